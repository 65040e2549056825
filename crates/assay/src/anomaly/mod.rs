//! Statistical outlier detection.
//!
//! Univariate detection (IQR, z-score) works per numeric column; the
//! isolation forest flags rows that are unusual across several columns.

mod detector;
mod isolation;
mod univariate;

pub use detector::{
    AnomalyConfig, AnomalyDetector, AnomalyFinding, DetectionMethod, MultivariateOutliers,
    OutlierLabel, TableAnomalies,
};
pub use isolation::{IsolationConfig, IsolationForest};
pub use univariate::{iqr_outliers, zscore_outliers};
