//! Descriptive profiling of tables and columns.

mod column;
mod table;

pub use column::{
    CategoricalStats, ColumnProfile, ColumnStats, NumericStats, TOP_VALUES, TemporalStats,
};
pub use table::{Profiler, TableProfile};
