//! Table transforms that return new datasets: cleaning, derived columns
//! and business-rule filters.

mod cleaning;
mod operations;
mod registry;

pub use cleaning::{clean_nulls, remove_duplicates, standardize_dates};
pub use operations::{DeriveFn, Derivation, NullStrategy};
pub use registry::{TableTransform, TransformRegistry};
