//! CLI command implementations.

pub mod anomalies;
pub mod check;
pub mod clean;
pub mod profile;
pub mod rules;
