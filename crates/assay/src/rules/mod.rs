//! Declarative validation rules and their execution engine.

mod engine;
mod predicate;
mod registry;
mod result;
mod rule;

pub use engine::{RuleEngine, evaluate_rule};
pub use predicate::{CompareOp, MaskFn, Predicate};
pub use registry::RuleRegistry;
pub use result::{ValidationResult, percentage};
pub use rule::{RuleType, Severity, ValidationRule};
