//! Dataset model and delimited-file loading.

mod dataset;
mod parser;
mod source;
mod value;

pub use dataset::{Column, Dataset};
pub use parser::{Parser, ParserConfig};
pub use source::SourceMetadata;
pub use value::{ColumnKind, Value, ValueKey, infer_column, parse_timestamp};
