//! SQL dump import: CREATE/ALTER TABLE statements to schema descriptors.

mod dialect;
mod lexer;
mod parser;
mod types;

pub use dialect::Dialect;
pub use parser::{SqlParseError, parse_sql};
pub use types::{ColumnType, parse_type};
