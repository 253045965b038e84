//! Data model for tabular data representation

mod key;
mod schema;
mod table;

pub use key::{resolve_key_columns, KeyIndex, RowKey};
pub use schema::Column;
pub use table::{CellValue, Row, Table};
