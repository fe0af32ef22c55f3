//! Destination table schema derived from CSV headers.

pub mod ddl;
pub mod types;

pub use ddl::{create_table_sql, drop_table_sql, insert_sql, quote_ident};
pub use types::{ColumnDef, ColumnType, DateFields, TableSpec};
