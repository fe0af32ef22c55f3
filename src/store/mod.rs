//! Destination stores.
//!
//! A [`Store`] provisions tables and inserts batches. Each call is its own
//! unit of work: it either commits completely or returns an error.

pub mod memory;
pub mod pg;

pub use self::memory::MemoryStore;
pub use self::pg::PgStore;

use crate::error::{Error, Result};
use crate::input::Row;
use crate::schema::TableSpec;

pub trait Store {
    /// Create the table for `spec`, dropping any existing table first when
    /// `drop_first` is set. Returns the table name.
    fn provision(&mut self, spec: &TableSpec, drop_first: bool) -> Result<String>;

    /// Insert `rows` into the table for `spec` and commit them together.
    fn insert(&mut self, spec: &TableSpec, rows: &[Row]) -> Result<()>;
}

/// Check that every row has exactly one value per column.
pub fn validate_rows(spec: &TableSpec, rows: &[Row]) -> Result<()> {
    let expected = spec.len();
    match rows.iter().position(|row| row.len() != expected) {
        Some(i) => Err(Error::RowLength {
            table: spec.name().to_string(),
            row: i + 1,
            expected,
            found: rows[i].len(),
        }),
        None => Ok(()),
    }
}
