//! Delimited input readers.

pub mod csv;

pub use self::csv::{CsvReader, Row};
