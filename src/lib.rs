//! CSV Batch Loader
//!
//! A Rust library and CLI tool for bulk-loading CSV files into PostgreSQL.
//!
//! Each file's header row becomes a table (one `text` or `date` column per
//! header, plus a generated UUID primary key). Data rows are inserted in
//! fixed-size batches, each committed on its own, and the time taken by
//! every commit is reported to a [`TimingSink`].
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use csv_batch_loader::{CsvReader, LoadConfig, Loader, MemorySink, MemoryStore};
//!
//! let config = LoadConfig::new(2).unwrap();
//! let mut loader = Loader::new(config, MemorySink::new());
//! let mut store = MemoryStore::new();
//!
//! let reader = CsvReader::new(Cursor::new("a,b\n1,2\n3,4\n5,6"), "example.csv").unwrap();
//! let samples = loader.process_reader(&mut store, "example", reader).unwrap();
//!
//! // One sample per committed batch: two full rows, then the trailing one.
//! assert_eq!(samples.iter().map(|s| s.rows).collect::<Vec<_>>(), vec![2, 3]);
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod input;
pub mod loader;
pub mod schema;
pub mod store;
pub mod timing;

// Re-export commonly used types
pub use config::{LoadConfig, Properties};
pub use connection::ConnectionDescriptor;
pub use error::{Error, Result};
pub use input::{CsvReader, Row};
pub use loader::{LoadSummary, Loader, Processor};
pub use schema::{ColumnDef, ColumnType, DateFields, TableSpec};
pub use store::{MemoryStore, PgStore, Store};
pub use timing::{FileSink, MemorySink, TimingFormat, TimingSample, TimingSink};
