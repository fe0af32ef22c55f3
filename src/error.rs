//! Error types for the CSV batch loader.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for the loader.
///
/// Every variant is fatal to the run; nothing in the crate retries.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File/Directory '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema error for table '{table}': {message}")]
    Schema { table: String, message: String },

    #[error("Insert error for table '{table}': {message}")]
    Insert { table: String, message: String },

    /// `row` counts data rows from the start of the file, header excluded.
    #[error("Row {row} for table '{table}' has {found} values, expected {expected}")]
    RowLength {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Cannot open input file '{}': {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file '{}' has no header row", .0.display())]
    MissingHeader(PathBuf),

    #[error("CSV parse error in '{}': {message}", .path.display())]
    Csv { path: PathBuf, message: String },

    #[error("Cannot write timing output '{}': {message}", .path.display())]
    TimingOutput { path: PathBuf, message: String },

    #[error(
        "Timing output '{}' would overwrite input file '{}'",
        .output.display(),
        .input.display()
    )]
    OutputClash { output: PathBuf, input: PathBuf },

    #[error("{source} (file '{}')", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the input file to errors that only name their table.
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            Error::Schema { .. } | Error::Insert { .. } | Error::RowLength { .. } => {
                Error::InFile {
                    path: path.to_path_buf(),
                    source: Box::new(self),
                }
            }
            other => other,
        }
    }

    /// Shift a batch-relative row number to a position in the file.
    pub(crate) fn offset_row(self, offset: usize) -> Self {
        match self {
            Error::RowLength {
                table,
                row,
                expected,
                found,
            } => Error::RowLength {
                table,
                row: row + offset,
                expected,
                found,
            },
            other => other,
        }
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
