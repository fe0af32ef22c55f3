//! CSV input reader.
//!
//! Reads the header row once, then yields data rows as positional string
//! vectors. The reader is flexible: ragged rows are returned as-is and
//! rejected later by the batch inserter's arity check.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One data row, positionally aligned with the header.
pub type Row = Vec<String>;

/// CSV reader that yields rows of text values.
pub struct CsvReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    source: PathBuf,
    record: csv::StringRecord,
}

impl CsvReader<BufReader<File>> {
    /// Open a file and read its header row.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::FileOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::new(BufReader::new(file), path)
    }
}

impl<R: Read> CsvReader<R> {
    /// Create a new CSV reader; `source` names the input in error messages.
    pub fn new(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| Error::Csv {
                path: source.clone(),
                message: e.to_string(),
            })?
            .iter()
            .map(|s| s.to_string())
            .collect();

        if headers.is_empty() {
            return Err(Error::MissingHeader(source));
        }

        Ok(Self {
            reader: csv_reader,
            headers,
            source,
            record: csv::StringRecord::new(),
        })
    }

    /// Get the headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Name of the input, as used in error messages.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Read the next data row, or `None` at end of input.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Ok(Some(self.record.iter().map(|s| s.to_string()).collect())),
            Ok(false) => Ok(None),
            Err(e) => Err(Error::Csv {
                path: self.source.clone(),
                message: e.to_string(),
            }),
        }
    }
}

impl<R: Read> Iterator for CsvReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}
