//! Per-batch timing samples and the sinks that consume them.
//!
//! Supported file formats:
//! - JSON: array of `{"rows": .., "elapsed_ms": ..}` objects (default)
//! - CSV: `rows,elapsed_ms` with a header row
//!
//! Samples are always handed over in commit order, so `rows` (the x axis of
//! a chart) is non-decreasing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timing of one committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSample {
    /// Rows consumed from the file so far, including this batch.
    pub rows: u64,
    /// Wall-clock time of the insert and commit.
    pub elapsed_ms: u64,
}

/// Consumer of a table's ordered timing samples.
pub trait TimingSink {
    fn record(&mut self, table: &str, samples: &[TimingSample]) -> Result<()>;

    /// File a table's samples are written to, for sinks that write files.
    fn target(&self, _table: &str) -> Option<PathBuf> {
        None
    }
}

/// Sink that keeps every table's samples in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Vec<(String, Vec<TimingSample>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples recorded for `table`, if any were recorded.
    pub fn samples(&self, table: &str) -> Option<&[TimingSample]> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, samples)| samples.as_slice())
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(name, _)| name.as_str())
    }
}

impl TimingSink for MemorySink {
    fn record(&mut self, table: &str, samples: &[TimingSample]) -> Result<()> {
        self.tables.push((table.to_string(), samples.to_vec()));
        Ok(())
    }
}

/// File format for timing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingFormat {
    #[default]
    Json,
    Csv,
}

impl TimingFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TimingFormat::Json => "json",
            TimingFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for TimingFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(TimingFormat::Json),
            "csv" => Ok(TimingFormat::Csv),
            _ => Err(format!("Unknown timing format: {}", s)),
        }
    }
}

/// Sink that writes `<dir>/<table>.<ext>` per table.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    format: TimingFormat,
}

impl FileSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>, format: TimingFormat) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| Error::TimingOutput {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { dir, format })
    }

    /// Output path for a table.
    pub fn path_for(&self, table: &str) -> PathBuf {
        timing_path(&self.dir, table, self.format)
    }

    fn write_file(&self, path: &Path, samples: &[TimingSample]) -> Result<()> {
        let output_error = |message: String| Error::TimingOutput {
            path: path.to_path_buf(),
            message,
        };

        let file = File::create(path).map_err(|e| output_error(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        let written = match self.format {
            TimingFormat::Json => write_samples_json(samples, &mut writer),
            TimingFormat::Csv => write_samples_csv(samples, &mut writer),
        };
        written.map_err(|e| output_error(e.to_string()))?;
        writer.flush().map_err(|e| output_error(e.to_string()))
    }
}

impl TimingSink for FileSink {
    fn record(&mut self, table: &str, samples: &[TimingSample]) -> Result<()> {
        let path = self.path_for(table);
        self.write_file(&path, samples)?;
        info!(
            "Timing: {} samples for '{}' -> {}",
            samples.len(),
            table,
            path.display()
        );
        Ok(())
    }

    fn target(&self, table: &str) -> Option<PathBuf> {
        Some(self.path_for(table))
    }
}

/// `<dir>/<table>.<ext>`
pub fn timing_path(dir: &Path, table: &str, format: TimingFormat) -> PathBuf {
    dir.join(format!("{}.{}", table, format.extension()))
}

/// Write samples as pretty-printed JSON.
pub fn write_samples_json<W: Write>(samples: &[TimingSample], writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, samples).map_err(|e| Error::TimingOutput {
        path: PathBuf::from("<json>"),
        message: e.to_string(),
    })?;
    writeln!(writer)?;
    Ok(())
}

/// Write samples as CSV with a `rows,elapsed_ms` header.
pub fn write_samples_csv<W: Write>(samples: &[TimingSample], writer: &mut W) -> Result<()> {
    let csv_error = |e: csv::Error| Error::TimingOutput {
        path: PathBuf::from("<csv>"),
        message: e.to_string(),
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    // An empty run still gets a header.
    if samples.is_empty() {
        csv_writer
            .write_record(["rows", "elapsed_ms"])
            .map_err(csv_error)?;
    }
    for sample in samples {
        csv_writer.serialize(sample).map_err(csv_error)?;
    }
    csv_writer.flush()?;
    Ok(())
}
