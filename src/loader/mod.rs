//! Batch loading of CSV files into a [`Store`].
//!
//! Each file becomes one table named after the file. Rows are streamed in
//! file order into batches of `batch_size`; every full batch, and the
//! trailing partial batch, is inserted and committed on its own and timed.

pub mod walker;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;

use crate::config::LoadConfig;
use crate::error::{Error, Result};
use crate::input::{CsvReader, Row};
use crate::schema::TableSpec;
use crate::store::Store;
use crate::timing::{TimingSample, TimingSink};

pub use walker::{resolve_inputs, table_name};

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub files: usize,
    pub rows: u64,
    pub batches: usize,
}

/// Loads files into a store, reporting batch timings to a sink.
pub struct Loader<K: TimingSink> {
    config: LoadConfig,
    sink: K,
}

impl<K: TimingSink> Loader<K> {
    pub fn new(config: LoadConfig, sink: K) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Load a file or every `*.csv` file of a directory.
    ///
    /// The first failing file aborts the run. Nothing is provisioned when a
    /// timing file would overwrite one of the inputs.
    pub fn run(&mut self, store: &mut dyn Store, input: &Path) -> Result<LoadSummary> {
        info!("Loading File: {}", input.display());

        let files = resolve_inputs(input)?;
        ensure_inputs_preserved(&files, |table| self.sink.target(table))?;
        let mut summary = LoadSummary::default();

        for path in &files {
            info!("Processing - File - '{}'", path.display());
            let table = table_name(path)?;
            let samples = self.process_file(store, &table, path)?;

            summary.files += 1;
            summary.batches += samples.len();
            summary.rows += samples.last().map_or(0, |s| s.rows);
        }

        info!(
            "Loaded {} rows in {} batches from {} files",
            summary.rows, summary.batches, summary.files
        );
        Ok(summary)
    }

    /// Load one file into `table`.
    ///
    /// Schema and insert errors are tagged with `path`.
    pub fn process_file(
        &mut self,
        store: &mut dyn Store,
        table: &str,
        path: &Path,
    ) -> Result<Vec<TimingSample>> {
        let reader = CsvReader::open(path)?;
        self.process_reader(store, table, reader).map_err(|e| e.in_file(path))
    }

    /// Load rows from an already opened reader into `table`.
    pub fn process_reader<R: Read>(
        &mut self,
        store: &mut dyn Store,
        table: &str,
        mut reader: CsvReader<R>,
    ) -> Result<Vec<TimingSample>> {
        info!("{:?}", reader.headers());
        let spec = TableSpec::from_headers(table, reader.headers(), &self.config.date_fields)?;
        store.provision(&spec, self.config.drop_first)?;

        let batch_size = self.config.batch_size;
        let mut batch: Vec<Row> = Vec::new();
        let mut total: u64 = 0;
        let mut samples = Vec::new();

        loop {
            if self.config.limit_reached(total) {
                info!(
                    "Limit - {} rows - {} - rows : reached",
                    self.config.limit, total
                );
                break;
            }

            let Some(row) = reader.read_row()? else {
                break;
            };
            batch.push(row);
            total += 1;

            if batch.len() == batch_size {
                samples.push(commit_batch(store, &spec, &batch, total)?);
                batch.clear();
            }
        }

        if !batch.is_empty() {
            samples.push(commit_batch(store, &spec, &batch, total)?);
        }

        self.sink.record(table, &samples)?;
        Ok(samples)
    }
}

/// Fail when a timing file would land on one of `files`.
///
/// `target` maps a table name to the file its timings are written to.
pub fn ensure_inputs_preserved<F>(files: &[PathBuf], target: F) -> Result<()>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    for path in files {
        let Some(output) = target(&table_name(path)?) else {
            continue;
        };
        if let Some(input) = files.iter().find(|input| same_file(&output, input)) {
            return Err(Error::OutputClash {
                output,
                input: input.clone(),
            });
        }
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Insert one batch and time it.
///
/// `total` counts the rows read so far, the batch being the last of them.
fn commit_batch(
    store: &mut dyn Store,
    spec: &TableSpec,
    batch: &[Row],
    total: u64,
) -> Result<TimingSample> {
    let rows_before = usize::try_from(total)
        .unwrap_or(usize::MAX)
        .saturating_sub(batch.len());

    let commenced = Instant::now();
    store
        .insert(spec, batch)
        .map_err(|e| e.offset_row(rows_before))?;
    let elapsed_ms = u64::try_from(commenced.elapsed().as_millis()).unwrap_or(u64::MAX);

    info!("Committed - {} ms - {} - rows", elapsed_ms, total);
    Ok(TimingSample {
        rows: total,
        elapsed_ms,
    })
}

/// A loader paired with the store it writes to.
pub struct Processor<S: Store, K: TimingSink> {
    loader: Loader<K>,
    store: S,
}

impl<S: Store, K: TimingSink> Processor<S, K> {
    pub fn new(loader: Loader<K>, store: S) -> Self {
        Self { loader, store }
    }

    pub fn run(&mut self, input: &Path) -> Result<LoadSummary> {
        self.loader.run(&mut self.store, input)
    }

    pub fn loader(&self) -> &Loader<K> {
        &self.loader
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (Loader<K>, S) {
        (self.loader, self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::timing::MemorySink;
    use std::io::Cursor;

    fn load(
        csv: &str,
        config: LoadConfig,
    ) -> (Result<Vec<TimingSample>>, MemoryStore, MemorySink) {
        let mut store = MemoryStore::new();
        let mut loader = Loader::new(config, MemorySink::new());
        let reader = CsvReader::new(Cursor::new(csv.to_string()), "<memory>").unwrap();
        let result = loader.process_reader(&mut store, "t", reader);
        (result, store, loader.into_sink())
    }

    fn rows_of(batch: &[Row]) -> Vec<Vec<&str>> {
        batch
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_full_and_trailing_batches() {
        let (result, store, sink) = load("a,b\n1,2\n3,4\n5,6", LoadConfig::new(2).unwrap());
        let samples = result.unwrap();

        let inserts = store.inserts_into("t");
        assert_eq!(inserts.len(), 2);
        assert_eq!(rows_of(inserts[0]), vec![vec!["1", "2"], vec!["3", "4"]]);
        assert_eq!(rows_of(inserts[1]), vec![vec!["5", "6"]]);

        let counts: Vec<u64> = samples.iter().map(|s| s.rows).collect();
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(sink.samples("t").unwrap(), samples.as_slice());
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_batch() {
        let (result, store, _) = load("a\n1\n2\n3\n4", LoadConfig::new(2).unwrap());
        assert_eq!(result.unwrap().len(), 2);
        assert_eq!(store.inserts_into("t").len(), 2);
    }

    #[test]
    fn test_limit_below_batch_size() {
        let config = LoadConfig::new(2).unwrap().with_limit(1);
        let (result, store, _) = load("a,b\n1,2\n3,4\n5,6", config);

        let samples = result.unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].rows, 1);
        assert_eq!(rows_of(store.inserts_into("t")[0]), vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_limit_on_batch_boundary() {
        let config = LoadConfig::new(2).unwrap().with_limit(4);
        let (result, store, _) = load("a\n1\n2\n3\n4\n5\n6", config);

        let counts: Vec<u64> = result.unwrap().iter().map(|s| s.rows).collect();
        assert_eq!(counts, vec![2, 4]);
        assert_eq!(store.table("t").unwrap().rows.len(), 4);
    }

    #[test]
    fn test_header_only_file_provisions_without_inserts() {
        let (result, store, sink) = load("a,b\n", LoadConfig::new(2).unwrap());

        assert!(result.unwrap().is_empty());
        assert!(store.table("t").is_some());
        assert!(store.inserts_into("t").is_empty());
        assert_eq!(sink.samples("t"), Some(&[][..]));
    }

    #[test]
    fn test_ragged_row_aborts_file() {
        let (result, store, sink) = load("a,b\n1,2\n3\n", LoadConfig::new(10).unwrap());

        assert!(matches!(result, Err(Error::RowLength { row: 2, .. })));
        assert!(store.table("t").unwrap().rows.is_empty());
        assert!(sink.samples("t").is_none());
    }

    #[test]
    fn test_ragged_row_number_counts_from_file_start() {
        let (result, store, _) = load("a,b\n1,2\n3,4\n5,6\n7\n", LoadConfig::new(2).unwrap());

        assert!(matches!(result, Err(Error::RowLength { row: 4, .. })));
        assert_eq!(store.table("t").unwrap().rows.len(), 2);
    }

    #[test]
    fn test_ensure_inputs_preserved() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("x.csv");
        std::fs::write(&input, "a\n1\n").unwrap();
        let files = vec![input.clone()];

        let as_csv = |t: &str| Some(dir.path().join(format!("{t}.csv")));
        let as_json = |t: &str| Some(dir.path().join(format!("{t}.json")));

        let err = ensure_inputs_preserved(&files, as_csv).unwrap_err();
        assert!(matches!(err, Error::OutputClash { .. }));
        assert!(ensure_inputs_preserved(&files, as_json).is_ok());
        assert!(ensure_inputs_preserved(&files, |_| None).is_ok());
    }

    #[test]
    fn test_date_fields_reach_schema() {
        let config = LoadConfig::new(1)
            .unwrap()
            .with_date_fields(["d"].into_iter().collect());
        let mut store = MemoryStore::new();
        let mut loader = Loader::new(config, MemorySink::new());
        let reader = CsvReader::new(Cursor::new("d,n\n2024-01-01,x"), "<memory>").unwrap();
        loader.process_reader(&mut store, "t", reader).unwrap();

        assert_eq!(store.table("t").unwrap().rows.len(), 1);
    }
}
