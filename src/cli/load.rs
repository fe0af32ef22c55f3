//! Load command implementation.

use std::path::PathBuf;

use colored::Colorize;
use log::info;

use csv_batch_loader::loader::{ensure_inputs_preserved, resolve_inputs};
use csv_batch_loader::timing::timing_path;
use csv_batch_loader::{
    ConnectionDescriptor, FileSink, LoadConfig, LoadSummary, Loader, MemorySink, MemoryStore,
    PgStore, Processor, Properties, Store, TimingFormat, TimingSink,
};

use super::Cli;

/// Errors that can occur while running a load
#[derive(Debug)]
pub enum LoadCommandError {
    /// Invalid timing output format specified
    InvalidTimingFormat(String),
    /// A real load needs a connection string
    MissingConnection,
    /// A real load needs a timing output directory
    MissingOutput,
    /// Configuration, connection or loading error
    Load(csv_batch_loader::Error),
}

impl std::fmt::Display for LoadCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadCommandError::InvalidTimingFormat(fmt) => {
                write!(f, "Unknown timing format '{}'. Use 'json' or 'csv'.", fmt)
            }
            LoadCommandError::MissingConnection => {
                write!(
                    f,
                    "--connection (or LOADER_CONNECTION) is required unless --dry-run is set"
                )
            }
            LoadCommandError::MissingOutput => {
                write!(f, "--output is required unless --dry-run is set")
            }
            LoadCommandError::Load(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadCommandError {}

impl From<csv_batch_loader::Error> for LoadCommandError {
    fn from(e: csv_batch_loader::Error) -> Self {
        LoadCommandError::Load(e)
    }
}

/// Validated CLI arguments for a load
#[derive(Debug, Clone)]
pub struct ValidatedArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    /// `None` only in dry-run mode
    pub connection: Option<ConnectionDescriptor>,
    pub config: LoadConfig,
    pub timing_format: TimingFormat,
    pub dry_run: bool,
}

/// Validate CLI arguments and return validated args
///
/// The connection string is parsed and the timing targets are checked
/// against the inputs here, so both fail before any connection is attempted.
pub fn validate_cli_args(cli: &Cli) -> Result<ValidatedArgs, LoadCommandError> {
    let timing_format: TimingFormat = cli
        .timing_format
        .parse()
        .map_err(|_| LoadCommandError::InvalidTimingFormat(cli.timing_format.clone()))?;

    let properties = match &cli.properties {
        Some(path) => Properties::from_file(path)?,
        None => Properties::default(),
    };
    let config = LoadConfig::from_properties(properties, cli.batch_size, &cli.date_fields)?
        .with_limit(cli.limit)
        .with_drop_first(cli.drop);

    let connection = match (&cli.connection, cli.dry_run) {
        (Some(s), _) => Some(ConnectionDescriptor::parse(s)?),
        (None, true) => None,
        (None, false) => return Err(LoadCommandError::MissingConnection),
    };

    if cli.output.is_none() && !cli.dry_run {
        return Err(LoadCommandError::MissingOutput);
    }

    if !cli.input.exists() {
        return Err(csv_batch_loader::Error::NotFound(cli.input.clone()).into());
    }

    if let Some(output) = &cli.output {
        let files = resolve_inputs(&cli.input)?;
        ensure_inputs_preserved(&files, |table| {
            Some(timing_path(output, table, timing_format))
        })?;
    }

    Ok(ValidatedArgs {
        input: cli.input.clone(),
        output: cli.output.clone(),
        connection,
        config,
        timing_format,
        dry_run: cli.dry_run,
    })
}

/// Run a load from validated arguments (testable entry point)
pub fn execute(args: &ValidatedArgs) -> Result<LoadSummary, LoadCommandError> {
    info!("Input File: {}", args.input.display());
    if let Some(output) = &args.output {
        info!("Output File: {}", output.display());
    }
    info!("Drop Table: {}", args.config.drop_first);

    if let Some(descriptor) = &args.connection {
        log_descriptor(descriptor);
    }

    if args.dry_run {
        let store = MemoryStore::with_schema(
            args.connection
                .as_ref()
                .map_or("public", |descriptor| descriptor.schema.as_str()),
        );
        return match &args.output {
            Some(dir) => load_with(store, FileSink::new(dir, args.timing_format)?, args),
            None => load_with(store, MemorySink::new(), args),
        };
    }

    let descriptor = args
        .connection
        .as_ref()
        .ok_or(LoadCommandError::MissingConnection)?;
    let output = args.output.as_ref().ok_or(LoadCommandError::MissingOutput)?;

    let store = PgStore::connect(descriptor)?;
    load_with(store, FileSink::new(output, args.timing_format)?, args)
}

fn load_with<S: Store, K: TimingSink>(
    store: S,
    sink: K,
    args: &ValidatedArgs,
) -> Result<LoadSummary, LoadCommandError> {
    let loader = Loader::new(args.config.clone(), sink);
    let mut processor = Processor::new(loader, store);
    Ok(processor.run(&args.input)?)
}

fn log_descriptor(descriptor: &ConnectionDescriptor) {
    info!("Hostname: {}", descriptor.host);
    info!("Port: {}", descriptor.port);
    info!("Database: {}", descriptor.database);
    info!("Schema: {}", descriptor.schema);
    info!("Username: {}", descriptor.username);
}

/// Run the load command
pub fn run(cli: &Cli) {
    let args = match validate_cli_args(cli) {
        Ok(args) => args,
        Err(e) => exit_with(&e),
    };

    match execute(&args) {
        Ok(summary) => {
            if !cli.quiet {
                eprintln!(
                    "{} {} rows in {} batches from {} files{}",
                    "Loaded".green().bold(),
                    summary.rows,
                    summary.batches,
                    summary.files,
                    if args.dry_run { " (dry run)" } else { "" }
                );
            }
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &LoadCommandError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), e);
    std::process::exit(1);
}
