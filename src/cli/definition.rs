// Shared between the binary and build.rs (completions and man page), so it
// relies on the includer to bring `clap::Parser` and `PathBuf` into scope.

/// CSV Batch Loader CLI
#[derive(Parser, Debug)]
#[command(
    name = "csv-batch-loader",
    about = "Bulk-load CSV files into PostgreSQL in timed, committed batches",
    version = VERSION,
    author
)]
pub struct Cli {
    /// Input CSV file, or a directory whose *.csv files are loaded
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory for per-table timing output (created if missing)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Connection string: host:port:database:schema:username:password
    #[arg(short, long, env = "LOADER_CONNECTION", hide_env_values = true)]
    pub connection: Option<String>,

    /// Maximum rows to load per file (0 = no limit)
    #[arg(short, long, default_value = "0")]
    pub limit: u64,

    /// JSON properties file with batch_size and date_fields
    #[arg(short, long, value_name = "FILE")]
    pub properties: Option<PathBuf>,

    /// Drop each table before creating it
    #[arg(short, long)]
    pub drop: bool,

    /// Rows per committed batch (overrides the properties file)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Column to create as `date` (repeatable, added to the properties file)
    #[arg(long = "date-field", value_name = "NAME")]
    pub date_fields: Vec<String>,

    /// Timing output format: 'json' (default) or 'csv'
    #[arg(long, default_value = "json")]
    pub timing_format: String,

    /// Load into an in-memory store instead of connecting to PostgreSQL
    #[arg(long)]
    pub dry_run: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}
