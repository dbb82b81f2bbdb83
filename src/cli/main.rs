//! CLI binary entry point for pulse-loader

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use pulse_loader::cli::commands::ingest::{IngestArgs, handle_ingest};
#[cfg(feature = "cli")]
use pulse_loader::cli::commands::init::{InitArgs, handle_init};
#[cfg(feature = "cli")]
use pulse_loader::cli::commands::query::{QueryArgs, handle_query};
#[cfg(feature = "cli")]
use pulse_loader::cli::commands::report::{ReportArgs, handle_report};
#[cfg(feature = "cli")]
use pulse_loader::cli::commands::status::{StatusArgs, handle_status};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "pulse-loader")]
#[command(about = "Load the Pulse payments dataset into DuckDB or PostgreSQL")]
#[command(version)]
struct Cli {
    /// Directory holding .pulse-loader.toml
    #[arg(short, long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Write a starter .pulse-loader.toml
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Ingest a snapshot checkout into the configured store
    Ingest {
        /// Snapshot root (defaults to [dataset] root)
        #[arg(short, long)]
        root: Option<PathBuf>,
        /// Glob pattern relative to the root (defaults to [dataset] pattern)
        #[arg(short, long)]
        pattern: Option<String>,
        /// Extract files concurrently
        #[arg(long)]
        parallel: bool,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
        /// Output format (table, json, csv)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// Show row counts of the destination tables
    Status {
        /// Output format (table, json, csv)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// Run a canned report
    Report {
        /// Report name (transactions-by-type, state-transactions-by-type, users-by-brand,
        /// state-users-by-brand, top-transaction-entities, states, districts,
        /// district-transactions)
        name: String,
        /// State filter
        #[arg(long)]
        state: Option<String>,
        /// District filter
        #[arg(long)]
        district: Option<String>,
        /// Output format (table, json, csv)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// Execute SQL against the configured store
    Query {
        /// SQL query to execute
        sql: String,
        /// Output format (table, json, csv)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "pulse_loader=debug"
    } else {
        "pulse_loader=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = cli.config_dir;
    let result = match cli.command {
        Commands::Init { force } => handle_init(&InitArgs { config_dir, force }).map(|path| {
            println!("Wrote {}", path.display());
        }),
        Commands::Ingest {
            root,
            pattern,
            parallel,
            quiet,
            format,
        } => {
            let args = IngestArgs {
                config_dir,
                root,
                pattern,
                parallel,
                quiet,
                format,
            };
            handle_ingest(&args).map(|_| ())
        }
        Commands::Status { format } => handle_status(&StatusArgs { config_dir, format }),
        Commands::Report {
            name,
            state,
            district,
            format,
        } => {
            let args = ReportArgs {
                config_dir,
                name,
                state,
                district,
                format,
            };
            handle_report(&args)
        }
        Commands::Query { sql, format } => {
            let args = QueryArgs {
                sql,
                config_dir,
                format,
            };
            handle_query(&args)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
