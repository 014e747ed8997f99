/// dagv command-line tool: validate, import, inspect, and export DAGs held
/// in a file-backed block store.
///
/// # Command overview
///
/// ```text
/// dagv <COMMAND> [OPTIONS]
///
/// Commands:
///   validate   Check that every block of a DAG is present
///   put        Import a file as a DAG and print its root identifier
///   links      Print the children of one block
///   export     Reassemble the data under a root into a file
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log run summaries (info level) to stderr
///   --no-color       Disable coloured log output
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                                         |
/// |------|-----------------------------------------------------------------|
/// | 0    | Success                                                         |
/// | 1    | Error, or `validate` found the DAG incomplete or not restorable |
///
/// Logs and error details go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_export;
mod cmd_links;
mod cmd_put;
mod cmd_validate;
mod fsutil;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// DAG completeness and integrity validator.
#[derive(Parser)]
#[command(name = "dagv", version, about = "DAG completeness validator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log run summaries (info level). `RUST_LOG` overrides.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable coloured log output.
    #[arg(long, global = true)]
    no_color: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Check that every block reachable from a root is present.
    Validate(ValidateArgs),
    /// Import a file into the store as a DAG.
    Put(PutArgs),
    /// Print the child identifiers of one block.
    Links(LinksArgs),
    /// Reassemble the data under a root into a file.
    Export(ExportArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `dagv validate`.
///
/// Candidates come from the positional list and, when given, from
/// `--candidates-file` (one identifier per line, blank lines skipped).
/// With neither, the candidate list is empty and every required block is
/// reported missing unless the walk proves otherwise.
///
/// ```text
/// ┌───────────────────┬──────────────────────────────────────────────────┐
/// │ Flag              │ Effect                                           │
/// ├───────────────────┼──────────────────────────────────────────────────┤
/// │ --json            │ Print the result record as JSON                  │
/// │ --concurrency N   │ Walk worker limit (default 16, 0 treated as 1)   │
/// │ --timeout-ms MS   │ Per-lookup store timeout                         │
/// └───────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Block store directory.
    #[arg(long)]
    pub store: PathBuf,

    /// Root identifier of the DAG.
    pub root: String,

    /// Candidate identifiers to probe.
    pub candidates: Vec<String>,

    /// Read further candidates from this file, one per line.
    #[arg(long)]
    pub candidates_file: Option<PathBuf>,

    /// Print the result as JSON instead of a report.
    #[arg(long)]
    pub json: bool,

    /// Maximum number of concurrent walk tasks.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-lookup store timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Arguments for `dagv put`.
#[derive(clap::Args)]
pub struct PutArgs {
    /// Block store directory (created if missing).
    #[arg(long)]
    pub store: PathBuf,

    /// File to import.
    pub file: PathBuf,

    /// Maximum bytes per raw leaf block.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Maximum children per interior node.
    #[arg(long)]
    pub max_links: Option<usize>,
}

/// Arguments for `dagv links`.
#[derive(clap::Args)]
pub struct LinksArgs {
    /// Block store directory.
    #[arg(long)]
    pub store: PathBuf,

    /// Identifier of the block to inspect.
    pub cid: String,
}

/// Arguments for `dagv export`.
///
/// The output file name is sanitized before use, so a `--name` taken from
/// untrusted metadata cannot escape `--out-dir`.
#[derive(clap::Args)]
pub struct ExportArgs {
    /// Block store directory.
    #[arg(long)]
    pub store: PathBuf,

    /// Root identifier of the DAG to export.
    pub root: String,

    /// Directory to write into (created if missing).
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Output file name.
    #[arg(long)]
    pub name: String,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(verbose: bool, no_color: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color);

    let result = match cli.command {
        Commands::Validate(args) => cmd_validate::run(&args).await,
        Commands::Put(args) => cmd_put::run(&args).await,
        Commands::Links(args) => cmd_links::run(&args).await,
        Commands::Export(args) => cmd_export::run(&args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
