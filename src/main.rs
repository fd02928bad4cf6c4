mod config;
mod convert;
mod error;
mod host;
mod importer;
mod pack;
mod resource;

/// Version injected at compile time via PACKLOAD_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("PACKLOAD_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use convert::ConvertOptions;
use host::client::HostClient;
use host::registry::RemoteRegistry;
use importer::ImportOptions;
use pack::PackRef;
use serde_json::Value;
use tracing::Level;

/// Import JSON game data into a tabletop host compendium pack
#[derive(Parser, Debug)]
#[command(name = "packload", version = VERSION, about, long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace a compendium pack's entries with the records of a JSON resource
    Import(ImportArgs),

    /// Convert a CSV of roll tables into the JSON record array the import expects
    Convert(ConvertArgs),
}

#[derive(Debug, clap::Args)]
struct ImportArgs {
    /// Path or URL of the JSON resource holding the records to import
    resource: String,

    /// Target pack as '<namespace>.<collection>' (e.g. world.new-compendium)
    pack: String,

    /// Base URL of the host API
    #[arg(long)]
    host: Option<String>,

    /// Bearer token for the host API
    #[arg(long)]
    token: Option<String>,

    /// Resolve, fetch, and report without deleting or creating entries
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, clap::Args)]
struct ConvertArgs {
    /// The input CSV
    input: PathBuf,

    /// Write the JSON array here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The separator character
    #[arg(long, default_value = ",")]
    separator: char,

    /// Merge multi-column tables into a single combined table instead of
    /// one table per column
    #[arg(long)]
    combined: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = setup_logging(cli.log_level);

    match cli.command {
        Command::Import(args) => run_import(&args).await,
        Command::Convert(args) => run_convert(&args).await,
    }
}

async fn run_import(args: &ImportArgs) -> Result<()> {
    let mut config = Config::load();
    let base_url = args
        .host
        .clone()
        .unwrap_or_else(|| config.effective_base_url());
    let token = args.token.clone().or_else(|| config.effective_token());

    let pack: PackRef = args.pack.parse()?;

    tracing::info!("using host: {}, pack: {}", base_url, pack);

    let client = HostClient::new(&base_url, token)?;
    let registry = RemoteRegistry::new(client);

    let records = resource::fetch_records(&args.resource).await?;
    tracing::info!("loaded {} records from {}", records.len(), args.resource);

    let options = ImportOptions {
        dry_run: args.dry_run,
    };
    let summary = importer::import_records(&registry, &pack, &records, &options).await?;

    println!("{summary}");

    if !summary.dry_run {
        if let Err(e) = config.set_last_pack(&summary.pack) {
            tracing::warn!("failed to save config: {}", e);
        }
    }

    Ok(())
}

async fn run_convert(args: &ConvertArgs) -> Result<()> {
    if !args.separator.is_ascii() {
        anyhow::bail!("separator must be a single ASCII character");
    }

    let content = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let options = ConvertOptions {
        combined: args.combined,
    };
    let tables = convert::convert_csv(&content, args.separator as u8, &options)?;
    tracing::info!("converted {} tables from {}", tables.len(), args.input.display());

    let body = serde_json::to_string_pretty(&Value::Array(tables))?;
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, body)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => println!("{body}"),
    }

    Ok(())
}
