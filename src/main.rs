use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use taxonomy_import::models::DEFAULT_TABLE;
use taxonomy_import::progress::{format_duration, ProgressMode};
use taxonomy_import::{run, ImportConfig};

const DEFAULT_CSV: &str = "generated_taxonomy_records.csv";
const DEFAULT_DB: &str = "../data/books.db";

#[derive(Parser)]
#[command(name = "import-taxonomy")]
#[command(about = "Import generated taxonomy CSV records into the SQLite books table")]
struct Args {
    /// CSV path (default: generated_taxonomy_records.csv next to this executable)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// SQLite DB path (default: ../data/books.db relative to this executable)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Target table
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Delete old taxonomy seed rows before import
    #[arg(long)]
    truncate_taxonomy: bool,

    /// Hide progress bars and log progress lines instead
    #[arg(long)]
    log_only: bool,
}

fn init_logging() {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_module("taxonomy_import", LevelFilter::Info);
    }
    let _ = builder.format_timestamp_millis().try_init();
}

/// Directory holding the running executable; defaults resolve against it.
fn tool_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let start = Instant::now();

    let mut config = ImportConfig::new(
        args.csv.unwrap_or_else(|| tool_dir().join(DEFAULT_CSV)),
        args.db.unwrap_or_else(|| tool_dir().join(DEFAULT_DB)),
    );
    config.table = args.table;
    config.truncate = args.truncate_taxonomy;
    if args.log_only {
        config.progress = ProgressMode::LogOnly;
    }

    let report = run(&config).context("Taxonomy import failed")?;

    println!("\n{:=<60}", "");
    println!("{}", report);
    println!("Elapsed:        {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
