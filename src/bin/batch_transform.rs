//! batch-transform CLI
//!
//! Runs one batch transform against a local directory store, a JSON catalog document and a
//! bookmark directory.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};

use csv_pipeline::batch_transform::{BatchTransformer, TransformOutcome};
use csv_pipeline::bookmark::{BookmarkMode, FileBookmarkStore};
use csv_pipeline::catalog::StaticCatalog;
use csv_pipeline::config::BatchTransformConfig;
use csv_pipeline::export::OutputFormat;
use csv_pipeline::logging::init_logging;
use csv_pipeline::observability::{CompositeObserver, FileObserver, PipelineObserver, Reporting, TracingObserver};
use csv_pipeline::store::{LocalFsStore, ObjectLocation};
use csv_pipeline::PipelineResult;

/// Rename, filter and project a cataloged table into a final CSV or Parquet object.
///
/// ## Examples
///
///   batch-transform --job-name users-final --database csv_pipeline_db --table processed \
///     --catalog catalog.json --store-root ./data --output s3://csv-final-data/final_output/
#[derive(Parser, Debug)]
#[command(name = "batch-transform", version, about, long_about = None)]
struct Cli {
    /// Job name; also keys the bookmark
    #[arg(long, env = "JOB_NAME")]
    job_name: String,

    /// Catalog database
    #[arg(long)]
    database: String,

    /// Catalog table
    #[arg(long)]
    table: String,

    /// Catalog JSON document
    #[arg(long)]
    catalog: PathBuf,

    /// Directory holding one subdirectory per bucket
    #[arg(long, env = "CSV_PIPELINE_STORE_ROOT", default_value = ".")]
    store_root: PathBuf,

    /// Output prefix, e.g. s3://csv-final-data/final_output/
    #[arg(long)]
    output: String,

    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: FormatArg,

    /// Directory for bookmark files
    #[arg(long, default_value = ".bookmarks")]
    bookmarks_dir: PathBuf,

    /// Job bookmark option
    #[arg(long, value_enum, default_value = "enable")]
    job_bookmark_option: BookmarkArg,

    /// Run identifier used in output object names (defaults to the current Unix time in ms)
    #[arg(long)]
    run_id: Option<String>,

    /// Also append outcomes as JSON lines to this file
    #[arg(long)]
    audit_log: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BookmarkArg {
    Enable,
    Disable,
}

fn default_run_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .to_string()
}

fn build(cli: Cli) -> PipelineResult<BatchTransformer> {
    let mut config = BatchTransformConfig::new(
        cli.job_name,
        cli.database,
        cli.table,
        ObjectLocation::parse(&cli.output)?,
        cli.run_id.unwrap_or_else(default_run_id),
    );
    config.format = match cli.format {
        FormatArg::Csv => OutputFormat::Csv,
        FormatArg::Parquet => OutputFormat::Parquet,
    };
    config.bookmarks = match cli.job_bookmark_option {
        BookmarkArg::Enable => BookmarkMode::Enabled,
        BookmarkArg::Disable => BookmarkMode::Disabled,
    };

    let mut observers: Vec<Arc<dyn PipelineObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = cli.audit_log.as_ref() {
        observers.push(Arc::new(FileObserver::new(path)));
    }

    let catalog = StaticCatalog::from_path(&cli.catalog)?;
    Ok(BatchTransformer::new(
        Arc::new(LocalFsStore::new(&cli.store_root)),
        Arc::new(catalog),
        Arc::new(FileBookmarkStore::new(&cli.bookmarks_dir)),
        config,
    )
    .with_reporting(Reporting {
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        ..Default::default()
    }))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match build(cli).and_then(|job| job.run()) {
        Ok(TransformOutcome::Written { destination, rows_out, .. }) => {
            println!("wrote {rows_out} rows to {destination}");
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            println!("nothing written: {outcome:?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "batch transform failed");
            ExitCode::FAILURE
        }
    }
}
