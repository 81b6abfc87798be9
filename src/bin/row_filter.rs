//! row-filter CLI
//!
//! Handles one object-created event against a local directory store and prints the handler
//! response as JSON on stdout. The destination comes from `PROCESSED_BUCKET_NAME` and
//! `PROCESSED_BUCKET_KEY_PREFIX`.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use csv_pipeline::config::RowFilterConfig;
use csv_pipeline::event::ObjectCreatedEvent;
use csv_pipeline::logging::init_logging;
use csv_pipeline::observability::{CompositeObserver, FileObserver, PipelineObserver, Reporting, TracingObserver};
use csv_pipeline::row_filter::RowFilter;
use csv_pipeline::store::LocalFsStore;
use csv_pipeline::PipelineResult;

/// Filter one uploaded CSV: drop rows without an email or with a pending status.
///
/// ## Examples
///
///   PROCESSED_BUCKET_NAME=csv-processed-data row-filter --store-root ./data event.json
///
///   cat event.json | row-filter --store-root ./data
#[derive(Parser, Debug)]
#[command(name = "row-filter", version, about, long_about = None)]
struct Cli {
    /// Event JSON file; reads stdin when omitted
    event: Option<PathBuf>,

    /// Directory holding one subdirectory per bucket
    #[arg(long, env = "CSV_PIPELINE_STORE_ROOT", default_value = ".")]
    store_root: PathBuf,

    /// Also append outcomes as JSON lines to this file
    #[arg(long)]
    audit_log: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn read_event(path: Option<&PathBuf>) -> PipelineResult<ObjectCreatedEvent> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    ObjectCreatedEvent::from_json(&text)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut observers: Vec<Arc<dyn PipelineObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = cli.audit_log.as_ref() {
        observers.push(Arc::new(FileObserver::new(path)));
    }

    let store = Arc::new(LocalFsStore::new(&cli.store_root));
    let filter = RowFilter::new(store, RowFilterConfig::from_env()).with_reporting(Reporting {
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        ..Default::default()
    });

    let result = read_event(cli.event.as_ref()).and_then(|event| filter.handle(&event));
    match result {
        Ok(outcome) => {
            let response = outcome.response();
            match serde_json::to_string(&response) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode response");
                    return ExitCode::FAILURE;
                }
            }
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "row filter failed");
            ExitCode::FAILURE
        }
    }
}
