//! Upload-triggered row filter.
//!
//! For each object-created event the filter reads the uploaded CSV, drops records that fail
//! [`admit_upload`], and writes the survivors under the original header to
//! `<destination prefix><source basename>` in the destination bucket.
//!
//! Store, decoding and encoding errors are logged with the source location and returned to the
//! caller unchanged; retrying is left to whatever invoked the handler.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{RowFilterConfig, DESTINATION_BUCKET_VAR};
use crate::error::{PipelineError, PipelineResult};
use crate::event::ObjectCreatedEvent;
use crate::export::{write_csv, CsvWriteOptions, OutputFormat};
use crate::ingestion::csv::read_csv_from_bytes;
use crate::observability::{Reporting, Stage, StageContext, StageStats};
use crate::processing::{admit_upload, filter, Admission};
use crate::store::{ObjectLocation, ObjectStore};
use crate::types::DataSet;

/// What one invocation of [`RowFilter::handle`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilterOutcome {
    /// Admitted records were written to `destination`.
    Written {
        source: ObjectLocation,
        destination: ObjectLocation,
        rows_in: usize,
        rows_out: usize,
    },
    /// The source key does not end in `.csv`; nothing was read.
    SkippedNotCsv { source: ObjectLocation },
    /// No record survived admission; nothing was written.
    NoRowsAdmitted { source: ObjectLocation, rows_in: usize },
    /// The source object is empty or has no header line.
    MissingHeader { source: ObjectLocation },
    /// The destination bucket is not configured; the event was not touched.
    ConfigurationError { message: String },
}

/// Status code plus JSON-encoded message, as returned to the invoking runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: serde_json::Value::String(message.into()).to_string(),
        }
    }
}

impl RowFilterOutcome {
    /// `true` for every outcome except the client-input and configuration failures.
    pub fn is_success(&self) -> bool {
        self.response().status_code == 200
    }

    pub fn response(&self) -> HandlerResponse {
        match self {
            Self::Written {
                source, destination, ..
            } => HandlerResponse::new(
                200,
                format!(
                    "File {} processed successfully and uploaded to {}/{}",
                    source.key, destination.bucket, destination.key
                ),
            ),
            Self::SkippedNotCsv { .. } => HandlerResponse::new(200, "File is not a CSV. Skipped."),
            Self::NoRowsAdmitted { .. } => HandlerResponse::new(200, "No data after preprocessing."),
            Self::MissingHeader { .. } => HandlerResponse::new(400, "CSV has no headers or is empty."),
            Self::ConfigurationError { message } => {
                HandlerResponse::new(500, format!("Configuration error: {message}"))
            }
        }
    }
}

/// The row filter stage, with its store and settings injected.
pub struct RowFilter {
    store: Arc<dyn ObjectStore>,
    config: RowFilterConfig,
    reporting: Reporting,
}

impl RowFilter {
    pub fn new(store: Arc<dyn ObjectStore>, config: RowFilterConfig) -> Self {
        Self {
            store,
            config,
            reporting: Reporting::default(),
        }
    }

    /// Attach an observer and alert threshold.
    pub fn with_reporting(mut self, reporting: Reporting) -> Self {
        self.reporting = reporting;
        self
    }

    pub fn config(&self) -> &RowFilterConfig {
        &self.config
    }

    /// Handle one object-created event.
    ///
    /// Only the first record of the event is consumed. Returns `Err` for store, decoding and
    /// encoding failures; every other result, including the no-op exits, is an `Ok` outcome.
    pub fn handle(&self, event: &ObjectCreatedEvent) -> PipelineResult<RowFilterOutcome> {
        let Some(destination_bucket) = self.config.destination_bucket.as_deref() else {
            let message = format!("{DESTINATION_BUCKET_VAR} not set");
            tracing::error!("{DESTINATION_BUCKET_VAR} environment variable not set");
            let ctx = StageContext {
                stage: Stage::RowFilter,
                source: "<unread event>".to_string(),
            };
            self.reporting.failure(
                &ctx,
                &PipelineError::Config {
                    message: message.clone(),
                },
            );
            return Ok(RowFilterOutcome::ConfigurationError { message });
        };

        let source = match event.source() {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(error = %e, "error reading event");
                let ctx = StageContext {
                    stage: Stage::RowFilter,
                    source: "<unread event>".to_string(),
                };
                self.reporting.failure(&ctx, &e);
                return Err(e);
            }
        };
        tracing::info!(source_bucket = %source.bucket, source_key = %source.key, "received object");

        let ctx = StageContext {
            stage: Stage::RowFilter,
            source: source.to_string(),
        };
        match self.process(&source, destination_bucket) {
            Ok(outcome) => {
                match &outcome {
                    RowFilterOutcome::MissingHeader { .. } => {
                        self.reporting.failure(&ctx, &PipelineError::MissingHeader)
                    }
                    RowFilterOutcome::Written { rows_in, rows_out, .. } => self.reporting.success(
                        &ctx,
                        StageStats {
                            rows_in: *rows_in,
                            rows_out: *rows_out,
                        },
                    ),
                    RowFilterOutcome::NoRowsAdmitted { rows_in, .. } => self.reporting.success(
                        &ctx,
                        StageStats {
                            rows_in: *rows_in,
                            rows_out: 0,
                        },
                    ),
                    _ => self.reporting.success(&ctx, StageStats::default()),
                }
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(
                    source_bucket = %source.bucket,
                    source_key = %source.key,
                    error = %e,
                    "error processing file"
                );
                self.reporting.failure(&ctx, &e);
                Err(e)
            }
        }
    }

    fn process(&self, source: &ObjectLocation, destination_bucket: &str) -> PipelineResult<RowFilterOutcome> {
        if !source.key.to_lowercase().ends_with(".csv") {
            tracing::info!(key = %source.key, "file is not a CSV; skipping");
            return Ok(RowFilterOutcome::SkippedNotCsv {
                source: source.clone(),
            });
        }

        let body = self.store.get(source)?;
        let dataset = match read_csv_from_bytes(body) {
            Ok(ds) => ds,
            Err(PipelineError::MissingHeader) => {
                tracing::warn!(key = %source.key, "csv has no headers or is empty");
                return Ok(RowFilterOutcome::MissingHeader {
                    source: source.clone(),
                });
            }
            Err(e) => return Err(e),
        };

        let admitted = admit_records(&dataset);
        let rows_in = dataset.row_count();
        let rows_out = admitted.row_count();
        tracing::info!(rows_in, rows_out, "preprocessed rows");

        if admitted.is_empty() {
            tracing::info!(key = %source.key, "no data left after preprocessing; nothing to write");
            return Ok(RowFilterOutcome::NoRowsAdmitted {
                source: source.clone(),
                rows_in,
            });
        }

        let destination = ObjectLocation::new(
            destination_bucket,
            format!("{}{}", self.config.destination_prefix, source.basename()),
        );
        let body = write_csv(&admitted, &CsvWriteOptions::default())?;
        tracing::info!(
            destination_bucket = %destination.bucket,
            destination_key = %destination.key,
            "writing processed data"
        );
        self.store.put(&destination, body, OutputFormat::Csv.content_type())?;

        Ok(RowFilterOutcome::Written {
            source: source.clone(),
            destination,
            rows_in,
            rows_out,
        })
    }
}

/// Keep admitted records under the original header. Records without an email are logged by id.
pub fn admit_records(dataset: &DataSet) -> DataSet {
    filter(dataset, |record| match admit_upload(record) {
        Admission::Admitted => true,
        Admission::MissingEmail => {
            let id = record.get("id").unwrap_or("N/A");
            tracing::info!(id, "skipping row due to missing email");
            false
        }
        Admission::Pending => false,
    })
}
