//! Catalog-driven batch transformer.
//!
//! One run resolves the source table through the [`Catalog`], reads every object the job has
//! not yet consumed, applies the [`crate::processing::TransformPlan`] (rename, status filter,
//! projection), writes one output object and commits the job bookmark.
//!
//! Every successful run commits, including runs that find no input or filter everything out,
//! so the same objects are not picked up again. Failed runs do not commit.

use std::sync::Arc;

use crate::bookmark::{BookmarkStore, Job};
use crate::catalog::Catalog;
use crate::config::BatchTransformConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::export::CsvWriteOptions;
use crate::ingestion::{read_object, InputFormat};
use crate::observability::{Reporting, Stage, StageContext, StageStats};
use crate::processing::PlanOutcome;
use crate::store::{ObjectLocation, ObjectMeta, ObjectStore};
use crate::types::DataSet;

/// Bookmark context under which source objects are tracked.
pub const INPUT_CONTEXT: &str = "input_dynamic_frame_ctx";

/// What one run of [`BatchTransformer::run`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// No unprocessed objects, or they held no rows.
    NoInput,
    /// Input rows existed but none survived the transformation.
    EmptyAfterTransform { rows_in: usize },
    /// Output was written to `destination`.
    Written {
        destination: ObjectLocation,
        rows_in: usize,
        rows_out: usize,
    },
}

/// The batch transformer stage, with its collaborators injected.
pub struct BatchTransformer {
    store: Arc<dyn ObjectStore>,
    catalog: Arc<dyn Catalog>,
    bookmarks: Arc<dyn BookmarkStore>,
    config: BatchTransformConfig,
    reporting: Reporting,
}

impl BatchTransformer {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        catalog: Arc<dyn Catalog>,
        bookmarks: Arc<dyn BookmarkStore>,
        config: BatchTransformConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            bookmarks,
            config,
            reporting: Reporting::default(),
        }
    }

    /// Attach an observer and alert threshold.
    pub fn with_reporting(mut self, reporting: Reporting) -> Self {
        self.reporting = reporting;
        self
    }

    pub fn config(&self) -> &BatchTransformConfig {
        &self.config
    }

    /// Execute one run. Errors are logged, reported and returned without committing.
    pub fn run(&self) -> PipelineResult<TransformOutcome> {
        let ctx = StageContext {
            stage: Stage::BatchTransform,
            source: format!("{}.{}", self.config.database, self.config.table),
        };

        match self.run_job() {
            Ok(outcome) => {
                let stats = match &outcome {
                    TransformOutcome::NoInput => StageStats::default(),
                    TransformOutcome::EmptyAfterTransform { rows_in } => StageStats {
                        rows_in: *rows_in,
                        rows_out: 0,
                    },
                    TransformOutcome::Written { rows_in, rows_out, .. } => StageStats {
                        rows_in: *rows_in,
                        rows_out: *rows_out,
                    },
                };
                self.reporting.success(&ctx, stats);
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(job = %self.config.job_name, source = %ctx.source, error = %e, "batch transform failed");
                self.reporting.failure(&ctx, &e);
                Err(e)
            }
        }
    }

    fn run_job(&self) -> PipelineResult<TransformOutcome> {
        let cfg = &self.config;
        let mut job = Job::init(&cfg.job_name, Arc::clone(&self.bookmarks), cfg.bookmarks)?;

        let table = self.catalog.resolve(&cfg.database, &cfg.table)?;
        let listed = self.store.list(&table.location.bucket, &table.location.key)?;
        let selected = table.select(&listed);
        let fresh = job.unprocessed(INPUT_CONTEXT, selected, |item| item.0);
        tracing::info!(
            table = %table.location,
            listed = listed.len(),
            unprocessed = fresh.len(),
            "resolved source objects"
        );

        let input = match self.read_objects(&fresh)? {
            Some(ds) => ds,
            None => {
                tracing::info!("no unprocessed objects in the source table; exiting");
                job.commit()?;
                return Ok(TransformOutcome::NoInput);
            }
        };

        let rows_in = input.row_count();
        tracing::info!(columns = ?input.header.names(), rows = rows_in, "read source table");
        if input.is_empty() {
            tracing::info!("no data in the source table; exiting");
            job.commit()?;
            return Ok(TransformOutcome::NoInput);
        }

        let projected = match cfg.plan.run(input)? {
            PlanOutcome::EmptyAfterFilter { .. } => {
                tracing::info!(
                    column = %cfg.plan.status_filter.column,
                    value = %cfg.plan.status_filter.value,
                    "no rows left after status filter; exiting"
                );
                job.commit()?;
                return Ok(TransformOutcome::EmptyAfterTransform { rows_in });
            }
            PlanOutcome::Projected {
                filter_applied,
                dataset,
            } => {
                if !filter_applied {
                    tracing::info!(
                        column = %cfg.plan.status_filter.column,
                        "status column not found; skipping status filter"
                    );
                }
                dataset
            }
        };

        let rows_out = projected.row_count();
        tracing::info!(columns = ?projected.header.names(), rows = rows_out, "transformed");
        if projected.is_empty() {
            tracing::info!("no data left after transformations; exiting");
            job.commit()?;
            return Ok(TransformOutcome::EmptyAfterTransform { rows_in });
        }

        let destination = cfg.output_location();
        let body = cfg.format.encode(&projected, &CsvWriteOptions::unquoted())?;
        self.store.put(&destination, body, cfg.format.content_type())?;
        tracing::info!(destination = %destination, rows = rows_out, "wrote transformed data");

        job.commit()?;
        Ok(TransformOutcome::Written {
            destination,
            rows_in,
            rows_out,
        })
    }

    /// Read and union the given objects. `None` when no object had a header.
    ///
    /// Empty objects hold zero rows; they are skipped but stay staged in the bookmark.
    fn read_objects(&self, objects: &[(&ObjectMeta, InputFormat)]) -> PipelineResult<Option<DataSet>> {
        let mut combined: Option<DataSet> = None;
        for (meta, format) in objects {
            let body = self.store.get(&meta.location)?;
            let part = match read_object(*format, body) {
                Ok(part) => part,
                Err(PipelineError::MissingHeader) => {
                    tracing::warn!(object = %meta.location, "object is empty or has no header; skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };
            tracing::debug!(object = %meta.location, rows = part.row_count(), "read object");
            combined = Some(match combined {
                None => part,
                Some(acc) => append_aligned(acc, part, &meta.location)?,
            });
        }
        Ok(combined)
    }
}

/// Append `part` to `acc`, reordering `part`'s columns to `acc`'s header.
///
/// Both must have the same column set.
fn append_aligned(mut acc: DataSet, part: DataSet, source: &ObjectLocation) -> PipelineResult<DataSet> {
    if part.header == acc.header {
        acc.rows.extend(part.rows);
        return Ok(acc);
    }

    let mismatch = || PipelineError::SchemaMismatch {
        message: format!(
            "{source} has columns {:?}, expected {:?}",
            part.header.names(),
            acc.header.names()
        ),
    };
    if part.header.len() != acc.header.len() {
        return Err(mismatch());
    }
    let mut idxs = Vec::with_capacity(acc.header.len());
    for name in acc.header.field_names() {
        idxs.push(part.header.index_of(name).ok_or_else(mismatch)?);
    }

    acc.rows.extend(
        part.rows
            .iter()
            .map(|row| idxs.iter().map(|&i| row[i].clone()).collect::<Vec<_>>()),
    );
    Ok(acc)
}
