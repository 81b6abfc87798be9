//! Stage configuration.
//!
//! The row filter is configured from the environment:
//!
//! - `PROCESSED_BUCKET_NAME`: destination bucket (required when an event is handled)
//! - `PROCESSED_BUCKET_KEY_PREFIX`: destination key prefix (default `processed/`)
//!
//! The batch transformer is configured explicitly, usually from command-line arguments.

use crate::bookmark::BookmarkMode;
use crate::export::OutputFormat;
use crate::processing::TransformPlan;
use crate::store::ObjectLocation;

pub const DESTINATION_BUCKET_VAR: &str = "PROCESSED_BUCKET_NAME";
pub const DESTINATION_PREFIX_VAR: &str = "PROCESSED_BUCKET_KEY_PREFIX";
pub const DEFAULT_DESTINATION_PREFIX: &str = "processed/";

/// Settings for the row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilterConfig {
    /// Destination bucket. `None` is a configuration error reported at handle time.
    pub destination_bucket: Option<String>,
    /// Prepended verbatim to the source basename.
    pub destination_prefix: String,
}

impl RowFilterConfig {
    pub fn new(destination_bucket: impl Into<String>) -> Self {
        Self {
            destination_bucket: Some(destination_bucket.into()),
            destination_prefix: DEFAULT_DESTINATION_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.destination_prefix = prefix.into();
        self
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// An empty bucket name counts as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            destination_bucket: lookup(DESTINATION_BUCKET_VAR).filter(|b| !b.is_empty()),
            destination_prefix: lookup(DESTINATION_PREFIX_VAR)
                .unwrap_or_else(|| DEFAULT_DESTINATION_PREFIX.to_string()),
        }
    }
}

/// Settings for one batch transformer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTransformConfig {
    /// Job name; also the bookmark key.
    pub job_name: String,
    /// Catalog database holding the source table.
    pub database: String,
    /// Source table name.
    pub table: String,
    /// Output prefix; written objects are placed directly under it.
    pub output: ObjectLocation,
    pub format: OutputFormat,
    pub bookmarks: BookmarkMode,
    /// Identifies this run in output object names.
    pub run_id: String,
    pub plan: TransformPlan,
}

impl BatchTransformConfig {
    /// Config with CSV output, bookmarks enabled and the default plan.
    pub fn new(
        job_name: impl Into<String>,
        database: impl Into<String>,
        table: impl Into<String>,
        output: ObjectLocation,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            database: database.into(),
            table: table.into(),
            output,
            format: OutputFormat::Csv,
            bookmarks: BookmarkMode::Enabled,
            run_id: run_id.into(),
            plan: TransformPlan::default(),
        }
    }

    /// `<output prefix>run-<run_id>-part-r-00000.<ext>`
    pub fn output_location(&self) -> ObjectLocation {
        self.output.join(&format!(
            "run-{}-part-r-00000.{}",
            self.run_id,
            self.format.extension()
        ))
    }
}
