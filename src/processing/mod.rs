//! In-memory dataset transformations.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion.
//!
//! Currently implemented:
//!
//! - [`filter()`] and [`StatusFilter`]: row filtering
//! - [`admit_upload`]: admission rules for uploaded records
//! - [`RenameRule`]: single-column rename
//! - [`Projection`]: ordered column selection
//! - [`TransformPlan`]: rename → filter → project, in that order
//!
//! ## Example: rename → filter → project
//!
//! ```rust
//! use csv_pipeline::processing::{PlanOutcome, TransformPlan};
//! use csv_pipeline::types::{DataSet, Header};
//!
//! let ds = DataSet::new(
//!     Header::new(["id", "name", "email", "signup_date", "status"]),
//!     vec![
//!         vec!["1".into(), "Al".into(), "a@x.com".into(), "2024-01-02".into(), "active".into()],
//!         vec!["2".into(), "Bo".into(), "b@x.com".into(), "2024-01-03".into(), "inactive".into()],
//!     ],
//! );
//!
//! let PlanOutcome::Projected { dataset, .. } = TransformPlan::default().run(ds).unwrap() else {
//!     panic!("expected projected rows");
//! };
//! assert_eq!(dataset.header.names(), ["id", "name", "email", "registration_date"]);
//! assert_eq!(dataset.row_count(), 1);
//! ```

pub mod admission;
pub mod filter;
pub mod project;
pub mod rename;

pub use admission::{admit_upload, Admission};
pub use filter::{filter, StatusFilter, StatusFilterOutcome};
pub use project::Projection;
pub use rename::RenameRule;

use crate::error::PipelineResult;
use crate::types::DataSet;

/// The ordered transformation applied by the batch transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformPlan {
    pub rename: RenameRule,
    pub status_filter: StatusFilter,
    pub projection: Projection,
}

/// Result of [`TransformPlan::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// The status filter left no rows; the projection was not run.
    EmptyAfterFilter { filter_applied: bool },
    /// All three steps ran. `dataset` may still be empty if the input was.
    Projected { filter_applied: bool, dataset: DataSet },
}

impl TransformPlan {
    /// Run rename, then the status filter, then the projection.
    ///
    /// Each step consumes the previous step's output. When the filter removes every row the
    /// run stops there and reports [`PlanOutcome::EmptyAfterFilter`].
    pub fn run(&self, dataset: DataSet) -> PipelineResult<PlanOutcome> {
        let renamed = self.rename.apply(dataset)?;
        let had_rows = !renamed.is_empty();
        let (filter_applied, filtered) = match self.status_filter.apply(renamed) {
            StatusFilterOutcome::Applied(ds) => (true, ds),
            StatusFilterOutcome::Skipped(ds) => (false, ds),
        };
        if had_rows && filtered.is_empty() {
            return Ok(PlanOutcome::EmptyAfterFilter { filter_applied });
        }

        let dataset = self.projection.apply(&filtered)?;
        Ok(PlanOutcome::Projected {
            filter_applied,
            dataset,
        })
    }
}

impl Default for TransformPlan {
    fn default() -> Self {
        Self {
            rename: RenameRule::new("signup_date", "registration_date"),
            status_filter: StatusFilter::default(),
            projection: Projection::default(),
        }
    }
}
