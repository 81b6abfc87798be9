//! Column renaming.

use crate::error::{PipelineError, PipelineResult};
use crate::types::DataSet;

/// Rename one column, keeping column order and count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    pub from: String,
    pub to: String,
}

impl RenameRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Apply the rename to the header. Values are untouched.
    ///
    /// Fails with [`PipelineError::MissingColumn`] when `from` is absent (exact match), and with
    /// [`PipelineError::DuplicateColumn`] when another column is already named `to`.
    pub fn apply(&self, dataset: DataSet) -> PipelineResult<DataSet> {
        let idx = dataset
            .header
            .index_of(&self.from)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: self.from.clone(),
                headers: dataset.header.names().to_vec(),
            })?;

        if self.from != self.to && dataset.header.contains(&self.to) {
            return Err(PipelineError::DuplicateColumn {
                column: self.to.clone(),
            });
        }

        let header = dataset.header.with_renamed(idx, &self.to);
        Ok(DataSet {
            header,
            rows: dataset.rows,
        })
    }
}
