//! Column projection.

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, Header};

/// Ordered list of columns retained in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub columns: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Keep exactly the projected columns, in projection order.
    ///
    /// Every projected column must exist in `dataset`; otherwise the projection is invalid and
    /// all missing names are reported at once. Projecting an already projected dataset onto the
    /// same columns returns it unchanged.
    pub fn apply(&self, dataset: &DataSet) -> PipelineResult<DataSet> {
        let mut idxs = Vec::with_capacity(self.columns.len());
        let mut missing = Vec::new();
        for column in &self.columns {
            match dataset.header.index_of(column) {
                Some(idx) => idxs.push(idx),
                None => missing.push(column.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(PipelineError::InvalidProjection { missing });
        }

        let header = Header::new(self.columns.iter().cloned());
        Ok(dataset.map_rows(header, |row| idxs.iter().map(|&i| row[i].clone()).collect()))
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(["id", "name", "email", "registration_date"])
    }
}
