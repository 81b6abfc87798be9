//! Row filtering for [`crate::types::DataSet`].

use crate::types::{DataSet, Record};

/// Returns a new [`DataSet`] containing only records for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`DataSet::filter_records`].
pub fn filter<F>(dataset: &DataSet, predicate: F) -> DataSet
where
    F: FnMut(&Record<'_>) -> bool,
{
    dataset.filter_records(predicate)
}

/// Keep records whose `column` equals `value` exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    pub column: String,
    pub value: String,
}

/// Result of applying a [`StatusFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilterOutcome {
    /// The column exists and non-matching records were removed.
    Applied(DataSet),
    /// The column does not exist; the dataset passed through unchanged.
    Skipped(DataSet),
}

impl StatusFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Apply the filter, or pass `dataset` through when the column is absent.
    pub fn apply(&self, dataset: DataSet) -> StatusFilterOutcome {
        match dataset.header.index_of(&self.column) {
            Some(idx) => StatusFilterOutcome::Applied(
                dataset.filter_records(|r| r.values()[idx] == self.value),
            ),
            None => StatusFilterOutcome::Skipped(dataset),
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::new("status", "active")
    }
}
