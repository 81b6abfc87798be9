//! Core data model types.
//!
//! Every stage works on an in-memory [`DataSet`]: an ordered [`Header`] of column names plus
//! string-valued rows in header order. Header order defines both parse and emit order.

/// Ordered list of column names shared by every row of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Create a header from column names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate column names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Column names as a slice.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns `true` if the header contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the header has no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub(crate) fn with_renamed(&self, idx: usize, name: &str) -> Self {
        let mut names = self.names.clone();
        names[idx] = name.to_owned();
        Self { names }
    }
}

/// A borrowed view of one row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    header: &'a Header,
    values: &'a [String],
}

impl<'a> Record<'a> {
    /// Value of column `name`, or `None` if the header has no such column.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.header
            .index_of(name)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    /// Raw values in header order.
    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<String>>` in the same order as the [`Header`] columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSet {
    /// Column names in emit order.
    pub header: Header,
    /// Row-major value storage.
    pub rows: Vec<Vec<String>>,
}

impl DataSet {
    /// Create a dataset from a header and rows.
    ///
    /// # Panics
    ///
    /// Panics if any row length differs from the header length.
    pub fn new(header: Header, rows: Vec<Vec<String>>) -> Self {
        for (idx, row) in rows.iter().enumerate() {
            assert!(
                row.len() == header.len(),
                "row {} has {} values but header has {} columns",
                idx,
                row.len(),
                header.len()
            );
        }
        Self { header, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows as [`Record`] views.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|row| Record {
            header: &self.header,
            values: row.as_slice(),
        })
    }

    /// Create a new dataset containing only records that match `predicate`.
    ///
    /// The returned dataset preserves the original header; rows keep their relative order.
    pub fn filter_records<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record<'_>) -> bool,
    {
        let rows = self
            .records()
            .filter(|record| predicate(record))
            .map(|record| record.values().to_vec())
            .collect();
        Self {
            header: self.header.clone(),
            rows,
        }
    }

    /// Create a new dataset by applying `mapper` to every row, under a new header.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than `header`.
    pub fn map_rows<F>(&self, header: Header, mut mapper: F) -> Self
    where
        F: FnMut(&[String]) -> Vec<String>,
    {
        let expected_len = header.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match header length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();
        Self { header, rows }
    }
}
