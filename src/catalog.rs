//! Table catalog: resolves `database.table` to the objects holding the table's data.
//!
//! A table is a prefix in the object store plus an optional include pattern. The catalog is
//! read-only here; registering tables is the job of whoever populates it (a crawler, a JSON
//! document, or test code).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glob::Pattern;
use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};
use crate::ingestion::InputFormat;
use crate::store::{ObjectLocation, ObjectMeta};

/// Where a table's data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Bucket and key prefix of the table's objects.
    pub location: ObjectLocation,
    /// Restricts objects to one format. `None` accepts every supported format.
    pub format: Option<InputFormat>,
    /// Glob matched against the key relative to `location`.
    pub include: Option<Pattern>,
}

impl TableDescriptor {
    pub fn new(location: ObjectLocation) -> Self {
        Self {
            location,
            format: None,
            include: None,
        }
    }

    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Restrict the table to keys matching `pattern` (e.g. `*.csv`, `2024/**/*.csv`).
    pub fn with_include(mut self, pattern: &str) -> PipelineResult<Self> {
        let compiled = Pattern::new(pattern).map_err(|e| PipelineError::Config {
            message: format!("invalid include pattern '{pattern}': {e}"),
        })?;
        self.include = Some(compiled);
        Ok(self)
    }

    /// Format of `key` if it belongs to this table.
    pub fn object_format(&self, key: &str) -> Option<InputFormat> {
        let relative = key.strip_prefix(self.location.key.as_str())?;
        if let Some(pattern) = &self.include {
            if !pattern.matches(relative) {
                return None;
            }
        }
        let format = InputFormat::from_key(relative)?;
        match self.format {
            Some(expected) if expected != format => None,
            _ => Some(format),
        }
    }

    /// Keep the listed objects that belong to this table, in listing order.
    pub fn select<'a>(&self, objects: &'a [ObjectMeta]) -> Vec<(&'a ObjectMeta, InputFormat)> {
        objects
            .iter()
            .filter(|o| o.location.bucket == self.location.bucket)
            .filter_map(|o| self.object_format(&o.location.key).map(|f| (o, f)))
            .collect()
    }
}

/// Resolves table handles.
pub trait Catalog: Send + Sync {
    fn resolve(&self, database: &str, table: &str) -> PipelineResult<TableDescriptor>;
}

/// Catalog held in memory, populated programmatically or from a JSON document.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tables: BTreeMap<(String, String), TableDescriptor>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    databases: BTreeMap<String, BTreeMap<String, TableEntry>>,
}

#[derive(Debug, Deserialize)]
struct TableEntry {
    location: String,
    #[serde(default)]
    format: Option<InputFormat>,
    #[serde(default)]
    include: Option<String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, database: impl Into<String>, table: impl Into<String>, descriptor: TableDescriptor) {
        self.tables.insert((database.into(), table.into()), descriptor);
    }

    /// Builder-style [`Self::register`].
    pub fn with_table(
        mut self,
        database: impl Into<String>,
        table: impl Into<String>,
        descriptor: TableDescriptor,
    ) -> Self {
        self.register(database, table, descriptor);
        self
    }

    /// Parse a catalog document:
    ///
    /// ```json
    /// { "databases": { "csv_pipeline_db": { "processed": {
    ///     "location": "s3://csv-processed-data/processed/", "format": "csv", "include": "*.csv"
    /// } } } }
    /// ```
    pub fn from_json(input: &str) -> PipelineResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(input)?;
        let mut catalog = Self::new();
        for (database, tables) in doc.databases {
            for (table, entry) in tables {
                let mut descriptor = TableDescriptor::new(ObjectLocation::parse(&entry.location)?);
                descriptor.format = entry.format;
                if let Some(include) = entry.include.as_deref() {
                    descriptor = descriptor.with_include(include)?;
                }
                catalog.register(database.clone(), table, descriptor);
            }
        }
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl Catalog for StaticCatalog {
    fn resolve(&self, database: &str, table: &str) -> PipelineResult<TableDescriptor> {
        self.tables
            .get(&(database.to_string(), table.to_string()))
            .cloned()
            .ok_or_else(|| PipelineError::TableNotFound {
                database: database.to_string(),
                table: table.to_string(),
            })
    }
}
