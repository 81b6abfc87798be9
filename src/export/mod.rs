//! Encoding a [`crate::types::DataSet`] into an object body.
//!
//! - [`csv`]: header line plus one record per line, with configurable quoting
//! - [`parquet`]: single row group, every column a UTF-8 byte array

pub mod csv;
pub mod parquet;

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::types::DataSet;

pub use self::csv::{write_csv, CsvQuoting, CsvWriteOptions};
pub use self::parquet::write_parquet;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl OutputFormat {
    /// File extension (without the dot) used for written objects.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }

    /// MIME type stored alongside written objects.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Parquet => "application/vnd.apache.parquet",
        }
    }

    /// Encode `dataset` in this format.
    ///
    /// CSV output uses the given quoting options; Parquet ignores them.
    pub fn encode(self, dataset: &DataSet, csv_options: &CsvWriteOptions) -> PipelineResult<Vec<u8>> {
        match self {
            Self::Csv => write_csv(dataset, csv_options),
            Self::Parquet => write_parquet(dataset),
        }
    }
}
