//! Decoding object bodies into an in-memory [`crate::types::DataSet`].
//!
//! Format-specific functions live under:
//! - [`csv`]
//! - [`parquet`]
//!
//! [`read_object`] dispatches on an [`InputFormat`], usually inferred from the object key.

pub mod csv;
pub mod parquet;

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::types::DataSet;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Comma-separated values with a header line.
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl InputFormat {
    /// Parse an input format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }

    /// Infer the format from the suffix of an object key.
    pub fn from_key(key: &str) -> Option<Self> {
        let name = key.rsplit('/').next().unwrap_or(key);
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

/// Decode an object body using the given format.
pub fn read_object(format: InputFormat, body: Vec<u8>) -> PipelineResult<DataSet> {
    match format {
        InputFormat::Csv => csv::read_csv_from_bytes(body),
        InputFormat::Parquet => parquet::read_parquet_from_bytes(body),
    }
}

#[cfg(test)]
mod tests {
    use super::InputFormat;

    #[test]
    fn infers_format_from_key_suffix() {
        assert_eq!(InputFormat::from_key("processed/users.CSV"), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_key("a/b/part-0.parquet"), Some(InputFormat::Parquet));
        assert_eq!(InputFormat::from_key("a/b/part-0.pq"), Some(InputFormat::Parquet));
        assert_eq!(InputFormat::from_key("notes.txt"), None);
        assert_eq!(InputFormat::from_key("dir.csv/README"), None);
    }
}
