use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by both pipeline stages.
///
/// A single enum is shared by ingestion, processing, the object store, the catalog and the
/// bookmark layer, so the stage handlers can propagate any failure with `?`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding or encoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet decoding or encoding error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON (de)serialization error for events, catalogs and bookmarks.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Object body is not valid UTF-8.
    #[error("object is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// A required setting is missing or invalid.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The trigger payload does not identify a source object.
    #[error("invalid event: {message}")]
    InvalidEvent { message: String },

    /// The requested object does not exist in the store.
    #[error("object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    /// The object store rejected an operation.
    #[error("object store error: {message}")]
    Store { message: String },

    /// The CSV input has no header line (or is empty).
    #[error("csv has no headers or is empty")]
    MissingHeader,

    /// A record has more fields than the header.
    #[error("malformed record at line {line}: expected at most {expected} fields, found {found}")]
    MalformedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A column required by a transformation step is absent.
    #[error("missing column '{column}'. headers={headers:?}")]
    MissingColumn { column: String, headers: Vec<String> },

    /// A rename would produce two columns with the same name.
    #[error("duplicate column '{column}'")]
    DuplicateColumn { column: String },

    /// A projection names columns that do not exist.
    #[error("invalid projection: missing columns {missing:?}")]
    InvalidProjection { missing: Vec<String> },

    /// Source objects of one table disagree on their column set.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The catalog has no entry for the requested table.
    #[error("table not found: {database}.{table}")]
    TableNotFound { database: String, table: String },
}
