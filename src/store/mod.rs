//! Blob store abstraction.
//!
//! Both stages talk to storage only through the [`ObjectStore`] trait, which is passed in at
//! construction time. Implementations:
//!
//! - [`MemoryStore`]: in-process map, used by tests and for dry runs
//! - [`LocalFsStore`]: one directory per bucket under a root directory

mod local;
mod memory;

use std::fmt;

use crate::error::{PipelineError, PipelineResult};

pub use local::LocalFsStore;
pub use memory::MemoryStore;

/// Address of one object: a bucket and a key within it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an `s3://bucket/key` URI. The key may be empty (bucket root) or a prefix.
    pub fn parse(uri: &str) -> PipelineResult<Self> {
        let rest = uri.strip_prefix("s3://").ok_or_else(|| PipelineError::Config {
            message: format!("expected s3:// URI, got: {uri}"),
        })?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(PipelineError::Config {
                message: format!("missing bucket in URI: {uri}"),
            });
        }
        Ok(Self::new(bucket, key))
    }

    /// Final path segment of the key (text after the last `/`).
    pub fn basename(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// A location in the same bucket with `name` appended to this key.
    pub fn join(&self, name: &str) -> Self {
        Self::new(self.bucket.clone(), format!("{}{}", self.key, name))
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Listing entry returned by [`ObjectStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub location: ObjectLocation,
    /// Body size in bytes.
    pub size: u64,
    /// Stamp that increases whenever the object is rewritten.
    pub version: u64,
}

/// Minimal blob store interface used by the pipeline.
pub trait ObjectStore: Send + Sync {
    /// Read the whole body of an object.
    fn get(&self, location: &ObjectLocation) -> PipelineResult<Vec<u8>>;

    /// Create or overwrite an object.
    fn put(&self, location: &ObjectLocation, body: Vec<u8>, content_type: &str) -> PipelineResult<()>;

    /// List objects in `bucket` whose key starts with `prefix`, sorted by key.
    fn list(&self, bucket: &str, prefix: &str) -> PipelineResult<Vec<ObjectMeta>>;
}

#[cfg(test)]
mod tests {
    use super::ObjectLocation;

    #[test]
    fn parse_s3_uri_valid() {
        let loc = ObjectLocation::parse("s3://my-bucket/path/to/file.csv").unwrap();
        assert_eq!(loc.bucket, "my-bucket");
        assert_eq!(loc.key, "path/to/file.csv");
        assert_eq!(loc.to_string(), "s3://my-bucket/path/to/file.csv");
    }

    #[test]
    fn parse_s3_uri_bucket_only() {
        let loc = ObjectLocation::parse("s3://bucket").unwrap();
        assert_eq!(loc.key, "");
    }

    #[test]
    fn parse_s3_uri_invalid_scheme() {
        assert!(ObjectLocation::parse("http://bucket/key").is_err());
        assert!(ObjectLocation::parse("s3:///key").is_err());
    }

    #[test]
    fn basename_takes_last_segment() {
        assert_eq!(ObjectLocation::new("b", "uploads/2024/users.csv").basename(), "users.csv");
        assert_eq!(ObjectLocation::new("b", "users.csv").basename(), "users.csv");
    }
}
