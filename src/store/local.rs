use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};

use super::{ObjectLocation, ObjectMeta, ObjectStore};

/// [`ObjectStore`] over a local directory tree.
///
/// Bucket `b` maps to `<root>/b` and key `x/y.csv` to `<root>/b/x/y.csv`. Object versions are
/// file modification times in nanoseconds since the Unix epoch.
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    root: PathBuf,
}

impl LocalFsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, location: &ObjectLocation) -> PipelineResult<PathBuf> {
        if location.bucket.is_empty() || location.key.is_empty() {
            return Err(PipelineError::Store {
                message: format!("invalid object location {location}"),
            });
        }
        if location.key.split('/').any(|seg| seg == "..") || location.bucket.contains(['/', '\\']) {
            return Err(PipelineError::Store {
                message: format!("object location escapes the store root: {location}"),
            });
        }
        Ok(self.root.join(&location.bucket).join(&location.key))
    }
}

impl ObjectStore for LocalFsStore {
    fn get(&self, location: &ObjectLocation) -> PipelineResult<Vec<u8>> {
        let path = self.path_for(location)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PipelineError::ObjectNotFound {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
            },
            _ => PipelineError::Io(e),
        })
    }

    fn put(&self, location: &ObjectLocation, body: Vec<u8>, content_type: &str) -> PipelineResult<()> {
        let path = self.path_for(location)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        tracing::debug!(path = %path.display(), content_type, "wrote object");
        Ok(())
    }

    fn list(&self, bucket: &str, prefix: &str) -> PipelineResult<Vec<ObjectMeta>> {
        let bucket_dir = self.root.join(bucket);
        if !bucket_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for entry in WalkDir::new(&bucket_dir).follow_links(false) {
            let entry = entry.map_err(|e| PipelineError::Store {
                message: format!("failed to walk {}: {e}", bucket_dir.display()),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&bucket_dir) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !key.starts_with(prefix) {
                continue;
            }

            let meta = entry.metadata().map_err(|e| PipelineError::Store {
                message: format!("failed to stat {}: {e}", entry.path().display()),
            })?;
            let version = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_nanos().min(u64::MAX as u128) as u64)
                .unwrap_or_default();

            out.push(ObjectMeta {
                location: ObjectLocation::new(bucket, key),
                size: meta.len(),
                version,
            });
        }
        out.sort_by(|a, b| a.location.key.cmp(&b.location.key));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::LocalFsStore;
    use crate::error::PipelineError;
    use crate::store::{ObjectLocation, ObjectStore};

    fn tmp_root(tag: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("csv-pipeline-store-{tag}-{nanos}"))
    }

    #[test]
    fn put_then_list_and_get() {
        let root = tmp_root("roundtrip");
        let store = LocalFsStore::new(&root);
        let loc = ObjectLocation::new("processed", "processed/users.csv");
        store.put(&loc, b"id\n1\n".to_vec(), "text/csv").unwrap();
        store
            .put(&ObjectLocation::new("processed", "elsewhere/x.csv"), b"id\n".to_vec(), "text/csv")
            .unwrap();

        assert_eq!(store.get(&loc).unwrap(), b"id\n1\n");
        let listed = store.list("processed", "processed/").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].location, loc);
        assert_eq!(listed[0].size, 5);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_bucket_lists_empty_and_get_is_not_found() {
        let root = tmp_root("missing");
        let store = LocalFsStore::new(&root);
        assert!(store.list("nope", "").unwrap().is_empty());
        let err = store.get(&ObjectLocation::new("nope", "k.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::ObjectNotFound { .. }));
    }

    #[test]
    fn rejects_parent_segments() {
        let store = LocalFsStore::new(tmp_root("escape"));
        let err = store
            .put(&ObjectLocation::new("b", "../outside.csv"), Vec::new(), "text/csv")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Store { .. }));
    }
}
