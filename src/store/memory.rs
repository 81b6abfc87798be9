use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{PipelineError, PipelineResult};

use super::{ObjectLocation, ObjectMeta, ObjectStore};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
    version: u64,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<ObjectLocation, StoredObject>,
    next_version: u64,
}

/// In-process [`ObjectStore`] backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded by the last `put` of `location`.
    pub fn content_type(&self, location: &ObjectLocation) -> Option<String> {
        self.lock().ok()?.objects.get(location).map(|o| o.content_type.clone())
    }

    /// Number of stored objects across all buckets.
    pub fn len(&self) -> usize {
        self.lock().map(|g| g.objects.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> PipelineResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| PipelineError::Store {
            message: "memory store mutex poisoned".to_string(),
        })
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, location: &ObjectLocation) -> PipelineResult<Vec<u8>> {
        self.lock()?
            .objects
            .get(location)
            .map(|o| o.body.clone())
            .ok_or_else(|| PipelineError::ObjectNotFound {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
            })
    }

    fn put(&self, location: &ObjectLocation, body: Vec<u8>, content_type: &str) -> PipelineResult<()> {
        let mut guard = self.lock()?;
        guard.next_version += 1;
        let version = guard.next_version;
        guard.objects.insert(
            location.clone(),
            StoredObject {
                body,
                content_type: content_type.to_owned(),
                version,
            },
        );
        Ok(())
    }

    fn list(&self, bucket: &str, prefix: &str) -> PipelineResult<Vec<ObjectMeta>> {
        let guard = self.lock()?;
        Ok(guard
            .objects
            .iter()
            .filter(|(loc, _)| loc.bucket == bucket && loc.key.starts_with(prefix))
            .map(|(loc, obj)| ObjectMeta {
                location: loc.clone(),
                size: obj.body.len() as u64,
                version: obj.version,
            })
            .collect())
    }
}
