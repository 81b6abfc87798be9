//! Job bookmarks.
//!
//! A bookmark remembers, per job and per transformation context, which object versions a job
//! has already consumed. [`Job::unprocessed`] hides objects at or below the remembered version
//! and stages the rest; [`Job::commit`] persists the staged progress. Nothing advances until
//! commit, so a failed run is re-read in full by the next one.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::store::ObjectMeta;

/// Whether a job tracks progress between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkMode {
    /// Skip objects consumed by earlier committed runs.
    #[default]
    Enabled,
    /// Read everything on every run and persist nothing.
    Disabled,
}

/// Persisted bookmark state of one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBookmark {
    /// Transformation context -> object URI -> last consumed version.
    #[serde(default)]
    pub contexts: BTreeMap<String, BTreeMap<String, u64>>,
}

impl JobBookmark {
    fn consumed_version(&self, ctx: &str, uri: &str) -> Option<u64> {
        self.contexts.get(ctx).and_then(|m| m.get(uri)).copied()
    }

    fn merge(&mut self, other: JobBookmark) {
        for (ctx, objects) in other.contexts {
            self.contexts.entry(ctx).or_default().extend(objects);
        }
    }

    fn is_empty(&self) -> bool {
        self.contexts.values().all(BTreeMap::is_empty)
    }
}

/// Storage for [`JobBookmark`]s, keyed by job name.
pub trait BookmarkStore: Send + Sync {
    /// Load a job's bookmark; a job that never committed gets an empty one.
    fn load(&self, job: &str) -> PipelineResult<JobBookmark>;

    fn save(&self, job: &str, bookmark: &JobBookmark) -> PipelineResult<()>;
}

/// In-process bookmark storage.
#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    jobs: Mutex<BTreeMap<String, JobBookmark>>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved bookmark of `job`, if any run committed.
    pub fn get(&self, job: &str) -> PipelineResult<Option<JobBookmark>> {
        Ok(self.lock()?.get(job).cloned())
    }

    fn lock(&self) -> PipelineResult<MutexGuard<'_, BTreeMap<String, JobBookmark>>> {
        self.jobs.lock().map_err(|_| PipelineError::Store {
            message: "bookmark store mutex poisoned".to_string(),
        })
    }
}

impl BookmarkStore for MemoryBookmarkStore {
    fn load(&self, job: &str) -> PipelineResult<JobBookmark> {
        Ok(self.get(job)?.unwrap_or_default())
    }

    fn save(&self, job: &str, bookmark: &JobBookmark) -> PipelineResult<()> {
        self.lock()?.insert(job.to_string(), bookmark.clone());
        Ok(())
    }
}

/// Bookmarks stored as `<dir>/<job>.json`.
#[derive(Debug, Clone)]
pub struct FileBookmarkStore {
    dir: PathBuf,
}

impl FileBookmarkStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, job: &str) -> PathBuf {
        let file: String = job
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl BookmarkStore for FileBookmarkStore {
    fn load(&self, job: &str) -> PipelineResult<JobBookmark> {
        match fs::read_to_string(self.path_for(job)) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(JobBookmark::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, job: &str, bookmark: &JobBookmark) -> PipelineResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(job);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(bookmark)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// One run of a bookmarked job.
pub struct Job {
    name: String,
    mode: BookmarkMode,
    store: Arc<dyn BookmarkStore>,
    state: JobBookmark,
    pending: JobBookmark,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("pending", &self.pending)
            .finish()
    }
}

impl Job {
    /// Start a run, loading the job's bookmark when bookmarks are enabled.
    pub fn init(name: impl Into<String>, store: Arc<dyn BookmarkStore>, mode: BookmarkMode) -> PipelineResult<Self> {
        let name = name.into();
        let state = match mode {
            BookmarkMode::Enabled => store.load(&name)?,
            BookmarkMode::Disabled => JobBookmark::default(),
        };
        tracing::debug!(job = %name, ?mode, "job initialized");
        Ok(Self {
            name,
            mode,
            store,
            state,
            pending: JobBookmark::default(),
        })
    }

    /// Keep the items whose object is newer than the bookmark for `ctx`, and stage them so
    /// the next [`Self::commit`] marks them consumed.
    pub fn unprocessed<T, F>(&mut self, ctx: &str, items: Vec<T>, object_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &ObjectMeta,
    {
        if self.mode == BookmarkMode::Disabled {
            return items;
        }

        let mut fresh = Vec::with_capacity(items.len());
        for item in items {
            let object = object_of(&item);
            let uri = object.location.to_string();
            let seen = self.state.consumed_version(ctx, &uri);
            if seen.is_some_and(|v| v >= object.version) {
                tracing::debug!(job = %self.name, ctx, object = %uri, "skipping bookmarked object");
                continue;
            }
            self.pending
                .contexts
                .entry(ctx.to_string())
                .or_default()
                .insert(uri, object.version);
            fresh.push(item);
        }
        fresh
    }

    /// Persist staged progress. Disabled bookmarks make this a no-op.
    pub fn commit(&mut self) -> PipelineResult<()> {
        if self.mode == BookmarkMode::Disabled {
            tracing::debug!(job = %self.name, "bookmarks disabled; nothing to commit");
            return Ok(());
        }

        let staged = std::mem::take(&mut self.pending);
        let advanced = !staged.is_empty();
        self.state.merge(staged);
        self.store.save(&self.name, &self.state)?;
        tracing::info!(job = %self.name, advanced, "job committed");
        Ok(())
    }
}
