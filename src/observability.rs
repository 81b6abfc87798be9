//! Outcome reporting for pipeline runs.
//!
//! Each stage reports one success or failure per invocation to an optional
//! [`PipelineObserver`]. Failures are classified by [`Severity`]; failures at or above the
//! configured threshold are also raised through [`PipelineObserver::on_alert`].

use std::error::Error as StdError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::PipelineError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or store failures).
    Critical,
}

/// Which pipeline stage produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RowFilter,
    BatchTransform,
}

/// Context about one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageContext {
    pub stage: Stage,
    /// Source object URI or `database.table`.
    pub source: String,
}

/// Row counts reported on success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    /// Rows read from the source.
    pub rows_in: usize,
    /// Rows written to the destination (zero for no-op exits).
    pub rows_out: usize,
}

/// Observer interface for stage outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    /// Called when a stage succeeds, including no-op exits.
    fn on_success(&self, _ctx: &StageContext, _stats: StageStats) {}

    /// Called when a stage fails.
    fn on_failure(&self, _ctx: &StageContext, _severity: Severity, _error: &PipelineError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Classify an error for alerting.
pub fn severity_for_error(e: &PipelineError) -> Severity {
    match e {
        PipelineError::Io(_) | PipelineError::Store { .. } | PipelineError::ObjectNotFound { .. } => {
            Severity::Critical
        }
        PipelineError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        PipelineError::Parquet(err) => {
            if error_chain_contains_io(err) {
                Severity::Critical
            } else {
                Severity::Error
            }
        }
        PipelineError::Config { .. } => Severity::Critical,
        _ => Severity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// Where and how a stage reports its outcome.
#[derive(Clone)]
pub struct Reporting {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl Default for Reporting {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl fmt::Debug for Reporting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporting")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Reporting {
    pub fn success(&self, ctx: &StageContext, stats: StageStats) {
        if let Some(obs) = self.observer.as_ref() {
            obs.on_success(ctx, stats);
        }
    }

    pub fn failure(&self, ctx: &StageContext, error: &PipelineError) {
        if let Some(obs) = self.observer.as_ref() {
            let sev = severity_for_error(error);
            obs.on_failure(ctx, sev, error);
            if sev >= self.alert_at_or_above {
                obs.on_alert(ctx, sev, error);
            }
        }
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_success(&self, ctx: &StageContext, stats: StageStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits stage outcomes as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_success(&self, ctx: &StageContext, stats: StageStats) {
        tracing::info!(
            stage = ?ctx.stage,
            source = %ctx.source,
            rows_in = stats.rows_in,
            rows_out = stats.rows_out,
            "stage completed"
        );
    }

    fn on_failure(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        tracing::error!(stage = ?ctx.stage, source = %ctx.source, ?severity, error = %error, "stage failed");
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        tracing::error!(
            alert = true,
            stage = ?ctx.stage,
            source = %ctx.source,
            ?severity,
            error = %error,
            "stage failure crossed alert threshold"
        );
    }
}

#[derive(Serialize)]
struct LogLine<'a> {
    ts: u64,
    event: &'a str,
    stage: Stage,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<StageStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Appends stage outcomes to a local file, one JSON object per line.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, line: &LogLine<'_>) {
        let Ok(text) = serde_json::to_string(line) else {
            return;
        };
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{text}");
        }
    }

    fn failure_line<'a>(
        event: &'a str,
        ctx: &'a StageContext,
        severity: Severity,
        error: &PipelineError,
    ) -> LogLine<'a> {
        LogLine {
            ts: unix_ts(),
            event,
            stage: ctx.stage,
            source: &ctx.source,
            severity: Some(severity),
            stats: None,
            error: Some(error.to_string()),
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_success(&self, ctx: &StageContext, stats: StageStats) {
        self.append(&LogLine {
            ts: unix_ts(),
            event: "ok",
            stage: ctx.stage,
            source: &ctx.source,
            severity: None,
            stats: Some(stats),
            error: None,
        });
    }

    fn on_failure(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.append(&Self::failure_line("fail", ctx, severity, error));
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.append(&Self::failure_line("alert", ctx, severity, error));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
