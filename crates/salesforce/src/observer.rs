//! Stats and log hooks for bulk jobs.
//!
//! The orchestrator reports through a [`BulkObserver`]. Observer methods
//! return nothing, so a sink cannot change the outcome of a job.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Receives counters and log lines emitted while a bulk job runs.
pub trait BulkObserver: Send + Sync {
    /// Increment `metric` by `value`.
    fn incr(&self, metric: &str, value: u64, tags: &[String]);

    /// Progress line (job created, CSV uploaded, job closed).
    fn info(&self, message: &str);

    /// Failure line (a job that could not be closed).
    fn error(&self, message: &str);
}

/// Observer that forwards everything to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl BulkObserver for TracingObserver {
    fn incr(&self, metric: &str, value: u64, tags: &[String]) {
        info!(target: "actions_salesforce::stats", metric, value, tags = ?tags, "incr");
    }

    fn info(&self, message: &str) {
        info!(target: "actions_salesforce::bulk", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "actions_salesforce::bulk", "{}", message);
    }
}

/// Logging options for one bulk dispatch.
///
/// Progress counters and lines are only emitted when `should_log` is set;
/// close failures are always reported.
#[derive(Clone)]
pub struct BulkLogging {
    should_log: bool,
    observer: Arc<dyn BulkObserver>,
    tags: Vec<String>,
}

impl fmt::Debug for BulkLogging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkLogging")
            .field("should_log", &self.should_log)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl Default for BulkLogging {
    fn default() -> Self {
        Self::new(false)
    }
}

impl BulkLogging {
    /// Logging through [`TracingObserver`].
    pub fn new(should_log: bool) -> Self {
        Self {
            should_log,
            observer: Arc::new(TracingObserver),
            tags: Vec::new(),
        }
    }

    /// Report to `observer` instead of `tracing`.
    pub fn with_observer(mut self, observer: Arc<dyn BulkObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Tags attached to every counter, before the job tag.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn should_log(&self) -> bool {
        self.should_log
    }
}

/// Per-job view of the logging options with the `jobId:<id>` tag applied.
pub(crate) struct JobRecorder<'a> {
    logging: Option<&'a BulkLogging>,
    tags: Vec<String>,
}

impl<'a> JobRecorder<'a> {
    pub(crate) fn new(logging: Option<&'a BulkLogging>) -> Self {
        Self {
            logging,
            tags: logging.map(|l| l.tags.clone()).unwrap_or_default(),
        }
    }

    /// Tag every later counter with the job id.
    pub(crate) fn set_job(&mut self, job_id: &str) {
        self.tags.push(format!("jobId:{}", job_id));
    }

    /// Counter emitted only when logging is enabled.
    pub(crate) fn incr(&self, metric: &str, value: u64) {
        if let Some(logging) = self.logging.filter(|l| l.should_log) {
            logging.observer.incr(metric, value, &self.tags);
        }
    }

    /// Progress line emitted only when logging is enabled. `message` is
    /// built lazily since it may contain the whole CSV.
    pub(crate) fn info(&self, message: impl FnOnce() -> String) {
        if let Some(logging) = self.logging.filter(|l| l.should_log) {
            logging.observer.info(&message());
        }
    }

    /// Failure counter and line, emitted whenever logging options were given.
    pub(crate) fn failure(&self, metric: &str, message: &str) {
        if let Some(logging) = self.logging {
            logging.observer.incr(metric, 1, &self.tags);
            logging.observer.error(message);
        }
    }
}
