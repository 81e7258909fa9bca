//! Progress events and the subscription that delivers them.
//!
//! The service only exposes a status endpoint, so a background task polls it
//! and turns each status into zero or more [`ProgressEvent`]s, sent over a
//! bounded channel in the order they were observed. The channel closes once
//! the job reports completion, after a transport error, or on cancellation.

use crate::error::{GrokVidError, Result};
use crate::video::service::{GenerationService, JobHandle};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const EVENT_BUFFER: usize = 32;

/// One log line emitted by the service while a job runs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct LogEntry {
    /// Human-readable text, when the entry has one.
    pub message: Option<String>,
    /// Severity, e.g. `INFO`.
    pub level: Option<String>,
    raw: Value,
}

impl LogEntry {
    /// Creates an entry carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            raw: serde_json::json!({ "message": message }),
            message: Some(message),
            level: None,
        }
    }
}

impl From<Value> for LogEntry {
    fn from(raw: Value) -> Self {
        let field = |name: &str| raw.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            message: field("message"),
            level: field("level"),
            raw,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => write!(f, "{}", self.raw),
        }
    }
}

/// Where a job stands in the remote queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueStatus {
    /// Waiting for a worker.
    InQueue {
        /// Zero-based position, when reported.
        position: Option<u32>,
    },
    /// Running. `logs` is everything logged so far.
    InProgress {
        /// Cumulative logs.
        logs: Vec<LogEntry>,
    },
    /// Finished; the result can be fetched.
    Completed {
        /// Cumulative logs.
        logs: Vec<LogEntry>,
    },
}

impl QueueStatus {
    /// Returns true once the job has finished.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    status: String,
    queue_position: Option<u32>,
    logs: Option<Vec<LogEntry>>,
}

impl StatusResponse {
    pub(crate) fn into_status(self) -> Result<QueueStatus> {
        let logs = self.logs.unwrap_or_default();
        match self.status.as_str() {
            "IN_QUEUE" => Ok(QueueStatus::InQueue {
                position: self.queue_position,
            }),
            "IN_PROGRESS" => Ok(QueueStatus::InProgress { logs }),
            "COMPLETED" => Ok(QueueStatus::Completed { logs }),
            "FAILED" => Err(GrokVidError::GenerationFailed(
                "fal.ai video generation failed".into(),
            )),
            other => Err(GrokVidError::UnexpectedResponse(format!(
                "fal.ai returned unexpected status: {}",
                other
            ))),
        }
    }
}

/// A notification worth showing the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A status message.
    Message(String),
    /// Log lines not seen before, in emission order.
    Logs(Vec<LogEntry>),
}

/// Turns successive cumulative statuses into incremental events.
#[derive(Debug, Default)]
struct EventTracker {
    last_position: Option<Option<u32>>,
    started: bool,
    seen_logs: usize,
}

impl EventTracker {
    fn observe(&mut self, status: QueueStatus) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        match status {
            QueueStatus::InQueue { position } => {
                if self.last_position != Some(position) {
                    self.last_position = Some(position);
                    events.push(ProgressEvent::Message(match position {
                        Some(p) => format!("In queue (position {})", p),
                        None => "In queue".to_string(),
                    }));
                }
            }
            QueueStatus::InProgress { logs } | QueueStatus::Completed { logs } => {
                if !self.started {
                    self.started = true;
                    events.push(ProgressEvent::Message("Generation in progress".to_string()));
                }
                // The service resends every log on each poll.
                if logs.len() < self.seen_logs {
                    self.seen_logs = 0;
                }
                if logs.len() > self.seen_logs {
                    let fresh = logs[self.seen_logs..].to_vec();
                    self.seen_logs = logs.len();
                    events.push(ProgressEvent::Logs(fresh));
                }
            }
        }
        events
    }
}

/// A live stream of progress events for one job.
///
/// Dropping the subscription stops the background poller.
#[derive(Debug)]
pub struct EventSubscription {
    rx: mpsc::Receiver<Result<ProgressEvent>>,
    cancel: CancellationToken,
}

impl EventSubscription {
    /// Starts polling `job` every `poll_interval` until it completes.
    ///
    /// The poller also stops when `parent` is cancelled.
    pub fn spawn(
        service: Arc<dyn GenerationService>,
        job: JobHandle,
        poll_interval: Duration,
        parent: &CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let cancel = parent.child_token();
        tokio::spawn(poll_events(service, job, poll_interval, tx, cancel.clone()));
        Self { rx, cancel }
    }

    /// Waits for the next event. `None` means the stream has closed.
    pub async fn next(&mut self) -> Option<Result<ProgressEvent>> {
        self.rx.recv().await
    }

}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_events(
    service: Arc<dyn GenerationService>,
    job: JobHandle,
    poll_interval: Duration,
    tx: mpsc::Sender<Result<ProgressEvent>>,
    cancel: CancellationToken,
) {
    let mut tracker = EventTracker::default();

    loop {
        let status = tokio::select! {
            _ = cancel.cancelled() => return,
            status = service.status(&job, true) => status,
        };

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(request_id = %job.request_id, "status poll failed: {e}");
                let _ = tx.send(Err(e)).await;
                return;
            }
        };

        let done = status.is_completed();
        tracing::debug!(request_id = %job.request_id, ?status, "polled job status");

        for event in tracker.observe(status) {
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }
        if done {
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
