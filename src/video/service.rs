//! The seam between the orchestrator and the remote generation service.

use crate::error::Result;
use crate::video::download::DownloadBody;
use crate::video::events::QueueStatus;
use crate::video::types::{VideoGenerationRequest, VideoResult};
use async_trait::async_trait;
use serde::Deserialize;

/// Reference to an in-flight generation job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobHandle {
    /// Identifier assigned by the service. Used for display and logs.
    pub request_id: String,
    /// URL that reports queue status and logs.
    pub status_url: String,
    /// URL that serves the result payload once the job completes.
    pub response_url: String,
}

/// A remote service that runs video generation jobs.
///
/// [`FalQueueClient`](crate::video::FalQueueClient) talks to fal.ai; tests
/// substitute scripted fakes.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submits a request and returns a handle to the queued job.
    async fn submit(&self, request: &VideoGenerationRequest) -> Result<JobHandle>;

    /// Fetches the current status of a job, optionally with its logs.
    async fn status(&self, job: &JobHandle, with_logs: bool) -> Result<QueueStatus>;

    /// Fetches the terminal result of a completed job.
    async fn result(&self, job: &JobHandle) -> Result<VideoResult>;

    /// Opens a streaming download of a generated video.
    async fn open_download(&self, url: &str) -> Result<DownloadBody>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_handle_deserialization() {
        let json = r#"{
            "request_id": "req-abc-123",
            "response_url": "https://queue.fal.run/xai/grok-imagine/requests/req-abc-123",
            "status_url": "https://queue.fal.run/xai/grok-imagine/requests/req-abc-123/status",
            "cancel_url": "https://queue.fal.run/xai/grok-imagine/requests/req-abc-123/cancel",
            "queue_position": 0
        }"#;
        let job: JobHandle = serde_json::from_str(json).unwrap();
        assert_eq!(job.request_id, "req-abc-123");
        assert!(job.status_url.ends_with("/status"));
        assert!(job.response_url.ends_with("req-abc-123"));
    }
}
