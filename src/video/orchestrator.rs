//! Submit, monitor, fetch, download.

use crate::config::Config;
use crate::error::{GrokVidError, Result};
use crate::video::download;
use crate::video::events::EventSubscription;
use crate::video::report::{Reporter, SilentReporter};
use crate::video::service::{GenerationService, JobHandle};
use crate::video::types::{DownloadOutcome, VideoGenerationRequest, VideoResult};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs one generation job end to end.
pub struct Orchestrator {
    service: Arc<dyn GenerationService>,
    reporter: Arc<dyn Reporter>,
    cancel: CancellationToken,
    poll_interval: Duration,
    timeout: Duration,
}

impl Orchestrator {
    /// Creates an orchestrator over `service`, taking timings from `config`.
    pub fn new(service: Arc<dyn GenerationService>, config: &Config) -> Self {
        Self {
            service,
            reporter: Arc::new(SilentReporter),
            cancel: CancellationToken::new(),
            poll_interval: config.poll_interval,
            timeout: config.timeout,
        }
    }

    /// Sets where progress is reported.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets a token that aborts the run when cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Generates a video for `request` and saves it under `output_dir`.
    ///
    /// Returns [`DownloadOutcome::NoVideo`] without touching the filesystem
    /// beyond `output_dir` when the result carries no URL.
    pub async fn submit_and_download(
        &self,
        request: &VideoGenerationRequest,
        output_dir: &Path,
    ) -> Result<DownloadOutcome> {
        tokio::fs::create_dir_all(output_dir).await?;

        self.reporter.request(request);
        let job = self.cancellable(self.service.submit(request)).await?;
        tracing::info!(request_id = %job.request_id, "request submitted");
        self.reporter.submitted(&job);

        let result = self.wait_for_result(&job).await?;
        let video = result.video;
        tracing::info!(request_id = %job.request_id, url = ?video.url, "generation complete");
        self.reporter.completed(&video);

        let Some(url) = video.url.as_deref() else {
            tracing::warn!(request_id = %job.request_id, "no video URL in result");
            self.reporter.missing_url();
            return Ok(DownloadOutcome::NoVideo);
        };

        let path = video.destination(output_dir);
        self.reporter.download_started(&path);

        let bytes = self
            .cancellable(async {
                let body = self.service.open_download(url).await?;
                download::write_stream(body, &path, |progress| {
                    self.reporter.download_progress(progress)
                })
                .await
            })
            .await?;

        tracing::info!(path = %path.display(), bytes, "video saved");
        self.reporter.saved(&path, bytes);
        Ok(DownloadOutcome::Saved { path, bytes })
    }

    /// Runs `work` unless the cancellation token fires first.
    async fn cancellable<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(GrokVidError::Cancelled),
            result = work => result,
        }
    }

    /// Drains progress events, then fetches the result, all under the timeout.
    async fn wait_for_result(&self, job: &JobHandle) -> Result<VideoResult> {
        let monitor = async {
            let mut events = EventSubscription::spawn(
                Arc::clone(&self.service),
                job.clone(),
                self.poll_interval,
                &self.cancel,
            );
            while let Some(event) = events.next().await {
                self.reporter.event(&event?);
            }
            if self.cancel.is_cancelled() {
                return Err(GrokVidError::Cancelled);
            }
            self.service.result(job).await
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(GrokVidError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, monitor) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(request_id = %job.request_id, timeout = ?self.timeout, "generation timed out");
                    Err(GrokVidError::Timeout(self.timeout))
                }
            },
        }
    }
}
