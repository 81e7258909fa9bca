//! fal.ai queue API client.

use crate::config::Config;
use crate::error::{parse_retry_after, sanitize_error_message, GrokVidError, Result};
use crate::video::download::DownloadBody;
use crate::video::events::{QueueStatus, StatusResponse};
use crate::video::service::{GenerationService, JobHandle};
use crate::video::types::{VideoGenerationRequest, VideoResult};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;

/// Client for fal.ai's queue: submit, status, result, and download.
#[derive(Debug, Clone)]
pub struct FalQueueClient {
    client: reqwest::Client,
    api_key: String,
    submit_url: String,
    queue_url: String,
    model: String,
}

impl FalQueueClient {
    /// Creates a client from the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GrokVidError::MissingCredential(crate::config::API_KEY_VAR));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            submit_url: config.submit_url(),
            queue_url: config.queue_url.clone(),
            model: config.model.clone(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> GrokVidError {
        let text = sanitize_error_message(text);

        // fal.ai usually wraps errors as {"detail": "..."}.
        let message = match serde_json::from_str::<FalErrorResponse>(&text) {
            Ok(FalErrorResponse {
                detail: serde_json::Value::String(detail),
            }) => detail,
            Ok(FalErrorResponse { detail }) => sanitize_error_message(&detail.to_string()),
            Err(_) => text,
        };

        let lower = message.to_lowercase();
        if status == 401 || status == 403 || lower.contains("unauthorized") {
            return GrokVidError::Auth(message);
        }
        if status == 429 || (lower.contains("rate") && lower.contains("limit")) {
            return GrokVidError::RateLimited {
                retry_after: parse_retry_after(headers),
            };
        }
        if status == 422 {
            return GrokVidError::InvalidRequest(message);
        }

        GrokVidError::Api { status, message }
    }

    async fn error_from(&self, response: reqwest::Response) -> GrokVidError {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        self.parse_error(status, &text, &headers)
    }
}

#[async_trait]
impl GenerationService for FalQueueClient {
    async fn submit(&self, request: &VideoGenerationRequest) -> Result<JobHandle> {
        let response = self
            .client
            .post(&self.submit_url)
            .header("Authorization", self.auth_header())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let job: JobHandle = response.json().await?;
        tracing::debug!(request_id = %job.request_id, model = %self.model, "submitted fal.ai video generation request");
        Ok(job)
    }

    async fn status(&self, job: &JobHandle, with_logs: bool) -> Result<QueueStatus> {
        let mut builder = self
            .client
            .get(&job.status_url)
            .header("Authorization", self.auth_header());
        if with_logs {
            builder = builder.query(&[("logs", "1")]);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        let status: StatusResponse = response.json().await?;
        status.into_status()
    }

    /// Tries the `response_url` first. Models with nested paths sometimes
    /// answer 404/405 there, so fall back to a URL built from the model id.
    async fn result(&self, job: &JobHandle) -> Result<VideoResult> {
        let response = self
            .client
            .get(&job.response_url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status().as_u16();
        let response = if status == 404 || status == 405 {
            let fallback_url = format!(
                "{}/{}/requests/{}",
                self.queue_url, self.model, job.request_id
            );
            tracing::debug!(
                response_url = %job.response_url,
                %fallback_url,
                "fal.ai response_url returned {}, falling back to model-based URL",
                status
            );
            self.client
                .get(&fallback_url)
                .header("Authorization", self.auth_header())
                .send()
                .await?
        } else {
            response
        };

        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        Ok(response.json().await?)
    }

    async fn open_download(&self, url: &str) -> Result<DownloadBody> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GrokVidError::Api {
                status: status.as_u16(),
                message: "failed to download video".into(),
            });
        }

        Ok(DownloadBody {
            content_length: response.content_length(),
            stream: response
                .bytes_stream()
                .map(|chunk| chunk.map_err(GrokVidError::from))
                .boxed(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct FalErrorResponse {
    detail: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use std::time::Duration;

    fn client() -> FalQueueClient {
        FalQueueClient::new(&Config::new("test-key")).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let err = FalQueueClient::new(&Config::new("  ")).unwrap_err();
        assert!(matches!(err, GrokVidError::MissingCredential("FAL_KEY")));
    }

    #[test]
    fn test_submit_url_follows_config() {
        let config = Config::new("test-key").with_queue_url("http://127.0.0.1:9000/");
        let c = FalQueueClient::new(&config).unwrap();
        assert_eq!(
            c.submit_url,
            "http://127.0.0.1:9000/xai/grok-imagine/text-to-video"
        );
    }

    #[test]
    fn test_auth_header_uses_key_scheme() {
        assert_eq!(client().auth_header(), "Key test-key");
    }

    #[test]
    fn test_parse_error_auth() {
        let c = client();
        let headers = HeaderMap::new();

        assert!(matches!(
            c.parse_error(401, "Unauthorized", &headers),
            GrokVidError::Auth(_)
        ));
        assert!(matches!(
            c.parse_error(403, "Forbidden", &headers),
            GrokVidError::Auth(_)
        ));
        assert!(matches!(
            c.parse_error(400, r#"{"detail": "Unauthorized: invalid key format"}"#, &headers),
            GrokVidError::Auth(_)
        ));
    }

    #[test]
    fn test_parse_error_rate_limited() {
        let c = client();
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

        match c.parse_error(429, "Too many requests", &headers) {
            GrokVidError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_validation() {
        let c = client();
        let err = c.parse_error(
            422,
            r#"{"detail": [{"loc": ["body", "aspect_ratio"], "msg": "unexpected value"}]}"#,
            &HeaderMap::new(),
        );
        match err {
            GrokVidError::InvalidRequest(message) => assert!(message.contains("aspect_ratio")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_plain_api() {
        let err = client().parse_error(500, r#"{"detail": "Internal error"}"#, &HeaderMap::new());
        match err {
            GrokVidError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal error");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
