//! Error types for video generation and download.

use std::time::Duration;

/// Longest error body surfaced to the user, in characters.
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// Errors that can occur while generating or downloading a video.
#[derive(Debug, thiserror::Error)]
pub enum GrokVidError {
    /// The API credential is not configured.
    #[error("{0} not found in environment variables")]
    MissingCredential(&'static str),

    /// A configuration override could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// API key rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// The service reported that the job failed.
    #[error("video generation failed: {0}")]
    GenerationFailed(String),

    /// Generation did not finish within the configured timeout.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// The run was cancelled before generation finished.
    #[error("generation cancelled")]
    Cancelled,

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service answered with something we do not understand.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., writing the video file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for video generation operations.
pub type Result<T> = std::result::Result<T, GrokVidError>;

/// Trims an error body to something fit for a terminal.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_ERROR_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
    truncated.push_str("...");
    truncated
}

/// Reads a `Retry-After` header expressed in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_error_display() {
        let err = GrokVidError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = GrokVidError::MissingCredential("FAL_KEY");
        assert_eq!(
            err.to_string(),
            "FAL_KEY not found in environment variables"
        );

        let err = GrokVidError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "generation timed out after 30s");
    }

    #[test]
    fn test_sanitize_keeps_short_messages() {
        assert_eq!(sanitize_error_message("  bad prompt \n"), "bad prompt");
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let long = "x".repeat(MAX_ERROR_MESSAGE_CHARS + 50);
        let sanitized = sanitize_error_message(&long);
        assert_eq!(sanitized.chars().count(), MAX_ERROR_MESSAGE_CHARS + 3);
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(12)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }
}
