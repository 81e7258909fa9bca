//! Runtime configuration, sourced once at start-up.

use crate::error::{GrokVidError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the fal.ai API key.
pub const API_KEY_VAR: &str = "FAL_KEY";

/// Default fal.ai queue base URL.
pub const DEFAULT_QUEUE_URL: &str = "https://queue.fal.run";

/// Default model endpoint.
pub const DEFAULT_MODEL: &str = "xai/grok-imagine/text-to-video";

/// Default directory videos are saved into.
pub const DEFAULT_OUTPUT_DIR: &str = "videos";

const QUEUE_URL_VAR: &str = "GROKVID_QUEUE_URL";
const MODEL_VAR: &str = "GROKVID_MODEL";
const OUTPUT_DIR_VAR: &str = "GROKVID_OUTPUT_DIR";
const POLL_INTERVAL_VAR: &str = "GROKVID_POLL_INTERVAL_MS";
const TIMEOUT_VAR: &str = "GROKVID_TIMEOUT_SECS";

/// Everything the client and orchestrator need to know about their environment.
#[derive(Clone)]
pub struct Config {
    /// fal.ai API key.
    pub api_key: String,
    /// Queue base URL, without a trailing slash.
    pub queue_url: String,
    /// Model endpoint id, e.g. `xai/grok-imagine/text-to-video`.
    pub model: String,
    /// Directory videos are saved into.
    pub output_dir: PathBuf,
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Upper bound on waiting for generation (events plus result).
    pub timeout: Duration,
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("queue_url", &self.queue_url)
            .field("model", &self.model)
            .field("output_dir", &self.output_dir)
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Creates a config with the given key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(600), // 10 minutes for video
        }
    }

    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(GrokVidError::Config(format!("failed to read .env: {}", e))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or(GrokVidError::MissingCredential(API_KEY_VAR))?;
        let mut config = Self::new(api_key.trim());

        if let Some(url) = get(QUEUE_URL_VAR) {
            config.queue_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(model) = get(MODEL_VAR) {
            config.model = model.trim().trim_matches('/').to_string();
        }
        if let Some(dir) = get(OUTPUT_DIR_VAR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(ms) = get(POLL_INTERVAL_VAR) {
            config.poll_interval = Duration::from_millis(parse_number(POLL_INTERVAL_VAR, &ms)?);
        }
        if let Some(secs) = get(TIMEOUT_VAR) {
            config.timeout = Duration::from_secs(parse_number(TIMEOUT_VAR, &secs)?);
        }

        Ok(config)
    }

    /// Sets the directory videos are saved into.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the generation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the delay between status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the queue base URL.
    pub fn with_queue_url(mut self, url: impl Into<String>) -> Self {
        self.queue_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full submit URL for the configured model.
    pub fn submit_url(&self) -> String {
        format!("{}/{}", self.queue_url, self.model)
    }
}

/// Remediation text shown when the credential is missing.
pub fn missing_credential_help(var: &str) -> String {
    format!(
        "❌ Error: {var} not found in environment variables.\n   \
         Please add your API key to the .env file:\n   \
         {var}=your_api_key_here"
    )
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| GrokVidError::Config(format!("{} must be a whole number, got '{}'", key, value)))
}
