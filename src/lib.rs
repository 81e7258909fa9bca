#![warn(missing_docs)]
//! grokvid - generate Grok Imagine videos through fal.ai and save them locally.
//!
//! One request, one job, one download: the request is submitted to the
//! fal.ai queue, progress is followed until the job completes, and the
//! resulting video is streamed to disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use grokvid::{AspectRatio, Config, FalQueueClient, Orchestrator, VideoGenerationRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> grokvid::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = FalQueueClient::new(&config)?;
//!     let request = VideoGenerationRequest::new("A cat playing with a ball")?
//!         .with_duration(6)?
//!         .with_aspect_ratio(AspectRatio::Portrait);
//!
//!     let outcome = Orchestrator::new(Arc::new(client), &config)
//!         .submit_and_download(&request, &config.output_dir)
//!         .await?;
//!     println!("{:?}", outcome.path());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `grokvid` command-line tool

pub mod config;
mod error;
pub mod prompt;
pub mod video;

// Re-export error types at crate root
pub use error::{GrokVidError, Result};

pub use config::Config;
pub use video::{
    AspectRatio, ConsoleReporter, DownloadOutcome, FalQueueClient, GenerationService, JobHandle,
    Orchestrator, ProgressEvent, Reporter, Resolution, VideoDescriptor, VideoGenerationRequest,
    VideoResult,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{GrokVidError, Result};
    pub use crate::video::{
        AspectRatio, DownloadOutcome, FalQueueClient, GenerationService, Orchestrator,
        Resolution, VideoGenerationRequest,
    };
}
