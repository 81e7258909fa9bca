//! Video generation: request types, the queue client, and the orchestrator.

mod download;
mod events;
mod orchestrator;
mod queue;
mod report;
mod service;
mod types;

pub use download::{write_stream, DownloadBody, DownloadProgress, CHUNK_SIZE};
pub use events::{EventSubscription, LogEntry, ProgressEvent, QueueStatus};
pub use orchestrator::Orchestrator;
pub use queue::FalQueueClient;
pub use report::{event_lines, metadata_lines, ConsoleReporter, Reporter, SilentReporter};
pub use service::{GenerationService, JobHandle};
pub use types::{
    parse_duration, AspectRatio, DownloadOutcome, Resolution, VideoDescriptor,
    VideoGenerationRequest, VideoResult, DEFAULT_DURATION_SECS, DEFAULT_FILE_NAME,
    MAX_DURATION_SECS,
};
