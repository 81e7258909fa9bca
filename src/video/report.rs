//! Rendering of job progress for the user.

use crate::video::download::DownloadProgress;
use crate::video::events::ProgressEvent;
use crate::video::service::JobHandle;
use crate::video::types::{VideoDescriptor, VideoGenerationRequest};
use std::fmt::Display;
use std::io::Write;
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// Receives notifications as a run moves through its steps.
///
/// Every hook defaults to doing nothing.
pub trait Reporter: Send + Sync {
    /// About to submit `request`.
    fn request(&self, _request: &VideoGenerationRequest) {}

    /// The service accepted the job.
    fn submitted(&self, _job: &JobHandle) {}

    /// A progress event arrived.
    fn event(&self, _event: &ProgressEvent) {}

    /// Generation finished and the result was fetched.
    fn completed(&self, _video: &VideoDescriptor) {}

    /// The result had no video URL.
    fn missing_url(&self) {}

    /// Download to `path` is starting.
    fn download_started(&self, _path: &Path) {}

    /// One more chunk was written.
    fn download_progress(&self, _progress: DownloadProgress) {}

    /// The video was saved.
    fn saved(&self, _path: &Path, _bytes: u64) {}
}

/// Reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Prints a human-readable transcript to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Creates a console reporter.
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn request(&self, request: &VideoGenerationRequest) {
        println!("🎬 Generating video with prompt: {}", request.prompt());
        println!(
            "   Duration: {}s | Aspect Ratio: {} | Resolution: {}",
            request.duration_secs(),
            request.aspect_ratio(),
            request.resolution()
        );
        println!("{}", "-".repeat(RULE_WIDTH));
    }

    fn submitted(&self, job: &JobHandle) {
        println!("📤 Request submitted. Request ID: {}", job.request_id);
        println!("⏳ Waiting for video generation...");
    }

    fn event(&self, event: &ProgressEvent) {
        for line in event_lines(event) {
            println!("{}", line);
        }
    }

    fn completed(&self, video: &VideoDescriptor) {
        println!("{}", "-".repeat(RULE_WIDTH));
        println!("✅ Video generation complete!");
        for line in metadata_lines(video) {
            println!("{}", line);
        }
    }

    fn missing_url(&self) {
        println!("❌ No video URL found in the response");
    }

    fn download_started(&self, path: &Path) {
        println!("\n📥 Downloading video to: {}", path.display());
    }

    fn download_progress(&self, progress: DownloadProgress) {
        if let Some(percent) = progress.percent() {
            print!("\r   Progress: {:.1}%", percent);
            let _ = std::io::stdout().flush();
        }
    }

    fn saved(&self, path: &Path, bytes: u64) {
        println!("\n✅ Video saved to: {} ({} bytes)", path.display(), bytes);
    }
}

/// Console lines for one progress event.
pub fn event_lines(event: &ProgressEvent) -> Vec<String> {
    match event {
        ProgressEvent::Message(message) => vec![format!("   📝 {}", message)],
        ProgressEvent::Logs(logs) => logs.iter().map(|log| format!("   📋 {}", log)).collect(),
    }
}

/// Console lines summarizing a result, with `N/A` for missing fields.
pub fn metadata_lines(video: &VideoDescriptor) -> Vec<String> {
    vec![
        format!(
            "   📊 Resolution: {}x{}",
            or_na(video.width),
            or_na(video.height)
        ),
        format!("   ⏱️  Duration: {}s", or_na(video.duration)),
        format!("   🎞️  FPS: {}", or_na(video.fps)),
        format!("   📹 Frames: {}", or_na(video.num_frames)),
    ]
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::events::LogEntry;

    #[test]
    fn test_metadata_lines_use_na() {
        let lines = metadata_lines(&VideoDescriptor::default());
        assert_eq!(lines[0], "   📊 Resolution: N/AxN/A");
        assert!(lines[1].contains("N/A"));
        assert!(lines[2].contains("N/A"));
        assert!(lines[3].contains("N/A"));
    }

    #[test]
    fn test_metadata_lines_with_values() {
        let video = VideoDescriptor {
            width: Some(848),
            height: Some(480),
            duration: Some(6.0),
            fps: Some(24.0),
            num_frames: Some(145),
            ..Default::default()
        };
        let lines = metadata_lines(&video);
        assert_eq!(lines[0], "   📊 Resolution: 848x480");
        assert_eq!(lines[1], "   ⏱️  Duration: 6s");
        assert_eq!(lines[2], "   🎞️  FPS: 24");
        assert_eq!(lines[3], "   📹 Frames: 145");
    }

    #[test]
    fn test_event_lines() {
        assert_eq!(
            event_lines(&ProgressEvent::Message("In queue".into())),
            vec!["   📝 In queue"]
        );
        assert_eq!(
            event_lines(&ProgressEvent::Logs(vec![
                LogEntry::new("one"),
                LogEntry::new("two")
            ])),
            vec!["   📋 one", "   📋 two"]
        );
    }
}
