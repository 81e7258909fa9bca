//! Core types for video generation.

use crate::error::{GrokVidError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name used when the service does not name the video.
pub const DEFAULT_FILE_NAME: &str = "grok_video.mp4";

/// Default video duration in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 6;

/// Longest duration the model accepts, in seconds.
pub const MAX_DURATION_SECS: u32 = 15;

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 widescreen.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 4:3.
    #[serde(rename = "4:3")]
    Standard,
    /// 3:2.
    #[serde(rename = "3:2")]
    Photo,
    /// 1:1.
    #[serde(rename = "1:1")]
    Square,
    /// 2:3.
    #[serde(rename = "2:3")]
    PhotoPortrait,
    /// 3:4.
    #[serde(rename = "3:4")]
    StandardPortrait,
    /// 9:16 vertical.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Every ratio the model accepts, in display order.
    pub const ALL: [AspectRatio; 7] = [
        Self::Landscape,
        Self::Standard,
        Self::Photo,
        Self::Square,
        Self::PhotoPortrait,
        Self::StandardPortrait,
        Self::Portrait,
    ];

    /// Returns the wire string (e.g. `"16:9"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Standard => "4:3",
            Self::Photo => "3:2",
            Self::Square => "1:1",
            Self::PhotoPortrait => "2:3",
            Self::StandardPortrait => "3:4",
            Self::Portrait => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = GrokVidError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| {
                GrokVidError::InvalidRequest(format!(
                    "unsupported aspect ratio '{}' (expected one of {})",
                    s,
                    join(Self::ALL.iter().map(AspectRatio::as_str))
                ))
            })
    }
}

/// Output resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// 480p.
    #[default]
    #[serde(rename = "480p")]
    P480,
    /// 720p.
    #[serde(rename = "720p")]
    P720,
}

impl Resolution {
    /// Every resolution the model accepts.
    pub const ALL: [Resolution; 2] = [Self::P480, Self::P720];

    /// Returns the wire string (e.g. `"480p"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P480 => "480p",
            Self::P720 => "720p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = GrokVidError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|res| res.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                GrokVidError::InvalidRequest(format!(
                    "unsupported resolution '{}' (expected one of {})",
                    s,
                    join(Self::ALL.iter().map(Resolution::as_str))
                ))
            })
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(", ")
}

fn check_duration(secs: u32) -> Result<u32> {
    if secs == 0 || secs > MAX_DURATION_SECS {
        return Err(GrokVidError::InvalidRequest(format!(
            "duration must be between 1 and {} seconds, got {}",
            MAX_DURATION_SECS, secs
        )));
    }
    Ok(secs)
}

/// Parses a duration in whole seconds and checks it is in range.
pub fn parse_duration(s: &str) -> Result<u32> {
    let secs = s.trim().parse::<u32>().map_err(|_| {
        GrokVidError::InvalidRequest(format!(
            "duration must be a whole number of seconds, got '{}'",
            s.trim()
        ))
    })?;
    check_duration(secs)
}

/// A request to generate a video.
///
/// Serializes to exactly the body the queue endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoGenerationRequest {
    prompt: String,
    duration: u32,
    aspect_ratio: AspectRatio,
    resolution: Resolution,
}

impl VideoGenerationRequest {
    /// Creates a request with the default duration, aspect ratio and resolution.
    pub fn new(prompt: impl Into<String>) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(GrokVidError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(Self {
            prompt,
            duration: DEFAULT_DURATION_SECS,
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
        })
    }

    /// Sets the video duration in seconds (1-15).
    pub fn with_duration(mut self, secs: u32) -> Result<Self> {
        self.duration = check_duration(secs)?;
        Ok(self)
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Sets the resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// The text prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Video duration in seconds.
    pub fn duration_secs(&self) -> u32 {
        self.duration
    }

    /// Aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

/// The terminal payload of a generation job.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoResult {
    /// Descriptor of the generated video. Absent when generation failed.
    #[serde(default)]
    pub video: VideoDescriptor,
}

/// Location and metadata of a generated video. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoDescriptor {
    /// Download URL.
    pub url: Option<String>,
    /// Name the service gave the file.
    pub file_name: Option<String>,
    /// MIME type, e.g. `video/mp4`.
    pub content_type: Option<String>,
    /// Size in bytes as reported by the service.
    pub file_size: Option<u64>,
    /// Width in pixels.
    pub width: Option<u32>,
    /// Height in pixels.
    pub height: Option<u32>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    /// Frames per second.
    pub fps: Option<f64>,
    /// Total frame count.
    pub num_frames: Option<u64>,
}

impl VideoDescriptor {
    /// File name to save under, falling back to [`DEFAULT_FILE_NAME`].
    pub fn file_name_or_default(&self) -> &str {
        self.file_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
    }

    /// Where the video lands inside `output_dir`.
    ///
    /// Only the final path component of the service-supplied name is used.
    pub fn destination(&self, output_dir: &Path) -> PathBuf {
        let name = Path::new(self.file_name_or_default())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_FILE_NAME);
        output_dir.join(name)
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The video was written to `path`.
    Saved {
        /// Local file path.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// The result carried no video URL; nothing was written.
    NoVideo,
}

impl DownloadOutcome {
    /// The saved path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Saved { path, .. } => Some(path),
            Self::NoVideo => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req = VideoGenerationRequest::new("A cat").unwrap();
        assert_eq!(req.duration_secs(), 6);
        assert_eq!(req.aspect_ratio(), AspectRatio::Landscape);
        assert_eq!(req.resolution(), Resolution::P480);
    }

    #[test]
    fn test_request_rejects_empty_prompt() {
        let err = VideoGenerationRequest::new("   ").unwrap_err();
        assert!(matches!(err, GrokVidError::InvalidRequest(_)));
    }

    #[test]
    fn test_request_duration_bounds() {
        let req = VideoGenerationRequest::new("A cat").unwrap();
        assert!(req.clone().with_duration(0).is_err());
        assert!(req.clone().with_duration(16).is_err());
        assert_eq!(req.with_duration(15).unwrap().duration_secs(), 15);
    }

    #[test]
    fn test_payload_carries_fields_untransformed() {
        for ratio in AspectRatio::ALL {
            for resolution in Resolution::ALL {
                for duration in [1, 6, 15] {
                    let req = VideoGenerationRequest::new("Ocean waves")
                        .unwrap()
                        .with_duration(duration)
                        .unwrap()
                        .with_aspect_ratio(ratio)
                        .with_resolution(resolution);
                    let json = serde_json::to_value(&req).unwrap();
                    let obj = json.as_object().unwrap();

                    assert_eq!(obj.len(), 4);
                    assert_eq!(json["prompt"], "Ocean waves");
                    assert_eq!(json["duration"], duration);
                    assert_eq!(json["aspect_ratio"], ratio.as_str());
                    assert_eq!(json["resolution"], resolution.as_str());
                }
            }
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(" 10 ").unwrap(), 10);
        assert!(parse_duration("six").is_err());
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("99").is_err());
    }

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert_eq!(" 3:2 ".parse::<AspectRatio>().unwrap(), AspectRatio::Photo);
        let err = "21:9".parse::<AspectRatio>().unwrap_err();
        assert!(err.to_string().contains("21:9"));
    }

    #[test]
    fn test_resolution_parse() {
        assert_eq!("720p".parse::<Resolution>().unwrap(), Resolution::P720);
        assert_eq!("480P".parse::<Resolution>().unwrap(), Resolution::P480);
        assert!("1080p".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_result_deserialization() {
        let json = r#"{
            "video": {
                "url": "https://v3.fal.media/files/rabbit/abc.mp4",
                "file_name": "abc.mp4",
                "content_type": "video/mp4",
                "width": 848,
                "height": 480,
                "duration": 6.04,
                "fps": 24,
                "num_frames": 145
            }
        }"#;
        let result: VideoResult = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.video.url.as_deref(),
            Some("https://v3.fal.media/files/rabbit/abc.mp4")
        );
        assert_eq!(result.video.width, Some(848));
        assert_eq!(result.video.fps, Some(24.0));
        assert_eq!(result.video.num_frames, Some(145));
        assert_eq!(result.video.file_size, None);
    }

    #[test]
    fn test_result_without_video() {
        let result: VideoResult = serde_json::from_str("{}").unwrap();
        assert!(result.video.url.is_none());
    }

    #[test]
    fn test_destination_defaults_file_name() {
        let video = VideoDescriptor {
            url: Some("https://example/a.mp4".into()),
            ..Default::default()
        };
        assert_eq!(
            video.destination(Path::new("out")),
            Path::new("out").join("grok_video.mp4")
        );
    }

    #[test]
    fn test_destination_strips_directories() {
        let video = VideoDescriptor {
            file_name: Some("../../etc/clip.mp4".into()),
            ..Default::default()
        };
        assert_eq!(
            video.destination(Path::new("out")),
            Path::new("out").join("clip.mp4")
        );
    }
}
