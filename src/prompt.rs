//! Interactive console questions with defaults.

use crate::error::Result;
use crate::video::{
    parse_duration, AspectRatio, Resolution, VideoGenerationRequest, DEFAULT_DURATION_SECS,
};
use std::fmt::Display;
use std::io::{BufRead, Write};

/// Prompt used when the user enters nothing.
pub const DEFAULT_PROMPT: &str = "A cat playing with a ball of yarn in a cozy living room";

/// Asks questions on `output` and reads answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Creates a prompter over the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Reads one trimmed line. End of input reads as an empty answer.
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    /// Asks until the answer parses; an empty answer takes `default`.
    fn ask_parsed<T, F>(&mut self, question: &str, default: T, parse: F) -> Result<T>
    where
        F: Fn(&str) -> Result<T>,
    {
        loop {
            let answer = self.ask(question)?;
            if answer.is_empty() {
                return Ok(default);
            }
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "   ⚠️  {}", e)?,
            }
        }
    }

    /// Asks for the video prompt, falling back to [`DEFAULT_PROMPT`].
    pub fn prompt_text(&mut self) -> Result<String> {
        let answer = self.ask("🎬 Enter your video prompt: ")?;
        if answer.is_empty() {
            writeln!(self.output, "   Using default prompt: {}", DEFAULT_PROMPT)?;
            return Ok(DEFAULT_PROMPT.to_string());
        }
        Ok(answer)
    }

    /// Prints the settings header.
    pub fn settings_header(&mut self) -> Result<()> {
        writeln!(self.output, "\n📐 Video settings (press Enter for defaults):")?;
        Ok(())
    }

    /// Asks for the duration in seconds.
    pub fn duration(&mut self) -> Result<u32> {
        self.ask_parsed(
            &format!("   Duration in seconds ({}): ", DEFAULT_DURATION_SECS),
            DEFAULT_DURATION_SECS,
            parse_duration,
        )
    }

    /// Asks for the aspect ratio, listing the choices.
    pub fn aspect_ratio(&mut self) -> Result<AspectRatio> {
        writeln!(self.output, "   Aspect ratios: {}", list(&AspectRatio::ALL))?;
        self.ask_parsed(
            &format!("   Aspect ratio ({}): ", AspectRatio::default()),
            AspectRatio::default(),
            str::parse::<AspectRatio>,
        )
    }

    /// Asks for the resolution, listing the choices.
    pub fn resolution(&mut self) -> Result<Resolution> {
        writeln!(self.output, "   Resolutions: {}", list(&Resolution::ALL))?;
        self.ask_parsed(
            &format!("   Resolution ({}): ", Resolution::default()),
            Resolution::default(),
            str::parse::<Resolution>,
        )
    }

    /// Runs the whole questionnaire and builds a request.
    pub fn request(&mut self) -> Result<VideoGenerationRequest> {
        self.request_with(None, None, None)
    }

    /// Like [`request`](Self::request), but settings already chosen are not asked.
    pub fn request_with(
        &mut self,
        duration: Option<u32>,
        aspect_ratio: Option<AspectRatio>,
        resolution: Option<Resolution>,
    ) -> Result<VideoGenerationRequest> {
        let prompt = self.prompt_text()?;
        self.settings_header()?;
        let duration = match duration {
            Some(d) => d,
            None => self.duration()?,
        };
        let aspect_ratio = match aspect_ratio {
            Some(r) => r,
            None => self.aspect_ratio()?,
        };
        let resolution = match resolution {
            Some(r) => r,
            None => self.resolution()?,
        };
        writeln!(self.output)?;

        Ok(VideoGenerationRequest::new(prompt)?
            .with_duration(duration)?
            .with_aspect_ratio(aspect_ratio)
            .with_resolution(resolution))
    }
}

fn list<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
