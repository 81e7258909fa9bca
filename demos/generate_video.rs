//! Basic video generation example.
//!
//! Run with: `cargo run --example generate_video`
//!
//! Requires `FAL_KEY` environment variable (or a `.env` file).

use grokvid::{
    AspectRatio, Config, ConsoleReporter, FalQueueClient, Orchestrator, Resolution,
    VideoGenerationRequest,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> grokvid::Result<()> {
    let config = Config::from_env()?;
    let client = FalQueueClient::new(&config)?;

    let request = VideoGenerationRequest::new("Ocean waves crashing on a rocky shore at sunset")?
        .with_duration(5)?
        .with_aspect_ratio(AspectRatio::Landscape)
        .with_resolution(Resolution::P720);

    let outcome = Orchestrator::new(Arc::new(client), &config)
        .with_reporter(Arc::new(ConsoleReporter::new()))
        .submit_and_download(&request, &config.output_dir)
        .await?;

    match outcome.path() {
        Some(path) => println!("Saved to {}", path.display()),
        None => println!("The service returned no video"),
    }

    Ok(())
}
