//! CLI for grokvid - generate a Grok Imagine video and download it.

use clap::Parser;
use grokvid::config::{missing_credential_help, Config};
use grokvid::prompt::Prompter;
use grokvid::video::{
    parse_duration, AspectRatio, ConsoleReporter, DownloadOutcome, FalQueueClient,
    GenerationService, Orchestrator, Reporter, Resolution, SilentReporter,
    VideoGenerationRequest,
};
use grokvid::GrokVidError;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grokvid")]
#[command(about = "Generate a video with Grok Imagine (via fal.ai) and download it")]
#[command(version)]
struct Cli {
    /// The text prompt describing the video (asked interactively if omitted)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Video duration in seconds (1-15)
    #[arg(short, long, value_parser = parse_duration)]
    duration: Option<u32>,

    /// Aspect ratio: 16:9, 4:3, 3:2, 1:1, 2:3, 3:4, 9:16
    #[arg(long)]
    aspect_ratio: Option<AspectRatio>,

    /// Resolution: 480p or 720p
    #[arg(long)]
    resolution: Option<Resolution>,

    /// Directory to save the video into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Give up waiting for generation after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            on_ctrl_c.cancel();
        }
    });

    let console = Console {
        input: std::io::stdin().lock(),
        out: std::io::stdout(),
        err: std::io::stderr(),
    };
    run(cli, Config::from_env, connect, cancel, console).await
}

/// Where the CLI reads answers and writes its output.
struct Console<R, W, E> {
    input: R,
    out: W,
    err: E,
}

fn connect(config: &Config) -> grokvid::Result<Arc<dyn GenerationService>> {
    Ok(Arc::new(FalQueueClient::new(config)?))
}

async fn run<L, C, R, W, E>(
    cli: Cli,
    load_config: L,
    connect: C,
    cancel: CancellationToken,
    mut console: Console<R, W, E>,
) -> anyhow::Result<()>
where
    L: FnOnce() -> grokvid::Result<Config>,
    C: FnOnce(&Config) -> grokvid::Result<Arc<dyn GenerationService>>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let config = match load_config() {
        Ok(config) => config,
        Err(GrokVidError::MissingCredential(var)) => {
            writeln!(console.out, "{}", missing_credential_help(var))?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let config = apply_overrides(config, &cli);

    // Questions stay off stdout when it carries JSON.
    let request = if cli.json {
        build_request(&cli, &mut console.input, &mut console.err)?
    } else {
        build_request(&cli, &mut console.input, &mut console.out)?
    };
    let service = connect(&config)?;

    let reporter: Arc<dyn Reporter> = if cli.json {
        Arc::new(SilentReporter)
    } else {
        Arc::new(ConsoleReporter::new())
    };

    let outcome = Orchestrator::new(service, &config)
        .with_reporter(reporter)
        .with_cancellation(cancel)
        .submit_and_download(&request, &config.output_dir)
        .await?;

    if cli.json {
        let result = match &outcome {
            DownloadOutcome::Saved { path, bytes } => serde_json::json!({
                "type": "video",
                "success": true,
                "output": path.display().to_string(),
                "size_bytes": bytes,
                "prompt": request.prompt(),
                "duration_secs": request.duration_secs(),
                "aspect_ratio": request.aspect_ratio(),
                "resolution": request.resolution(),
            }),
            DownloadOutcome::NoVideo => serde_json::json!({
                "type": "video",
                "success": false,
                "error": "no video URL found in the response",
            }),
        };
        writeln!(console.out, "{}", serde_json::to_string_pretty(&result)?)?;
    } else if let Some(path) = outcome.path() {
        writeln!(console.out, "\n🎉 Done! Your video is ready at: {}", path.display())?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "grokvid=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(dir) = &cli.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    config
}

/// Flags win; anything missing is asked for (only when no prompt flag was given).
fn build_request<R: BufRead, W: Write>(
    cli: &Cli,
    input: R,
    output: W,
) -> anyhow::Result<VideoGenerationRequest> {
    let Some(prompt) = &cli.prompt else {
        let request = Prompter::new(input, output).request_with(
            cli.duration,
            cli.aspect_ratio,
            cli.resolution,
        )?;
        return Ok(request);
    };

    let mut request = VideoGenerationRequest::new(prompt.as_str())?;
    if let Some(d) = cli.duration {
        request = request.with_duration(d)?;
    }
    if let Some(r) = cli.aspect_ratio {
        request = request.with_aspect_ratio(r);
    }
    if let Some(r) = cli.resolution {
        request = request.with_resolution(r);
    }
    Ok(request)
}
