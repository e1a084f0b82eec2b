use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use framepipe::{FfmpegPipeline, FilterConfig, PixelFormat, Rational};

#[derive(Parser, Debug)]
#[command(name = "framepipe")]
#[command(about = "Decode a video file into frames at a constant rate, size and pixel format")]
struct Args {
    /// Input media file
    input: PathBuf,

    /// Output frame rate
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Output width in pixels (defaults to the source width)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (defaults to the source height)
    #[arg(long)]
    height: Option<u32>,

    /// Output pixel format (yuv420p, nv12, rgba, bgra, ...)
    #[arg(long, default_value = "yuv420p")]
    format: PixelFormat,

    /// Start position in seconds
    #[arg(long)]
    seek: Option<f64>,

    /// Stop after this many frames
    #[arg(long)]
    limit: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // The time base is replaced by the stream's own once it is opened.
    let mut config = FilterConfig::new(Rational::new(1, 1), args.fps, args.format);
    config.output_width = args.width;
    config.output_height = args.height;

    let mut pipeline = FfmpegPipeline::open(&args.input, config)
        .with_context(|| format!("failed to open {}", args.input.display()))?;

    if let Some(seconds) = args.seek {
        let position = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("invalid seek position {seconds}"))?;
        pipeline.seek(position).context("seek failed")?;
    }

    let limit = args.limit.unwrap_or(u64::MAX);
    if limit == 0 {
        return Ok(());
    }
    let mut emitted = 0;
    let produced = pipeline
        .run(|output| {
            tracing::debug!(
                stream = output.stream_index,
                pts = ?output.frame.pts,
                time = ?output.frame.presentation_time(),
                geometry = %output.frame.geometry(),
                "frame"
            );
            emitted += 1;
            if emitted >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .context("pipeline failed")?;

    let stats = pipeline.stats();
    tracing::info!(
        frames = produced,
        packets = stats.packets_read,
        dropped = stats.packets_dropped,
        decoded = stats.frames_decoded,
        filtered = stats.frames_filtered,
        scaled = stats.frames_scaled,
        "done"
    );

    Ok(())
}
