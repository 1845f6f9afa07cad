//! anchorview replay - run a recorded tracking trace without a camera
//!
//! Reads a JSON-lines trace, drives an [`ArSession`] with it frame by frame
//! and prints what the viewer would show.

mod report;

use anchorview_core::config::{load_config, save_default_config};
use anchorview_core::trace::read_trace;
use anchorview_core::ArSession;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "anchorview-replay")]
#[command(about = "Replay a recorded tracking trace through the pose synchronizer")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "anchorview.toml")]
    config: PathBuf,

    /// Trace to replay (JSON lines)
    #[arg(short, long, required_unless_present = "write_default_config")]
    trace: Option<PathBuf>,

    /// Print a frame summary every N frames (0 prints only the final state)
    #[arg(short, long, default_value_t = 1)]
    every: usize,

    /// Print summaries as JSON lines
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write the default configuration to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if args.write_default_config {
        save_default_config(&args.config)
            .with_context(|| format!("writing {}", args.config.display()))?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    let config = load_config(&args.config)?;
    let Some(trace_path) = args.trace else {
        anyhow::bail!("--trace is required");
    };
    let file = File::open(&trace_path)
        .with_context(|| format!("opening {}", trace_path.display()))?;
    let frames = read_trace(BufReader::new(file))?;
    info!(frames = frames.len(), path = %trace_path.display(), "Replaying trace");

    let mut session = ArSession::new(config);
    let mut events = 0;
    for (index, frame) in frames.iter().enumerate() {
        events += frame.apply(&mut session).len();
        if args.every > 0 && (index + 1) % args.every == 0 {
            report::print(&report::FrameSummary::capture(index + 1, &session), args.json)?;
        }
    }

    let last = report::FrameSummary::capture(frames.len(), &session);
    if args.every == 0 || frames.len() % args.every != 0 {
        report::print(&last, args.json)?;
    }
    info!(frames = frames.len(), transitions = events, "Replay finished");
    Ok(())
}
