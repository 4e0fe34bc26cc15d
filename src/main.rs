//! AirMouse GW - hands-free mouse control
//!
//! Maps webcam hand gestures (finger pinches) to cursor movement, left click,
//! drag, and right click, with a small control panel to toggle control.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod gesture;
mod sink;
mod status;
mod tracker;
mod ui;

use crate::config::AppConfig;
use crate::gesture::{Classifier, ClassifierConfig};
use crate::sink::{ActionSink, EnigoSink, LogSink};
use crate::status::SharedStatus;
use crate::tracker::{CameraProvider, CaptureOptions, MediaPipeDetector};

/// Grace period for the gesture processor to drain after shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// AirMouse GW - control the mouse with webcam hand gestures
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Camera device index (overrides config)
    #[arg(long)]
    camera: Option<i32>,

    /// Run without the control panel window
    #[arg(long)]
    headless: bool,

    /// Disable the camera preview window (ESC exit still works via Ctrl-C)
    #[arg(long)]
    no_preview: bool,

    /// Reproduce the legacy stuck-drag and label-collision behaviors
    #[arg(long)]
    compat: bool,

    /// Log mouse actions instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// List available camera devices
    #[arg(long)]
    list_cameras: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    if args.list_cameras {
        list_cameras_formatted();
        return Ok(());
    }

    info!("Starting AirMouse GW...");
    info!("Configuration file: {}", args.config);

    let mut config = AppConfig::load(&args.config)?;
    if let Some(index) = args.camera {
        config.camera.index = index;
    }
    if args.no_preview {
        config.camera.preview = false;
    }
    if args.compat {
        config.gesture.compat = true;
    }

    run_app(config, args.headless, args.dry_run).await?;

    info!("AirMouse GW shutdown complete");
    Ok(())
}

async fn run_app(config: AppConfig, headless: bool, dry_run: bool) -> Result<()> {
    let sink: Box<dyn ActionSink> = if dry_run {
        info!("Dry-run mode: mouse actions will be logged, not injected");
        Box::new(LogSink::new())
    } else {
        Box::new(EnigoSink::new()?)
    };
    let screen = sink.screen_size();
    info!("Screen size: {}x{}", screen.0, screen.1);

    let status = Arc::new(SharedStatus::new());

    // The control panel thread is daemonic: abandoned at exit, never joined
    if !headless {
        ui::spawn(status.clone())?;
        info!("Control panel started");
    }

    let detector = MediaPipeDetector::new(&config.detector)?;

    let (observation_tx, observation_rx) = mpsc::unbounded_channel();
    let mut provider = CameraProvider::start(
        CaptureOptions {
            camera_index: config.camera.index,
            preview: config.camera.preview,
        },
        Box::new(detector),
        status.clone(),
        observation_tx,
    )?;

    let classifier = Classifier::new(ClassifierConfig::from(&config.gesture), screen);
    let mut processor = tracker::spawn_processor(observation_rx, status, classifier, sink);

    info!("Pipeline running, gesture control enabled");
    if config.gesture.compat {
        info!("Compatibility mode: legacy stuck-drag and label ordering active");
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, stopping capture");
            provider.shutdown().await?;
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut processor).await.is_err() {
                warn!("Gesture processor did not stop in time, aborting");
                processor.abort();
            }
        }
        _ = &mut processor => {
            // Capture ended on its own: ESC in the preview or camera failure
            info!("Capture pipeline ended");
            provider.shutdown().await?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

/// Probe the first few camera indices and report which respond
fn list_cameras_formatted() {
    use colored::*;
    use opencv::prelude::*;
    use opencv::videoio;

    println!("\n{}", "=== Available Cameras ===".bold().cyan());

    let mut found = 0;
    for index in 0..4 {
        let Ok(mut camera) = videoio::VideoCapture::new(index, videoio::CAP_ANY) else {
            continue;
        };
        if camera.is_opened().unwrap_or(false) {
            let width = camera
                .get(videoio::CAP_PROP_FRAME_WIDTH)
                .unwrap_or_default();
            let height = camera
                .get(videoio::CAP_PROP_FRAME_HEIGHT)
                .unwrap_or_default();
            println!(
                "  {} camera {} ({}x{})",
                "✓".green(),
                index.to_string().bright_white(),
                width as u32,
                height as u32
            );
            found += 1;
            let _ = camera.release();
        }
    }

    if found == 0 {
        println!("  {}", "No cameras detected".yellow());
    } else {
        println!("\n{} camera(s) found", found.to_string().green());
    }
}
