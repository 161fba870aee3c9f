//! VExport CLI Project Exporter
//!
//! A command-line tool that exports video-editing projects to rendered
//! media files by driving an external compositing engine.
//!
//! # Usage
//!
//! ```bash
//! vexport export --project project.json --outfile render.mp4
//! vexport export --project project.json --outfile render.mp4 --start-frame 1 --end-frame 300
//! vexport inspect --project project.json --json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error, info};

use vexport_cli::adapters::{FfmpegEngine, JsonProjectStore};
use vexport_cli::app::{ExportInteractor, ExportRequest, InspectInteractor, InspectRequest};
use vexport_cli::cli::{args::ExportArgs, args::InspectArgs, Cli, Commands};
use vexport_cli::config::ExportConfig;
use vexport_cli::error::{ExportError, ExportResult};
use vexport_cli::planner::{RangePolicy, DEFAULT_END_FRAME, DEFAULT_START_FRAME};

/// Main entry point for the VExport CLI application
fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --log-level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    info!("Starting VExport CLI Project Exporter");

    // Execute the requested command; every failure is fatal and carries a
    // per-kind exit status
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }

    info!("VExport CLI completed successfully");
}

fn run(cli: Cli) -> ExportResult<()> {
    match cli.command {
        Commands::Export(args) => {
            info!("Executing export command");
            execute_export_command(args)
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            execute_inspect_command(args)
        }
    }
}

/// Execute export command through the interactor
fn execute_export_command(args: ExportArgs) -> ExportResult<()> {
    if !args.remainder.is_empty() {
        debug!("Ignoring {} additional arguments", args.remainder.len());
    }

    let config = match &args.config {
        Some(path) => ExportConfig::load(Path::new(path))?,
        None => ExportConfig::default(),
    };

    let range_policy = if args.start_frame.is_some() || args.end_frame.is_some() {
        RangePolicy::Fixed {
            start: args.start_frame.unwrap_or(DEFAULT_START_FRAME),
            end: args.end_frame.unwrap_or(DEFAULT_END_FRAME),
        }
    } else {
        RangePolicy::Computed
    };

    let request = ExportRequest {
        project_path: PathBuf::from(&args.project),
        output_path: PathBuf::from(&args.outfile),
        video: config.video_settings()?,
        audio: config.audio_settings()?,
        range_policy,
        cache_frames: config.cache_frames(),
    };

    let engine = Arc::new(FfmpegEngine::new()?.with_threads(config.threads()));
    let store = Arc::new(JsonProjectStore::new());
    let interactor = ExportInteractor::new(store, engine);

    let response = interactor.execute(request)?;
    info!(
        "Wrote {} frames to {} in {:.2}s",
        response.report.frames_written,
        response.output_path.display(),
        response.report.elapsed.as_secs_f64()
    );
    Ok(())
}

/// Execute inspect command through the interactor
fn execute_inspect_command(args: InspectArgs) -> ExportResult<()> {
    let engine = Arc::new(FfmpegEngine::new()?);
    let store = Arc::new(JsonProjectStore::new());
    let interactor = InspectInteractor::new(store, engine);

    let report = interactor.execute(InspectRequest {
        project_path: PathBuf::from(&args.project),
    })?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).map_err(|e| ExportError::EngineError {
                message: format!("failed to render report: {}", e),
            })?;
        println!("{}", rendered);
    } else {
        println!("Geometry:     {}x{}", report.width, report.height);
        println!("Frame rate:   {}/{}", report.fps_num, report.fps_den);
        println!(
            "Audio:        {} Hz, {} channels",
            report.sample_rate, report.channels
        );
        println!("Clips:        {}", report.clip_count);
        println!(
            "Export range: [{}, {}] ({} frames)",
            report.start_frame, report.end_frame, report.frame_count
        );
    }
    Ok(())
}
