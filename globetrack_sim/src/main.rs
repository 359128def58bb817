//! GlobeTrack CLI
//!
//! Loads a track, then either replays the marker animation on a virtual
//! clock (default) or runs it in real time.

use anyhow::{Context, Result};
use clap::Parser;
use globetrack_core::{
    AnimationPhase, GeometryKind, RerunLogger, SceneDescription, SpeedSpec, TracingSink,
    ViewerConfig, ViewerSession,
};
use globetrack_env::{SourceId, TextSource, TokioContext};
use globetrack_sim::{open_source, replay};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// GlobeTrack track animation CLI
#[derive(Parser, Debug)]
#[command(name = "globetrack")]
#[command(about = "Animate a marker along a CSV track", long_about = None)]
struct Args {
    /// Track CSV: a file path or an http(s) URL
    #[arg(short, long)]
    source: Option<String>,

    /// Constant speed in m/s
    #[arg(long, conflicts_with = "speeds")]
    speed: Option<f64>,

    /// Per-segment speeds in m/s, comma separated
    #[arg(long)]
    speeds: Option<String>,

    /// JSON config file (CLI flags override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Distance model (chord, haversine)
    #[arg(short, long)]
    geometry: Option<GeometryKind>,

    /// Run against the wall clock instead of replaying instantly
    #[arg(long)]
    realtime: bool,

    /// Export the replayed timeline to a JSON file
    #[arg(long, conflicts_with = "realtime")]
    export: Option<String>,

    /// Stream the scene and marker to a Rerun viewer
    #[arg(long)]
    visualize: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,
}

fn build_config(args: &Args) -> Result<ViewerConfig> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    if let Some(source) = &args.source {
        config.source = SourceId::parse(source);
    }
    if let Some(speed) = args.speed {
        config.speed = SpeedSpec::Constant(speed);
    }
    if let Some(speeds) = &args.speeds {
        config.speed = speeds
            .parse::<SpeedSpec>()
            .map_err(anyhow::Error::msg)
            .context("--speeds")?;
    }
    if let Some(geometry) = args.geometry {
        config.geometry = geometry;
    }
    Ok(config)
}

/// Replays on the virtual clock; returns the process exit code.
async fn run_replay(args: &Args, config: &ViewerConfig, source: &dyn TextSource) -> Result<i32> {
    let result = match replay(source, config).await {
        Ok(result) => result,
        Err(e) => {
            error!("Error loading track data: {}", e);
            return Ok(1);
        }
    };

    if args.visualize {
        let mut logger = RerunLogger::new("globetrack");
        logger.log_scene(&result.scene);
        for problem in result.problems() {
            logger.log_event("globe/events", &format!("{:?}", problem));
        }
        for update in &result.updates {
            logger.log_position(&result.scene, update);
        }
    }

    let export = result.to_export(&source.describe(), config.geometry);
    if let Some(path) = &args.export {
        export
            .write_to_file(path)
            .with_context(|| format!("writing {}", path))?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "source": export.source,
                "geometry": export.geometry,
                "outcome": export.outcome,
                "frames": export.frames.len(),
                "duration_sec": export.duration_sec,
                "failure_reason": result.failure_reason,
            }))?
        );
    }

    match &result.failure_reason {
        None => {
            info!(
                "✓ {} positions over {:.2}s ({:?})",
                result.updates.len(),
                result.total_time.as_secs_f64(),
                result.phase
            );
            Ok(0)
        }
        Some(reason) => {
            error!("✗ Animation failed: {}", reason);
            Ok(1)
        }
    }
}

/// Runs against the wall clock until completion or Ctrl-C.
async fn run_realtime(args: &Args, config: &ViewerConfig, source: &dyn TextSource) -> Result<i32> {
    let mut logger = if args.visualize {
        RerunLogger::new("globetrack")
    } else {
        RerunLogger::disabled()
    };

    let mut session = match ViewerSession::load(
        TokioContext::shared(),
        Arc::new(config.geometry),
        source,
        config,
        Arc::new(TracingSink),
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            error!("Error loading track data: {}", e);
            logger.log_scene(&SceneDescription::camera_only(config.camera));
            logger.log_event("globe/events", &e.to_string());
            return Ok(1);
        }
    };

    logger.log_scene(&session.scene);

    let mut positions = match session.start() {
        Ok(positions) => positions,
        Err(e) => {
            error!("✗ Animation failed: {}", e);
            return Ok(1);
        }
    };

    loop {
        tokio::select! {
            update = positions.next() => match update {
                Some(update) => {
                    info!(index = update.index, "Marker at {}", update.position);
                    logger.log_position(&session.scene, &update);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted - cancelling animation");
                let state = session.close();
                logger.log_event("globe/events", &format!("Animation cancelled at index {}", state.index));
                info!(index = state.index, "Marker stopped");
                return Ok(130);
            }
        }
    }

    match session.animator().state().phase {
        AnimationPhase::Failed => Ok(1),
        _ => Ok(0),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = build_config(&args)?;
    let source = open_source(&config.source)?;

    if !args.json {
        info!("GlobeTrack v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            source = %config.source,
            geometry = config.geometry.name(),
            speed = ?config.speed,
            "Configuration"
        );
    }

    let code = if args.realtime {
        run_realtime(&args, &config, source.as_ref()).await?
    } else {
        run_replay(&args, &config, source.as_ref()).await?
    };

    // Exit with proper code for CI
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
