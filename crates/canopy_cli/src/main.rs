//! Canopy CLI
//!
//! Drive the canopy scenegraph headlessly: build a sample scene, run frames
//! against a recording painter, and report what happened.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use canopy_app::{init_logging, Canvas, CanvasConfig};
use canopy_core::{
    ActivityScheduler, Clock, ManualClock, RecordingPainter, Size, Transform2D,
};

mod demo;

use demo::ScriptStep;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Canopy scenegraph demo driver", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Canvas configuration file
    #[arg(short, long, global = true, default_value = "canopy.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sample scene for a number of frames
    Demo {
        /// Frames to run
        #[arg(short, long, default_value = "40")]
        frames: u32,

        /// Zoom factor the camera animates to halfway through
        #[arg(short, long, default_value = "1.5")]
        zoom: f32,
    },

    /// List the nodes of the sample scene under a screen point
    Pick {
        x: f32,
        y: f32,
    },

    /// Show the effective configuration
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CanvasConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    // Initialize logging
    let filter = if cli.verbose {
        "debug"
    } else {
        config.log_filter.as_str()
    };
    init_logging(filter);

    match cli.command {
        Commands::Demo { frames, zoom } => cmd_demo(config, frames, zoom),
        Commands::Pick { x, y } => cmd_pick(config, x, y),
        Commands::Info => cmd_info(&cli.config, &config),
    }
}

fn cmd_demo(config: CanvasConfig, frames: u32, zoom: f32) -> Result<()> {
    let clock = ManualClock::new();
    let interval = config.frame_interval();
    let viewport = Size::new(config.width, config.height);
    let mut canvas = Canvas::with_scheduler(
        config,
        ActivityScheduler::new().with_clock(clock.clone()),
    )?;
    let demo = demo::build(&mut canvas)?;
    let script = demo::pointer_script(&canvas, &demo)?;
    let mut painter = RecordingPainter::new(viewport);

    info!(
        "running {} frames at {:?} per frame ({} cards)",
        frames,
        interval,
        demo.cards.len()
    );

    let mut events = 0;
    let mut fills = 0;
    let mut texts = 0;
    let mut images = 0;
    for frame in 0..frames {
        if frame == frames / 4 {
            let loaded = demo.load_icon(&mut canvas)?;
            debug!("frame {}: icon loaded = {}", frame, loaded);
        }

        for (_, step) in script.iter().filter(|(at, _)| *at == frame) {
            let emitted = match *step {
                ScriptStep::Pointer(input, point) => {
                    canvas.handle_pointer(input, point.x, point.y)?
                }
                ScriptStep::Exit => canvas.pointer_exit()?,
            };
            debug!("frame {}: {:?} -> {} events", frame, step, emitted.len());
            events += emitted.len();
        }

        if frame == frames / 2 {
            canvas.animate_view_to(
                Transform2D::scaling(zoom, zoom),
                Duration::from_millis(500),
            )?;
        }

        let report = canvas.run_frame(clock.now(), &mut painter)?;
        if report.painted {
            fills += painter.filled_rects().len();
            texts += painter.texts().len();
            images += painter.images().len();
            painter.clear();
        }
        clock.advance(interval);
    }

    let scene = canvas.scene();
    let view = scene.view_transform(canvas.camera())?;
    info!("demo finished");
    println!("Canopy demo");
    println!("===========");
    println!("Frames run:       {}", frames);
    println!("Frames painted:   {}", canvas.frames_painted());
    println!("Rects filled:     {}", fills);
    println!("Texts drawn:      {}", texts);
    println!("Images drawn:     {}", images);
    println!("Pointer events:   {}", events);
    println!("Hovers / clicks:  {} / {}", demo.hovers.get(), demo.clicks.get());
    println!("Pending activity: {}", scene.scheduler().len());
    println!("View transform:   {:?}", view.elements);

    Ok(())
}

fn cmd_pick(config: CanvasConfig, x: f32, y: f32) -> Result<()> {
    let mut canvas = Canvas::new(config)?;
    let demo = demo::build(&mut canvas)?;

    let picked = canvas.picked_nodes(x, y)?;
    println!("Picked at ({}, {}):", x, y);
    for node in picked {
        let name = if node == canvas.layer() {
            "layer".to_string()
        } else if node == demo.label {
            "label".to_string()
        } else if node == demo.icon {
            "icon".to_string()
        } else if let Some(index) = demo.cards.iter().position(|card| *card == node) {
            format!("card {}", index)
        } else {
            format!("{:?}", node)
        };
        let bounds = canvas.scene().global_full_bounds(node)?;
        println!(
            "  - {} at ({}, {}) {}x{}",
            name,
            bounds.x(),
            bounds.y(),
            bounds.width(),
            bounds.height()
        );
    }

    Ok(())
}

fn cmd_info(path: &std::path::Path, config: &CanvasConfig) -> Result<()> {
    println!("Canopy");
    println!("======");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "Config:  {} ({})",
        path.display(),
        if path.exists() { "loaded" } else { "defaults" }
    );
    println!();
    println!("Viewport:       {}x{}", config.width, config.height);
    println!("Frame interval: {:?}", config.frame_interval());
    println!("Background:     {:?}", config.background);
    println!("Log filter:     {}", config.log_filter);

    Ok(())
}
