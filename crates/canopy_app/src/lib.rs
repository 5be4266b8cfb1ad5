//! Canopy App
//!
//! Drives a [`canopy_core::Scene`] the way a host window would:
//!
//! - **Canvas**: root, default layer, and camera wiring plus a paint-when-stale frame loop
//! - **Input**: pointer picking with enter/leave synthesis and bubbling dispatch
//! - **Config**: TOML canvas settings with defaults for every key
//! - **Logging**: `tracing` subscriber setup
//!
//! # Example
//!
//! ```rust
//! use std::time::Instant;
//! use canopy_app::{Canvas, CanvasConfig};
//! use canopy_core::{Color, NodeOptions, Rect, RecordingPainter};
//!
//! let mut canvas = Canvas::new(CanvasConfig::default()).unwrap();
//! let layer = canvas.layer();
//! let card = canvas.scene_mut().create_node(
//!     NodeOptions::new()
//!         .with_fill(Color::BLUE)
//!         .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)),
//! );
//! canvas.scene_mut().add_child(layer, card).unwrap();
//!
//! let mut painter = RecordingPainter::default();
//! let report = canvas.run_frame(Instant::now(), &mut painter).unwrap();
//! assert!(report.painted);
//! ```

pub mod canvas;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;

pub use canvas::{Canvas, FrameReport};
pub use config::CanvasConfig;
pub use error::{CanvasError, Result};
pub use input::{InputRouter, PointerInput};
pub use logging::init_logging;
