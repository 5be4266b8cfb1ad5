//! Canvas configuration
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! width = 800.0
//! height = 600.0
//! frame_interval_ms = 50
//! background = [1.0, 1.0, 1.0, 1.0]
//! log_filter = "info"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use canopy_core::{Color, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};

/// Canvas configuration, usually read from `canopy.toml`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CanvasConfig {
    /// Viewport width in pixels
    #[serde(default = "default_width")]
    pub width: f32,
    /// Viewport height in pixels
    #[serde(default = "default_height")]
    pub height: f32,
    /// Activity timer period
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// RGBA, each channel in `[0, 1]`
    #[serde(default = "default_background")]
    pub background: [f32; 4],
    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_width() -> f32 {
    800.0
}

fn default_height() -> f32 {
    600.0
}

fn default_frame_interval_ms() -> u64 {
    50
}

fn default_background() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            frame_interval_ms: default_frame_interval_ms(),
            background: default_background(),
            log_filter: default_log_filter(),
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a file if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CanvasError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.frame_interval_ms == 0 {
            return Err(CanvasError::InvalidConfig(
                "frame_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn background_color(&self) -> Color {
        Color::from(self.background)
    }

    /// The camera's bounds: `(0, 0, width, height)`
    pub fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}
