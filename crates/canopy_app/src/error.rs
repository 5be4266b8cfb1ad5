//! Error types for canopy_app

use canopy_core::SceneError;
use thiserror::Error;

/// Errors that can occur while driving a canvas
#[derive(Error, Debug)]
pub enum CanvasError {
    /// A scene operation failed
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// The configuration file could not be parsed
    #[error("invalid configuration file: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration parsed but holds unusable values
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading the configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for canopy_app operations
pub type Result<T> = std::result::Result<T, CanvasError>;
