//! Scene error types

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised by scene, geometry, and scheduler operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Malformed argument, wrong node kind, or an illegal tree edit
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Attempted inversion of a transform with a zero or non-finite determinant
    #[error("Degenerate transform (determinant {determinant})")]
    DegenerateTransform { determinant: f32 },

    /// The node id is not (or no longer) in the scene arena
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    /// An activity hook reported a failure
    #[error("Activity failed: {0}")]
    Activity(String),
}

impl SceneError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SceneError::InvalidArgument(msg.into())
    }
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
