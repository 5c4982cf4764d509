//! Error types for the rigpose engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    /// No node in the decoded scene matches any known bone name.
    #[error("Malformed hierarchy: {0}")]
    MalformedHierarchy(String),

    /// Zero-duration animation, or a channel too short to interpolate.
    #[error("Degenerate animation: {0}")]
    DegenerateAnimation(String),

    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
