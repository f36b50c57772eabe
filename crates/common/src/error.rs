//! Error types shared across vertcut crates.

use std::path::PathBuf;

/// Top-level error type for vertcut operations.
#[derive(Debug, thiserror::Error)]
pub enum VertcutError {
    /// Malformed region/layout or application configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A crop rectangle does not fit inside the source frame.
    #[error(
        "Region '{role}' ({x},{y} {width}x{height}) exceeds source frame {source_width}x{source_height}"
    )]
    OutOfBounds {
        role: String,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        source_width: u32,
        source_height: u32,
    },

    #[error("Media inspection failed for {path}: {message}")]
    MediaInspection { path: PathBuf, message: String },

    /// Non-zero exit (or spawn failure) of an external tool.
    #[error("{description} failed ({status}): {stderr}")]
    ExternalProcess {
        description: String,
        status: String,
        stderr: String,
    },

    #[error("Source is {source_secs:.2}s long, shorter than the requested {requested_secs:.2}s clip")]
    InsufficientDuration {
        source_secs: f64,
        requested_secs: f64,
    },

    #[error("Composition error: {message}")]
    Composition { message: String },

    #[error("No input video found: {message}")]
    NoInput { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using VertcutError.
pub type VertcutResult<T> = Result<T, VertcutError>;

impl VertcutError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn media_inspection(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::MediaInspection {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition {
            message: msg.into(),
        }
    }

    pub fn no_input(msg: impl Into<String>) -> Self {
        Self::NoInput {
            message: msg.into(),
        }
    }
}
