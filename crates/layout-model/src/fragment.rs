//! Time windows selected from a source recording.

use serde::{Deserialize, Serialize};

use crate::config::LayoutError;

/// How the start of a single fragment is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StartStrategy {
    /// Use the requested start offset as-is (clamped to the source).
    Fixed,
    /// Center the fragment in the source.
    Centered,
    /// Uniformly random start that keeps the fragment inside the source.
    #[default]
    UniformRandom,
}

/// Request for one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentSpec {
    /// Requested start offset in seconds (used by [`StartStrategy::Fixed`]).
    pub start_offset_secs: f64,

    /// Requested fragment length in seconds.
    pub duration_secs: f64,

    pub strategy: StartStrategy,
}

impl FragmentSpec {
    pub fn new(
        start_offset_secs: f64,
        duration_secs: f64,
        strategy: StartStrategy,
    ) -> Result<Self, LayoutError> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(LayoutError::invalid(format!(
                "fragment duration must be a positive number of seconds, got {duration_secs}"
            )));
        }
        if !start_offset_secs.is_finite() {
            return Err(LayoutError::invalid(format!(
                "fragment start offset must be finite, got {start_offset_secs}"
            )));
        }
        Ok(Self {
            start_offset_secs,
            duration_secs,
            strategy,
        })
    }

    pub fn centered(duration_secs: f64) -> Result<Self, LayoutError> {
        Self::new(0.0, duration_secs, StartStrategy::Centered)
    }

    pub fn random(duration_secs: f64) -> Result<Self, LayoutError> {
        Self::new(0.0, duration_secs, StartStrategy::UniformRandom)
    }
}

/// A resolved time window within the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub start_secs: f64,
    pub duration_secs: f64,
}

impl Fragment {
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }
}

/// Request for a batch of independently sampled clips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipBatchRequest {
    pub count: usize,
    pub duration_secs: f64,
}

impl ClipBatchRequest {
    pub fn new(count: usize, duration_secs: f64) -> Result<Self, LayoutError> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(LayoutError::invalid(format!(
                "clip duration must be a positive number of seconds, got {duration_secs}"
            )));
        }
        Ok(Self {
            count,
            duration_secs,
        })
    }
}
