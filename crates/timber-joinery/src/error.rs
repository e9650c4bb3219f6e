//! Error types for joinery operations.

use thiserror::Error;

/// Errors that can occur while placing joint holes or building fabricable beams.
#[derive(Error, Debug)]
pub enum JoineryError {
    /// The joint argument list has the wrong length for its joint type.
    #[error("You should've given {expected} values, but you only gave {actual}")]
    ParameterCountMismatch {
        /// Number of arguments the joint type takes.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// The joint type needs a different number of beams.
    #[error("expected {expected} beams, got {actual}")]
    BeamCountMismatch {
        /// Number of beams the joint type works on.
        expected: usize,
        /// Number of beams supplied.
        actual: usize,
    },

    /// Joint type code outside 0–8.
    #[error("unknown joint type code: {0}")]
    UnknownJointType(u8),

    /// A line runs parallel to the plane it was intersected with.
    #[error("No intersection found: {0}")]
    NoIntersection(String),

    /// A hole axis is parallel to the beam face normal, so the bore
    /// extension is unbounded.
    #[error("degenerate hole angle {angle} rad: hole axis is parallel to the beam normal")]
    DegenerateAngle {
        /// Angle between the beam normal and the hole axis, in radians.
        angle: f64,
    },

    /// Beam dimensions must be positive and finite.
    #[error("invalid beam dimensions: {0}")]
    InvalidDimensions(String),

    /// A frame has zero, parallel or non-finite axes.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or incomplete JSON beam records.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed configuration file.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl JoineryError {
    /// Create a no-intersection error.
    pub fn no_intersection(context: impl Into<String>) -> Self {
        Self::NoIntersection(context.into())
    }
}

/// Result type for joinery operations.
pub type Result<T> = std::result::Result<T, JoineryError>;
