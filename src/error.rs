//! Error types for the tracking core.

use thiserror::Error;

/// Result type alias for the tracking library.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors raised at construction time or at the detection ingestion boundary.
///
/// The per-frame pipeline itself is infallible: once a tracker is built, every
/// detection set (including an empty one) completes a cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid detection: {0}")]
    InvalidDetection(String),
}

impl TrackerError {
    pub fn config<S: Into<String>>(field: &'static str, reason: S) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn detection<S: Into<String>>(msg: S) -> Self {
        Self::InvalidDetection(msg.into())
    }
}

/// Reject a value that is negative or not finite.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(TrackerError::config(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(TrackerError::config(field, format!("must be non-negative, got {value}")));
    }
    Ok(())
}

/// Reject a value that is not strictly positive and finite.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TrackerError::config(field, format!("must be positive, got {value}")));
    }
    Ok(())
}

/// Reject a value that is not finite.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(TrackerError::config(field, format!("must be finite, got {value}")));
    }
    Ok(())
}
