//! Gesture error types

use thiserror::Error;

/// Errors raised while validating recognizer configuration.
///
/// Runtime input never produces errors: invalid or out-of-order events are
/// ignored by the recognizers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GestureError {
    /// A configuration value is out of range
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
}

impl GestureError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for gesture configuration
pub type Result<T> = std::result::Result<T, GestureError>;

/// Fail with [`GestureError::InvalidConfig`] unless `value` is strictly positive
pub fn ensure_positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GestureError::invalid(field, format!("must be > 0, got {value}")))
    }
}

/// Fail unless `value` is a finite number within `[min, max]`
pub fn ensure_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(GestureError::invalid(
            field,
            format!("must be within [{min}, {max}], got {value}"),
        ))
    }
}
