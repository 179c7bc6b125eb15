//! Error types for the die-line crate.
//!
//! The geometry engine clamps and sanitises rather than failing, so the
//! only hard error is an unsupported style. Parameter errors are reported
//! by explicit validation for callers that want to warn about inputs the
//! engine would otherwise silently repair.

use thiserror::Error;

/// Errors that can occur while designing a die-line.
#[derive(Error, Debug)]
pub enum DielineError {
    /// The requested FEFCO style has no layout implementation.
    #[error("Unsupported carton style: {0}")]
    UnsupportedStyle(String),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),
}

/// Errors related to design parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Dimensions are invalid (zero, negative or not a number).
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Result type alias for die-line operations.
pub type DielineResult<T> = Result<T, DielineError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
