//! Error handling for CartonKit
//!
//! Errors raised while interpreting reference data: flute codes,
//! thicknesses and glue sides. Reading persisted tables never fails, so
//! I/O errors live with the settings crate.

use thiserror::Error;

/// Reference data error type
///
/// Raised when a flute or allowance table cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Flute code is empty after trimming
    #[error("Flute code must not be empty")]
    EmptyFluteCode,

    /// Flute thickness is not a finite, positive number
    #[error("Invalid thickness for flute {flute}: {thickness}")]
    InvalidThickness {
        /// The flute code.
        flute: String,
        /// The rejected thickness.
        thickness: f64,
    },

    /// Glue side could not be parsed
    #[error("Unknown glue side: {value}")]
    UnknownGlueSide {
        /// The rejected input.
        value: String,
    },
}

/// Result type using DataError
pub type DataResult<T> = std::result::Result<T, DataError>;
