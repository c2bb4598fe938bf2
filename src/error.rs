//! Error types for TNE2 numerics.

use thiserror::Error;

/// Errors surfaced by configuration, evaluator construction and the few
/// fallible evaluations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Tne2Error {
    /// A physically meaningful configuration that has no implementation.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// Array or matrix size does not match the variable layout.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Invalid configuration table or flag.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A thermodynamic state could not be assembled.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl Tne2Error {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unsupported configuration error.
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration(what.into())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Tne2Error>;

/// Check that a slice has the expected length.
pub(crate) fn check_len(name: &str, slice: &[f64], expected: usize) -> Result<()> {
    if slice.len() < expected {
        return Err(Tne2Error::dimension_mismatch(
            format!("{name} of length {expected}"),
            format!("length {}", slice.len()),
        ));
    }
    Ok(())
}
