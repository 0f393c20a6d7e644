//! Conversion errors for fixed-point numbers

use thiserror::Error;

/// Errors surfaced when converting a [`crate::Number`] to a fixed-width
/// integer or parsing one from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumberError {
    /// The rescaled magnitude does not fit in the target integer range.
    #[error("value does not fit in the target integer range")]
    Overflow,

    /// Attempted to convert a negative value to an unsigned integer.
    #[error("cannot convert a negative value to an unsigned integer")]
    Negative,

    /// A decimal literal could not be parsed.
    #[error("malformed decimal literal")]
    Malformed,
}
