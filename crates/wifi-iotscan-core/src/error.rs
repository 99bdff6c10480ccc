//! Error types for the wifi-iotscan core crate.
//!
//! The inference engine itself is infallible by design: malformed input
//! degrades to empty per-device results rather than aborting a session.
//! Errors therefore only surface from fallible constructors such as
//! [`MacAddr::parse`] and [`Confidence::new`].
//!
//! [`MacAddr::parse`]: crate::types::MacAddr::parse
//! [`Confidence::new`]: crate::types::Confidence::new

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced while building domain values from raw input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreError {
    /// A hardware address was not exactly 6 bytes long.
    #[error("invalid hardware address: expected 6 bytes, got {len}")]
    InvalidAddress {
        /// The number of bytes that were provided.
        len: usize,
    },

    /// A hardware address string failed normalization.
    #[error("failed to parse hardware address from '{input}'")]
    AddressParseFailed {
        /// The input string that could not be parsed.
        input: String,
    },

    /// Validation error for input data.
    #[error("validation error: {message}")]
    Validation {
        /// Description of what validation failed.
        message: String,
    },
}

impl CoreError {
    /// Creates a new address-parse error.
    #[must_use]
    pub fn address_parse(input: impl Into<String>) -> Self {
        Self::AddressParseFailed {
            input: input.into(),
        }
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
