//! Error types for value conversion.

use thiserror::Error;

/// Errors raised while converting between field types and stored values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The stored value has a kind the target type cannot accept.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// The kind the target type accepts.
        expected: &'static str,
        /// The kind of the stored value.
        found: &'static str,
    },

    /// A numeric value does not fit in the target type.
    #[error("value {value} is out of range for {target}")]
    OutOfRange {
        /// String form of the offending value.
        value: String,
        /// The target Rust type.
        target: &'static str,
    },

    /// Text could not be parsed into the target type.
    #[error("cannot parse '{text}' as {target}")]
    Parse {
        /// The text that failed to parse.
        text: String,
        /// The target Rust type.
        target: &'static str,
    },

    /// An accessor reported its own failure.
    #[error("{0}")]
    Custom(String),
}
