//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised when transport values are parsed back strictly.
///
/// Serialization itself never fails; these only come out of the
/// validating constructors and the `parse_*` functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The string is not an RFC 3339 / ISO-8601 timestamp.
    #[error("invalid timestamp {input:?}: {message}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Parser message.
        message: String,
    },

    /// Latitude outside [-90, 90].
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180].
    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// A document path that is not `<collection>/<id>`.
    #[error("invalid document path: {0:?}")]
    InvalidReference(String),

    /// The transport value has the wrong shape.
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        /// What the parser wanted.
        expected: &'static str,
        /// What it got.
        found: String,
    },
}

impl CodecError {
    /// Create an unexpected type error.
    pub fn unexpected(expected: &'static str, found: impl Into<String>) -> Self {
        Self::UnexpectedType {
            expected,
            found: found.into(),
        }
    }
}
