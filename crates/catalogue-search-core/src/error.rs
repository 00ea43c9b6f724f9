//! Error types for query mapping and index responses

use thiserror::Error;

use crate::verdict::{ErrorKind, Failure};

/// Result type alias for parameter mapping
pub type MappingResult<T> = std::result::Result<T, MappingError>;

/// A raw query parameter could not be turned into a structured value.
///
/// Mapping is all-or-nothing: the first of these aborts the whole request.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The value was empty after trimming and unquoting
    #[error("empty value for parameter '{key}'")]
    EmptyValue { key: String },

    /// An integer-coerced parameter did not hold a finite number
    #[error("parameter '{key}' must be numeric, got '{value}'")]
    NotANumber { key: String, value: String },

    /// The free-text `q` value contains characters outside the text grammar
    #[error("invalid text search string for parameter '{key}'")]
    InvalidText { key: String },

    /// Bracketed value is not a well-formed array (after token quoting)
    #[error("malformed array for parameter '{key}': {source}")]
    MalformedArray {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The array decoded, but holds `null` or an object
    #[error("unsupported array element in parameter '{key}'")]
    UnsupportedElement { key: String },
}

impl MappingError {
    /// The parameter that caused the failure
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::EmptyValue { key }
            | Self::NotANumber { key, .. }
            | Self::InvalidText { key }
            | Self::MalformedArray { key, .. }
            | Self::UnsupportedElement { key } => key,
        }
    }

    /// Returns the error type string (for JSON responses and logs)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::EmptyValue { .. } => "EMPTY_VALUE",
            Self::NotANumber { .. } => "NOT_A_NUMBER",
            Self::InvalidText { .. } => "INVALID_TEXT",
            Self::MalformedArray { .. } => "MALFORMED_ARRAY",
            Self::UnsupportedElement { .. } => "UNSUPPORTED_ELEMENT",
        }
    }

    /// Client-facing failure for a request whose parameters did not map.
    #[must_use]
    pub fn to_failure(&self) -> Failure {
        Failure::new(ErrorKind::InvalidPropertyValue, self.to_string())
    }
}

/// Result type alias for index response decoding
pub type ResponseResult<T> = std::result::Result<T, ResponseError>;

/// A search-index response body did not have the expected shape
#[derive(Debug, Error)]
pub enum ResponseError {
    /// A required section of the body is absent or has the wrong type
    #[error("missing or invalid '{0}' in index response")]
    MissingField(&'static str),

    /// The body is not JSON at all
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
