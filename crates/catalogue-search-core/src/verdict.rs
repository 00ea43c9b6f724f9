//! Validation outcome and the client-facing error envelope
//!
//! A [`Verdict`] is either success or a [`Failure`] carrying one of the
//! [`ErrorKind`]s the HTTP layer knows how to surface. Failures serialize to
//! the `{"type","title","description","status"}` body returned with a 400.

use serde::{Deserialize, Serialize};

/// Value of the `status` field on a failed request
pub const STATUS_FAILED: &str = "failed";
/// Value of the `status` field on a request that passed validation
pub const STATUS_SUCCESS: &str = "success";

/// Machine-readable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A present value breaks a structural, numeric, format, or size rule
    InvalidPropertyValue,
    /// A companion parameter required by a facet is missing
    InvalidSyntax,
    /// The response-filter list is too long
    BadFilter,
}

impl ErrorKind {
    /// URN used as the `type` of the error envelope
    #[must_use]
    pub const fn urn(self) -> &'static str {
        match self {
            Self::InvalidPropertyValue => "urn:dx:cat:InvalidPropertyValue",
            Self::InvalidSyntax => "urn:dx:cat:InvalidSyntax",
            Self::BadFilter => "urn:dx:cat:BadFilter",
        }
    }

    /// Short human title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::InvalidPropertyValue => "Invalid Property Value",
            Self::InvalidSyntax => "Invalid Syntax",
            Self::BadFilter => "Bad Filter",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.urn())
    }
}

/// A single rejected check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub title: String,
    pub description: String,
}

impl Failure {
    /// Build a failure whose title is the kind's default title.
    #[must_use]
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            description: description.into(),
        }
    }

    /// Shorthand for the most common kind.
    #[must_use]
    pub fn invalid_value(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPropertyValue, description)
    }

    /// The body the HTTP layer returns with a 400.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error_type: self.kind.urn().to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: STATUS_FAILED.to_string(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

impl std::error::Error for Failure {}

/// Client-facing error envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title: String,
    pub description: String,
    pub status: String,
}

/// Validation outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(Failure),
}

impl Verdict {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failure, if any
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success => None,
            Self::Failure(f) => Some(f),
        }
    }

    /// Error kind of a failed verdict
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.failure().map(|f| f.kind)
    }

    /// Render as the JSON status body.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Success => serde_json::json!({ "status": STATUS_SUCCESS }),
            Self::Failure(f) => {
                serde_json::to_value(f.to_response()).unwrap_or(serde_json::Value::Null)
            }
        }
    }

    /// Convert into a `Result`, for callers that want `?`.
    pub fn into_result(self) -> Result<(), Failure> {
        match self {
            Self::Success => Ok(()),
            Self::Failure(f) => Err(f),
        }
    }
}

impl From<Result<(), Failure>> for Verdict {
    fn from(result: Result<(), Failure>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(f) => Self::Failure(f),
        }
    }
}
