use std::fmt;

use thiserror::Error;

use crate::version::ServerVersion;

/// Result alias for account operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by account lookups.
#[derive(Debug, Error)]
pub enum Error {
    #[error("server version {actual} is below the required {required}")]
    UnsupportedVersion {
        required: ServerVersion,
        actual: ServerVersion,
    },
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidUrl(value.to_string())
    }
}

/// Non-fatal conditions reported alongside a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The legacy search matched more than one account; only the first is returned.
    MultipleMatches { count: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MultipleMatches { count } => write!(
                f,
                "{count} accounts found; only the first result is returned"
            ),
        }
    }
}
