//! Error types for Signals Notebook API operations.

use thiserror::Error;

use crate::resolver::ResolverError;
use crate::types::IdError;

/// Errors that can occur during Signals Notebook API operations.
#[derive(Debug, Error)]
pub enum SignalsError {
    /// Configuration is missing or incomplete.
    #[error("Signals Notebook configuration required: {0}")]
    ConfigMissing(String),

    /// Malformed entity, material or attribute identifier.
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// Response envelope or record body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A record decoded fine but is not the kind the operation needs.
    #[error("Expected {expected}, got '{found}'")]
    UnexpectedType {
        expected: &'static str,
        found: String,
    },

    /// API request failed with a non-success status.
    #[error("Signals Notebook API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A value was rejected by a domain rule (e.g. not one of the allowed options).
    #[error("Invalid value: {0}")]
    Validation(String),

    /// A discriminator table is inconsistent.
    #[error(transparent)]
    Registry(#[from] ResolverError),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignalsError {
    /// HTTP status code of a failed API call, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => *status_code,
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for Signals Notebook operations.
pub type Result<T> = core::result::Result<T, SignalsError>;
