//! Custom error types for the Bitbucket client with a status-based taxonomy.

use thiserror::Error;

/// Main error type for Bitbucket client operations.
///
/// Callers are expected to branch on the variant, not on message text. Every
/// operation either returns a typed result or exactly one of these; the two
/// documented absence cases (`get_default_branch` on an empty repository,
/// `get_branch` with no exact match) are represented as `Ok(None)` and never
/// reach this type.
#[derive(Error, Debug)]
pub enum BitbucketError {
    // Input validation errors, raised before any request is sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // HTTP 404 where the resource was required to exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Any other non-2xx response
    #[error("Request failed with status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    // Transport/IO/decode failures that carry no HTTP status
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Result type alias using BitbucketError
pub type Result<T> = std::result::Result<T, BitbucketError>;

impl BitbucketError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unexpected (status-less) error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Map an HTTP status to the taxonomy: 404 becomes `NotFound`, every
    /// other non-2xx becomes `HttpStatus`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 404 {
            Self::NotFound(message)
        } else {
            Self::HttpStatus { status, message }
        }
    }

    /// Numeric status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Implement From for reqwest errors: responses that carried a status map
// through from_status, everything else (connect, timeout, body, decode)
// surfaces as Unexpected. reqwest error messages never include request
// headers, so the derived auth header cannot leak through here.
impl From<reqwest::Error> for BitbucketError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else {
            Self::Unexpected(err.to_string())
        }
    }
}

// Implement From for reqwest header errors. InvalidHeaderValue's display
// does not echo the offending value, so the credential stays masked.
impl From<reqwest::header::InvalidHeaderValue> for BitbucketError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::Unexpected(format!("invalid header value: {}", err))
    }
}

impl From<url::ParseError> for BitbucketError {
    fn from(err: url::ParseError) -> Self {
        Self::Unexpected(format!("URL parse error: {}", err))
    }
}

impl From<serde_json::Error> for BitbucketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(format!("JSON parse error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = BitbucketError::invalid_input("missing field");
        assert_eq!(err.to_string(), "Invalid input: missing field");

        let err = BitbucketError::from_status(500, "boom");
        assert_eq!(err.to_string(), "Request failed with status 500: boom");
    }

    #[test]
    fn test_from_status_taxonomy() {
        let err = BitbucketError::from_status(404, "no such repo");
        assert!(matches!(err, BitbucketError::NotFound(_)));
        assert_eq!(err.status(), Some(404));

        let err = BitbucketError::from_status(409, "stale source commit");
        assert!(matches!(
            err,
            BitbucketError::HttpStatus { status: 409, .. }
        ));
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_statusless_errors_carry_no_status() {
        let err = BitbucketError::unexpected("connection refused");
        assert!(err.status().is_none());
    }
}
