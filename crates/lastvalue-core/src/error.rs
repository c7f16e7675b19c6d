//! Shared error type across lastvalue crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Sample is missing one of the identity tags.
    InvalidSample,
    /// Principal is not permitted to perform the operation.
    Unauthorized,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::InvalidSample => "INVALID_SAMPLE",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LastValueError>;

/// Unified error type used by core and gateway.
///
/// A missing identity or attribute is not an error; lookups return `Option`.
#[derive(Debug, Error)]
pub enum LastValueError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid sample: missing tag `{missing}`")]
    InvalidSample { missing: &'static str },
    #[error("principal `{principal}` may not {op}")]
    Unauthorized { principal: String, op: &'static str },
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl LastValueError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            LastValueError::BadRequest(_) => ClientCode::BadRequest,
            LastValueError::InvalidSample { .. } => ClientCode::InvalidSample,
            LastValueError::Unauthorized { .. } => ClientCode::Unauthorized,
            LastValueError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            LastValueError::Internal(_) => ClientCode::Internal,
        }
    }
}
