//! Failure taxonomy reported by the dispatcher.
//!
//! Every failure ends up as one of three kinds. The host maps the kind to a
//! transport status and shows the message and correlation id.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unexpected failures, including handler errors.
    Internal,
    /// The caller sent something malformed or unknown.
    BadRequest,
    /// The request could not be authenticated.
    Signature,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Internal => "internal_error",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Signature => "signature_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub correlation_id: Option<String>,
}

impl AppError {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        correlation_id: Option<&str>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            correlation_id: correlation_id.map(str::to_string),
        }
    }

    pub fn internal(message: impl Into<String>, correlation_id: Option<&str>) -> Self {
        Self::new(ErrorKind::Internal, message, correlation_id)
    }

    pub fn bad_request(message: impl Into<String>, correlation_id: Option<&str>) -> Self {
        Self::new(ErrorKind::BadRequest, message, correlation_id)
    }

    pub fn signature(message: impl Into<String>, correlation_id: Option<&str>) -> Self {
        Self::new(ErrorKind::Signature, message, correlation_id)
    }
}
