//! Backend error types

use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    /// HTTP status, when the server answered at all
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    /// The server refused the request; `detail` is user-facing
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Rejected, detail).with_status(status)
    }

    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::ServerError, message).with_status(status)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Timeouts, refused connections
    Network,
    /// 4xx with a detail message
    Rejected,
    /// 5xx
    ServerError,
    /// Response body did not match the expected shape
    Decode,
    Unknown,
}

impl BackendErrorKind {
    /// Whether the server itself turned the request down
    pub fn is_rejection(self) -> bool {
        matches!(self, Self::Rejected)
    }
}
