use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Two families reach the user: something they can fix (validation) and
/// something that went wrong talking to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    /// Transport failures, error statuses and unreadable bodies alike.
    Network,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Network => "NETWORK_ERROR",
        }
    }
}

/// Failure of a single outbound call, already detached from the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server responded with status {status}")]
    Status { status: u16 },

    #[error("invalid response: {0}")]
    Parse(String),

    #[error("{0}")]
    Rejected(String),

    #[error("service configuration is invalid: {0}")]
    Configuration(String),
}

impl ApiError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_)
            | Self::Status { .. }
            | Self::Parse(_)
            | Self::Rejected(_)
            | Self::Configuration(_) => ErrorKind::Network,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// User-visible banner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
        }
    }

    /// Something the user can fix before trying again.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn from_api(message: impl Into<String>, error: &ApiError) -> Self {
        Self::new(error.kind(), message).with_internal(error.to_string())
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        self.message.clone()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.internal_message {
            Some(internal) => write!(f, "[{}] {} ({internal})", self.code(), self.message),
            None => write!(f, "[{}] {}", self.code(), self.message),
        }
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_network() {
        assert_eq!(ApiError::Status { status: 401 }.kind(), ErrorKind::Network);
        assert_eq!(ApiError::Status { status: 502 }.kind(), ErrorKind::Network);
        assert_eq!(ApiError::Status { status: 502 }.status(), Some(502));
    }

    #[test]
    fn test_parse_failure_is_network() {
        let err = ApiError::Parse("expected array".into());
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_rejected_ocr_is_network() {
        let err = ApiError::Rejected("OCR service could not extract text".into());
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(AppError::from_api("Failed", &err).code(), "NETWORK_ERROR");
    }

    #[test]
    fn test_transport_and_configuration_are_network() {
        assert_eq!(ApiError::Network("reset".into()).kind(), ErrorKind::Network);
        assert_eq!(
            ApiError::Configuration("bad url".into()).kind(),
            ErrorKind::Network
        );
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::validation("Case name is required");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Case name is required");
    }

    #[test]
    fn test_app_error_display_includes_internal() {
        let err = AppError::from_api("Could not load cases", &ApiError::Status { status: 500 });
        let shown = err.to_string();
        assert!(shown.starts_with("[NETWORK_ERROR] Could not load cases"));
        assert!(shown.contains("500"));
        assert_eq!(err.user_facing_message(), "Could not load cases");
    }
}
