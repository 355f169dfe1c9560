//! Domain error taxonomy shared by every callable operation.

use thiserror::Error;

use crate::store::StoreError;

/// Machine-readable error kind reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    PermissionDenied,
    InvalidArgument,
    NotFound,
    FailedPrecondition,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::NotFound => "not-found",
            ErrorKind::FailedPrecondition => "failed-precondition",
            ErrorKind::Internal => "internal",
        }
    }

    /// Whether retrying the same request can succeed without changing it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Internal)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("You must be logged in.")]
    Unauthenticated,

    #[error("{0}")]
    PermissionDenied(String),

    #[error("Invalid '{field}': {message}")]
    InvalidArgument { field: String, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    FailedPrecondition(String),

    #[error("{0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a required field that is absent or blank.
    pub fn missing(field: &str) -> Self {
        Self::invalid_argument(field, format!("Missing '{}'.", field))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Unauthenticated => ErrorKind::Unauthenticated,
            DomainError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            DomainError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The offending request field, for `InvalidArgument` errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            DomainError::InvalidArgument { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::Internal(format!("Store error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        assert_eq!(DomainError::Unauthenticated.kind().as_str(), "unauthenticated");
        assert_eq!(
            DomainError::PermissionDenied("Admins only.".into()).kind().as_str(),
            "permission-denied"
        );
        assert_eq!(DomainError::missing("name").kind().as_str(), "invalid-argument");
        assert_eq!(DomainError::NotFound("x".into()).kind().as_str(), "not-found");
        assert_eq!(
            DomainError::FailedPrecondition("x".into()).kind().as_str(),
            "failed-precondition"
        );
        assert_eq!(DomainError::Internal("x".into()).kind().as_str(), "internal");
    }

    #[test]
    fn test_missing_field_message() {
        let err = DomainError::missing("city");
        assert_eq!(err.field(), Some("city"));
        assert_eq!(err.to_string(), "Invalid 'city': Missing 'city'.");
    }

    #[test]
    fn test_only_internal_is_retryable() {
        assert!(ErrorKind::Internal.is_retryable());
        assert!(!ErrorKind::PermissionDenied.is_retryable());
        assert!(!ErrorKind::InvalidArgument.is_retryable());
    }

    #[test]
    fn test_store_error_becomes_internal() {
        let err: DomainError = StoreError::Backend("connection reset".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("connection reset"));
    }
}
