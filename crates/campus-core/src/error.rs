//! Unified application error types for Campus.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Authorization failures are modeled
//! as first-class kinds so that the HTTP layer can map them to status
//! codes without string matching.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed token, bad signature, or unexpected signing algorithm.
    TokenInvalid,
    /// Token past its expiry timestamp.
    TokenExpired,
    /// Token does not map to a live session in the registry.
    SessionNotFound,
    /// Authenticated user has no role assignments at all.
    UserHasNoRole,
    /// Claimed (role, school) pair is not in the resolved available set.
    NoAvailableRole,
    /// Username/password verification failed.
    InvalidCredentials,
    /// The session persistence store is unreachable.
    StoreUnavailable,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification).
    Conflict,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenInvalid => write!(f, "TOKEN_INVALID"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::SessionNotFound => write!(f, "SESSION_NOT_FOUND"),
            Self::UserHasNoRole => write!(f, "USER_HAS_NO_ROLE"),
            Self::NoAvailableRole => write!(f, "NO_AVAILABLE_ROLE"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Campus.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a token-invalid error.
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    /// Create a token-expired error.
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Create a session-not-found error.
    pub fn session_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionNotFound, message)
    }

    /// Create a user-has-no-role error.
    pub fn user_has_no_role(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserHasNoRole, message)
    }

    /// Create a no-available-role error carrying the attempted pair.
    pub fn no_available_role(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoAvailableRole, message)
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreUnavailable, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error should be surfaced to the client verbatim.
    ///
    /// Internal/database/store failures get a generic client message; the
    /// full detail goes to the server log only.
    pub fn is_client_safe(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::Database | ErrorKind::Internal | ErrorKind::StoreUnavailable
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_codes() {
        assert_eq!(ErrorKind::TokenExpired.to_string(), "TOKEN_EXPIRED");
        assert_eq!(ErrorKind::NoAvailableRole.to_string(), "NO_AVAILABLE_ROLE");
        assert_eq!(
            ErrorKind::StoreUnavailable.to_string(),
            "STORE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_client_safety() {
        assert!(AppError::token_expired("expired").is_client_safe());
        assert!(AppError::no_available_role("denied").is_client_safe());
        assert!(!AppError::database("connection refused").is_client_safe());
        assert!(!AppError::store_unavailable("down").is_client_safe());
    }
}
