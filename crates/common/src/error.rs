//! Error types for fanout.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Status not found: {0}")]
    StatusNotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// An identical (account, status, name) reaction already exists.
    #[error("Duplicate reaction: {0}")]
    DuplicateReaction(String),

    /// Neither a known unicode emoji nor an enabled custom emoji.
    #[error("Unrecognized emoji: {0}")]
    UnrecognizedEmoji(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Federation error: {0}")]
    Federation(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::StatusNotFound(_) => "STATUS_NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateReaction(_) => "DUPLICATE_REACTION",
            Self::UnrecognizedEmoji(_) => "UNRECOGNIZED_EMOJI",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Federation(_) => "FEDERATION_ERROR",
            Self::Queue(_) => "QUEUE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller caused this error (validation, authorization, lookup).
    ///
    /// Client errors surface synchronously and are never retried.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::AccountNotFound(_)
                | Self::StatusNotFound(_)
                | Self::Forbidden(_)
                | Self::Validation(_)
                | Self::DuplicateReaction(_)
                | Self::UnrecognizedEmoji(_)
        )
    }

    /// Whether this error means the referenced entity no longer exists.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::AccountNotFound(_) | Self::StatusNotFound(_)
        )
    }

    /// Whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("Serialization error: {err}"))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_errors_are_client_errors() {
        let duplicate = AppError::DuplicateReaction("😀".to_string());
        let unrecognized = AppError::UnrecognizedEmoji("nope".to_string());

        assert!(duplicate.is_client_error());
        assert!(unrecognized.is_client_error());
        assert_eq!(duplicate.error_code(), "DUPLICATE_REACTION");
        assert_eq!(unrecognized.error_code(), "UNRECOGNIZED_EMOJI");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(AppError::StatusNotFound("1".to_string()).is_not_found());
        assert!(AppError::AccountNotFound("1".to_string()).is_not_found());
        assert!(!AppError::Database("down".to_string()).is_not_found());
    }

    #[test]
    fn test_server_errors() {
        assert!(AppError::Redis("timeout".to_string()).is_server_error());
        assert!(!AppError::Forbidden("no".to_string()).is_server_error());
    }
}
