//! Bot error taxonomy
//!
//! Handlers return [`BotError`]. The router turns most variants into a chat
//! reply; only transport faults and deliberate faults reach the fault reporter.

use bucketbot_core::{ErrorMetadata, LogLevel};
use bucketbot_infra::CdnError;
use bucketbot_storage::StorageError;
use thiserror::Error;

use crate::telegram::TelegramError;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Access denied for {0}")]
    AccessDenied(String),

    #[error("Invalid command arguments: {0}")]
    Validation(String),

    #[error("File is too big: {size} bytes exceeds the {limit} byte limit")]
    AttachmentTooLarge { size: u64, limit: u64 },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Cdn(#[from] CdnError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    #[error("{0}")]
    Internal(String),
}

impl BotError {
    /// Whether the error escapes the handler and goes to the fault reporter.
    pub fn is_fault(&self) -> bool {
        matches!(self, BotError::Telegram(_) | BotError::Internal(_))
    }
}

impl ErrorMetadata for BotError {
    fn error_code(&self) -> &'static str {
        match self {
            BotError::AccessDenied(_) => "ACCESS_DENIED",
            BotError::Validation(_) => "VALIDATION_ERROR",
            BotError::AttachmentTooLarge { .. } => "ATTACHMENT_TOO_LARGE",
            BotError::Storage(e) => e.error_code(),
            BotError::Cdn(e) => e.error_code(),
            BotError::Configuration(_) => "CONFIGURATION_ERROR",
            BotError::Telegram(_) => "TELEGRAM_ERROR",
            BotError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn user_message(&self) -> String {
        match self {
            BotError::Storage(e) => e.user_message(),
            BotError::Cdn(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            BotError::AccessDenied(_) | BotError::Validation(_) => LogLevel::Debug,
            BotError::AttachmentTooLarge { .. } | BotError::Configuration(_) => LogLevel::Warn,
            BotError::Storage(e) => e.log_level(),
            BotError::Cdn(e) => e.log_level(),
            BotError::Telegram(_) | BotError::Internal(_) => LogLevel::Error,
        }
    }
}

/// Log an error at the level it asks for.
pub fn log_error(error: &BotError, chat_id: i64, command: &str) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_code, chat_id, command, "Command failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code, chat_id, command, "Command failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_code, chat_id, command, "Command failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_keep_their_metadata() {
        let err = BotError::from(StorageError::NotFound("missing-key.txt".into()));
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.user_message(), "File not found: missing-key.txt");
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(!err.is_fault());
    }

    #[test]
    fn only_transport_and_internal_errors_are_faults() {
        assert!(BotError::Internal("boom".into()).is_fault());
        assert!(BotError::Telegram(TelegramError::Api("down".into())).is_fault());
        assert!(!BotError::Validation("missing".into()).is_fault());
        assert!(!BotError::Configuration("no token".into()).is_fault());
    }
}
