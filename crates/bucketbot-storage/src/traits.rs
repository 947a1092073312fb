//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bucketbot_core::{AccessPolicy, ErrorMetadata, LogLevel, ObjectEntry, ObjectMetadata};
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("ACL is not supported by the storage provider")]
    AclUnsupported,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Storage provider error: {0}")]
    Provider(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorMetadata for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::NotFound(_) => "NOT_FOUND",
            StorageError::AclUnsupported => "ACL_UNSUPPORTED",
            StorageError::AccessDenied(_) => "ACCESS_DENIED",
            StorageError::Provider(_) => "PROVIDER_ERROR",
            StorageError::InvalidKey(_) => "INVALID_KEY",
            StorageError::IoError(_) => "IO_ERROR",
            StorageError::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    fn user_message(&self) -> String {
        self.to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            StorageError::NotFound(_)
            | StorageError::AclUnsupported
            | StorageError::InvalidKey(_) => LogLevel::Warn,
            StorageError::AccessDenied(_)
            | StorageError::Provider(_)
            | StorageError::IoError(_)
            | StorageError::ConfigError(_) => LogLevel::Error,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait against a
/// single configured bucket. Keys are opaque strings; callers normalize user
/// input with [`bucketbot_core::normalize_key`] before passing it in.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a local file under `key`.
    ///
    /// The ACL is only set when `policy` is [`AccessPolicy::PublicRead`];
    /// private uploads keep the provider default.
    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
        policy: AccessPolicy,
    ) -> StorageResult<()>;

    /// Public URL of `key`. Pure in the key and the backend settings.
    fn url_for(&self, key: &str) -> String;

    /// Delete an object. An absent object is reported as `NotFound`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Metadata-only existence probe
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Apply a canned ACL. Fails with `AclUnsupported` when the provider has no object ACLs.
    async fn set_access_policy(&self, key: &str, policy: AccessPolicy) -> StorageResult<()>;

    /// Read the object ACL. `None` means the provider does not support ACLs.
    async fn access_policy(&self, key: &str) -> StorageResult<Option<AccessPolicy>>;

    /// Copy within the bucket, preserving the source ACL when supported.
    ///
    /// Returns `false` without copying when the source does not exist.
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<bool>;

    /// List at most `limit` objects under `prefix` in provider order
    async fn list(&self, prefix: &str, limit: usize) -> StorageResult<Vec<ObjectEntry>>;

    /// Fetch object metadata, `None` when the object does not exist
    async fn metadata(&self, key: &str) -> StorageResult<Option<ObjectMetadata>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_errors_log_as_warnings() {
        assert_eq!(
            StorageError::NotFound("a.txt".into()).log_level(),
            LogLevel::Warn
        );
        assert_eq!(StorageError::AclUnsupported.log_level(), LogLevel::Warn);
        assert_eq!(
            StorageError::Provider("boom".into()).log_level(),
            LogLevel::Error
        );
    }

    #[test]
    fn acl_unsupported_message_matches_reply_text() {
        assert_eq!(
            StorageError::AclUnsupported.user_message(),
            "ACL is not supported by the storage provider"
        );
        assert_eq!(StorageError::AclUnsupported.error_code(), "ACL_UNSUPPORTED");
    }
}
