//! Bucketbot Core Library
//!
//! This crate provides the domain types, error metadata, configuration and
//! object-key rules shared by the storage backends and the bot.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod object_key;
pub mod storage_types;

// Re-export commonly used types
pub use config::{CdnConfig, Config, StorageConfig, TelegramConfig};
pub use error::{ErrorMetadata, LogLevel};
pub use models::{AccessPolicy, ObjectEntry, ObjectMetadata};
pub use object_key::{normalize_key, resolve_upload_key};
pub use storage_types::StorageBackend;
