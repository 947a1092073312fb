//! Bucketbot Storage Library
//!
//! This crate provides the storage abstraction the bot talks to and its
//! implementations for S3-compatible providers and the local filesystem.
//!
//! # Object keys
//!
//! Keys are opaque, slash-separated strings. The bot normalizes user input
//! before calling into a backend; backends only enforce their own namespace
//! rules (the local backend rejects `..` segments and absolute keys).
//!
//! Public URLs are derived in the `urls` module so every backend formats
//! them the same way.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod urls;

// Re-export commonly used types
pub use bucketbot_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Settings, S3Storage};
pub use traits::{Storage, StorageError, StorageResult};
