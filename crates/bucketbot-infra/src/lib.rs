//! Bucketbot Infrastructure Library
//!
//! Shared infrastructure used by the bot binaries:
//! - Telemetry initialization (tracing subscriber)
//! - CDN edge cache purge client

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "cdn")]
pub mod cdn;

// Re-export commonly used types
#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, LogFormat};

#[cfg(feature = "cdn")]
pub use cdn::{CdnClient, CdnEndpoint, CdnError};
