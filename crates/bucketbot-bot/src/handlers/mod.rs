//! Command handlers.
//!
//! Each handler performs one storage or CDN operation and sends its own
//! success reply. Failures are returned to the router, which formats them.

pub mod basic;
pub mod cdn;
pub mod objects;
pub mod upload;
