//! Bucketbot
//!
//! A Telegram bot that proxies object-storage operations for a single
//! authorized user: uploads from attachments, delete, copy, ACL changes,
//! existence and metadata probes, prefix listings and CDN cache purges.
//!
//! Updates flow from [`runner::poll_loop`] through [`router::handle_update`]
//! to one handler per command. Handlers reach storage through
//! [`bucketbot_storage::Storage`] and reply through [`transport::ChatTransport`].

pub mod attachment;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod report;
pub mod router;
pub mod runner;
pub mod state;
pub mod telegram;
pub mod text;
pub mod transport;

pub use error::BotError;
pub use state::BotState;
pub use transport::ChatTransport;
