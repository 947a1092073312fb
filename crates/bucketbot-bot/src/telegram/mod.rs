//! Telegram Bot API transport.
//!
//! `api` wraps the HTTP calls, `types` holds the serde models for the
//! subset of the Bot API the bot reads.

pub mod api;
pub mod types;

use thiserror::Error;

pub use api::TelegramApi;

/// Telegram transport errors
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
