//! Outbound side of the chat transport, as seen by the handlers.

use std::path::Path;

use async_trait::async_trait;

use crate::telegram::{TelegramApi, TelegramError};

/// Replies and file retrieval used while handling an update.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a plain-text reply.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    /// Send an HTML-formatted reply.
    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError>;

    /// Resolve an attachment's file id to the remote path it can be downloaded from.
    async fn resolve_file(&self, file_id: &str) -> Result<String, TelegramError>;

    /// Download a resolved remote path into `dest`, returning the byte count.
    async fn download(&self, remote_path: &str, dest: &Path) -> Result<u64, TelegramError>;
}

#[async_trait]
impl ChatTransport for TelegramApi {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, text, None).await.map(|_| ())
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, html, Some("HTML")).await.map(|_| ())
    }

    async fn resolve_file(&self, file_id: &str) -> Result<String, TelegramError> {
        self.get_file(file_id)
            .await?
            .file_path
            .ok_or_else(|| TelegramError::Api(format!("getFile returned no path for {}", file_id)))
    }

    async fn download(&self, remote_path: &str, dest: &Path) -> Result<u64, TelegramError> {
        self.download_file(remote_path, dest).await
    }
}
