//! Raw HTTP calls to the Telegram Bot API.
//!
//! Wraps reqwest for `getUpdates`, `sendMessage`, `getFile`, file downloads
//! and the `*MyCommands` menu calls.

use std::path::Path;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::types::{ApiResponse, BotCommand, File, SentMessage};
use super::TelegramError;

/// Low-level Telegram Bot API client.
pub struct TelegramApi {
    client: Client,
    base_url: String,
    file_base_url: String,
}

impl TelegramApi {
    /// Create a new API client for the given bot token.
    pub fn new(bot_token: &str) -> Self {
        Self::with_base_url(bot_token, "https://api.telegram.org")
    }

    /// Create a new API client with a custom base URL (self-hosted Bot API server, tests).
    pub fn with_base_url(bot_token: &str, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            client: Client::new(),
            base_url: format!("{}/bot{}", base_url, bot_token),
            file_base_url: format!("{}/file/bot{}", base_url, bot_token),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, TelegramError> {
        let resp = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await?;

        let api_resp: ApiResponse<T> = resp.json().await?;
        if !api_resp.ok {
            let desc = api_resp.description.unwrap_or_default();
            warn!(method, "Telegram call failed: {desc}");
            return Err(TelegramError::Api(desc));
        }

        api_resp
            .result
            .ok_or_else(|| TelegramError::Api(format!("{method} returned no result")))
    }

    /// Long-poll for new updates.
    ///
    /// Updates are returned undecoded so a failing update can be reported
    /// verbatim. `offset` should be `last_update_id + 1`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: u64,
    ) -> Result<Vec<Value>, TelegramError> {
        let mut body = json!({
            "timeout": timeout,
            "allowed_updates": ["message"],
        });

        if let Some(off) = offset {
            body["offset"] = json!(off);
        }

        self.call("getUpdates", &body).await
    }

    /// Send a text message, optionally with a parse mode such as `HTML`.
    ///
    /// Returns the sent message's ID on success.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<i64, TelegramError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }

        debug!("sendMessage to chat_id={chat_id}");

        let sent: SentMessage = self.call("sendMessage", &body).await?;
        Ok(sent.message_id)
    }

    /// Resolve a file id to its download path. Bots may fetch files up to 20 MiB.
    pub async fn get_file(&self, file_id: &str) -> Result<File, TelegramError> {
        self.call("getFile", &json!({ "file_id": file_id })).await
    }

    /// Stream a file from the Bot API file endpoint into `dest`.
    ///
    /// Returns the number of bytes written.
    pub async fn download_file(&self, file_path: &str, dest: &Path) -> Result<u64, TelegramError> {
        let mut resp = self
            .client
            .get(format!("{}/{}", self.file_base_url, file_path))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TelegramError::Api(format!(
                "file download failed with status {}",
                status
            )));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(file_path, bytes = written, "Telegram file downloaded");
        Ok(written)
    }

    /// Replace the bot's command menu.
    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError> {
        let _: bool = self
            .call("setMyCommands", &json!({ "commands": commands }))
            .await?;
        Ok(())
    }

    /// Current command menu.
    pub async fn get_my_commands(&self) -> Result<Vec<BotCommand>, TelegramError> {
        self.call("getMyCommands", &json!({})).await
    }

    /// Remove the command menu.
    pub async fn delete_my_commands(&self) -> Result<(), TelegramError> {
        let _: bool = self.call("deleteMyCommands", &json!({})).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn send_message_with_html_parse_mode() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": 42,
                "text": "<b>hi</b>",
                "parse_mode": "HTML"
            })))
            .with_status(200)
            .with_body(r#"{"ok": true, "result": {"message_id": 7, "date": 0, "chat": {"id": 42}}}"#)
            .create_async()
            .await;

        let api = TelegramApi::with_base_url("123:abc", &server.url());
        let id = api.send_message(42, "<b>hi</b>", Some("HTML")).await.unwrap();

        assert_eq!(id, 7);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_errors_surface_the_description() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bot123:abc/getUpdates")
            .with_status(401)
            .with_body(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
            .create_async()
            .await;

        let api = TelegramApi::with_base_url("123:abc", &server.url());
        match api.get_updates(None, 0).await {
            Err(TelegramError::Api(desc)) => assert_eq!(desc, "Unauthorized"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn get_updates_sends_offset() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bot123:abc/getUpdates")
            .match_body(Matcher::PartialJson(json!({"offset": 11, "timeout": 30})))
            .with_status(200)
            .with_body(r#"{"ok": true, "result": [{"update_id": 11}]}"#)
            .create_async()
            .await;

        let api = TelegramApi::with_base_url("123:abc", &server.url());
        let updates = api.get_updates(Some(11), 30).await.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0]["update_id"], 11);
    }

    #[tokio::test]
    async fn get_file_then_download() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bot123:abc/getFile")
            .match_body(Matcher::PartialJson(json!({"file_id": "abc"})))
            .with_status(200)
            .with_body(r#"{"ok": true, "result": {"file_id": "abc", "file_size": 5, "file_path": "documents/file_3.txt"}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/file/bot123:abc/documents/file_3.txt")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let api = TelegramApi::with_base_url("123:abc", &server.url());
        let file = api.get_file("abc").await.unwrap();
        let path = file.file_path.unwrap();
        assert_eq!(path, "documents/file_3.txt");

        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("download");
        let written = api.download_file(&path, &dest).await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn command_menu_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let set = server
            .mock("POST", "/bot123:abc/setMyCommands")
            .match_body(Matcher::PartialJson(json!({
                "commands": [{"command": "start", "description": "Start the bot"}]
            })))
            .with_status(200)
            .with_body(r#"{"ok": true, "result": true}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/bot123:abc/getMyCommands")
            .with_status(200)
            .with_body(r#"{"ok": true, "result": [{"command": "start", "description": "Start the bot"}]}"#)
            .create_async()
            .await;

        let api = TelegramApi::with_base_url("123:abc", &server.url());
        let menu = vec![BotCommand {
            command: "start".into(),
            description: "Start the bot".into(),
        }];
        api.set_my_commands(&menu).await.unwrap();
        assert_eq!(api.get_my_commands().await.unwrap(), menu);
        set.assert_async().await;
    }
}
