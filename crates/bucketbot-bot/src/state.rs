use std::path::PathBuf;
use std::sync::Arc;

use bucketbot_core::Config;
use bucketbot_infra::CdnClient;
use bucketbot_storage::Storage;

use crate::transport::ChatTransport;

/// Everything a handler needs. Built once at startup, read-only afterwards.
#[derive(Clone)]
pub struct BotState {
    pub storage: Arc<dyn Storage>,
    pub transport: Arc<dyn ChatTransport>,
    /// Present only when a CDN API token is configured
    pub cdn: Option<CdnClient>,
    pub authorized_username: String,
    pub developer_chat_id: Option<i64>,
    pub temp_path: PathBuf,
}

impl BotState {
    pub fn new(
        config: &Config,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn ChatTransport>,
        cdn: Option<CdnClient>,
    ) -> Self {
        Self {
            storage,
            transport,
            cdn,
            authorized_username: config.telegram.authorized_username.clone(),
            developer_chat_id: config.telegram.developer_chat_id,
            temp_path: config.temp_path.clone(),
        }
    }

    /// Telegram usernames are case-insensitive.
    pub fn is_authorized(&self, username: Option<&str>) -> bool {
        username
            .map(|name| name.eq_ignore_ascii_case(&self.authorized_username))
            .unwrap_or(false)
    }
}
