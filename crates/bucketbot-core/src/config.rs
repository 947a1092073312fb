//! Configuration module
//!
//! Settings for the Telegram transport, the storage backend and the CDN
//! client. Everything is read once at startup into an explicit [`Config`]
//! that is passed to the components that need it. Blank variables count as
//! unset.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_CDN_API_URL: &str = "https://api.digitalocean.com";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TEMP_PATH: &str = "/tmp";
const POLL_TIMEOUT_SECS: u64 = 30;

/// Telegram transport settings
#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub api_token: String,
    pub api_url: String,
    /// The single username allowed to run commands (without the `@`).
    pub authorized_username: String,
    /// Operator chat that receives fault reports. Falls back to the originating chat.
    pub developer_chat_id: Option<i64>,
    pub poll_timeout_secs: u64,
}

/// Storage backend settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub region: String,
    pub bucket: Option<String>,
    pub endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers (DigitalOcean Spaces, MinIO, ...)
    pub custom_endpoint_url: Option<String>, // Public base URL used in replies instead of the bucket host
    pub force_path_style: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub local_storage_path: Option<String>,
}

impl StorageConfig {
    /// Static credential pair, when both halves are configured.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Some((key.clone(), secret.clone())),
            _ => None,
        }
    }
}

/// CDN purge settings
#[derive(Clone, Debug)]
pub struct CdnConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    /// Edge hostname to purge. When unset the edge endpoint is found by the bucket origin.
    pub edge_endpoint_url: Option<String>,
}

impl CdnConfig {
    pub fn purge_enabled(&self) -> bool {
        self.api_token.is_some()
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    pub cdn: CdnConfig,
    /// Directory that receives attachment downloads before upload.
    pub temp_path: PathBuf,
}

impl Config {
    /// Load configuration from the process environment and `.env`.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &str| {
            var(key).ok_or_else(|| anyhow::anyhow!("{} must be set", key))
        };

        let developer_chat_id = var("DEVELOPER_CHAT_ID")
            .map(|id| {
                id.parse::<i64>()
                    .map_err(|_| anyhow::anyhow!("DEVELOPER_CHAT_ID must be a valid chat id"))
            })
            .transpose()?;

        let poll_timeout_secs = var("TELEGRAM_POLL_TIMEOUT_SECS")
            .unwrap_or_else(|| POLL_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("TELEGRAM_POLL_TIMEOUT_SECS must be a valid number"))?;

        let telegram = TelegramConfig {
            api_token: required("TELEGRAM_API_TOKEN")?,
            api_url: var("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            authorized_username: required("TELEGRAM_USERNAME")?
                .trim_start_matches('@')
                .to_string(),
            developer_chat_id,
            poll_timeout_secs,
        };

        let backend = var("STORAGE_BACKEND")
            .map(|b| b.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::S3);

        let force_path_style = var("S3_FORCE_PATH_STYLE")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let storage = StorageConfig {
            backend,
            region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket: var("BUCKET_NAME"),
            endpoint_url: var("ENDPOINT_URL"),
            custom_endpoint_url: var("CUSTOM_ENDPOINT_URL"),
            force_path_style,
            access_key_id: var("AWS_SERVER_PUBLIC_KEY"),
            secret_access_key: var("AWS_SERVER_SECRET_KEY"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
        };

        let cdn = CdnConfig {
            api_url: var("CDN_API_URL").unwrap_or_else(|| DEFAULT_CDN_API_URL.to_string()),
            api_token: var("CDN_API_TOKEN"),
            edge_endpoint_url: var("EDGE_ENDPOINT_URL"),
        };

        Ok(Config {
            telegram,
            storage,
            cdn,
            temp_path: PathBuf::from(var("TEMP_PATH").unwrap_or_else(|| DEFAULT_TEMP_PATH.to_string())),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "BUCKET_NAME must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.storage.access_key_id.is_some() != self.storage.secret_access_key.is_some() {
            return Err(anyhow::anyhow!(
                "AWS_SERVER_PUBLIC_KEY and AWS_SERVER_SECRET_KEY must be set together"
            ));
        }

        Ok(())
    }
}
