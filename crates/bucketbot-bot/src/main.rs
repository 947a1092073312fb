//! bucketbot: long-polling Telegram bot in front of an object-storage bucket.
//!
//! Configuration comes from the environment (and `.env`); see `Config::from_env`.

use std::sync::Arc;

use anyhow::Context;
use bucketbot_bot::runner::poll_loop;
use bucketbot_bot::telegram::TelegramApi;
use bucketbot_bot::BotState;
use bucketbot_core::Config;
use bucketbot_infra::{init_telemetry, CdnClient, LogFormat};
use bucketbot_storage::create_storage;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_telemetry(LogFormat::from_env())?;
    config.validate()?;

    tokio::fs::create_dir_all(&config.temp_path)
        .await
        .with_context(|| format!("Failed to create TEMP_PATH {}", config.temp_path.display()))?;

    let storage = create_storage(&config.storage)
        .await
        .context("Failed to initialize storage backend")?;
    let cdn = CdnClient::from_config(&config.cdn, &config.storage)
        .context("Failed to initialize CDN client")?;

    tracing::info!(
        backend = %storage.backend_type(),
        authorized_username = %config.telegram.authorized_username,
        cdn_purge = cdn.is_some(),
        "bucketbot starting"
    );

    let api = Arc::new(TelegramApi::with_base_url(
        &config.telegram.api_token,
        &config.telegram.api_url,
    ));
    let state = Arc::new(BotState::new(&config, storage, api.clone(), cdn));

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = cancel_tx.send(true);
        }
    });

    poll_loop(api, state, config.telegram.poll_timeout_secs, cancel_rx).await;
    Ok(())
}
