use crate::error::BotError;
use crate::state::BotState;

/// `/purge_cache KEY`
pub async fn purge_cache(state: &BotState, chat_id: i64, key: &str) -> Result<(), BotError> {
    let cdn = state.cdn.as_ref().ok_or_else(|| {
        BotError::Configuration("CDN purge is disabled, set CDN_API_TOKEN to enable it".to_string())
    })?;

    cdn.purge(key).await?;

    let url = state.storage.url_for(key);
    state
        .transport
        .send_text(chat_id, &format!("Cache for {} has been purged.", url))
        .await?;
    Ok(())
}
