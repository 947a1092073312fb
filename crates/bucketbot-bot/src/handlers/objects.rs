use bucketbot_core::constants::TELEGRAM_MESSAGE_LIMIT;
use bucketbot_core::{AccessPolicy, ObjectEntry, ObjectMetadata};
use bucketbot_storage::StorageError;

use crate::error::BotError;
use crate::state::BotState;
use crate::text::truncate_message;

const ACL_UNSUPPORTED: &str = "ACL is not supported by the storage provider.";

async fn reply(state: &BotState, chat_id: i64, text: &str) -> Result<(), BotError> {
    state.transport.send_text(chat_id, text).await?;
    Ok(())
}

pub async fn delete(state: &BotState, chat_id: i64, key: &str) -> Result<(), BotError> {
    state.storage.delete(key).await?;
    let url = state.storage.url_for(key);
    reply(
        state,
        chat_id,
        &format!(
            "File {} has been deleted. Do not forget to clear all of your edge caches.",
            url
        ),
    )
    .await
}

/// `/make_public` and `/make_private`
pub async fn set_access_policy(
    state: &BotState,
    chat_id: i64,
    key: &str,
    policy: AccessPolicy,
) -> Result<(), BotError> {
    match state.storage.set_access_policy(key, policy).await {
        Ok(()) => {}
        Err(StorageError::AclUnsupported) => return reply(state, chat_id, ACL_UNSUPPORTED).await,
        Err(e) => return Err(e.into()),
    }

    let url = state.storage.url_for(key);
    let state_word = match policy {
        AccessPolicy::PublicRead => "public",
        AccessPolicy::Private => "private",
    };
    reply(state, chat_id, &format!("File {} has become {}.", url, state_word)).await
}

pub async fn exist(state: &BotState, chat_id: i64, key: &str) -> Result<(), BotError> {
    let exists = state.storage.exists(key).await?;
    let url = state.storage.url_for(key);
    let text = if exists {
        format!("File {} exist.", url)
    } else {
        format!("File {} does not exist.", url)
    };
    reply(state, chat_id, &text).await
}

pub async fn copy_file(
    state: &BotState,
    chat_id: i64,
    src: &str,
    dest: &str,
) -> Result<(), BotError> {
    let src_url = state.storage.url_for(src);
    if !state.storage.copy(src, dest).await? {
        return reply(state, chat_id, &format!("Source file {} does not exist.", src_url)).await;
    }

    let dest_url = state.storage.url_for(dest);
    reply(
        state,
        chat_id,
        &format!("File {} has been copied to {}.", src_url, dest_url),
    )
    .await
}

pub async fn get_file_acl(state: &BotState, chat_id: i64, key: &str) -> Result<(), BotError> {
    let url = state.storage.url_for(key);
    let text = match state.storage.access_policy(key).await? {
        Some(policy) => format!("File {} is {}.", url, policy),
        None => format!("ACL is not supported by the storage provider for file {}.", url),
    };
    reply(state, chat_id, &text).await
}

pub async fn list(
    state: &BotState,
    chat_id: i64,
    prefix: &str,
    limit: usize,
) -> Result<(), BotError> {
    let entries = state.storage.list(prefix, limit).await?;
    reply(state, chat_id, &format_listing(prefix, &entries)).await
}

pub async fn get_meta(state: &BotState, chat_id: i64, key: &str) -> Result<(), BotError> {
    let url = state.storage.url_for(key);
    let text = match state.storage.metadata(key).await? {
        Some(meta) => format_metadata(&url, &meta),
        None => format!("File {} does not exist.", url),
    };
    reply(state, chat_id, &text).await
}

pub fn format_listing(prefix: &str, entries: &[ObjectEntry]) -> String {
    if entries.is_empty() {
        return format!("No objects found under {}.", prefix);
    }

    let mut text = format!("Objects under {}:", prefix);
    for entry in entries {
        text.push('\n');
        text.push_str(&entry.key);
        match (entry.size, entry.last_modified) {
            (Some(size), Some(modified)) => {
                text.push_str(&format!(" ({} bytes, {})", size, modified.to_rfc3339()))
            }
            (Some(size), None) => text.push_str(&format!(" ({} bytes)", size)),
            (None, Some(modified)) => text.push_str(&format!(" ({})", modified.to_rfc3339())),
            (None, None) => {}
        }
    }
    truncate_message(&text, TELEGRAM_MESSAGE_LIMIT)
}

pub fn format_metadata(url: &str, meta: &ObjectMetadata) -> String {
    let acl = meta
        .access_policy
        .map(|policy| policy.to_string())
        .unwrap_or_else(|| "not supported".to_string());

    [
        format!("File: {}", url),
        format!("Size: {} bytes", meta.size),
        format!(
            "Content-Type: {}",
            meta.content_type.as_deref().unwrap_or("unknown")
        ),
        format!(
            "Last-Modified: {}",
            meta.last_modified
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        ),
        format!("ETag: {}", meta.etag.as_deref().unwrap_or("unknown")),
        format!("ACL: {}", acl),
    ]
    .join("\n")
}
