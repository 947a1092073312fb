use bucketbot_core::constants::{DEFAULT_CONTENT_TYPE, MAX_ATTACHMENT_BYTES};
use bucketbot_core::object_key::base_name;
use bucketbot_core::{resolve_upload_key, AccessPolicy};
use std::path::Path;
use tempfile::TempPath;
use uuid::Uuid;

use crate::attachment::Attachment;
use crate::error::BotError;
use crate::state::BotState;

pub const TOO_BIG_HTML: &str = "<b>File is too big</b>\n\nFor the moment, <a href=\"https://core.telegram.org/bots/api#getfile\">bots can download files of up to 20MB in size</a>.\n";

/// Content type for an upload: declared, then guessed from the key, then the generic default.
pub fn content_type_for(declared: Option<&str>, key: &str) -> String {
    declared
        .filter(|mime| !mime.trim().is_empty())
        .map(String::from)
        .or_else(|| mime_guess::from_path(key).first_raw().map(String::from))
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// Reserve `{dir}/{uuid-v4}` for a download. The file is removed when the
/// returned path is closed or dropped.
pub fn reserve_temp_path(dir: &Path) -> Result<TempPath, BotError> {
    let name = Uuid::new_v4().to_string();
    tempfile::Builder::new()
        .prefix(&name)
        .rand_bytes(0)
        .tempfile_in(dir)
        .map(|file| file.into_temp_path())
        .map_err(|e| {
            BotError::Internal(format!(
                "Failed to create temp file in {}: {}",
                dir.display(),
                e
            ))
        })
}

/// Remove a temp download. Failures are logged, never returned.
pub fn remove_temp_path(temp: TempPath) {
    let path = temp.to_path_buf();
    match temp.close() {
        Ok(()) => tracing::debug!(path = %path.display(), "Temp file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to remove temp file")
        }
    }
}

/// Store an attachment in the bucket and reply with its public URL.
///
/// The size limit is checked against the declared size before any network
/// call. The temp download is removed whichever way this returns.
pub async fn upload(
    state: &BotState,
    chat_id: i64,
    attachment: &dyn Attachment,
    caption: Option<&str>,
) -> Result<(), BotError> {
    if let Some(size) = attachment.size() {
        if size > MAX_ATTACHMENT_BYTES {
            return Err(BotError::AttachmentTooLarge {
                size,
                limit: MAX_ATTACHMENT_BYTES,
            });
        }
    }

    let remote_path = state.transport.resolve_file(attachment.file_id()).await?;
    let original_name = attachment
        .file_name()
        .unwrap_or_else(|| base_name(&remote_path));
    let key = resolve_upload_key(caption, original_name);
    let content_type = content_type_for(attachment.mime_type(), &key);

    let temp = reserve_temp_path(&state.temp_path)?;
    let stored = store(state, &remote_path, &temp, &key, &content_type).await;
    remove_temp_path(temp);
    let bytes = stored?;

    tracing::info!(
        chat_id,
        key = %key,
        content_type = %content_type,
        size_bytes = bytes,
        "Attachment uploaded"
    );

    let url = state.storage.url_for(&key);
    state.transport.send_text(chat_id, &url).await?;
    Ok(())
}

async fn store(
    state: &BotState,
    remote_path: &str,
    temp: &Path,
    key: &str,
    content_type: &str,
) -> Result<u64, BotError> {
    let bytes = state.transport.download(remote_path, temp).await?;
    state
        .storage
        .upload(temp, key, content_type, AccessPolicy::PublicRead)
        .await?;
    Ok(bytes)
}
