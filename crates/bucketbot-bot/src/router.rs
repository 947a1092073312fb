//! Update routing
//!
//! Authorizes the sender, parses the command and runs the matching handler.
//! Handler failures become chat replies here; faults are returned to the
//! caller for the fault reporter.

use bucketbot_core::constants::TELEGRAM_MESSAGE_LIMIT;
use bucketbot_core::{AccessPolicy, ErrorMetadata};

use crate::attachment::message_attachment;
use crate::commands::{parse_text, Command, ParsedText};
use crate::error::{log_error, BotError};
use crate::handlers::{basic, cdn, objects, upload};
use crate::state::BotState;
use crate::telegram::types::Update;
use crate::text::truncate_message;

/// Handle one inbound update end to end.
pub async fn handle_update(state: &BotState, update: &Update) -> Result<(), BotError> {
    let Some(message) = &update.message else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    let username = message.from.as_ref().and_then(|user| user.username.as_deref());

    if let Some(attachment) = message_attachment(message) {
        if !state.is_authorized(username) {
            return ignore(chat_id, username, "upload");
        }
        let result = upload::upload(state, chat_id, attachment, message.caption.as_deref()).await;
        return finish(state, chat_id, "upload", result).await;
    }

    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };

    match parse_text(text) {
        ParsedText::Command(command) => {
            if !command.is_public() && !state.is_authorized(username) {
                return ignore(chat_id, username, command.name());
            }
            let name = command.name();
            let result = dispatch(state, chat_id, username, command).await;
            finish(state, chat_id, name, result).await
        }
        ParsedText::Invalid { command, reason } => {
            log_error(&BotError::Validation(reason), chat_id, &command);
            Ok(())
        }
        ParsedText::Unknown(command) => {
            tracing::debug!(chat_id, command = %command, "Ignoring unknown command");
            Ok(())
        }
        ParsedText::Text(text) => {
            if !state.is_authorized(username) {
                return ignore(chat_id, username, "echo");
            }
            let result = basic::echo(state, chat_id, &text).await;
            finish(state, chat_id, "echo", result).await
        }
    }
}

async fn dispatch(
    state: &BotState,
    chat_id: i64,
    username: Option<&str>,
    command: Command,
) -> Result<(), BotError> {
    tracing::debug!(chat_id, command = command.name(), "Dispatching command");

    match command {
        Command::Start | Command::Help => basic::start(state, chat_id, username).await,
        Command::BadCommand => basic::bad_command().await,
        Command::Delete(key) => objects::delete(state, chat_id, &key).await,
        Command::MakePublic(key) => {
            objects::set_access_policy(state, chat_id, &key, AccessPolicy::PublicRead).await
        }
        Command::MakePrivate(key) => {
            objects::set_access_policy(state, chat_id, &key, AccessPolicy::Private).await
        }
        Command::Exist(key) => objects::exist(state, chat_id, &key).await,
        Command::CopyFile { src, dest } => objects::copy_file(state, chat_id, &src, &dest).await,
        Command::GetFileAcl(key) => objects::get_file_acl(state, chat_id, &key).await,
        Command::List { prefix, limit } => objects::list(state, chat_id, &prefix, limit).await,
        Command::GetMeta(key) => objects::get_meta(state, chat_id, &key).await,
        Command::PurgeCache(key) => cdn::purge_cache(state, chat_id, &key).await,
    }
}

fn ignore(chat_id: i64, username: Option<&str>, command: &str) -> Result<(), BotError> {
    let who = username.unwrap_or("<no username>").to_string();
    log_error(&BotError::AccessDenied(who), chat_id, command);
    Ok(())
}

/// Turn a handler result into a reply, passing faults through.
async fn finish(
    state: &BotState,
    chat_id: i64,
    command: &str,
    result: Result<(), BotError>,
) -> Result<(), BotError> {
    let error = match result {
        Ok(()) => return Ok(()),
        Err(e) if e.is_fault() => return Err(e),
        Err(e) => e,
    };

    log_error(&error, chat_id, command);

    match &error {
        BotError::AccessDenied(_) | BotError::Validation(_) => {}
        BotError::AttachmentTooLarge { .. } => {
            state
                .transport
                .send_html(chat_id, upload::TOO_BIG_HTML)
                .await?;
        }
        _ => {
            let reply = format!("Error: {}", error.user_message());
            state
                .transport
                .send_text(chat_id, &truncate_message(&reply, TELEGRAM_MESSAGE_LIMIT))
                .await?;
        }
    }
    Ok(())
}
