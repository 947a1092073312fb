use crate::error::BotError;
use crate::state::BotState;
use crate::text::escape_html;

pub const GREETING: &str = "My dear cruel world do you ever think about me?";

/// `/start` and `/help`: greet the authorized user, tell anyone else who they are.
pub async fn start(
    state: &BotState,
    chat_id: i64,
    username: Option<&str>,
) -> Result<(), BotError> {
    if state.is_authorized(username) {
        state.transport.send_text(chat_id, GREETING).await?;
        return Ok(());
    }

    tracing::info!(chat_id, username = username.unwrap_or(""), "Access denied");
    let notice = format!(
        "<b>Access denied</b>\n\nYour chat id is <code>{}</code>.\nYour username is <code>{}</code>.",
        chat_id,
        escape_html(username.unwrap_or(""))
    );
    state.transport.send_html(chat_id, &notice).await?;
    Ok(())
}

pub async fn echo(state: &BotState, chat_id: i64, text: &str) -> Result<(), BotError> {
    state.transport.send_text(chat_id, text).await?;
    Ok(())
}

/// Always fails, so the fault reporter can be checked end to end.
pub async fn bad_command() -> Result<(), BotError> {
    Err(BotError::Internal(
        "Something went wrong, please try again later.".to_string(),
    ))
}
