//! Fault reporter
//!
//! Faults that escape the router are sent as an HTML report to the operator
//! chat, or back to the originating chat when none is configured.

use std::error::Error as StdError;

use bucketbot_core::constants::TELEGRAM_MESSAGE_LIMIT;
use serde_json::Value;

use crate::error::BotError;
use crate::state::BotState;
use crate::text::escape_html_truncated;

const HEADER: &str = "An exception was raised while handling an update\n";
const ERROR_BUDGET: usize = 1024;

/// The error and its sources, one per line.
pub fn error_chain(error: &dyn StdError) -> String {
    let mut lines = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines.join("\n")
}

/// Build the HTML report, kept under Telegram's message limit.
pub fn fault_report(update: &Value, error: &BotError) -> String {
    let update_json =
        serde_json::to_string_pretty(update).unwrap_or_else(|_| update.to_string());

    let chain = escape_html_truncated(&error_chain(error), ERROR_BUDGET);
    let fixed = HEADER.len() + "<pre>update = </pre>\n\n<pre></pre>".len();
    let update_budget = TELEGRAM_MESSAGE_LIMIT.saturating_sub(fixed + chain.chars().count());
    let update_html = escape_html_truncated(&update_json, update_budget);

    format!(
        "{}<pre>update = {}</pre>\n\n<pre>{}</pre>",
        HEADER, update_html, chain
    )
}

/// Chat the update came from, if it carries one.
pub fn origin_chat(update: &Value) -> Option<i64> {
    update
        .pointer("/message/chat/id")
        .and_then(Value::as_i64)
}

/// Log a fault and send the report. Delivery failures are only logged.
pub async fn report_fault(state: &BotState, update: &Value, error: &BotError) {
    tracing::error!(error = %error_chain(error), "Fault while handling an update");

    let Some(chat_id) = state.developer_chat_id.or_else(|| origin_chat(update)) else {
        tracing::warn!("No chat to send the fault report to");
        return;
    };

    if let Err(e) = state
        .transport
        .send_html(chat_id, &fault_report(update, error))
        .await
    {
        tracing::error!(error = %e, chat_id, "Failed to deliver fault report");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::TelegramError;
    use serde_json::json;

    #[test]
    fn report_escapes_update_and_error() {
        let update = json!({"update_id": 1, "message": {"chat": {"id": 5}, "text": "<b>"}});
        let report = fault_report(&update, &BotError::Internal("x < y".into()));
        assert!(report.starts_with(HEADER));
        assert!(report.contains("&lt;b&gt;"));
        assert!(report.contains("x &lt; y"));
        assert!(!report.contains("<b>"));
    }

    #[test]
    fn report_fits_in_one_message() {
        let update = json!({"update_id": 1, "message": {"text": "&".repeat(10_000)}});
        let report = fault_report(&update, &BotError::Internal("boom".into()));
        assert!(report.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
        assert!(report.ends_with("<pre>boom</pre>"));
    }

    #[test]
    fn chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = BotError::Telegram(TelegramError::Io(io));
        let chain = error_chain(&err);
        assert!(chain.starts_with("Telegram error: IO error: disk on fire"));
    }

    #[test]
    fn origin_chat_is_read_from_message() {
        assert_eq!(origin_chat(&json!({"message": {"chat": {"id": -42}}})), Some(-42));
        assert_eq!(origin_chat(&json!({"update_id": 1})), None);
    }
}
