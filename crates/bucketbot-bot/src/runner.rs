//! Long-polling loop for Telegram Bot API `getUpdates`.
//!
//! Updates are handled one at a time, end to end. Shutdown is checked
//! between updates and while waiting on a poll.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::report::report_fault;
use crate::router::handle_update;
use crate::state::BotState;
use crate::telegram::types::Update;
use crate::telegram::TelegramApi;

const MAX_BACKOFF_SECS: u64 = 60;

/// Outcome of handling one `getUpdates` batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Offset acknowledging every handled update
    pub next_offset: Option<i64>,
    /// Shutdown was requested before the batch finished
    pub cancelled: bool,
}

/// Handle a batch of raw updates in order.
///
/// Faults escaping the router go to the fault reporter with the raw update.
/// Updates that cannot be decoded are acknowledged and skipped.
pub async fn handle_batch(
    state: &BotState,
    updates: Vec<Value>,
    offset: Option<i64>,
    cancel: &watch::Receiver<bool>,
) -> BatchOutcome {
    let mut next_offset = offset;

    for raw in updates {
        if *cancel.borrow() {
            return BatchOutcome {
                next_offset,
                cancelled: true,
            };
        }

        let Some(update_id) = raw.get("update_id").and_then(Value::as_i64) else {
            warn!("Skipping update without update_id");
            continue;
        };
        next_offset = Some(update_id + 1);

        let update: Update = match serde_json::from_value(raw.clone()) {
            Ok(update) => update,
            Err(e) => {
                warn!(error = %e, update_id, "Skipping undecodable update");
                continue;
            }
        };

        let start = std::time::Instant::now();
        if let Err(e) = handle_update(state, &update).await {
            report_fault(state, &raw, &e).await;
        }
        debug!(
            update_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Update handled"
        );
    }

    BatchOutcome {
        next_offset,
        cancelled: false,
    }
}

/// Run the long-polling loop until the cancellation flag is set.
pub async fn poll_loop(
    api: Arc<TelegramApi>,
    state: Arc<BotState>,
    poll_timeout: u64,
    mut cancel: watch::Receiver<bool>,
) {
    let mut offset: Option<i64> = None;
    let mut backoff_secs = 1u64;

    info!(poll_timeout, "Telegram poller started");

    loop {
        if *cancel.borrow() {
            break;
        }

        let updates = tokio::select! {
            result = api.get_updates(offset, poll_timeout) => result,
            _ = cancel.changed() => break,
        };

        match updates {
            Ok(updates) => {
                backoff_secs = 1;
                let outcome = handle_batch(&state, updates, offset, &cancel).await;
                offset = outcome.next_offset;
                if outcome.cancelled {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, backoff_secs, "getUpdates failed, backing off");
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
                    _ = cancel.changed() => break,
                }
                backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
            }
        }
    }

    // Confirm handled updates so they are not redelivered on the next start.
    if let Some(off) = offset {
        if let Err(e) = api.get_updates(Some(off), 0).await {
            warn!(error = %e, "Failed to acknowledge handled updates");
        }
    }

    info!("Telegram poller stopped");
}
