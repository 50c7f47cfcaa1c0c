pub mod client;

pub use client::TelegramClient;

use chrono::Local;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::bot::BotEngine;

const MAX_BACKOFF_SECS: u64 = 30;

/// Doubling back-off capped at `MAX_BACKOFF_SECS`, plus up to a second of jitter.
fn backoff_delay(failures: u32) -> Duration {
    let secs = 1u64
        .checked_shl(failures.saturating_sub(1))
        .unwrap_or(MAX_BACKOFF_SECS)
        .min(MAX_BACKOFF_SECS);
    let jitter_ms = rand::thread_rng().gen_range(0..1000);
    Duration::from_secs(secs) + Duration::from_millis(jitter_ms)
}

/// Long-poll Telegram forever, handing each text message to the engine on
/// its own task and sending back whatever it replies.
pub async fn run_polling(client: TelegramClient, engine: Arc<BotEngine>, poll_timeout_secs: u64) {
    info!("Listening for Telegram messages...");
    let mut offset = 0i64;
    let mut failures = 0u32;

    loop {
        let updates = match client.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => {
                failures = 0;
                updates
            }
            Err(e) => {
                failures += 1;
                let delay = backoff_delay(failures);
                warn!("Polling failed ({} in a row): {:#}; retrying in {:?}", failures, e, delay);
                tokio::time::sleep(delay).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };
            let chat_id = message.chat.id;
            let user_id = message.from.map(|u| u.id).unwrap_or(0);

            let client = client.clone();
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let today = Local::now().date_naive();
                for reply in engine.handle_message(user_id, &text, today).await {
                    if let Err(e) = client.send_message(chat_id, &reply).await {
                        error!(chat_id, "Failed to send reply: {:#}", e);
                    }
                }
            });
        }
    }
}
