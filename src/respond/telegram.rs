//! Telegram outbound sender using teloxide.

use teloxide::prelude::*;
use tracing::{info, warn};

use crate::respond::engine::OutboundSender;
use crate::respond::rule::RoomId;

/// Telegram's hard limit on message length, in characters.
const MAX_MESSAGE_CHARS: usize = 4096;

/// Sends replies to Telegram chats.
pub struct TelegramSender {
    bot: Bot,
    dry_run: bool,
}

impl TelegramSender {
    pub fn new(bot: Bot, dry_run: bool) -> Self {
        Self { bot, dry_run }
    }
}

/// Cut `text` to Telegram's limit on a char boundary.
fn clamp_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(MAX_MESSAGE_CHARS - 3).collect();
    format!("{}...", truncated)
}

impl OutboundSender for TelegramSender {
    fn send(&self, room: RoomId, text: &str) {
        let text = clamp_message(text);

        if self.dry_run {
            info!("[DRY RUN] Would send to {}: {:?}", room, text);
            return;
        }

        let bot = self.bot.clone();
        tokio::spawn(async move {
            // Plain text: responses carry user-authored content
            if let Err(e) = bot.send_message(ChatId(room.0), text).await {
                warn!("Failed to send to {}: {e}", room);
            }
        });
    }
}
