//! Respond engine - turns inbound chat messages into rule edits or replies.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::respond::command::{parse_command, strip_address};
use crate::respond::matcher::find_match;
use crate::respond::persist::RuleWriter;
use crate::respond::rule::{RoomId, Rule};
use crate::respond::store::RuleStore;
use crate::respond::template::{render, RenderContext};
use crate::respond::tokenizer::tokenize;

/// A chat message delivered by the host.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub text: String,
    pub sender_name: String,
    pub room_id: RoomId,
    pub room_name: String,
    /// Private chat with the bot; commands need no address there.
    pub direct: bool,
}

/// Outbound half of the host. Fire-and-forget: delivery failures are the
/// sender's problem.
pub trait OutboundSender: Send + Sync {
    fn send(&self, room: RoomId, text: &str);
}

/// What the engine decided for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledgement of an authoring command.
    Ack(String),
    /// Rendered response of a matching rule.
    Response(String),
    /// Nothing matched.
    Silent,
}

impl Reply {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Ack(text) | Self::Response(text) => Some(text.as_str()),
            Self::Silent => None,
        }
    }
}

/// Text to parse as a command, if the message is addressed to the bot.
///
/// Without a bot name every message is a command candidate.
fn command_text<'a>(msg: &'a IncomingMessage, bot_name: Option<&str>) -> Option<&'a str> {
    match bot_name {
        Some(name) => strip_address(&msg.text, name)
            .or_else(|| msg.direct.then_some(msg.text.as_str())),
        None => Some(msg.text.as_str()),
    }
}

/// Handle one message against `store`.
///
/// Returns the reply and whether the store changed.
pub fn process(
    store: &mut RuleStore,
    msg: &IncomingMessage,
    bot_name: Option<&str>,
) -> (Reply, bool) {
    let command = command_text(msg, bot_name).and_then(|text| parse_command(text, msg.room_id));

    if let Some(command) = command {
        debug!("Command from {} in {}: {:?}", msg.sender_name, msg.room_id, command);
        let applied = command.apply(store, &msg.sender_name);
        return (Reply::Ack(applied.reply), applied.mutated);
    }

    let tokens = tokenize(&msg.text);
    let Some(rule) = find_match(store, &tokens, msg.room_id) else {
        return (Reply::Silent, false);
    };

    info!("💬 {:?} fired in {} ({})", rule.trigger, msg.room_name, rule.scope);
    let context = RenderContext {
        sender: &msg.sender_name,
        room: &msg.room_name,
    };
    (Reply::Response(render(&rule.response_template, &context)), false)
}

/// The respond engine. Messages are handled one at a time against the
/// shared store.
pub struct RespondEngine {
    store: Arc<Mutex<RuleStore>>,
    sender: Arc<dyn OutboundSender>,
    bot_name: Option<String>,
    writer: Option<RuleWriter>,
}

impl RespondEngine {
    /// Create an engine with an empty store.
    pub fn new(sender: Arc<dyn OutboundSender>, bot_name: Option<String>) -> Self {
        Self {
            store: Arc::new(Mutex::new(RuleStore::new())),
            sender,
            bot_name,
            writer: None,
        }
    }

    /// Start from previously loaded rules.
    pub fn with_store(mut self, store: RuleStore) -> Self {
        self.store = Arc::new(Mutex::new(store));
        self
    }

    /// Persist a snapshot through `writer` after every change.
    pub fn with_writer(mut self, writer: RuleWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn bot_name(&self) -> Option<&str> {
        self.bot_name.as_deref()
    }

    /// Handle an inbound message, sending any reply to its room.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> Reply {
        let reply = {
            let mut store = self.store.lock().await;
            let (reply, mutated) = process(&mut store, msg, self.bot_name.as_deref());
            // Enqueue under the lock so snapshots reach the writer in mutation order
            if let (true, Some(writer)) = (mutated, &self.writer) {
                writer.save(store.snapshot());
            }
            reply
        };

        if let Some(text) = reply.text() {
            self.sender.send(msg.room_id, text);
        }

        reply
    }

    /// Rules visible from `room`, or all rules.
    pub async fn rules(&self, room: Option<RoomId>) -> Vec<Rule> {
        let store = self.store.lock().await;
        store.list(room).into_iter().cloned().collect()
    }

    /// Forget every rule.
    pub async fn reset(&self) {
        let mut store = self.store.lock().await;
        store.reset();
        if let Some(ref writer) = self.writer {
            writer.save(Vec::new());
        }
        info!("🧹 Rules reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str, direct: bool) -> IncomingMessage {
        IncomingMessage {
            text: text.to_string(),
            sender_name: "alice".to_string(),
            room_id: RoomId(-1),
            room_name: "general".to_string(),
            direct,
        }
    }

    #[test]
    fn test_unaddressed_command_is_plain_text_when_named() {
        let mut store = RuleStore::new();
        let text = msg("respond to foo with bar", false);
        let (reply, mutated) = process(&mut store, &text, Some("hubot"));
        assert_eq!(reply, Reply::Silent);
        assert!(!mutated);
        assert!(store.is_empty());
    }

    #[test]
    fn test_addressed_command() {
        let mut store = RuleStore::new();
        let text = msg("@hubot respond to foo with bar", false);
        let (reply, mutated) = process(&mut store, &text, Some("hubot"));
        assert_eq!(reply, Reply::Ack("@alice Respond added".to_string()));
        assert!(mutated);
    }

    #[test]
    fn test_direct_message_needs_no_address() {
        let mut store = RuleStore::new();
        let (reply, _) = process(&mut store, &msg("respond to foo with bar", true), Some("hubot"));
        assert_eq!(reply, Reply::Ack("@alice Respond added".to_string()));
    }

    #[test]
    fn test_without_bot_name_every_message_may_be_a_command() {
        let mut store = RuleStore::new();
        let (reply, _) = process(&mut store, &msg("respond to foo with bar", false), None);
        assert_eq!(reply.text(), Some("@alice Respond added"));
    }

    #[test]
    fn test_addressed_non_command_still_matches() {
        let mut store = RuleStore::new();
        process(&mut store, &msg("@hubot respond to foo with bar", false), Some("hubot"));
        let (reply, mutated) = process(&mut store, &msg("@hubot foo", false), Some("hubot"));
        assert_eq!(reply, Reply::Response("bar".to_string()));
        assert!(!mutated);
    }

    #[test]
    fn test_reply_text() {
        assert_eq!(Reply::Silent.text(), None);
        assert_eq!(Reply::Response("x".to_string()).text(), Some("x"));
    }
}
