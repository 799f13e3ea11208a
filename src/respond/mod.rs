//! Respond module - user-defined trigger/response rules for chat rooms.

pub mod command;
pub mod database;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod persist;
pub mod rule;
pub mod store;
pub mod telegram;
pub mod template;
pub mod tokenizer;


pub use command::{parse_command, Command};
pub use database::RuleDatabase;
pub use engine::{IncomingMessage, OutboundSender, Reply, RespondEngine};
pub use error::RespondError;
pub use persist::{RuleRepository, RuleWriter};
pub use rule::{RoomId, Rule, Scope};
pub use store::{RuleStore, Upserted};
pub use telegram::TelegramSender;
