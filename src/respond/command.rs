//! Authoring commands and their acknowledgements.
//!
//! Grammar (keywords are case-sensitive, trigger and response are free text):
//!
//! ```text
//! respond to <trigger> with <response>
//! here respond to <trigger> with <response>
//! delete respond to <trigger>
//! from here delete respond to <trigger>
//! list responds
//! ```
//!
//! The trigger ends at the first standalone `with`; everything after it,
//! further `with`s included, is the response.

use tracing::{debug, info};

use crate::respond::error::RespondError;
use crate::respond::rule::{RoomId, Scope};
use crate::respond::store::{RuleStore, Upserted};

/// A parsed authoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upsert { scope: Scope, trigger: String, template: String },
    Delete { scope: Scope, trigger: String },
    List { room: RoomId },
}

/// What applying a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub reply: String,
    /// Whether the store changed and should be persisted.
    pub mutated: bool,
}

/// Remaining command text. Every combinator either consumes a prefix or fails.
#[derive(Debug, Clone, Copy)]
struct Input<'a>(&'a str);

impl<'a> Input<'a> {
    fn new(text: &'a str) -> Self {
        Self(text.trim_start())
    }

    /// Consume `word` plus the whitespace after it. The word must end at
    /// whitespace or at the end of input.
    fn keyword(self, word: &str) -> Option<Self> {
        let rest = self.0.strip_prefix(word)?;
        let trimmed = rest.trim_start();
        (rest.is_empty() || trimmed.len() < rest.len()).then_some(Self(trimmed))
    }

    fn keywords(self, words: &[&str]) -> Option<Self> {
        words.iter().try_fold(self, |input, word| input.keyword(word))
    }

    fn end(self) -> Option<()> {
        self.0.trim().is_empty().then_some(())
    }

    /// All remaining text, trimmed. Fails when nothing is left.
    fn rest(self) -> Option<&'a str> {
        let text = self.0.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Split at the first occurrence of `word` standing between whitespace,
    /// with non-empty text on both sides.
    fn split_on(self, word: &str) -> Option<(&'a str, &'a str)> {
        let text = self.0;
        let mut from = 0;

        while let Some(found) = text[from..].find(word) {
            let at = from + found;
            let end = at + word.len();
            from = end;

            let standalone = text[..at].ends_with(char::is_whitespace)
                && text[end..].starts_with(char::is_whitespace);
            if !standalone {
                continue;
            }

            let (head, tail) = (text[..at].trim(), text[end..].trim());
            if !head.is_empty() && !tail.is_empty() {
                return Some((head, tail));
            }
        }

        None
    }
}

fn upsert(input: Input<'_>, scope: Scope) -> Option<Command> {
    let (trigger, template) = input.keywords(&["respond", "to"])?.split_on("with")?;
    Some(Command::Upsert {
        scope,
        trigger: trigger.to_string(),
        template: template.to_string(),
    })
}

fn delete(input: Input<'_>, scope: Scope) -> Option<Command> {
    let trigger = input.keywords(&["delete", "respond", "to"])?.rest()?;
    Some(Command::Delete { scope, trigger: trigger.to_string() })
}

fn list(input: Input<'_>, room: RoomId) -> Option<Command> {
    input.keywords(&["list", "responds"])?.end()?;
    Some(Command::List { room })
}

/// Parse command text (already stripped of any bot address) sent in `room`.
pub fn parse_command(text: &str, room: RoomId) -> Option<Command> {
    let input = Input::new(text);
    let here = Scope::Room(room);

    upsert(input, Scope::Global)
        .or_else(|| upsert(input.keyword("here")?, here))
        .or_else(|| delete(input, Scope::Global))
        .or_else(|| delete(input.keywords(&["from", "here"])?, here))
        .or_else(|| list(input, room))
}

/// Strip a leading bot address (`@name`, `name:`, `name,` or `name`).
///
/// The name is compared case-insensitively and must be followed by
/// whitespace. Returns the remaining text when the message is addressed.
pub fn strip_address<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let text = text.trim_start();
    let text = text.strip_prefix('@').unwrap_or(text);
    let name = name.trim_start_matches('@');

    let head = text.get(..name.len())?;
    if name.is_empty() || !head.eq_ignore_ascii_case(name) {
        return None;
    }

    let rest = &text[name.len()..];
    let rest = rest.strip_prefix([':', ',']).unwrap_or(rest);
    let trimmed = rest.trim_start();
    (trimmed.len() < rest.len()).then_some(trimmed)
}

impl Command {
    /// Apply the command to `store`, producing the reply for `sender`.
    pub fn apply(self, store: &mut RuleStore, sender: &str) -> Applied {
        match self {
            Self::Upsert { scope, trigger, template } => {
                match store.upsert(scope, &trigger, &template) {
                    Ok(Upserted::Created) => {
                        info!("➕ {} added respond to {:?} ({})", sender, trigger, scope);
                        mutated(format!("@{} Respond added", sender))
                    }
                    Ok(Upserted::Updated) => {
                        info!("✏️ {} updated respond to {:?} ({})", sender, trigger, scope);
                        mutated(format!("@{} Respond updated", sender))
                    }
                    Err(e) => unchanged(error_reply(sender, &e)),
                }
            }
            Self::Delete { scope, trigger } => {
                if store.delete(scope, &trigger) {
                    info!("🗑️ {} deleted respond to {:?} ({})", sender, trigger, scope);
                    mutated(format!("@{} respond to {} deleted", sender, trigger))
                } else {
                    let e = RespondError::RuleNotFound { scope, trigger };
                    debug!("Delete failed: {e}");
                    unchanged(error_reply(sender, &e))
                }
            }
            Self::List { room } => {
                let lines: Vec<String> =
                    store.list(Some(room)).into_iter().map(|r| r.describe()).collect();
                if lines.is_empty() {
                    unchanged(format!("@{} No responds defined", sender))
                } else {
                    unchanged(format!("@{} {}", sender, lines.join("\n")))
                }
            }
        }
    }
}

fn error_reply(sender: &str, error: &RespondError) -> String {
    match error {
        RespondError::InvalidTrigger { .. } => format!("@{} Invalid trigger", sender),
        RespondError::RuleNotFound { trigger, .. } => {
            format!("@{} respond to {} not found", sender, trigger)
        }
    }
}

fn mutated(reply: String) -> Applied {
    Applied { reply, mutated: true }
}

fn unchanged(reply: String) -> Applied {
    Applied { reply, mutated: false }
}
