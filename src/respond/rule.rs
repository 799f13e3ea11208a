//! Rule data model.

use std::fmt;

/// Opaque chat room identity (the Telegram chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(pub i64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a rule is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Room(RoomId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Room(room) => write!(f, "room {}", room),
        }
    }
}

/// A trigger bound to a response template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Trigger as the author typed it.
    pub trigger: String,
    /// Lookup key, see [`crate::respond::tokenizer::normalize`].
    pub normalized_trigger: String,
    pub response_template: String,
    pub scope: Scope,
    /// Sequence number from first insertion; kept across updates.
    pub created_order: u64,
}

impl Rule {
    /// Number of words the trigger spans in a message.
    pub fn word_count(&self) -> usize {
        self.normalized_trigger.split(' ').count()
    }

    /// Listing line, `respond to <trigger> with <template>`.
    pub fn describe(&self) -> String {
        format!("respond to {} with {}", self.trigger, self.response_template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(trigger: &str, normalized: &str) -> Rule {
        Rule {
            trigger: trigger.to_string(),
            normalized_trigger: normalized.to_string(),
            response_template: "bar".to_string(),
            scope: Scope::Global,
            created_order: 1,
        }
    }

    #[test]
    fn test_word_count() {
        assert_eq!(rule("foo", "foo").word_count(), 1);
        assert_eq!(rule("Good  Morning", "good morning").word_count(), 2);
    }

    #[test]
    fn test_describe_keeps_original_case() {
        assert_eq!(rule("lOrEm", "lorem").describe(), "respond to lOrEm with bar");
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::Global.to_string(), "global");
        assert_eq!(Scope::Room(RoomId(-42)).to_string(), "room -42");
    }
}
