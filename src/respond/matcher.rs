//! Picks the rule a message fires.
//!
//! Room rules are tried across the whole message before any global rule, so a
//! room's own customization is never shadowed by a global default. Within a
//! scope the leftmost match wins; at the same position the longer trigger wins.

use crate::respond::rule::{RoomId, Rule, Scope};
use crate::respond::store::RuleStore;
use crate::respond::tokenizer::Token;

/// Find the rule fired by `tokens` in `room`, if any.
pub fn find_match<'a>(store: &'a RuleStore, tokens: &[Token], room: RoomId) -> Option<&'a Rule> {
    scan(store, tokens, Scope::Room(room)).or_else(|| scan(store, tokens, Scope::Global))
}

fn scan<'a>(store: &'a RuleStore, tokens: &[Token], scope: Scope) -> Option<&'a Rule> {
    let longest = store.longest_trigger(scope);
    if longest == 0 {
        return None;
    }

    for start in 0..tokens.len() {
        let widest = longest.min(tokens.len() - start);
        for width in (1..=widest).rev() {
            let window = tokens[start..start + width]
                .iter()
                .map(|t| t.normalized.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(rule) = store.lookup(scope, &window) {
                return Some(rule);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::respond::tokenizer::tokenize;

    const ROOM_A: RoomId = RoomId(-1);
    const ROOM_B: RoomId = RoomId(-2);

    fn response<'a>(store: &'a RuleStore, message: &str, room: RoomId) -> Option<&'a str> {
        find_match(store, &tokenize(message), room).map(|r| r.response_template.as_str())
    }

    #[test]
    fn test_whole_token_only() {
        let mut store = RuleStore::new();
        store.upsert(Scope::Global, "foo", "bar").unwrap();

        assert_eq!(response(&store, "foo", ROOM_A), Some("bar"));
        assert_eq!(
            response(&store, "This is a message, where the foo text is embedded somewhere", ROOM_A),
            Some("bar")
        );
        assert_eq!(
            response(
                &store,
                "This is a message, where the fooish text is embedded somewhere",
                ROOM_A
            ),
            None
        );
    }

    #[test]
    fn test_case_insensitive() {
        let mut store = RuleStore::new();
        store.upsert(Scope::Global, "lorem", "ipsum").unwrap();
        assert_eq!(response(&store, "LoReM", ROOM_A), Some("ipsum"));
        assert_eq!(response(&store, "lOrEm!", ROOM_A), Some("ipsum"));
    }

    #[test]
    fn test_symbol_trigger() {
        let mut store = RuleStore::new();
        store.upsert(Scope::Global, "❇", "flower").unwrap();
        assert_eq!(response(&store, "❇", ROOM_A), Some("flower"));
        assert_eq!(response(&store, "-❇\"", ROOM_A), Some("flower"));
    }

    #[test]
    fn test_room_rule_wins_anywhere_in_message() {
        let mut store = RuleStore::new();
        store.upsert(Scope::Global, "hello", "global").unwrap();
        store.upsert(Scope::Room(ROOM_A), "world", "room").unwrap();

        assert_eq!(response(&store, "hello world", ROOM_A), Some("room"));
        assert_eq!(response(&store, "hello world", ROOM_B), Some("global"));
    }

    #[test]
    fn test_falls_back_to_global_when_room_rules_miss() {
        let mut store = RuleStore::new();
        store.upsert(Scope::Global, "helo", "Helo0").unwrap();
        store.upsert(Scope::Room(ROOM_A), "other", "unrelated").unwrap();

        assert_eq!(response(&store, "helo", ROOM_A), Some("Helo0"));
    }

    #[test]
    fn test_first_token_wins_within_scope() {
        let mut store = RuleStore::new();
        store.upsert(Scope::Global, "second", "2").unwrap();
        store.upsert(Scope::Global, "first", "1").unwrap();
        assert_eq!(response(&store, "first then second", ROOM_A), Some("1"));
        assert_eq!(response(&store, "second then first", ROOM_A), Some("2"));
    }

    #[test]
    fn test_multi_word_trigger() {
        let mut store = RuleStore::new();
        store.upsert(Scope::Global, "good morning", "coffee?").unwrap();

        assert_eq!(response(&store, "Well, GOOD morning everyone", ROOM_A), Some("coffee?"));
        assert_eq!(response(&store, "good evening, morning people", ROOM_A), None);
        assert_eq!(response(&store, "good", ROOM_A), None);
    }

    #[test]
    fn test_longer_trigger_wins_at_same_position() {
        let mut store = RuleStore::new();
        store.upsert(Scope::Global, "good", "short").unwrap();
        store.upsert(Scope::Global, "good morning", "long").unwrap();

        assert_eq!(response(&store, "good morning", ROOM_A), Some("long"));
        assert_eq!(response(&store, "good night", ROOM_A), Some("short"));
    }

    #[test]
    fn test_no_rules_no_match() {
        let store = RuleStore::new();
        assert_eq!(response(&store, "anything at all", ROOM_A), None);
        assert_eq!(response(&store, "", ROOM_A), None);
    }
}
