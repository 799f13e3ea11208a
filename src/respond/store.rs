//! In-memory rule table keyed by (scope, normalized trigger).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::respond::error::RespondError;
use crate::respond::rule::{RoomId, Rule, Scope};
use crate::respond::tokenizer::normalize;

/// Result of [`RuleStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

/// Owns every rule. At most one rule exists per (scope, normalized trigger).
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: HashMap<Scope, HashMap<String, Rule>>,
    /// Longest trigger per scope, in words. Bounds the matcher's windows.
    longest: HashMap<Scope, usize>,
    next_order: u64,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, or replace the template of the rule already at this key.
    pub fn upsert(
        &mut self,
        scope: Scope,
        trigger: &str,
        template: &str,
    ) -> Result<Upserted, RespondError> {
        let normalized = normalize(trigger);
        if normalized.is_empty() {
            return Err(RespondError::InvalidTrigger { trigger: trigger.to_string() });
        }

        let outcome = match self.rules.entry(scope).or_default().entry(normalized) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().response_template = template.to_string();
                Upserted::Updated
            }
            Entry::Vacant(entry) => {
                self.next_order += 1;
                let normalized_trigger = entry.key().clone();
                entry.insert(Rule {
                    trigger: trigger.trim().to_string(),
                    normalized_trigger,
                    response_template: template.to_string(),
                    scope,
                    created_order: self.next_order,
                });
                Upserted::Created
            }
        };

        self.refresh_longest(scope);
        Ok(outcome)
    }

    /// Remove the rule at (scope, trigger). Returns whether one existed.
    pub fn delete(&mut self, scope: Scope, trigger: &str) -> bool {
        let normalized = normalize(trigger);
        let Some(rules) = self.rules.get_mut(&scope) else {
            return false;
        };

        let removed = rules.remove(&normalized).is_some();
        if rules.is_empty() {
            self.rules.remove(&scope);
        }
        if removed {
            self.refresh_longest(scope);
        }
        removed
    }

    /// Exact lookup by an already-normalized trigger.
    pub fn lookup(&self, scope: Scope, normalized_trigger: &str) -> Option<&Rule> {
        self.rules.get(&scope)?.get(normalized_trigger)
    }

    /// Rules visible from `room` (global plus that room), or every rule when
    /// no room is given, in creation order.
    pub fn list(&self, room: Option<RoomId>) -> Vec<&Rule> {
        let mut visible: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|(scope, _)| match (room, scope) {
                (None, _) | (_, Scope::Global) => true,
                (Some(room), Scope::Room(id)) => room == *id,
            })
            .flat_map(|(_, rules)| rules.values())
            .collect();
        visible.sort_by_key(|rule| rule.created_order);
        visible
    }

    /// Longest trigger in `scope`, in words. Zero when the scope is empty.
    pub fn longest_trigger(&self, scope: Scope) -> usize {
        self.longest.get(&scope).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Drop every rule and restart the sequence.
    pub fn reset(&mut self) {
        self.rules.clear();
        self.longest.clear();
        self.next_order = 0;
    }

    /// Owned copy of every rule in creation order, for persistence.
    pub fn snapshot(&self) -> Vec<Rule> {
        self.list(None).into_iter().cloned().collect()
    }

    /// Replace the contents with previously persisted rules.
    ///
    /// Creation order is kept and new rules continue after the highest one.
    /// Rules with an empty key are skipped; a later duplicate key wins.
    pub fn restore(&mut self, rules: Vec<Rule>) {
        self.reset();

        for rule in rules {
            if rule.normalized_trigger.is_empty() {
                continue;
            }
            self.next_order = self.next_order.max(rule.created_order);
            self.rules
                .entry(rule.scope)
                .or_default()
                .insert(rule.normalized_trigger.clone(), rule);
        }

        let scopes: Vec<Scope> = self.rules.keys().copied().collect();
        for scope in scopes {
            self.refresh_longest(scope);
        }
    }

    fn refresh_longest(&mut self, scope: Scope) {
        let longest = self
            .rules
            .get(&scope)
            .and_then(|rules| rules.values().map(Rule::word_count).max());

        match longest {
            Some(words) => {
                self.longest.insert(scope, words);
            }
            None => {
                self.longest.remove(&scope);
            }
        }
    }
}
