//! Errors surfaced by rule management.

use std::fmt;

use crate::respond::rule::Scope;

/// Rule management failures. Both are turned into chat replies, never faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespondError {
    /// The trigger has no words left after normalization.
    InvalidTrigger { trigger: String },
    /// Delete targeted a (scope, trigger) with no rule.
    RuleNotFound { scope: Scope, trigger: String },
}

impl fmt::Display for RespondError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTrigger { trigger } => write!(f, "invalid trigger '{}'", trigger),
            Self::RuleNotFound { scope, trigger } => {
                write!(f, "no {} rule for trigger '{}'", scope, trigger)
            }
        }
    }
}

impl std::error::Error for RespondError {}
