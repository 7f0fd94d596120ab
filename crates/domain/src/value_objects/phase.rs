//! Game phase enum
//!
//! Engine builds name their phases differently ("intro", "user_turn",
//! "free_discussion", ...). Every label reduces to one of four semantic
//! phases, which is all the client ever reasons about.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Semantic game phase
///
/// Exactly one phase is active per snapshot.
///
/// # Examples
///
/// ```
/// use phantomlog_domain::Phase;
///
/// assert_eq!(Phase::from_label("free_discussion"), Some(Phase::Discussion));
/// assert_eq!(Phase::from_label("VOTING"), Some(Phase::Voting));
/// assert_eq!(Phase::from_label("lunch"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Day-time talk; most actions are open
    #[default]
    Discussion,
    /// The adversary acts; players wait
    Night,
    /// Accusation round
    Voting,
    /// Game resolved
    End,
}

impl Phase {
    /// Reduce an engine phase label to a semantic phase.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Returns `None` for labels this client does not recognize.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "discussion" | "intro" | "user_turn" | "one_on_one" | "free_discussion" | "day" => {
                Some(Self::Discussion)
            }
            // Setup runs before the first discussion; nothing is actionable yet.
            "night" | "setup" => Some(Self::Night),
            "voting" | "vote" => Some(Self::Voting),
            "end" | "game_over" | "finished" => Some(Self::End),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discussion => "discussion",
            Self::Night => "night",
            Self::Voting => "voting",
            Self::End => "end",
        }
    }

    /// Night and end accept no player-initiated actions.
    #[inline]
    pub fn is_passive(self) -> bool {
        matches!(self, Self::Night | Self::End)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| DomainError::parse(format!("Unknown phase: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_labels_reduce_to_four_phases() {
        for label in ["discussion", "intro", "user_turn", "one_on_one", "free_discussion"] {
            assert_eq!(Phase::from_label(label), Some(Phase::Discussion), "{label}");
        }
        assert_eq!(Phase::from_label(" Night "), Some(Phase::Night));
        assert_eq!(Phase::from_label("setup"), Some(Phase::Night));
        assert_eq!(Phase::from_label("vote"), Some(Phase::Voting));
        assert_eq!(Phase::from_label("game_over"), Some(Phase::End));
    }

    #[test]
    fn unknown_label_fails_to_parse() {
        let err = "unknown".parse::<Phase>().unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));
    }

    #[test]
    fn passive_phases() {
        assert!(Phase::Night.is_passive());
        assert!(Phase::End.is_passive());
        assert!(!Phase::Discussion.is_passive());
        assert!(!Phase::Voting.is_passive());
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Voting).unwrap(), "\"voting\"");
    }
}
