//! Player action kinds and intents
//!
//! One enumeration covers every action surface (public chat, addressed
//! one-on-one chat, suspicion, vote, and the explicit "proceed" signal), so
//! gating and serialization each live in exactly one table.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ValidationError};

/// Kind of player-initiated action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Public chat to everyone at the table
    Chat,
    /// Chat addressed to a single character
    OneOnOne,
    /// Raise suspicion against a character
    Suspect,
    /// Accuse a character; resolves the game
    Vote,
    /// Ask the engine to move on
    Advance,
}

/// Set of permitted action kinds, ordered for stable display.
pub type ActionSet = BTreeSet<ActionKind>;

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Chat,
        ActionKind::OneOnOne,
        ActionKind::Suspect,
        ActionKind::Vote,
        ActionKind::Advance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::OneOnOne => "one_on_one",
            Self::Suspect => "suspect",
            Self::Vote => "vote",
            Self::Advance => "advance",
        }
    }

    /// Actions aimed at a specific, living character.
    #[inline]
    pub fn requires_target(self) -> bool {
        matches!(self, Self::OneOnOne | Self::Suspect | Self::Vote)
    }

    /// Actions that carry free text.
    #[inline]
    pub fn requires_content(self) -> bool {
        matches!(self, Self::Chat | Self::OneOnOne)
    }

    /// Chat-family actions share the voting-phase capability switch.
    #[inline]
    pub fn is_chat(self) -> bool {
        matches!(self, Self::Chat | Self::OneOnOne)
    }

    /// A successful terminal action is expected to end the game.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Vote)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "one_on_one" | "whisper" => Ok(Self::OneOnOne),
            "suspect" => Ok(Self::Suspect),
            "vote" => Ok(Self::Vote),
            "advance" | "next" => Ok(Self::Advance),
            _ => Err(DomainError::parse(format!("Unknown action: {}", s))),
        }
    }
}

/// A player's request to act, before it is validated or serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionIntent {
    pub kind: ActionKind,
    pub target: Option<String>,
    pub content: Option<String>,
}

impl ActionIntent {
    pub fn new(kind: ActionKind, target: Option<String>, content: Option<String>) -> Self {
        Self {
            kind,
            target,
            content,
        }
    }

    pub fn chat(text: impl Into<String>) -> Self {
        Self::new(ActionKind::Chat, None, Some(text.into()))
    }

    pub fn one_on_one(recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            ActionKind::OneOnOne,
            Some(recipient.into()),
            Some(text.into()),
        )
    }

    pub fn suspect(target: impl Into<String>) -> Self {
        Self::new(ActionKind::Suspect, Some(target.into()), None)
    }

    pub fn vote(target: impl Into<String>) -> Self {
        Self::new(ActionKind::Vote, Some(target.into()), None)
    }

    pub fn advance() -> Self {
        Self::new(ActionKind::Advance, None, None)
    }

    /// Target with surrounding whitespace removed; blank counts as absent.
    pub fn target(&self) -> Option<&str> {
        self.target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Text with surrounding whitespace removed; blank counts as absent.
    pub fn content(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Check the fields the action kind requires.
    ///
    /// This only looks at the intent itself; whether the phase and the
    /// target's liveness allow it is the `PhaseGate`'s call.
    pub fn validate_fields(&self) -> Result<(), ValidationError> {
        if self.kind.requires_target() && self.target().is_none() {
            return Err(ValidationError::missing_target(self.kind));
        }
        if self.kind.requires_content() && self.content().is_none() {
            return Err(ValidationError::empty_content(self.kind));
        }
        Ok(())
    }
}
