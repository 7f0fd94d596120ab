//! Game state aggregate
//!
//! # Invariants
//!
//! - Every key of `suspicion_by_name` / `alive_by_name` names a character
//!   in the roster, and every character has an entry in both maps.
//! - `game_over` is true iff `winner_name` is set, and then `phase` is
//!   `Phase::End`.
//! - Character names are unique.
//!
//! These hold by construction: the only way to obtain a `GameState` is
//! [`GameState::from_draft`], which repairs whatever the draft gets wrong
//! and reports each repair as a [`StateRepair`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::value_objects::{MessageKind, Phase};

/// Winner placeholder used when the engine ends the game without naming one.
pub const UNKNOWN_WINNER: &str = "Unknown";

/// A participant in the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub job: String,
    pub alive: bool,
    pub suspicion: u32,
}

/// One transcript line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub text: String,
    pub kind: MessageKind,
    /// Set when the line was addressed to a single character
    pub recipient_hint: Option<String>,
}

impl Message {
    pub fn new(sender: impl Into<String>, text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            kind,
            recipient_hint: None,
        }
    }

    pub fn addressed_to(mut self, recipient: impl Into<String>) -> Self {
        self.recipient_hint = Some(recipient.into());
        self
    }

    #[inline]
    pub fn is_addressed(&self) -> bool {
        self.recipient_hint.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_number: u32,
    pub text: String,
}

/// Engine-declared capability flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Public chat stays open while voting
    pub chat_during_voting: bool,
}

/// Character entry as read from a snapshot, before invariants are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterDraft {
    pub name: String,
    pub job: String,
    /// Liveness carried on the character itself, if any
    pub alive: Option<bool>,
    /// Suspicion carried on the character itself, if any
    pub suspicion: Option<u32>,
}

/// Loosely assembled state, as produced by snapshot normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameStateDraft {
    pub round_number: u32,
    pub phase: Phase,
    pub characters: Vec<CharacterDraft>,
    pub messages: Vec<Message>,
    pub clues: Vec<String>,
    pub suspicion_by_name: BTreeMap<String, u32>,
    pub alive_by_name: BTreeMap<String, bool>,
    pub night_logs: Vec<String>,
    pub round_summaries: BTreeMap<u32, String>,
    pub game_over: bool,
    pub winner_name: Option<String>,
    pub capabilities: Capabilities,
}

/// A correction applied while enforcing invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateRepair {
    #[error("character entry without a name was dropped")]
    UnnamedCharacter,
    #[error("duplicate character {0} was dropped")]
    DuplicateCharacter(String),
    #[error("suspicion entry for unknown character {0} was dropped")]
    OrphanSuspicion(String),
    #[error("liveness entry for unknown character {0} was dropped")]
    OrphanLiveness(String),
    #[error("game ended without a winner name")]
    MissingWinner,
    #[error("roster change ignored (added: {added:?}, missing: {missing:?})")]
    RosterChanged {
        added: Vec<String>,
        missing: Vec<String>,
    },
    #[error("{0} was reported alive again after dying")]
    Resurrection(String),
    #[error("transcript shrank from {previous} to {received} messages; kept the longer one")]
    TranscriptShrank { previous: usize, received: usize },
    #[error("summary for round {0} changed after it was recorded")]
    RoundSummaryRewritten(u32),
    #[error("round number went backwards from {previous} to {received}")]
    RoundRegressed { previous: u32, received: u32 },
}

/// Normalized, invariant-respecting view of one authoritative snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    pub(crate) session: Session,
    pub(crate) round_number: u32,
    pub(crate) phase: Phase,
    pub(crate) characters: Vec<Character>,
    pub(crate) messages: Vec<Message>,
    pub(crate) clues: Vec<String>,
    pub(crate) suspicion_by_name: BTreeMap<String, u32>,
    pub(crate) alive_by_name: BTreeMap<String, bool>,
    pub(crate) night_logs: Vec<String>,
    pub(crate) round_summaries: BTreeMap<u32, RoundSummary>,
    pub(crate) game_over: bool,
    pub(crate) winner_name: Option<String>,
    pub(crate) capabilities: Capabilities,
}

impl GameState {
    /// Build a state from a draft, repairing anything that would break an
    /// invariant.
    ///
    /// Liveness and suspicion come from the draft's maps first, then from
    /// the character entry itself, then default to alive with no suspicion.
    pub fn from_draft(session: Session, draft: GameStateDraft) -> (Self, Vec<StateRepair>) {
        let mut repairs = Vec::new();

        let mut seen = BTreeSet::new();
        let mut roster = Vec::with_capacity(draft.characters.len());
        for entry in draft.characters {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                repairs.push(StateRepair::UnnamedCharacter);
                continue;
            }
            if !seen.insert(name.clone()) {
                repairs.push(StateRepair::DuplicateCharacter(name));
                continue;
            }
            roster.push(CharacterDraft { name, ..entry });
        }

        for name in draft.suspicion_by_name.keys() {
            if !seen.contains(name) {
                repairs.push(StateRepair::OrphanSuspicion(name.clone()));
            }
        }
        for name in draft.alive_by_name.keys() {
            if !seen.contains(name) {
                repairs.push(StateRepair::OrphanLiveness(name.clone()));
            }
        }

        let characters: Vec<Character> = roster
            .into_iter()
            .map(|entry| Character {
                alive: draft
                    .alive_by_name
                    .get(&entry.name)
                    .copied()
                    .or(entry.alive)
                    .unwrap_or(true),
                suspicion: draft
                    .suspicion_by_name
                    .get(&entry.name)
                    .copied()
                    .or(entry.suspicion)
                    .unwrap_or(0),
                name: entry.name,
                job: entry.job,
            })
            .collect();

        let winner_name = draft
            .winner_name
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
        let ended = draft.game_over || draft.phase == Phase::End || winner_name.is_some();
        let (phase, game_over, winner_name) = if ended {
            let winner = winner_name.unwrap_or_else(|| {
                repairs.push(StateRepair::MissingWinner);
                UNKNOWN_WINNER.to_string()
            });
            (Phase::End, true, Some(winner))
        } else {
            (draft.phase, false, None)
        };

        let round_summaries = draft
            .round_summaries
            .into_iter()
            .map(|(round_number, text)| (round_number, RoundSummary { round_number, text }))
            .collect();

        let mut state = Self {
            session,
            round_number: draft.round_number.max(1),
            phase,
            characters,
            messages: draft.messages,
            clues: draft.clues,
            suspicion_by_name: BTreeMap::new(),
            alive_by_name: BTreeMap::new(),
            night_logs: draft.night_logs,
            round_summaries,
            game_over,
            winner_name,
            capabilities: draft.capabilities,
        };
        state.rebuild_status_maps();

        (state, repairs)
    }

    pub(crate) fn rebuild_status_maps(&mut self) {
        self.suspicion_by_name = self
            .characters
            .iter()
            .map(|c| (c.name.clone(), c.suspicion))
            .collect();
        self.alive_by_name = self
            .characters
            .iter()
            .map(|c| (c.name.clone(), c.alive))
            .collect();
    }

    // =========================================================================
    // Accessors (read-only)
    // =========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clues(&self) -> &[String] {
        &self.clues
    }

    pub fn suspicion_by_name(&self) -> &BTreeMap<String, u32> {
        &self.suspicion_by_name
    }

    pub fn alive_by_name(&self) -> &BTreeMap<String, bool> {
        &self.alive_by_name
    }

    pub fn night_logs(&self) -> &[String] {
        &self.night_logs
    }

    pub fn round_summaries(&self) -> &BTreeMap<u32, RoundSummary> {
        &self.round_summaries
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner_name.as_deref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// `Some(alive)` for a known character, `None` for an unknown name.
    pub fn is_alive(&self, name: &str) -> Option<bool> {
        self.alive_by_name.get(name).copied()
    }

    pub fn alive_names(&self) -> impl Iterator<Item = &str> {
        self.characters
            .iter()
            .filter(|c| c.alive)
            .map(|c| c.name.as_str())
    }

    pub fn dead_names(&self) -> impl Iterator<Item = &str> {
        self.characters
            .iter()
            .filter(|c| !c.alive)
            .map(|c| c.name.as_str())
    }
}
