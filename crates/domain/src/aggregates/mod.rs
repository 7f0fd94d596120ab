//! Aggregate roots - domain objects that own their related data
//!
//! `GameState` is the only aggregate on the player side. It is never
//! field-patched: each reconciliation builds a new one from a draft and,
//! within a session, reconciles it against its predecessor.

mod continuity;
pub mod game_state;

pub use game_state::{
    Capabilities, Character, CharacterDraft, GameState, GameStateDraft, Message, RoundSummary,
    StateRepair, UNKNOWN_WINNER,
};
