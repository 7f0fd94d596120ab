//! Phantom Log domain layer.
//!
//! Pure types and rules for the player side of a social-deduction game:
//! the normalized `GameState` aggregate, its invariants, and the `PhaseGate`
//! that decides which player actions are legal. Nothing in here performs I/O.

pub mod aggregates;
pub mod error;
pub mod ids;
pub mod phase_gate;
pub mod session;
pub mod value_objects;

pub use aggregates::{
    Capabilities, Character, CharacterDraft, GameState, GameStateDraft, Message, RoundSummary,
    StateRepair, UNKNOWN_WINNER,
};
pub use error::{DomainError, ValidationError};
pub use ids::SessionId;
pub use phase_gate::{allowed_actions, PhaseGate};
pub use session::Session;
pub use value_objects::{
    ActionIntent, ActionKind, ActionSet, MessageKind, Phase, SuspicionScale, SuspicionTier,
};
