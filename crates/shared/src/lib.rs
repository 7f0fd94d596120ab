//! Phantom Log Protocol - Wire types for talking to the game engine
//!
//! This crate contains the HTTP contract between the player client and the
//! engine:
//! - Request bodies for starting a game and sending actions
//! - The raw state snapshot the engine returns
//! - The one-on-one addressing convention carried inside chat text
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain types** - snapshots stay loose JSON until normalized

pub mod addressing;
pub mod requests;
pub mod responses;

pub use addressing::{address, parse_addressed};
pub use requests::{ActionCommand, ActionRequest, StartGameRequest, WireActionType};
pub use responses::{EngineErrorBody, GameStateSnapshot, StartAck};
