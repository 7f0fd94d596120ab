//! Phantom Log player client.
//!
//! Keeps a local, normalized view of a game the remote engine runs, gates
//! player actions by phase, and re-synchronizes after every action.
//!
//! Layers follow the usual ports/adapters split: `ports` declares what the
//! client needs from the outside world, `infrastructure` provides it, and
//! `application` holds the session services. `ui` is the terminal front-end
//! used by the binary.

pub mod application;
pub mod infrastructure;
pub mod ports;
pub mod ui;

pub use application::{
    ActionDispatcher, ClientOptions, DispatchError, GameClient, GameView, ReconcileError,
    ReconciliationLoop, SessionError, SessionManager, SnapshotNormalizer, Trigger, ViewState,
};
pub use infrastructure::config::{ClientConfig, ConfigError};
