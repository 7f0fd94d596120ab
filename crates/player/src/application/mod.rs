//! Application layer - session services built on the outbound ports

mod client;
pub mod error;
pub mod services;
pub mod view;

pub use client::{ClientOptions, GameClient};
pub use error::{DispatchError, ReconcileError, SessionError};
pub use services::{
    ActionDispatcher, Normalized, PayloadIssue, ReconciliationLoop, SessionManager,
    SnapshotNormalizer,
};
pub use view::{GameView, Trigger, ViewState};
