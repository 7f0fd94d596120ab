//! Engine Port - the remote game engine as seen by the client
//!
//! The engine owns every game rule. The client only starts sessions, reads
//! state snapshots and submits actions; everything else is local.

use std::time::Duration;

use async_trait::async_trait;
use phantomlog_domain::SessionId;
use phantomlog_shared::{ActionCommand, GameStateSnapshot, StartAck};

/// Failure talking to the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The request never produced a response (refused, reset, DNS, ...)
    #[error("Engine request failed: {0}")]
    RequestFailed(String),

    #[error("Engine did not answer within {0:?}")]
    Timeout(Duration),

    /// The engine refused the request (HTTP 4xx)
    #[error("Engine rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The engine failed while handling the request (HTTP 5xx)
    #[error("Engine error ({status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl EngineError {
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            detail: detail.into(),
        }
    }

    /// Whether the engine is unreachable or unusable, as opposed to having
    /// refused this one request.
    pub fn is_connectivity(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Register a new session with the engine.
    async fn start(
        &self,
        session_id: SessionId,
        player_name: Option<String>,
    ) -> Result<StartAck, EngineError>;

    /// Fetch the authoritative state of a session.
    async fn get_state(&self, session_id: SessionId) -> Result<GameStateSnapshot, EngineError>;

    /// Submit one action. Success only acknowledges; callers re-fetch state.
    async fn send_action(
        &self,
        session_id: SessionId,
        command: ActionCommand,
    ) -> Result<(), EngineError>;
}
