//! Application error types
//!
//! Every error ends the current operation only. Connectivity failures also
//! move the published view to `Failed`, after which only a restart helps.

use phantomlog_domain::{SessionId, ValidationError};
use thiserror::Error;

use crate::ports::outbound::EngineError;

/// Failure to reconcile local state with the engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("No session has been started")]
    NoSession,

    #[error("The session lost its connection to the engine; restart to continue")]
    RestartRequired,

    #[error("Lost connection to the game engine: {0}")]
    Connectivity(EngineError),

    #[error("Engine rejected the request ({status}): {detail}")]
    EngineRejected { status: u16, detail: String },

    /// The session was replaced while its state was in flight
    #[error("Session {0} was replaced before its state arrived")]
    Superseded(SessionId),
}

impl ReconcileError {
    pub(crate) fn from_engine(error: EngineError) -> Self {
        match error {
            EngineError::Rejected { status, detail } => Self::EngineRejected { status, detail },
            other => Self::Connectivity(other),
        }
    }
}

/// Failure to dispatch a player action
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid action: {0}")]
    InvalidAction(#[from] ValidationError),

    #[error("Another action is still in progress")]
    Busy,

    #[error("No session has been started")]
    NoSession,

    /// The session exists but no state has been reconciled yet
    #[error("The game state has not loaded yet")]
    NotReady,

    #[error("The session lost its connection to the engine; restart to continue")]
    RestartRequired,

    #[error("Lost connection to the game engine: {0}")]
    Connectivity(EngineError),

    #[error("Engine rejected the request ({status}): {detail}")]
    EngineRejected { status: u16, detail: String },

    #[error("Vote against {target} was accepted but the game did not end")]
    VoteUnresolved { target: String },

    #[error("Session {0} was replaced before its state arrived")]
    Superseded(SessionId),
}

impl From<ReconcileError> for DispatchError {
    fn from(error: ReconcileError) -> Self {
        match error {
            ReconcileError::NoSession => Self::NoSession,
            ReconcileError::RestartRequired => Self::RestartRequired,
            ReconcileError::Connectivity(e) => Self::Connectivity(e),
            ReconcileError::EngineRejected { status, detail } => {
                Self::EngineRejected { status, detail }
            }
            ReconcileError::Superseded(id) => Self::Superseded(id),
        }
    }
}

/// Failure to start or restart a session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No session to restart; start one first")]
    NotStarted,

    #[error("Could not reach the game engine: {0}")]
    Connectivity(EngineError),

    #[error("Engine refused to start the session ({status}): {detail}")]
    EngineRejected { status: u16, detail: String },

    #[error("Session started but its state could not be loaded: {0}")]
    Reconcile(#[from] ReconcileError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use phantomlog_domain::ActionKind;

    #[test]
    fn engine_errors_split_into_rejection_and_connectivity() {
        assert_eq!(
            ReconcileError::from_engine(EngineError::rejected(404, "Game session not found")),
            ReconcileError::EngineRejected {
                status: 404,
                detail: "Game session not found".into()
            }
        );
        assert!(matches!(
            ReconcileError::from_engine(EngineError::RequestFailed("refused".into())),
            ReconcileError::Connectivity(_)
        ));
    }

    #[test]
    fn validation_errors_convert_into_dispatch_errors() {
        let err: DispatchError = ValidationError::missing_target(ActionKind::Suspect).into();
        assert_eq!(
            err.to_string(),
            "Invalid action: suspect requires a target character"
        );
    }
}
