//! Session manager
//!
//! Creates sessions, registers them with the engine and runs the first
//! reconciliation. Restart is the only way out of a failed session; there
//! is no automatic retry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use phantomlog_domain::{Session, SessionId};
use tracing::{info, instrument, warn};

use super::{bounded, ReconciliationLoop};
use crate::application::error::SessionError;
use crate::application::view::Trigger;
use crate::ports::outbound::{ClockPort, EngineError, EnginePort};

pub struct SessionManager {
    engine: Arc<dyn EnginePort>,
    reconciliation: Arc<ReconciliationLoop>,
    clock: Arc<dyn ClockPort>,
    timeout: Duration,
    player_name: Mutex<Option<String>>,
}

impl SessionManager {
    pub fn new(
        engine: Arc<dyn EnginePort>,
        reconciliation: Arc<ReconciliationLoop>,
        clock: Arc<dyn ClockPort>,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            reconciliation,
            clock,
            timeout,
            player_name: Mutex::new(None),
        }
    }

    fn identity(&self) -> MutexGuard<'_, Option<String>> {
        self.player_name
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Identity the current session was started with.
    pub fn player_identity(&self) -> Option<String> {
        self.identity().clone()
    }

    /// Start a fresh session for `player_name`.
    ///
    /// Any previous session is replaced; results still in flight for it
    /// are discarded.
    #[instrument(skip(self))]
    pub async fn start(&self, player_name: &str) -> Result<SessionId, SessionError> {
        let session = Session::new(SessionId::new(), self.clock.now());
        let session_id = session.id;
        *self.identity() = Some(player_name.to_string());
        self.reconciliation.init(session, player_name);

        info!(session_id = %session_id, "Starting session");
        if let Err(e) = bounded(
            self.timeout,
            self.engine.start(session_id, Some(player_name.to_string())),
        )
        .await
        {
            self.reconciliation.mark_failed(session_id, e.to_string());
            return Err(match e {
                EngineError::Rejected { status, detail } => {
                    warn!(session_id = %session_id, status, detail = %detail, "Engine refused to start session");
                    SessionError::EngineRejected { status, detail }
                }
                other => SessionError::Connectivity(other),
            });
        }

        self.reconciliation.reconcile(Trigger::Start).await?;
        Ok(session_id)
    }

    /// Tear down the current session and start a new one with the same
    /// player identity.
    #[instrument(skip(self))]
    pub async fn restart(&self) -> Result<SessionId, SessionError> {
        let player_name = self.player_identity().ok_or(SessionError::NotStarted)?;
        self.reconciliation.teardown();
        info!(player = %player_name, "Restarting session");
        self.start(&player_name).await
    }
}
