//! Game client facade
//!
//! Wires the session services around one engine and exposes the handful
//! of operations a front-end needs.

use std::sync::Arc;
use std::time::Duration;

use phantomlog_domain::{ActionIntent, SessionId, SuspicionScale};
use tokio::sync::watch;

use super::error::{DispatchError, ReconcileError, SessionError};
use super::services::{ActionDispatcher, ReconciliationLoop, SessionManager};
use super::view::{GameView, Trigger, ViewState};
use crate::ports::outbound::{ClockPort, EnginePort};

/// Application-level settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Sender name the engine uses for narration
    pub system_name: String,
    /// Sender names the engine uses for the player's own lines
    pub player_aliases: Vec<String>,
    pub suspicion_scale: SuspicionScale,
    /// Upper bound on every engine call
    pub request_timeout: Duration,
}

pub struct GameClient {
    reconciliation: Arc<ReconciliationLoop>,
    sessions: SessionManager,
    dispatcher: ActionDispatcher,
}

impl GameClient {
    pub fn new(
        engine: Arc<dyn EnginePort>,
        clock: Arc<dyn ClockPort>,
        options: ClientOptions,
    ) -> Self {
        let reconciliation = Arc::new(ReconciliationLoop::new(
            engine.clone(),
            options.system_name,
            options.suspicion_scale,
            options.request_timeout,
        )
        .with_player_aliases(options.player_aliases));
        let sessions = SessionManager::new(
            engine.clone(),
            reconciliation.clone(),
            clock,
            options.request_timeout,
        );
        let dispatcher =
            ActionDispatcher::new(engine, reconciliation.clone(), options.request_timeout);

        Self {
            reconciliation,
            sessions,
            dispatcher,
        }
    }

    pub async fn start(&self, player_name: &str) -> Result<SessionId, SessionError> {
        self.sessions.start(player_name).await
    }

    pub async fn restart(&self) -> Result<SessionId, SessionError> {
        self.sessions.restart().await
    }

    pub async fn dispatch(&self, intent: ActionIntent) -> Result<Arc<GameView>, DispatchError> {
        self.dispatcher.dispatch(intent).await
    }

    pub async fn refresh(&self) -> Result<Arc<GameView>, ReconcileError> {
        self.reconciliation.reconcile(Trigger::Refresh).await
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.reconciliation.subscribe()
    }

    pub fn view_state(&self) -> ViewState {
        self.reconciliation.view_state()
    }

    pub fn current_view(&self) -> Option<Arc<GameView>> {
        self.reconciliation.current()
    }

    pub fn player_identity(&self) -> Option<String> {
        self.sessions.player_identity()
    }
}
