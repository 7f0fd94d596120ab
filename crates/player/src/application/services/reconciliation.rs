//! Reconciliation loop
//!
//! Sole owner of the active session's state. Each run fetches a snapshot,
//! normalizes it, carries session continuity forward, derives a `GameView`
//! and publishes it on a watch channel.
//!
//! Fetches may overlap (a manual refresh racing a post-dispatch re-fetch).
//! Every fetch takes a ticket when it is issued, and a result is applied
//! only if its ticket is newer than the last one applied. Results for a
//! session that has since been replaced are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use phantomlog_domain::{Session, SessionId, SuspicionScale};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use super::{bounded, Normalized, SnapshotNormalizer};
use crate::application::error::ReconcileError;
use crate::application::view::{GameView, Trigger, ViewState};
use crate::ports::outbound::EnginePort;

struct ActiveSession {
    session: Session,
    normalizer: SnapshotNormalizer,
    current: Option<Arc<GameView>>,
    last_applied: u64,
    failure: Option<String>,
}

pub struct ReconciliationLoop {
    engine: Arc<dyn EnginePort>,
    system_name: String,
    player_aliases: Vec<String>,
    scale: SuspicionScale,
    timeout: Duration,
    next_ticket: AtomicU64,
    active: Mutex<Option<ActiveSession>>,
    views: watch::Sender<ViewState>,
}

impl ReconciliationLoop {
    pub fn new(
        engine: Arc<dyn EnginePort>,
        system_name: impl Into<String>,
        scale: SuspicionScale,
        timeout: Duration,
    ) -> Self {
        let (views, _) = watch::channel(ViewState::Idle);
        Self {
            engine,
            system_name: system_name.into(),
            player_aliases: Vec::new(),
            scale,
            timeout,
            next_ticket: AtomicU64::new(0),
            active: Mutex::new(None),
            views,
        }
    }

    /// Sender names besides the player's own that count as the player.
    pub fn with_player_aliases(mut self, aliases: Vec<String>) -> Self {
        self.player_aliases = aliases;
        self
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: ViewState) {
        self.views.send_replace(state);
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.views.subscribe()
    }

    /// Snapshot of what is currently published.
    pub fn view_state(&self) -> ViewState {
        self.views.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.active().as_ref().map(|a| a.session.clone())
    }

    pub fn current(&self) -> Option<Arc<GameView>> {
        self.active().as_ref().and_then(|a| a.current.clone())
    }

    pub fn is_failed(&self) -> bool {
        self.active()
            .as_ref()
            .is_some_and(|a| a.failure.is_some())
    }

    /// Begin tracking a new session, dropping anything held for the old one.
    pub fn init(&self, session: Session, player_name: &str) {
        info!(session_id = %session.id, player = player_name, "Session initialized");
        *self.active() = Some(ActiveSession {
            normalizer: SnapshotNormalizer::new(player_name, self.system_name.clone())
                .with_player_aliases(self.player_aliases.iter().cloned()),
            session,
            current: None,
            // Tickets issued before this point belong to older sessions.
            last_applied: self.next_ticket.load(Ordering::SeqCst),
            failure: None,
        });
        self.publish(ViewState::Idle);
    }

    /// Forget the active session.
    pub fn teardown(&self) {
        if let Some(old) = self.active().take() {
            info!(session_id = %old.session.id, "Session torn down");
        }
        self.publish(ViewState::Idle);
    }

    /// Mark the session unusable after a connectivity failure.
    ///
    /// Ignored if `session_id` is no longer the active session.
    pub fn mark_failed(&self, session_id: SessionId, reason: impl Into<String>) {
        let reason = reason.into();
        let last = {
            let mut guard = self.active();
            let Some(active) = guard.as_mut().filter(|a| a.session.id == session_id) else {
                debug!(session_id = %session_id, "Ignoring failure for replaced session");
                return;
            };
            active.failure = Some(reason.clone());
            active.current.clone()
        };

        error!(session_id = %session_id, reason = %reason, "Lost connection to the engine");
        self.publish(ViewState::Failed { last, reason });
    }

    /// Fetch, normalize and publish the active session's state.
    ///
    /// If a newer fetch has already been applied, this result is discarded
    /// and the newer view is returned instead.
    #[instrument(skip_all, fields(trigger = %trigger))]
    pub async fn reconcile(&self, trigger: Trigger) -> Result<Arc<GameView>, ReconcileError> {
        let session = {
            let guard = self.active();
            let active = guard.as_ref().ok_or(ReconcileError::NoSession)?;
            if active.failure.is_some() {
                return Err(ReconcileError::RestartRequired);
            }
            active.session.clone()
        };
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(session_id = %session.id, ticket, "Fetching state");

        let fetched = bounded(self.timeout, self.engine.get_state(session.id)).await;

        let mut guard = self.active();
        let active = match guard.as_mut() {
            Some(active) if active.session.id == session.id => active,
            _ => {
                debug!(session_id = %session.id, ticket, "Discarding result for replaced session");
                return Err(ReconcileError::Superseded(session.id));
            }
        };

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let stale = ticket <= active.last_applied;
                drop(guard);
                if e.is_connectivity() && !stale {
                    self.mark_failed(session.id, e.to_string());
                } else {
                    warn!(session_id = %session.id, ticket, error = %e, "State fetch failed");
                }
                return Err(ReconcileError::from_engine(e));
            }
        };

        // Another fetch failed while this one was in flight.
        if active.failure.is_some() {
            return Err(ReconcileError::RestartRequired);
        }

        if ticket <= active.last_applied {
            debug!(
                session_id = %session.id,
                ticket,
                last_applied = active.last_applied,
                "Discarding out-of-order state"
            );
            return active
                .current
                .clone()
                .ok_or(ReconcileError::Superseded(session.id));
        }

        let Normalized { state, mut issues } =
            active.normalizer.normalize(session.clone(), &snapshot);
        let state = match &active.current {
            Some(previous) => {
                let (state, repairs) = state.carry_forward(&previous.state);
                issues.extend(repairs.into_iter().map(Into::into));
                state
            }
            None => state,
        };
        for issue in &issues {
            warn!(session_id = %session.id, ticket, issue = %issue, "Corrected engine snapshot");
        }

        let view = Arc::new(GameView::derive(state, &self.scale, ticket));
        active.current = Some(view.clone());
        active.last_applied = ticket;
        drop(guard);

        info!(
            session_id = %session.id,
            ticket,
            round = view.state.round_number(),
            phase = %view.state.phase(),
            messages = view.state.messages().len(),
            "State reconciled"
        );
        self.publish(ViewState::Live(view.clone()));
        Ok(view)
    }
}
