//! Action dispatcher
//!
//! Validates player intents locally, sends them to the engine, and
//! re-synchronizes through the reconciliation loop. Only one dispatch may
//! be in flight; a second one fails fast with `Busy`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use phantomlog_domain::{ActionIntent, ActionKind, PhaseGate, ValidationError};
use phantomlog_shared::{address, ActionCommand, WireActionType};
use tracing::{info, instrument, warn};

use super::{bounded, ReconciliationLoop};
use crate::application::error::DispatchError;
use crate::application::view::{GameView, Trigger};
use crate::ports::outbound::{EngineError, EnginePort};

/// Serialize an intent into the engine's action protocol.
///
/// One-on-one chat has no wire action of its own: it travels as chat with
/// an address tag in the content and the recipient in `target`.
pub fn encode_intent(intent: &ActionIntent) -> Result<ActionCommand, ValidationError> {
    let kind = intent.kind;
    let target = || {
        intent
            .target()
            .ok_or_else(|| ValidationError::missing_target(kind))
    };
    let content = || {
        intent
            .content()
            .ok_or_else(|| ValidationError::empty_content(kind))
    };

    let command = match kind {
        ActionKind::Chat => ActionCommand::new(WireActionType::Chat).with_content(content()?),
        ActionKind::OneOnOne => {
            let recipient = target()?;
            ActionCommand::new(WireActionType::Chat)
                .with_content(address(recipient, content()?))
                .with_target(recipient)
        }
        ActionKind::Suspect => ActionCommand::new(WireActionType::Suspect).with_target(target()?),
        ActionKind::Vote => ActionCommand::new(WireActionType::Vote).with_target(target()?),
        ActionKind::Advance => ActionCommand::new(WireActionType::Next),
    };
    Ok(command)
}

/// Clears the in-flight flag when the dispatch ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ActionDispatcher {
    engine: Arc<dyn EnginePort>,
    reconciliation: Arc<ReconciliationLoop>,
    timeout: Duration,
    in_flight: AtomicBool,
}

impl ActionDispatcher {
    pub fn new(
        engine: Arc<dyn EnginePort>,
        reconciliation: Arc<ReconciliationLoop>,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            reconciliation,
            timeout,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, send and re-synchronize one intent.
    ///
    /// Returns the view reconciled after the engine accepted the action.
    #[instrument(skip_all, fields(action = ?intent.kind))]
    pub async fn dispatch(&self, intent: ActionIntent) -> Result<Arc<GameView>, DispatchError> {
        let _in_flight = InFlight::acquire(&self.in_flight).ok_or(DispatchError::Busy)?;

        let session = self
            .reconciliation
            .session()
            .ok_or(DispatchError::NoSession)?;
        if self.reconciliation.is_failed() {
            return Err(DispatchError::RestartRequired);
        }
        let view = self
            .reconciliation
            .current()
            .ok_or(DispatchError::NotReady)?;

        intent.validate_fields()?;
        PhaseGate::for_state(&view.state).check(intent.kind, intent.target())?;
        let command = encode_intent(&intent)?;

        info!(
            session_id = %session.id,
            action_type = %command.action_type,
            character = command.target.as_deref().unwrap_or(""),
            "Dispatching action"
        );

        if let Err(e) = bounded(
            self.timeout,
            self.engine.send_action(session.id, command),
        )
        .await
        {
            return Err(match e {
                EngineError::Rejected { status, detail } => {
                    warn!(session_id = %session.id, status, detail = %detail, "Engine rejected action");
                    DispatchError::EngineRejected { status, detail }
                }
                other => {
                    self.reconciliation.mark_failed(session.id, other.to_string());
                    DispatchError::Connectivity(other)
                }
            });
        }

        let view = self
            .reconciliation
            .reconcile(Trigger::Dispatch(intent.kind))
            .await?;

        if intent.kind.is_terminal() && !view.state.is_game_over() {
            let target = intent.target().unwrap_or_default().to_string();
            warn!(session_id = %session.id, character = %target, "Vote did not resolve the game");
            return Err(DispatchError::VoteUnresolved { target });
        }

        Ok(view)
    }
}
