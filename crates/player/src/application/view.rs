//! Published view of the game
//!
//! A `GameView` is a reconciled `GameState` plus everything derived from it
//! for presentation. Views are immutable and replaced wholesale.

use std::collections::BTreeMap;
use std::sync::Arc;

use phantomlog_domain::{
    ActionKind, ActionSet, GameState, PhaseGate, SessionId, SuspicionScale, SuspicionTier,
};

/// One reconciled state and its derived affordances
#[derive(Debug, Clone, PartialEq)]
pub struct GameView {
    pub state: GameState,
    /// Target-less gate result
    pub allowed_actions: ActionSet,
    pub suspicion_tiers: BTreeMap<String, SuspicionTier>,
    /// Issue ticket of the fetch this view came from
    pub ticket: u64,
}

impl GameView {
    pub fn derive(state: GameState, scale: &SuspicionScale, ticket: u64) -> Self {
        let allowed_actions = PhaseGate::for_state(&state).allowed_actions(None);
        let suspicion_tiers = state
            .suspicion_by_name()
            .iter()
            .map(|(name, level)| (name.clone(), scale.tier(*level)))
            .collect();

        Self {
            state,
            allowed_actions,
            suspicion_tiers,
            ticket,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.state.session().id
    }

    pub fn alive_names(&self) -> Vec<&str> {
        self.state.alive_names().collect()
    }

    pub fn dead_names(&self) -> Vec<&str> {
        self.state.dead_names().collect()
    }

    pub fn allows(&self, kind: ActionKind) -> bool {
        self.allowed_actions.contains(&kind)
    }

    /// Actions available against one specific character.
    pub fn allowed_against(&self, target: &str) -> ActionSet {
        PhaseGate::for_state(&self.state).allowed_actions(Some(target))
    }
}

/// What presentation should show
#[derive(Debug, Clone, Default)]
pub enum ViewState {
    /// No session, or a session whose first state has not arrived
    #[default]
    Idle,
    Live(Arc<GameView>),
    /// Connectivity lost; the last good view is kept for display
    Failed {
        last: Option<Arc<GameView>>,
        reason: String,
    },
}

impl ViewState {
    /// Most recent view, live or not.
    pub fn view(&self) -> Option<&Arc<GameView>> {
        match self {
            ViewState::Idle => None,
            ViewState::Live(view) => Some(view),
            ViewState::Failed { last, .. } => last.as_ref(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewState::Failed { .. })
    }
}

/// Why a reconciliation ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Dispatch(ActionKind),
    Refresh,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Start => f.write_str("start"),
            Trigger::Dispatch(kind) => write!(f, "dispatch:{}", kind),
            Trigger::Refresh => f.write_str("refresh"),
        }
    }
}
