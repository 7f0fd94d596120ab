//! Scripted engine fake
//!
//! Replies are queued per endpoint and consumed in call order. A reply can
//! be held open and released later from the test, which mockall cannot do.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use phantomlog_domain::SessionId;
use phantomlog_shared::{ActionCommand, GameStateSnapshot, StartAck};
use tokio::sync::{oneshot, Notify};

use crate::ports::outbound::{EngineError, EnginePort};

/// One call the client made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Start {
        session_id: SessionId,
        player_name: Option<String>,
    },
    GetState {
        session_id: SessionId,
    },
    SendAction {
        session_id: SessionId,
        command: ActionCommand,
    },
}

enum Reply<T> {
    Ready(Result<T, EngineError>),
    Held(oneshot::Receiver<Result<T, EngineError>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, EngineError> {
        match self {
            Reply::Ready(result) => result,
            Reply::Held(rx) => rx
                .await
                .unwrap_or_else(|_| Err(EngineError::RequestFailed("reply dropped".into()))),
        }
    }
}

#[derive(Default)]
struct Script {
    calls: Vec<EngineCall>,
    start_failure: Option<EngineError>,
    states: VecDeque<Reply<GameStateSnapshot>>,
    fallback_state: Option<GameStateSnapshot>,
    actions: VecDeque<Reply<()>>,
}

/// [`EnginePort`] fake driven by queued replies
#[derive(Default)]
pub struct ScriptedEngine {
    script: Mutex<Script>,
    called: Notify,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer `get_state` with `snapshot` whenever nothing else is queued.
    pub fn with_state(self, snapshot: GameStateSnapshot) -> Self {
        self.script().fallback_state = Some(snapshot);
        self
    }

    pub fn fail_start(&self, error: EngineError) {
        self.script().start_failure = Some(error);
    }

    pub fn push_state(&self, snapshot: GameStateSnapshot) {
        self.script().states.push_back(Reply::Ready(Ok(snapshot)));
    }

    pub fn push_state_error(&self, error: EngineError) {
        self.script().states.push_back(Reply::Ready(Err(error)));
    }

    /// Queue a `get_state` reply the test completes later.
    pub fn hold_state(&self) -> oneshot::Sender<Result<GameStateSnapshot, EngineError>> {
        let (tx, rx) = oneshot::channel();
        self.script().states.push_back(Reply::Held(rx));
        tx
    }

    pub fn push_action_error(&self, error: EngineError) {
        self.script().actions.push_back(Reply::Ready(Err(error)));
    }

    /// Queue a `send_action` reply the test completes later.
    pub fn hold_action(&self) -> oneshot::Sender<Result<(), EngineError>> {
        let (tx, rx) = oneshot::channel();
        self.script().actions.push_back(Reply::Held(rx));
        tx
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.script().calls.clone()
    }

    pub fn actions_sent(&self) -> Vec<ActionCommand> {
        self.script()
            .calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::SendAction { command, .. } => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn state_fetches(&self) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|call| matches!(call, EngineCall::GetState { .. }))
            .count()
    }

    /// Wait until at least `count` calls have been made.
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            let notified = self.called.notified();
            if self.script().calls.len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, call: EngineCall) {
        self.script().calls.push(call);
        self.called.notify_waiters();
    }
}

#[async_trait]
impl EnginePort for ScriptedEngine {
    async fn start(
        &self,
        session_id: SessionId,
        player_name: Option<String>,
    ) -> Result<StartAck, EngineError> {
        self.record(EngineCall::Start {
            session_id,
            player_name,
        });
        match self.script().start_failure.clone() {
            Some(error) => Err(error),
            None => Ok(StartAck {
                message: Some("Game session started".into()),
                thread_id: Some(session_id.to_string()),
            }),
        }
    }

    async fn get_state(&self, session_id: SessionId) -> Result<GameStateSnapshot, EngineError> {
        self.record(EngineCall::GetState { session_id });
        let reply = {
            let mut script = self.script();
            match script.states.pop_front() {
                Some(reply) => reply,
                None => Reply::Ready(
                    script
                        .fallback_state
                        .clone()
                        .ok_or_else(|| EngineError::rejected(404, "Game session not found")),
                ),
            }
        };
        reply.resolve().await
    }

    async fn send_action(
        &self,
        session_id: SessionId,
        command: ActionCommand,
    ) -> Result<(), EngineError> {
        self.record(EngineCall::SendAction {
            session_id,
            command,
        });
        let reply = self.script().actions.pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(()),
        }
    }
}
