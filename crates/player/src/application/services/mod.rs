//! Session services

mod action_dispatcher;
mod normalizer;
mod reconciliation;
mod session_manager;

use std::future::Future;
use std::time::Duration;

pub use action_dispatcher::{encode_intent, ActionDispatcher};
pub use normalizer::{Normalized, PayloadIssue, SnapshotNormalizer, UNKNOWN_SENDER};
pub use reconciliation::ReconciliationLoop;
pub use session_manager::SessionManager;

use crate::ports::outbound::EngineError;

/// Bound an engine call by `limit`, independent of the adapter's own timeout.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, EngineError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Timeout(limit)),
    }
}
