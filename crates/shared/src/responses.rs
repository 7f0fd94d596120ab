//! Response types returned by the engine

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw state snapshot from `GET /api/game/state/{thread_id}`
///
/// Field names vary between engine versions and fields may be missing, so
/// the snapshot is kept as untyped JSON until the client normalizes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct GameStateSnapshot(pub Value);

impl GameStateSnapshot {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Top-level field lookup; `None` for non-object snapshots.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|obj| obj.get(key))
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for GameStateSnapshot {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Acknowledgement from `POST /api/game/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StartAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Error body the engine attaches to 4xx/5xx responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineErrorBody {
    #[serde(default)]
    pub detail: Value,
}

impl EngineErrorBody {
    /// Human-readable detail; validation errors arrive as structured lists.
    pub fn detail_text(&self) -> String {
        match &self.detail {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}
