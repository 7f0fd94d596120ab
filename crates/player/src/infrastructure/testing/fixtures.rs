//! Snapshot fixtures shaped like the engine's state endpoint.

use phantomlog_shared::GameStateSnapshot;
use serde_json::{json, Value};

/// The five-character table used across tests.
pub const CAST: [(&str, &str); 5] = [
    ("Artist", "Painter"),
    ("Chef", "Cook"),
    ("Worker", "Builder"),
    ("Student", "Scholar"),
    ("Teacher", "Tutor"),
];

pub fn characters() -> Value {
    Value::Array(
        CAST.iter()
            .map(|(name, job)| json!({ "name": name, "job": job }))
            .collect(),
    )
}

/// Opening discussion of round one, everyone alive.
pub fn discussion() -> Value {
    json!({
        "messages": [
            { "sender": "System", "content": "The game begins. One of you is the Phantom." }
        ],
        "characters": characters(),
        "phase": "discussion",
        "day_night": "day",
        "alive_status": {},
        "suspicion_counts": {},
        "night_logs": [],
        "clues": [],
        "round_summaries": {},
        "game_over": false,
        "phantom_name": null
    })
}

/// Same table in the voting phase.
pub fn voting() -> Value {
    with(discussion(), |s| {
        s["phase"] = json!("voting");
    })
}

/// Resolved game with the Chef unmasked.
pub fn ended(winner: &str) -> Value {
    with(discussion(), |s| {
        s["phase"] = json!("end");
        s["game_over"] = json!(true);
        s["phantom_name"] = json!(winner);
    })
}

/// Append transcript lines `(sender, content)` to a snapshot.
pub fn with_messages(mut snapshot: Value, lines: &[(&str, &str)]) -> Value {
    if let Some(messages) = snapshot["messages"].as_array_mut() {
        for (sender, content) in lines {
            messages.push(json!({ "sender": sender, "content": content }));
        }
    }
    snapshot
}

pub fn with(mut snapshot: Value, edit: impl FnOnce(&mut Value)) -> Value {
    edit(&mut snapshot);
    snapshot
}

pub fn snapshot(value: Value) -> GameStateSnapshot {
    GameStateSnapshot::new(value)
}
