//! Snapshot normalizer
//!
//! Turns whatever the engine sent into a `GameState`. Normalization never
//! fails: every missing or malformed field gets a safe default and a
//! `PayloadIssue` describing what was wrong.

use std::collections::BTreeMap;

use phantomlog_domain::{
    Capabilities, CharacterDraft, GameState, GameStateDraft, Message, MessageKind, Phase, Session,
    StateRepair,
};
use phantomlog_shared::{parse_addressed, GameStateSnapshot};
use serde_json::{Map, Value};

/// Sender used when a message carries none.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// A problem found in a snapshot and corrected locally
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadIssue {
    #[error("snapshot is not a JSON object")]
    NotAnObject,

    #[error("field `{field}` should be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("entry {index} of `{field}` is malformed")]
    MalformedEntry { field: &'static str, index: usize },

    #[error("message {0} has no sender")]
    MissingSender(usize),

    #[error("snapshot has no phase label")]
    MissingPhase,

    #[error("unrecognized phase label {0:?}")]
    UnknownPhase(String),

    #[error("`{field}` has an unusable key {key:?}")]
    BadKey { field: &'static str, key: String },

    #[error("`{field}` has an unusable value for {key:?}")]
    BadValue { field: &'static str, key: String },

    #[error(transparent)]
    Repair(#[from] StateRepair),
}

/// Normalization result
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub state: GameState,
    pub issues: Vec<PayloadIssue>,
}

/// Maps raw snapshots onto the domain model for one player identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNormalizer {
    player_name: String,
    system_name: String,
    /// Other sender names the engine writes the player's lines under
    player_aliases: Vec<String>,
}

impl SnapshotNormalizer {
    pub fn new(player_name: impl Into<String>, system_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            system_name: system_name.into(),
            player_aliases: Vec::new(),
        }
    }

    pub fn with_player_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.player_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    fn is_player(&self, sender: &str) -> bool {
        sender == self.player_name || self.player_aliases.iter().any(|alias| alias == sender)
    }

    pub fn normalize(&self, session: Session, snapshot: &GameStateSnapshot) -> Normalized {
        let mut issues = Vec::new();
        let empty = Map::new();
        let root = match snapshot.0.as_object() {
            Some(root) => root,
            None => {
                issues.push(PayloadIssue::NotAnObject);
                &empty
            }
        };

        let draft = GameStateDraft {
            round_number: round_number(root, &mut issues),
            phase: phase(root, &mut issues),
            characters: characters(root, &mut issues),
            messages: self.messages(root, &mut issues),
            clues: strings(root, "clues", &mut issues),
            suspicion_by_name: suspicion(root, &mut issues),
            alive_by_name: liveness(root, &mut issues),
            night_logs: strings(root, "night_logs", &mut issues),
            round_summaries: summaries(root, &mut issues),
            game_over: flag(root, "game_over", &mut issues),
            winner_name: winner(root),
            capabilities: capabilities(root),
        };

        let (state, repairs) = GameState::from_draft(session, draft);
        issues.extend(repairs.into_iter().map(PayloadIssue::Repair));

        Normalized { state, issues }
    }

    fn messages(&self, root: &Map<String, Value>, issues: &mut Vec<PayloadIssue>) -> Vec<Message> {
        let Some(entries) = array(root, "messages", issues) else {
            return Vec::new();
        };

        let mut messages = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match entry {
                // Bare strings are narration.
                Value::String(text) => {
                    messages.push(self.message(&self.system_name, text, true));
                }
                Value::Object(fields) => {
                    let sender = match first_str(fields, &["sender", "name"]) {
                        Some(sender) => sender,
                        None => {
                            issues.push(PayloadIssue::MissingSender(index));
                            UNKNOWN_SENDER
                        }
                    };
                    let text = first_str(fields, &["content", "text"]).unwrap_or_default();
                    let flagged_system = ["type", "kind"]
                        .iter()
                        .any(|key| fields.get(*key).and_then(Value::as_str) == Some("system"))
                        || fields.get("is_system").and_then(Value::as_bool) == Some(true);
                    messages.push(self.message(sender, text, flagged_system));
                }
                _ => issues.push(PayloadIssue::MalformedEntry {
                    field: "messages",
                    index,
                }),
            }
        }
        messages
    }

    fn message(&self, sender: &str, text: &str, flagged_system: bool) -> Message {
        let kind = if flagged_system || sender == self.system_name {
            MessageKind::System
        } else if self.is_player(sender) {
            MessageKind::Player
        } else {
            MessageKind::Participant
        };

        let message = Message::new(sender, text, kind);
        match parse_addressed(text) {
            Some((recipient, _)) => message.addressed_to(recipient),
            None => message,
        }
    }
}

fn array<'a>(
    root: &'a Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<PayloadIssue>,
) -> Option<&'a Vec<Value>> {
    match root.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            issues.push(PayloadIssue::WrongType {
                field,
                expected: "an array",
            });
            None
        }
    }
}

fn object<'a>(
    root: &'a Map<String, Value>,
    fields: &[&'static str],
    issues: &mut Vec<PayloadIssue>,
) -> Option<(&'static str, &'a Map<String, Value>)> {
    for &field in fields {
        match root.get(field) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(map)) => return Some((field, map)),
            Some(_) => issues.push(PayloadIssue::WrongType {
                field,
                expected: "an object",
            }),
        }
    }
    None
}

fn first_str<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
}

/// Non-negative integer from a number or a numeric string.
fn count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn alive_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "alive" | "true" => Some(true),
            "dead" | "false" | "eliminated" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn round_number(root: &Map<String, Value>, issues: &mut Vec<PayloadIssue>) -> u32 {
    for field in ["round_number", "round"] {
        match root.get(field) {
            None | Some(Value::Null) => continue,
            Some(value) => match count(value) {
                Some(round) => return round.max(1),
                None => issues.push(PayloadIssue::WrongType {
                    field,
                    expected: "a round number",
                }),
            },
        }
    }
    1
}

fn phase(root: &Map<String, Value>, issues: &mut Vec<PayloadIssue>) -> Phase {
    let label = root.get("phase").and_then(Value::as_str);
    if let Some(phase) = label.and_then(Phase::from_label) {
        return phase;
    }

    match label {
        Some(label) => issues.push(PayloadIssue::UnknownPhase(label.to_string())),
        None => issues.push(PayloadIssue::MissingPhase),
    }
    let night = root
        .get("day_night")
        .and_then(Value::as_str)
        .is_some_and(|s| s.trim().eq_ignore_ascii_case("night"));
    if night {
        Phase::Night
    } else {
        Phase::Discussion
    }
}

fn characters(root: &Map<String, Value>, issues: &mut Vec<PayloadIssue>) -> Vec<CharacterDraft> {
    let Some(entries) = array(root, "characters", issues) else {
        return Vec::new();
    };

    let mut characters = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            Value::String(name) => characters.push(CharacterDraft {
                name: name.clone(),
                ..Default::default()
            }),
            Value::Object(fields) => {
                let alive = fields
                    .get("alive")
                    .and_then(alive_flag)
                    .or_else(|| fields.get("status").and_then(alive_flag));
                characters.push(CharacterDraft {
                    name: first_str(fields, &["name"]).unwrap_or_default().to_string(),
                    job: first_str(fields, &["job", "role"])
                        .unwrap_or_default()
                        .to_string(),
                    alive,
                    suspicion: fields.get("suspicion").and_then(count),
                });
            }
            _ => issues.push(PayloadIssue::MalformedEntry {
                field: "characters",
                index,
            }),
        }
    }
    characters
}

fn strings(
    root: &Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<PayloadIssue>,
) -> Vec<String> {
    let Some(entries) = array(root, field, issues) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry {
            Value::String(s) => Some(s.clone()),
            _ => {
                issues.push(PayloadIssue::MalformedEntry { field, index });
                None
            }
        })
        .collect()
}

fn suspicion(root: &Map<String, Value>, issues: &mut Vec<PayloadIssue>) -> BTreeMap<String, u32> {
    let Some((field, map)) = object(root, &["suspicion_counts", "suspicion_by_name"], issues)
    else {
        return BTreeMap::new();
    };

    let mut out = BTreeMap::new();
    for (name, value) in map {
        match count(value) {
            Some(level) => {
                out.insert(name.clone(), level);
            }
            None => issues.push(PayloadIssue::BadValue {
                field,
                key: name.clone(),
            }),
        }
    }
    out
}

fn liveness(root: &Map<String, Value>, issues: &mut Vec<PayloadIssue>) -> BTreeMap<String, bool> {
    let Some((field, map)) = object(root, &["alive_status", "alive_by_name"], issues) else {
        return BTreeMap::new();
    };

    let mut out = BTreeMap::new();
    for (name, value) in map {
        match alive_flag(value) {
            Some(alive) => {
                out.insert(name.clone(), alive);
            }
            None => issues.push(PayloadIssue::BadValue {
                field,
                key: name.clone(),
            }),
        }
    }
    out
}

fn summaries(root: &Map<String, Value>, issues: &mut Vec<PayloadIssue>) -> BTreeMap<u32, String> {
    let Some((field, map)) = object(root, &["round_summaries"], issues) else {
        return BTreeMap::new();
    };

    let mut out = BTreeMap::new();
    for (key, value) in map {
        let Ok(round) = key.trim().parse::<u32>() else {
            issues.push(PayloadIssue::BadKey {
                field,
                key: key.clone(),
            });
            continue;
        };
        match value.as_str() {
            Some(text) => {
                out.insert(round, text.to_string());
            }
            None => issues.push(PayloadIssue::BadValue {
                field,
                key: key.clone(),
            }),
        }
    }
    out
}

fn flag(root: &Map<String, Value>, field: &'static str, issues: &mut Vec<PayloadIssue>) -> bool {
    match root.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            issues.push(PayloadIssue::WrongType {
                field,
                expected: "a boolean",
            });
            false
        }
    }
}

fn winner(root: &Map<String, Value>) -> Option<String> {
    ["winner_name", "phantom_name", "winner"]
        .iter()
        .filter_map(|key| root.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

fn capabilities(root: &Map<String, Value>) -> Capabilities {
    let nested = root
        .get("capabilities")
        .and_then(|c| c.get("chat_during_voting"));
    let chat_during_voting = root
        .get("chat_during_voting")
        .or(nested)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Capabilities { chat_during_voting }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::fixtures;
    use chrono::Utc;
    use phantomlog_domain::{SessionId, UNKNOWN_WINNER};
    use serde_json::json;

    fn normalizer() -> SnapshotNormalizer {
        SnapshotNormalizer::new("Investigator", "System")
    }

    fn normalize(value: Value) -> Normalized {
        normalizer().normalize(
            Session::new(SessionId::new(), Utc::now()),
            &GameStateSnapshot::new(value),
        )
    }

    #[test]
    fn engine_snapshot_normalizes_cleanly() {
        let Normalized { state, issues } = normalize(fixtures::discussion());

        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        assert_eq!(state.round_number(), 1);
        assert_eq!(state.phase(), Phase::Discussion);
        assert_eq!(state.characters().len(), 5);
        assert!(state.alive_by_name().values().all(|alive| *alive));
        assert!(state.suspicion_by_name().values().all(|level| *level == 0));
        assert_eq!(state.messages()[0].kind, MessageKind::System);
    }

    #[test]
    fn empty_object_gets_safe_defaults() {
        let Normalized { state, issues } = normalize(json!({}));

        assert_eq!(state.round_number(), 1);
        assert_eq!(state.phase(), Phase::Discussion);
        assert!(state.characters().is_empty());
        assert!(state.messages().is_empty());
        assert!(!state.is_game_over());
        assert_eq!(issues, vec![PayloadIssue::MissingPhase]);
    }

    #[test]
    fn non_object_snapshot_is_reported() {
        let Normalized { state, issues } = normalize(json!("gibberish"));

        assert!(state.characters().is_empty());
        assert_eq!(issues[0], PayloadIssue::NotAnObject);
    }

    #[test]
    fn phase_labels_reduce() {
        for (label, expected) in [
            ("intro", Phase::Discussion),
            ("user_turn", Phase::Discussion),
            ("one_on_one", Phase::Discussion),
            ("free_discussion", Phase::Discussion),
            ("NIGHT", Phase::Night),
            ("vote", Phase::Voting),
        ] {
            let state = normalize(json!({ "phase": label })).state;
            assert_eq!(state.phase(), expected, "label {}", label);
        }
    }

    #[test]
    fn unknown_phase_falls_back_to_day_night() {
        let Normalized { state, issues } =
            normalize(json!({ "phase": "unknown", "day_night": "night" }));
        assert_eq!(state.phase(), Phase::Night);
        assert_eq!(issues, vec![PayloadIssue::UnknownPhase("unknown".into())]);

        let state = normalize(json!({ "phase": "lunch", "day_night": "day" })).state;
        assert_eq!(state.phase(), Phase::Discussion);
    }

    #[test]
    fn setup_phase_is_quiet_and_passive() {
        let Normalized { state, issues } =
            normalize(json!({ "phase": "setup", "day_night": "day" }));
        assert_eq!(state.phase(), Phase::Night);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn message_kinds_are_inferred() {
        let snapshot = json!({
            "phase": "discussion",
            "messages": [
                { "sender": "System", "content": "Night falls." },
                { "sender": "Narrator", "content": "A scream.", "type": "system" },
                { "sender": "Investigator", "content": "Where were you?" },
                { "sender": "Chef", "content": "In the kitchen." },
                { "content": "who said this?" },
                { "sender": 42, "text": "numbers" },
                "The lights flicker.",
                17
            ]
        });

        let Normalized { state, issues } = normalize(snapshot);
        let kinds: Vec<_> = state.messages().iter().map(|m| m.kind).collect();

        assert_eq!(
            kinds,
            vec![
                MessageKind::System,
                MessageKind::System,
                MessageKind::Player,
                MessageKind::Participant,
                MessageKind::Participant,
                MessageKind::Participant,
                MessageKind::System,
            ]
        );
        assert_eq!(state.messages()[4].sender, UNKNOWN_SENDER);
        assert_eq!(state.messages()[5].text, "numbers");
        assert!(issues.contains(&PayloadIssue::MissingSender(4)));
        assert!(issues.contains(&PayloadIssue::MissingSender(5)));
        assert!(issues.contains(&PayloadIssue::MalformedEntry {
            field: "messages",
            index: 7
        }));
    }

    #[test]
    fn addressed_messages_carry_recipient() {
        let snapshot = fixtures::with_messages(
            fixtures::discussion(),
            &[
                ("Investigator", "[To Artist] secret"),
                ("Chef", "[Student에게] 너 어디 있었어?"),
            ],
        );

        let messages = normalize(snapshot).state.messages().to_vec();

        assert_eq!(messages[1].recipient_hint.as_deref(), Some("Artist"));
        assert_eq!(messages[1].text, "[To Artist] secret");
        assert_eq!(messages[2].recipient_hint.as_deref(), Some("Student"));
        assert_eq!(messages[0].recipient_hint, None);
    }

    #[test]
    fn player_aliases_mark_engine_written_player_lines() {
        let snapshot = fixtures::with_messages(
            fixtures::discussion(),
            &[("유저", "[Artist에게] 어디 있었어?"), ("User", "hello"), ("Chef", "hi")],
        );

        let messages = normalizer()
            .with_player_aliases(["유저", "User"])
            .normalize(
                Session::new(SessionId::new(), Utc::now()),
                &GameStateSnapshot::new(snapshot),
            )
            .state
            .messages()
            .to_vec();

        assert_eq!(messages[1].kind, MessageKind::Player);
        assert_eq!(messages[1].recipient_hint.as_deref(), Some("Artist"));
        assert_eq!(messages[2].kind, MessageKind::Player);
        assert_eq!(messages[3].kind, MessageKind::Participant);
    }

    #[test]
    fn unaliased_engine_player_name_is_a_participant() {
        let snapshot = fixtures::with_messages(fixtures::discussion(), &[("유저", "hello")]);

        let messages = normalize(snapshot).state.messages().to_vec();

        assert_eq!(messages[1].kind, MessageKind::Participant);
    }

    #[test]
    fn status_maps_are_completed_and_cleaned() {
        let snapshot = fixtures::with(fixtures::discussion(), |s| {
            s["alive_status"] = json!({ "Teacher": false, "Ghost": true, "Chef": "maybe" });
            s["suspicion_counts"] = json!({ "Chef": 3, "Artist": "2", "Ghost": 9 });
        });

        let Normalized { state, issues } = normalize(snapshot);

        assert_eq!(state.alive_by_name().len(), 5);
        assert_eq!(state.suspicion_by_name().len(), 5);
        assert_eq!(state.is_alive("Teacher"), Some(false));
        assert_eq!(state.is_alive("Chef"), Some(true));
        assert_eq!(state.suspicion_by_name()["Chef"], 3);
        assert_eq!(state.suspicion_by_name()["Artist"], 2);
        assert_eq!(state.suspicion_by_name()["Worker"], 0);
        assert!(issues.contains(&PayloadIssue::BadValue {
            field: "alive_status",
            key: "Chef".into()
        }));
        assert!(issues.contains(&PayloadIssue::Repair(StateRepair::OrphanLiveness(
            "Ghost".into()
        ))));
    }

    #[test]
    fn inline_character_status_is_honoured() {
        let snapshot = json!({
            "phase": "discussion",
            "characters": [
                { "name": "Chef", "job": "Cook", "status": "dead" },
                { "name": "Artist", "role": "Painter", "alive": true, "suspicion": 4 },
                "Worker"
            ],
            "alive_status": { "Artist": false }
        });

        let state = normalize(snapshot).state;

        assert_eq!(state.is_alive("Chef"), Some(false));
        assert_eq!(state.is_alive("Artist"), Some(false));
        assert_eq!(state.character("Artist").unwrap().job, "Painter");
        assert_eq!(state.suspicion_by_name()["Artist"], 4);
        assert_eq!(state.is_alive("Worker"), Some(true));
    }

    #[test]
    fn round_number_accepts_strings_and_aliases() {
        assert_eq!(
            normalize(json!({ "phase": "night", "round_number": 3 }))
                .state
                .round_number(),
            3
        );
        assert_eq!(
            normalize(json!({ "phase": "night", "round": "2" }))
                .state
                .round_number(),
            2
        );

        let Normalized { state, issues } = normalize(json!({ "phase": "night", "round": "two" }));
        assert_eq!(state.round_number(), 1);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn round_summaries_keep_numeric_keys() {
        let Normalized { state, issues } = normalize(json!({
            "phase": "night",
            "round_summaries": { "1": "Chef was suspected.", "x": "lost", "2": 5 }
        }));

        assert_eq!(state.round_summaries().len(), 1);
        assert_eq!(state.round_summaries()[&1].text, "Chef was suspected.");
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn end_phase_implies_game_over_with_winner() {
        let state = normalize(fixtures::ended("Chef")).state;

        assert!(state.is_game_over());
        assert_eq!(state.phase(), Phase::End);
        assert_eq!(state.winner_name(), Some("Chef"));
    }

    #[test]
    fn winner_alone_ends_the_game() {
        let state = normalize(json!({ "phase": "voting", "winner_name": "Teacher" })).state;

        assert!(state.is_game_over());
        assert_eq!(state.phase(), Phase::End);
    }

    #[test]
    fn game_over_without_winner_is_unknown() {
        let Normalized { state, issues } = normalize(json!({ "phase": "end", "phantom_name": null }));

        assert_eq!(state.winner_name(), Some(UNKNOWN_WINNER));
        assert_eq!(issues, vec![PayloadIssue::Repair(StateRepair::MissingWinner)]);
    }

    #[test]
    fn wrong_shapes_are_reported_not_fatal() {
        let Normalized { state, issues } = normalize(json!({
            "phase": "discussion",
            "characters": "everyone",
            "clues": ["a knife", 3],
            "game_over": "no"
        }));

        assert!(state.characters().is_empty());
        assert_eq!(state.clues(), &["a knife".to_string()]);
        assert!(!state.is_game_over());
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn capability_read_from_either_place() {
        let top = normalize(json!({ "phase": "voting", "chat_during_voting": true })).state;
        let nested = normalize(json!({
            "phase": "voting",
            "capabilities": { "chat_during_voting": true }
        }))
        .state;
        let absent = normalize(json!({ "phase": "voting" })).state;

        assert!(top.capabilities().chat_during_voting);
        assert!(nested.capabilities().chat_during_voting);
        assert!(!absent.capabilities().chat_during_voting);
    }
}
