//! Request bodies sent to the engine

use serde::{Deserialize, Serialize};

/// Body of `POST /api/game/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub thread_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

/// Action type understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireActionType {
    Chat,
    Vote,
    Suspect,
    Next,
    /// Unknown action type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl WireActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Vote => "vote",
            Self::Suspect => "suspect",
            Self::Next => "next",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for WireActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session-independent part of an action request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCommand {
    pub action_type: WireActionType,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

impl ActionCommand {
    pub fn new(action_type: WireActionType) -> Self {
        Self {
            action_type,
            content: None,
            target: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Body of `POST /api/game/action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub thread_id: String,
    #[serde(flatten)]
    pub command: ActionCommand,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_request_flattens_command() {
        let request = ActionRequest {
            thread_id: "abc".into(),
            command: ActionCommand::new(WireActionType::Vote).with_target("Chef"),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "thread_id": "abc",
                "action_type": "vote",
                "content": null,
                "target": "Chef"
            })
        );
    }

    #[test]
    fn start_request_omits_missing_player_name() {
        let request = StartGameRequest {
            thread_id: "abc".into(),
            player_name: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "thread_id": "abc" })
        );
    }

    #[test]
    fn unknown_action_type_deserializes() {
        let parsed: ActionCommand =
            serde_json::from_value(json!({ "action_type": "night_start" })).unwrap();
        assert_eq!(parsed.action_type, WireActionType::Unknown);
    }
}
