use serde::{Deserialize, Serialize};

/// Who a transcript line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Narration or announcements from the engine itself
    System,
    /// One of the game's characters
    Participant,
    /// The local player
    Player,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Participant => "participant",
            Self::Player => "player",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
