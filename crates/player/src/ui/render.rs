//! Plain-text rendering of the published view

use phantomlog_domain::{Message, MessageKind, SuspicionTier};

use crate::application::{GameView, ViewState};

pub fn message_line(message: &Message) -> String {
    let to = message
        .recipient_hint
        .as_deref()
        .map(|r| format!(" -> {}", r))
        .unwrap_or_default();
    match message.kind {
        MessageKind::System => format!("* {}", message.text),
        MessageKind::Player => format!("> {}{}: {}", message.sender, to, message.text),
        MessageKind::Participant => format!("  {}{}: {}", message.sender, to, message.text),
    }
}

/// Transcript lines from `from` onwards.
pub fn transcript_since(view: &GameView, from: usize) -> Vec<String> {
    view.state
        .messages()
        .iter()
        .skip(from)
        .map(message_line)
        .collect()
}

pub fn status_block(view: &GameView) -> String {
    let state = &view.state;
    let mut out = format!("-- Round {} | {} --\n", state.round_number(), state.phase());

    for character in state.characters() {
        let marker = match view.suspicion_tiers.get(&character.name) {
            Some(SuspicionTier::High) => "!!",
            Some(SuspicionTier::Low) => "! ",
            _ => "  ",
        };
        let status = if character.alive { "" } else { " (dead)" };
        out.push_str(&format!(
            "{} {:<10} {:<10} suspicion {}{}\n",
            marker, character.name, character.job, character.suspicion, status
        ));
    }

    if let Some(winner) = state.winner_name() {
        out.push_str(&format!("Game over. The Phantom was {}.\n", winner));
    } else if view.allowed_actions.is_empty() {
        out.push_str("Waiting for the game to continue...\n");
    } else {
        let actions: Vec<&str> = view.allowed_actions.iter().map(|a| a.as_str()).collect();
        out.push_str(&format!("You can: {}\n", actions.join(", ")));
    }
    out
}

pub fn failure_line(state: &ViewState) -> Option<String> {
    match state {
        ViewState::Failed { reason, .. } => Some(format!(
            "Connection lost ({}). Type `restart` to begin a new game.",
            reason
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use phantomlog_domain::{
        CharacterDraft, GameState, GameStateDraft, Phase, Session, SessionId, SuspicionScale,
    };
    use std::collections::BTreeMap;

    fn view(phase: Phase, winner: Option<&str>) -> GameView {
        let draft = GameStateDraft {
            phase,
            characters: vec![
                CharacterDraft {
                    name: "Chef".into(),
                    job: "Cook".into(),
                    ..Default::default()
                },
                CharacterDraft {
                    name: "Teacher".into(),
                    job: "Tutor".into(),
                    alive: Some(false),
                    ..Default::default()
                },
            ],
            suspicion_by_name: BTreeMap::from([("Chef".to_string(), 6)]),
            messages: vec![
                Message::new("System", "Night falls.", MessageKind::System),
                Message::new("Investigator", "[To Chef] hi", MessageKind::Player)
                    .addressed_to("Chef"),
            ],
            winner_name: winner.map(str::to_string),
            ..Default::default()
        };
        let state = GameState::from_draft(Session::new(SessionId::new(), Utc::now()), draft).0;
        GameView::derive(state, &SuspicionScale::default(), 1)
    }

    #[test]
    fn status_lists_characters_and_actions() {
        let text = status_block(&view(Phase::Discussion, None));

        assert!(text.starts_with("-- Round 1 | discussion --"));
        assert!(text.contains("!! Chef"));
        assert!(text.contains("(dead)"));
        assert!(text.contains("You can: chat, one_on_one, suspect, advance"));
    }

    #[test]
    fn ended_game_names_the_phantom() {
        let text = status_block(&view(Phase::Voting, Some("Chef")));
        assert!(text.contains("-- Round 1 | end --"));
        assert!(text.contains("The Phantom was Chef."));
    }

    #[test]
    fn transcript_skips_already_shown_lines() {
        let lines = transcript_since(&view(Phase::Night, None), 1);
        assert_eq!(lines, vec!["> Investigator -> Chef: [To Chef] hi".to_string()]);
    }
}
