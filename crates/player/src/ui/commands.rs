//! Command parsing for the terminal front-end
//!
//! Lines that do not start with a known command are public chat.

use phantomlog_domain::{ActionIntent, ActionKind};

pub const HELP: &str = "\
Commands:
  say <text>             chat with everyone (plain text works too)
  whisper <name> <text>  talk to one character
  suspect <name>         raise suspicion against a character
  vote <name>            accuse a character and end the game
  next                   let the game move on
  refresh                reload the game state
  restart                start a new game
  help                   show this text
  quit                   leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Act(ActionIntent),
    Refresh,
    Restart,
    Help,
    Quit,
}

/// Parse one input line; blank lines yield `None`.
///
/// Missing arguments are passed through so the dispatcher can reject them.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    let command = match word.to_ascii_lowercase().as_str() {
        "say" => Command::Act(ActionIntent::new(ActionKind::Chat, None, arg)),
        "whisper" | "ask" => {
            let (name, text) = match rest.split_once(char::is_whitespace) {
                Some((name, text)) => (Some(name.to_string()), Some(text.trim().to_string())),
                None => (arg, None),
            };
            Command::Act(ActionIntent::new(ActionKind::OneOnOne, name, text))
        }
        "suspect" => Command::Act(ActionIntent::new(ActionKind::Suspect, arg, None)),
        "vote" => Command::Act(ActionIntent::new(ActionKind::Vote, arg, None)),
        "next" => Command::Act(ActionIntent::advance()),
        "refresh" => Command::Refresh,
        "restart" => Command::Restart,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Act(ActionIntent::chat(line)),
    };
    Some(command)
}
