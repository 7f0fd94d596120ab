//! Terminal front-end: command parsing and plain-text rendering

pub mod commands;
pub mod render;

pub use commands::{parse_command, Command, HELP};
