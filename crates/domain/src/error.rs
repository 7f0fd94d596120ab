//! Error types for the domain layer
//!
//! `DomainError` covers construction of value objects; `ValidationError` is
//! the local rejection of a player action before anything reaches the engine.

use thiserror::Error;

use crate::value_objects::{ActionKind, Phase};

/// Unified error type for domain construction
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for ActionKind {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "chat" => Ok(Self::Chat),
    ///             _ => Err(DomainError::parse(format!("Unknown action: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// A player action rejected locally.
///
/// Raised before dispatch; a request that fails with one of these never
/// reaches the transport and leaves the session state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} requires a target character")]
    MissingTarget { kind: ActionKind },

    #[error("{kind} requires some text to send")]
    EmptyContent { kind: ActionKind },

    #[error("{kind} is not allowed during the {phase} phase")]
    PhaseForbids { kind: ActionKind, phase: Phase },

    #[error("No character named {name}")]
    UnknownTarget { name: String },

    #[error("{name} is no longer alive")]
    DeadTarget { name: String },

    #[error("The game is already over")]
    GameOver,
}

impl ValidationError {
    pub fn missing_target(kind: ActionKind) -> Self {
        Self::MissingTarget { kind }
    }

    pub fn empty_content(kind: ActionKind) -> Self {
        Self::EmptyContent { kind }
    }
}
