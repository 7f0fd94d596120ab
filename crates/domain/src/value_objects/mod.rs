//! Value objects - Immutable objects defined by their attributes

mod action;
mod message_kind;
mod phase;
mod suspicion;

pub use action::{ActionIntent, ActionKind, ActionSet};
pub use message_kind::MessageKind;
pub use phase::Phase;
pub use suspicion::{SuspicionScale, SuspicionTier};
