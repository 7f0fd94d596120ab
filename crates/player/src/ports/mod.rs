//! Port traits at the client's boundaries

pub mod outbound;
