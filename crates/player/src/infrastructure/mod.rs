//! Infrastructure adapters for the outbound ports

pub mod clock;
pub mod config;
pub mod http_client;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
