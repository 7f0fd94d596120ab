//! Outbound ports - what the client needs from the outside world

mod clock_port;
mod engine_port;

pub use clock_port::ClockPort;
pub use engine_port::{EngineError, EnginePort};

#[cfg(test)]
pub use clock_port::MockClockPort;
#[cfg(test)]
pub use engine_port::MockEnginePort;
