//! Test doubles shared by the application tests.

pub mod fixtures;
mod scripted_engine;

pub use scripted_engine::{EngineCall, ScriptedEngine};
