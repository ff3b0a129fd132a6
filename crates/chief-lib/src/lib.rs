//! chief-lib — Cockpit assistant engine.
//!
//! Telemetry polling, reference lookup, state and config, the voice
//! pipeline boundaries (capture, STT, TTS, LLM), trigger stubs, the
//! orchestrator, and the HTTP control API. Depends on chief-core for pure
//! types and logic.

pub mod assistant;
pub mod capture;
pub mod error;
pub mod llm;
pub mod reference;
pub mod server;
pub mod state;
pub mod stt;
pub mod telemetry;
pub mod trigger;
pub mod tts;

pub use error::{Error, Result};

// Re-export chief-core for convenience
pub use chief_core;
