//! Error types for the assistant engine.
//!
//! Only genuine failures live here: audio devices, speech backends, config
//! I/O. A failed telemetry poll and a reference-data miss are normal
//! outcomes, not errors — the reader degrades to the previous snapshot and
//! the store returns `None`.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Microphone or playback device failure
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text backend failure
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech backend failure
    #[error("TTS error: {0}")]
    Tts(String),

    /// Language-model backend failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
