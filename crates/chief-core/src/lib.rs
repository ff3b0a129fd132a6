//! chief-core — Pure types and logic.
//!
//! No async runtime, no I/O, no platform dependencies. Everything here is a
//! deterministic function over its inputs: snapshot types, slug
//! normalization, intent classification, response formatting, prompt
//! presets, and the small WAV helpers the audio layers share.

pub mod intent;
pub mod prompt;
pub mod respond;
pub mod slug;
pub mod types;
pub mod wav;
