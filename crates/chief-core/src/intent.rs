//! Heuristic intent classification.
//!
//! Case-insensitive substring keyword matching against small fixed tables,
//! first match wins in a fixed priority order. Deliberately a placeholder
//! behind a stable boundary (text in, [`Intent`] out) so a smarter
//! classifier can replace it without touching the responder.

/// Coarse category of what an utterance is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Change the assistant persona ("switch to instructor mode").
    ModeSwitch,
    /// Static vehicle limits — flap rip speed, gear limit, wing rip G.
    Reference,
    /// Live telemetry — fuel, speed, G, damage.
    Status,
    /// Nothing matched; falls through to the generic reply path.
    Unknown,
}

const MODE_SWITCH_KEYWORDS: &[&str] = &["switch", "mode"];
const REFERENCE_KEYWORDS: &[&str] = &["flap", "gear", "rip", "limit", "wing"];
const STATUS_KEYWORDS: &[&str] = &[
    "fuel",
    "speed",
    "temperature",
    "damage",
    "status",
    "aoa",
    "altitude",
];

/// Classify an utterance. Pure and stateless.
pub fn classify(utterance: &str) -> Intent {
    let lowered = utterance.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if contains_any(MODE_SWITCH_KEYWORDS) {
        Intent::ModeSwitch
    } else if contains_any(REFERENCE_KEYWORDS) {
        Intent::Reference
    } else if contains_any(STATUS_KEYWORDS) {
        Intent::Status
    } else {
        Intent::Unknown
    }
}
