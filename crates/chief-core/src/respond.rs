//! Response assembly — pure formatting over snapshot and reference data.
//!
//! Everything here is deterministic string building with no side effects.
//! Missing data degrades to documented fallback phrases; nothing in this
//! module can fail.

use serde_json::Value;

use crate::intent::Intent;
use crate::types::{ReferenceData, TelemetrySnapshot};

/// Fixed order for reference speed labels. Labels present in the data are
/// rendered with their value; absent labels get [`FIELD_FALLBACK`].
pub const REFERENCE_LABELS: &[&str] = &["Combat", "Landing", "Takeoff"];

/// Reply when no reference document exists for the current vehicle.
pub const NO_REFERENCE_REPLY: &str = "No reference data";

/// Per-label phrase when a reference document omits a label.
pub const FIELD_FALLBACK: &str = "no data";

/// Reply for utterances that matched no intent keyword.
pub const UNKNOWN_REPLY: &str = "No data";

/// Reply when a status or reference question arrives before the first
/// telemetry snapshot has been recorded.
pub const NO_TELEMETRY_REPLY: &str = "No telemetry";

/// Placeholder for mode-switch intents; the orchestrator replaces it with
/// the actual `Mode: <mode>` confirmation after applying the switch.
pub const MODE_SWITCH_REPLY: &str = "Mode switch acknowledged";

/// Assemble a reply for a classified utterance.
pub fn respond(
    intent: Intent,
    snapshot: &TelemetrySnapshot,
    reference: Option<&ReferenceData>,
) -> String {
    match intent {
        Intent::Reference => reference_reply(reference),
        Intent::Status => status_reply(snapshot),
        Intent::ModeSwitch => MODE_SWITCH_REPLY.to_string(),
        Intent::Unknown => UNKNOWN_REPLY.to_string(),
    }
}

/// Format the known reference speeds in [`REFERENCE_LABELS`] order.
///
/// `Combat: 450 km/h, Landing: 350 km/h, Takeoff: 320 km/h` when all three
/// are present; absent labels render as `<Label>: no data`. A missing or
/// empty document yields [`NO_REFERENCE_REPLY`].
pub fn reference_reply(reference: Option<&ReferenceData>) -> String {
    let Some(reference) = reference.filter(|r| !r.is_empty()) else {
        return NO_REFERENCE_REPLY.to_string();
    };

    REFERENCE_LABELS
        .iter()
        .map(|label| match reference.get(label) {
            Some(value) => format!("{label}: {}", speed_value(value)),
            None => format!("{label}: {FIELD_FALLBACK}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a reference value for speech. Numbers get the km/h unit appended;
/// strings are taken verbatim since the document already spells their unit.
fn speed_value(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{n} km/h"),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Summarize live telemetry as short labeled datapoints.
///
/// `Fuel: 34%, IAS: 820 km/h, AoA: 12°, G-load: 7.2 (HIGH), Left Wing:
/// Yellow` — only populated fields appear; an empty snapshot yields
/// `No data`.
pub fn status_reply(snapshot: &TelemetrySnapshot) -> String {
    let mut parts = Vec::new();

    if let Some(fuel) = snapshot.fuel_percent {
        parts.push(format!("Fuel: {fuel}%"));
    }
    if let Some(ias) = snapshot.ias_kmh {
        parts.push(format!("IAS: {ias} km/h"));
    }
    if let Some(alt) = snapshot.altitude_m {
        parts.push(format!("Altitude: {alt} m"));
    }
    if let Some(aoa) = snapshot.aoa_deg {
        parts.push(format!("AoA: {aoa}\u{b0}"));
    }
    if let Some(g) = snapshot.g_load {
        match &snapshot.g_status {
            Some(status) => parts.push(format!("G-load: {g} ({status})")),
            None => parts.push(format!("G-load: {g}")),
        }
    }
    if !snapshot.damage.is_empty() {
        let report = snapshot
            .damage
            .iter()
            .map(|(part, state)| format!("{}: {state}", title_case(part)))
            .collect::<Vec<_>>()
            .join("; ");
        parts.push(report);
    }

    if parts.is_empty() {
        UNKNOWN_REPLY.to_string()
    } else {
        parts.join(", ")
    }
}

/// `left_wing` → `Left Wing`.
fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
