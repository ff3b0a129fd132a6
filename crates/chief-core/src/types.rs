//! Shared types for the chief assistant ecosystem.
//!
//! These types cross the boundary between chief-lib, chief-cli, and the
//! control API. Keeping them in chief-core means consumers can depend on
//! types without pulling in tokio, reqwest, or audio backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Telemetry ─────────────────────────────────────────────────────────────

/// One normalized poll of the game's local telemetry endpoint.
///
/// Every field is optional: the endpoint routinely omits fields between
/// missions, and the reader maps anything absent to `None`. Snapshots are
/// immutable once built; a new poll replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub vehicle: Option<String>,
    pub ias_kmh: Option<f64>,
    pub altitude_m: Option<f64>,
    pub fuel_percent: Option<f64>,
    pub aoa_deg: Option<f64>,
    pub pitch_deg: Option<f64>,
    pub roll_deg: Option<f64>,
    pub g_load: Option<f64>,
    /// Annotation attached to the G reading (e.g. "HIGH"), when the source
    /// provides one.
    pub g_status: Option<String>,
    pub gear_percent: Option<f64>,
    pub flaps_percent: Option<f64>,
    pub ammo: Option<u64>,
    /// Damage report keyed by airframe part, e.g. `left_wing → Yellow`.
    /// BTreeMap so summaries render in a stable order.
    pub damage: BTreeMap<String, String>,
}

impl TelemetrySnapshot {
    /// True when no poll has produced any data yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Flatten the populated fields into `label: value` pairs for LLM
    /// context lines. Skips everything that is `None`.
    pub fn context_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.vehicle {
            pairs.push(("vehicle".into(), v.clone()));
        }
        if let Some(v) = self.fuel_percent {
            pairs.push(("fuel_percent".into(), format!("{v}")));
        }
        if let Some(v) = self.ias_kmh {
            pairs.push(("ias_kmh".into(), format!("{v}")));
        }
        if let Some(v) = self.altitude_m {
            pairs.push(("altitude_m".into(), format!("{v}")));
        }
        if let Some(v) = self.aoa_deg {
            pairs.push(("aoa_deg".into(), format!("{v}")));
        }
        if let Some(v) = self.pitch_deg {
            pairs.push(("pitch_deg".into(), format!("{v}")));
        }
        if let Some(v) = self.roll_deg {
            pairs.push(("roll_deg".into(), format!("{v}")));
        }
        if let Some(v) = self.g_load {
            pairs.push(("g_load".into(), format!("{v}")));
        }
        if let Some(v) = &self.g_status {
            pairs.push(("g_status".into(), v.clone()));
        }
        if let Some(v) = self.gear_percent {
            pairs.push(("gear_percent".into(), format!("{v}")));
        }
        if let Some(v) = self.flaps_percent {
            pairs.push(("flaps_percent".into(), format!("{v}")));
        }
        if let Some(v) = self.ammo {
            pairs.push(("ammo".into(), format!("{v}")));
        }
        for (part, state) in &self.damage {
            pairs.push((part.clone(), state.clone()));
        }
        pairs
    }
}

// ─── Reference data ────────────────────────────────────────────────────────

/// Static per-vehicle lookup values, loaded from one flat JSON document per
/// vehicle slug. Values are numbers or strings; anything else in the file is
/// carried along untouched. Immutable once loaded; an absent label is a
/// miss, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceData(BTreeMap<String, Value>);

impl ReferenceData {
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.0.get(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

// ─── LLM chat types ────────────────────────────────────────────────────────

/// One message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_snapshot_is_empty() {
        assert!(TelemetrySnapshot::default().is_empty());
    }

    #[test]
    fn snapshot_with_data_is_not_empty() {
        let snap = TelemetrySnapshot {
            ias_kmh: Some(820.0),
            ..Default::default()
        };
        assert!(!snap.is_empty());
    }

    #[test]
    fn context_pairs_skip_missing_fields() {
        let snap = TelemetrySnapshot {
            vehicle: Some("F-16A".into()),
            fuel_percent: Some(55.0),
            ..Default::default()
        };
        assert_eq!(
            snap.context_pairs(),
            vec![
                ("vehicle".to_string(), "F-16A".to_string()),
                ("fuel_percent".to_string(), "55".to_string()),
            ]
        );
    }

    #[test]
    fn context_pairs_cover_the_full_snapshot() {
        let snap = TelemetrySnapshot {
            vehicle: Some("F-16A".into()),
            ias_kmh: Some(820.0),
            pitch_deg: Some(4.5),
            roll_deg: Some(-1.0),
            g_status: Some("HIGH".into()),
            gear_percent: Some(0.0),
            flaps_percent: Some(25.0),
            ammo: Some(512),
            ..Default::default()
        };
        let pairs = snap.context_pairs();
        let labels: Vec<&str> = pairs
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "vehicle",
                "ias_kmh",
                "pitch_deg",
                "roll_deg",
                "g_status",
                "gear_percent",
                "flaps_percent",
                "ammo",
            ]
        );
    }

    #[test]
    fn reference_data_deserializes_from_flat_map() {
        let data: ReferenceData =
            serde_json::from_value(json!({"Combat": 450, "Landing": 350})).unwrap();
        assert_eq!(data.get("Combat"), Some(&json!(450)));
        assert_eq!(data.get("Gear"), None);
        assert!(!data.is_empty());
    }
}
