//! Assistant state — current telemetry, cached reference data, and user
//! configuration with JSON persistence.
//!
//! The state has no locking of its own. The orchestrator owns it and is the
//! single writer; everything else sees it through the orchestrator's
//! handle. Both mutations are idempotent last-write-wins replacements.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use chief_core::prompt::{mode_from_command, PromptMode};
use chief_core::slug::vehicle_slug;
use chief_core::types::{ReferenceData, TelemetrySnapshot};

use crate::Result;

/// User configuration, read at startup and written back on change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub wake_word: String,
    pub hotkey: String,
    pub prompt_mode: PromptMode,
    pub stt_backend: String,
    pub tts_backend: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            wake_word: "chief".into(),
            hotkey: "capslock+q".into(),
            prompt_mode: PromptMode::CrewChief,
            stt_backend: "whisper".into(),
            tts_backend: "elevenlabs".into(),
        }
    }
}

impl AssistantConfig {
    /// Load from disk. A missing or unreadable file yields defaults; the
    /// config is owned by this process alone, so that is always safe.
    pub fn load(path: &std::path::Path) -> Self {
        let Ok(raw) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("corrupt config file {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// In-memory aggregate of everything the responder reads.
pub struct AssistantState {
    config_path: PathBuf,
    config: AssistantConfig,
    telemetry: TelemetrySnapshot,
    telemetry_seen: bool,
    reference: Option<ReferenceData>,
    reference_slug: Option<String>,
}

impl AssistantState {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let config = AssistantConfig::load(&config_path);
        Self {
            config_path,
            config,
            telemetry: TelemetrySnapshot::default(),
            telemetry_seen: false,
            reference: None,
            reference_slug: None,
        }
    }

    // ─── Telemetry ─────────────────────────────────────────────────────

    /// Replace the current snapshot. Last write wins.
    pub fn update_telemetry(&mut self, snapshot: TelemetrySnapshot) {
        self.telemetry = snapshot;
        self.telemetry_seen = true;
    }

    pub fn telemetry(&self) -> &TelemetrySnapshot {
        &self.telemetry
    }

    /// True once at least one snapshot has been recorded. The responder is
    /// never consulted before this.
    pub fn has_telemetry(&self) -> bool {
        self.telemetry_seen
    }

    // ─── Reference data ────────────────────────────────────────────────

    /// Cache the reference document for the vehicle slug it was loaded
    /// for. `None` records a confirmed miss so the store is not re-read on
    /// every question.
    pub fn set_reference(&mut self, slug: String, data: Option<ReferenceData>) {
        self.reference_slug = Some(slug);
        self.reference = data;
    }

    pub fn reference(&self) -> Option<&ReferenceData> {
        self.reference.as_ref()
    }

    /// Drop the cached entry. Used when the snapshot stops naming a
    /// vehicle, so stale documents never answer for the wrong airframe.
    pub fn clear_reference(&mut self) {
        self.reference_slug = None;
        self.reference = None;
    }

    /// True when the cached reference entry no longer matches the vehicle
    /// in the current snapshot.
    pub fn reference_stale(&self) -> bool {
        let current = self.telemetry.vehicle.as_deref().map(vehicle_slug);
        current.as_deref() != self.reference_slug.as_deref()
    }

    // ─── Configuration ─────────────────────────────────────────────────

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn set_wake_word(&mut self, value: String) -> Result<()> {
        self.config.wake_word = value;
        self.config.save(&self.config_path)
    }

    pub fn set_hotkey(&mut self, value: String) -> Result<()> {
        self.config.hotkey = value;
        self.config.save(&self.config_path)
    }

    pub fn set_prompt_mode(&mut self, mode: PromptMode) -> Result<()> {
        self.config.prompt_mode = mode;
        self.config.save(&self.config_path)
    }

    /// Apply a spoken mode-switch command and persist the new mode.
    pub fn toggle_mode_from_command(&mut self, command: &str) -> Result<PromptMode> {
        let mode = mode_from_command(command);
        self.set_prompt_mode(mode)?;
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_state() -> (tempfile::TempDir, AssistantState) {
        let dir = tempfile::tempdir().unwrap();
        let state = AssistantState::new(dir.path().join("config.json"));
        (dir, state)
    }

    #[test]
    fn defaults_when_config_missing() {
        let (_dir, state) = temp_state();
        assert_eq!(state.config().wake_word, "chief");
        assert_eq!(state.config().hotkey, "capslock+q");
        assert_eq!(state.config().prompt_mode, PromptMode::CrewChief);
    }

    #[test]
    fn config_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut state = AssistantState::new(&path);
        state.set_wake_word("ground control".into()).unwrap();
        state.set_prompt_mode(PromptMode::Instructor).unwrap();

        let reloaded = AssistantState::new(&path);
        assert_eq!(reloaded.config().wake_word, "ground control");
        assert_eq!(reloaded.config().prompt_mode, PromptMode::Instructor);
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let state = AssistantState::new(&path);
        assert_eq!(*state.config(), AssistantConfig::default());
    }

    #[test]
    fn telemetry_replace_is_last_write_wins() {
        let (_dir, mut state) = temp_state();
        assert!(!state.has_telemetry());

        state.update_telemetry(TelemetrySnapshot {
            ias_kmh: Some(400.0),
            ..Default::default()
        });
        state.update_telemetry(TelemetrySnapshot {
            ias_kmh: Some(500.0),
            ..Default::default()
        });

        assert!(state.has_telemetry());
        assert_eq!(state.telemetry().ias_kmh, Some(500.0));
    }

    #[test]
    fn reference_staleness_tracks_vehicle_changes() {
        let (_dir, mut state) = temp_state();
        state.update_telemetry(TelemetrySnapshot {
            vehicle: Some("F 16A".into()),
            ..Default::default()
        });
        assert!(state.reference_stale());

        let data: ReferenceData = serde_json::from_value(json!({"Combat": 450})).unwrap();
        state.set_reference("f_16a".into(), Some(data));
        assert!(!state.reference_stale());

        state.update_telemetry(TelemetrySnapshot {
            vehicle: Some("Spitfire Mk IX".into()),
            ..Default::default()
        });
        assert!(state.reference_stale());
    }

    #[test]
    fn cleared_reference_matches_vehicleless_telemetry() {
        let (_dir, mut state) = temp_state();
        state.update_telemetry(TelemetrySnapshot {
            vehicle: Some("F 16A".into()),
            ..Default::default()
        });
        let data: ReferenceData = serde_json::from_value(json!({"Combat": 450})).unwrap();
        state.set_reference("f_16a".into(), Some(data));

        state.update_telemetry(TelemetrySnapshot {
            ias_kmh: Some(300.0),
            ..Default::default()
        });
        assert!(state.reference_stale());

        state.clear_reference();
        assert!(!state.reference_stale());
        assert!(state.reference().is_none());
    }

    #[test]
    fn confirmed_miss_is_cached() {
        let (_dir, mut state) = temp_state();
        state.update_telemetry(TelemetrySnapshot {
            vehicle: Some("Unknown".into()),
            ..Default::default()
        });
        state.set_reference("unknown".into(), None);
        assert!(!state.reference_stale());
        assert!(state.reference().is_none());
    }

    #[test]
    fn toggle_mode_from_spoken_command() {
        let (_dir, mut state) = temp_state();
        let mode = state.toggle_mode_from_command("switch to instructor mode").unwrap();
        assert_eq!(mode, PromptMode::Instructor);
        assert_eq!(state.config().prompt_mode, PromptMode::Instructor);
    }
}
