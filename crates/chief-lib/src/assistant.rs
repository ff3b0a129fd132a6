//! The orchestrator — wires telemetry, reference data, classification, and
//! the speech boundaries into one interaction flow.
//!
//! `Assistant` is a cheap cloneable handle. The telemetry loop is the only
//! writer of snapshots; everything else reads through short lock sections.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use chief_core::intent::{classify, Intent};
use chief_core::prompt::{context_messages, prompt};
use chief_core::respond::{respond, NO_TELEMETRY_REPLY, UNKNOWN_REPLY};
use chief_core::slug::vehicle_slug;
use chief_core::types::{ChatMessage, TelemetrySnapshot};
use chief_core::wav::{write_wav, SAMPLE_RATE};

use crate::capture::MicrophoneStream;
use crate::llm::Completer;
use crate::reference::ReferenceStore;
use crate::state::{AssistantConfig, AssistantState};
use crate::stt::Transcriber;
use crate::telemetry::TelemetryReader;
use crate::trigger::TriggerEvent;
use crate::tts::{play_wav, Synthesizer};
use crate::Result;

/// Speech boundaries used by the full voice interaction. Absent in
/// text-only deployments (the `ask` CLI path and the HTTP API).
pub struct VoiceBackends {
    pub transcriber: Box<dyn Transcriber>,
    pub synthesizer: Box<dyn Synthesizer>,
}

#[derive(Clone)]
pub struct Assistant {
    inner: Arc<Inner>,
}

struct Inner {
    state: RwLock<AssistantState>,
    store: ReferenceStore,
    completer: Option<Box<dyn Completer>>,
}

impl Assistant {
    /// `completer` handles utterances the rule-based responder cannot;
    /// without one, unclassified questions get the fixed fallback.
    pub fn new(
        state: AssistantState,
        store: ReferenceStore,
        completer: Option<Box<dyn Completer>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                store,
                completer,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, AssistantState> {
        self.inner.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AssistantState> {
        self.inner.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // ─── Telemetry flow ────────────────────────────────────────────────

    /// Record a poll result. Empty snapshots (endpoint down, between
    /// missions) are skipped so stale-but-real data survives an outage.
    /// Reference data is reloaded only when the vehicle changed.
    pub fn apply_snapshot(&self, snapshot: TelemetrySnapshot) {
        if snapshot.is_empty() {
            return;
        }
        let mut state = self.write();
        state.update_telemetry(snapshot);
        if state.reference_stale() {
            match state.telemetry().vehicle.clone() {
                Some(vehicle) => {
                    let slug = vehicle_slug(&vehicle);
                    let data = self.inner.store.lookup(&vehicle);
                    if data.is_none() {
                        debug!("no reference data for vehicle '{vehicle}' (slug {slug})");
                    }
                    state.set_reference(slug, data);
                }
                // The endpoint dropped the vehicle name mid-session; the
                // previous vehicle's document must not answer for it.
                None => state.clear_reference(),
            }
        }
    }

    /// Poll the telemetry endpoint forever, applying each snapshot.
    pub async fn run_telemetry(&self, mut reader: TelemetryReader) {
        info!("telemetry reader started");
        let mut ticker = tokio::time::interval(reader.poll_interval());
        loop {
            ticker.tick().await;
            let snapshot = reader.poll().await;
            self.apply_snapshot(snapshot);
        }
    }

    // ─── Question answering ────────────────────────────────────────────

    /// Answer one transcribed utterance.
    pub async fn handle_utterance(&self, utterance: &str) -> String {
        let intent = classify(utterance);
        debug!("intent {intent:?} for utterance: {utterance}");

        match intent {
            Intent::ModeSwitch => {
                let mut state = self.write();
                match state.toggle_mode_from_command(utterance) {
                    Ok(mode) => format!("Mode: {}", mode.as_str()),
                    Err(e) => {
                        warn!("failed to persist mode switch: {e}");
                        format!("Mode: {}", state.config().prompt_mode.as_str())
                    }
                }
            }
            Intent::Reference | Intent::Status => {
                let state = self.read();
                if !state.has_telemetry() {
                    return NO_TELEMETRY_REPLY.to_string();
                }
                respond(intent, state.telemetry(), state.reference())
            }
            Intent::Unknown => match &self.inner.completer {
                Some(completer) => {
                    let messages = self.build_llm_messages(utterance);
                    match completer.complete(&messages).await {
                        Ok(reply) => reply,
                        Err(e) => {
                            warn!("LLM fallback failed: {e}");
                            UNKNOWN_REPLY.to_string()
                        }
                    }
                }
                None => UNKNOWN_REPLY.to_string(),
            },
        }
    }

    fn build_llm_messages(&self, utterance: &str) -> Vec<ChatMessage> {
        let state = self.read();
        let mut messages = vec![ChatMessage::system(prompt(state.config().prompt_mode))];
        messages.extend(context_messages(state.telemetry(), state.reference()));
        messages.push(ChatMessage::user(utterance));
        messages
    }

    // ─── Voice interaction ─────────────────────────────────────────────

    /// One full trigger-to-speech round trip: capture a phrase, transcribe
    /// it, answer, synthesize, play. Returns the spoken reply, or `None`
    /// when nothing intelligible was captured.
    pub async fn handle_interaction(&self, backends: &VoiceBackends) -> Result<Option<String>> {
        info!("trigger received, capturing audio");
        let mut mic = MicrophoneStream::open()?;
        let samples = mic.capture_phrase().await?;
        drop(mic);
        if samples.is_empty() {
            debug!("no speech captured before timeout");
            return Ok(None);
        }

        let wav = write_wav(&samples, SAMPLE_RATE);
        let utterance = backends.transcriber.transcribe(&wav).await?;
        if utterance.is_empty() {
            return Ok(None);
        }
        info!("recognized query: {utterance}");

        let reply = self.handle_utterance(&utterance).await;
        info!("response: {reply}");

        let audio = backends.synthesizer.synthesize(&reply).await?;
        tokio::task::spawn_blocking(move || play_wav(audio))
            .await
            .map_err(|e| crate::Error::Audio(format!("playback task failed: {e}")))??;

        Ok(Some(reply))
    }

    /// Serve trigger events until the channel closes.
    pub async fn run_voice(
        &self,
        mut triggers: mpsc::UnboundedReceiver<TriggerEvent>,
        backends: VoiceBackends,
    ) {
        while let Some(event) = triggers.recv().await {
            debug!("trigger: {event:?}");
            if let Err(e) = self.handle_interaction(&backends).await {
                warn!("interaction failed: {e}");
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
        }
    }

    // ─── State access for the control API ──────────────────────────────

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.read().telemetry().clone()
    }

    pub fn has_telemetry(&self) -> bool {
        self.read().has_telemetry()
    }

    pub fn config(&self) -> AssistantConfig {
        self.read().config().clone()
    }

    pub fn set_wake_word(&self, value: String) -> Result<()> {
        self.write().set_wake_word(value)
    }

    pub fn set_hotkey(&self, value: String) -> Result<()> {
        self.write().set_hotkey(value)
    }

    pub fn set_prompt_mode(&self, mode: chief_core::prompt::PromptMode) -> Result<()> {
        self.write().set_prompt_mode(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CannedCompleter;
    use crate::telemetry::normalize_snapshot;
    use serde_json::json;

    fn assistant_with_reference(reference_json: Option<&str>) -> (tempfile::TempDir, Assistant) {
        let dir = tempfile::tempdir().unwrap();
        if let Some(contents) = reference_json {
            std::fs::write(dir.path().join("f-16c_block_50.json"), contents).unwrap();
        }
        let state = AssistantState::new(dir.path().join("config.json"));
        let store = ReferenceStore::new(dir.path());
        (dir, Assistant::new(state, store, None))
    }

    fn f16_snapshot() -> TelemetrySnapshot {
        normalize_snapshot(&json!({
            "name": "F-16C Block 50",
            "speed": {"kmh": 820.0},
            "fuel": 34,
        }))
    }

    #[tokio::test]
    async fn reference_question_end_to_end() {
        let (_dir, assistant) = assistant_with_reference(Some(
            r#"{"Combat": 450, "Landing": 350, "Takeoff": 320}"#,
        ));
        assistant.apply_snapshot(f16_snapshot());

        let reply = assistant
            .handle_utterance("chief, what's my flap rip speed?")
            .await;
        assert_eq!(reply, "Combat: 450 km/h, Landing: 350 km/h, Takeoff: 320 km/h");
    }

    #[tokio::test]
    async fn reference_question_without_reference_file() {
        let (_dir, assistant) = assistant_with_reference(None);
        assistant.apply_snapshot(f16_snapshot());

        let reply = assistant
            .handle_utterance("chief, what's my flap rip speed?")
            .await;
        assert_eq!(reply, "No reference data");
    }

    #[tokio::test]
    async fn unrecognized_utterance_gets_fixed_fallback() {
        let (_dir, assistant) = assistant_with_reference(None);
        assistant.apply_snapshot(f16_snapshot());

        let reply = assistant.handle_utterance("chief, how's the weather").await;
        assert_eq!(reply, UNKNOWN_REPLY);
    }

    #[tokio::test]
    async fn unknown_routes_to_completer_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let state = AssistantState::new(dir.path().join("config.json"));
        let store = ReferenceStore::new(dir.path());
        let assistant = Assistant::new(
            state,
            store,
            Some(Box::new(CannedCompleter::new("copy that"))),
        );
        assistant.apply_snapshot(f16_snapshot());

        assert_eq!(assistant.handle_utterance("hello there").await, "copy that");
    }

    #[tokio::test]
    async fn questions_before_first_snapshot_are_refused() {
        let (_dir, assistant) = assistant_with_reference(Some(r#"{"Combat": 450}"#));
        let reply = assistant
            .handle_utterance("chief, what's my flap rip speed?")
            .await;
        assert_eq!(reply, NO_TELEMETRY_REPLY);
    }

    #[tokio::test]
    async fn status_question_formats_live_telemetry() {
        let (_dir, assistant) = assistant_with_reference(None);
        assistant.apply_snapshot(f16_snapshot());

        let reply = assistant.handle_utterance("fuel status").await;
        assert!(reply.contains("Fuel: 34%"));
        assert!(reply.contains("IAS: 820 km/h"));
    }

    #[tokio::test]
    async fn mode_switch_updates_config_and_confirms() {
        let (_dir, assistant) = assistant_with_reference(None);
        let reply = assistant.handle_utterance("switch to instructor mode").await;
        assert_eq!(reply, "Mode: instructor_mode");
        assert_eq!(
            assistant.config().prompt_mode,
            chief_core::prompt::PromptMode::Instructor
        );
    }

    #[tokio::test]
    async fn empty_snapshots_do_not_clobber_real_data() {
        let (_dir, assistant) = assistant_with_reference(None);
        assistant.apply_snapshot(f16_snapshot());
        assistant.apply_snapshot(TelemetrySnapshot::default());
        assert_eq!(assistant.snapshot().ias_kmh, Some(820.0));
    }

    #[tokio::test]
    async fn reference_cleared_when_vehicle_leaves_telemetry() {
        let (_dir, assistant) = assistant_with_reference(Some(
            r#"{"Combat": 450, "Landing": 350, "Takeoff": 320}"#,
        ));
        assistant.apply_snapshot(f16_snapshot());

        // Non-empty snapshot with no vehicle name: telemetry keeps flowing
        // but the F-16C document no longer applies.
        assistant.apply_snapshot(normalize_snapshot(&json!({"ias": 100.0})));
        assert_eq!(assistant.snapshot().vehicle, None);

        let reply = assistant.handle_utterance("flap limit?").await;
        assert_eq!(reply, "No reference data");
    }

    #[tokio::test]
    async fn reference_reloads_on_vehicle_change() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f_16a.json"), r#"{"Combat": 400}"#).unwrap();
        std::fs::write(dir.path().join("f-16c_block_50.json"), r#"{"Combat": 450}"#).unwrap();
        let state = AssistantState::new(dir.path().join("config.json"));
        let store = ReferenceStore::new(dir.path());
        let assistant = Assistant::new(state, store, None);

        assistant.apply_snapshot(normalize_snapshot(&json!({"name": "F 16A"})));
        let reply = assistant.handle_utterance("flap limit?").await;
        assert!(reply.starts_with("Combat: 400 km/h"));

        assistant.apply_snapshot(f16_snapshot());
        let reply = assistant.handle_utterance("flap limit?").await;
        assert!(reply.starts_with("Combat: 450 km/h"));
    }
}
