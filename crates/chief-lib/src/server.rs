//! HTTP control API for the assistant.
//!
//! Replaces the tray/settings UI of the desktop prototype: a local
//! CORS-permissive surface for inspecting state, asking questions in text
//! form, and changing the wake word, hotkey, or persona.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::warn;

use chief_core::intent::classify;
use chief_core::prompt::PromptMode;
use chief_core::types::TelemetrySnapshot;

use crate::assistant::Assistant;
use crate::state::AssistantConfig;

/// Build the axum router with a shared [`Assistant`] handle.
pub fn router(assistant: Assistant) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/ask", post(ask))
        .route("/config", get(get_config).post(set_config))
        .layer(CorsLayer::permissive())
        .with_state(assistant)
}

#[derive(serde::Serialize)]
struct StatusResponse {
    /// False until the first telemetry snapshot has been recorded.
    ready: bool,
    telemetry: TelemetrySnapshot,
    config: AssistantConfig,
}

async fn status(State(assistant): State<Assistant>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ready: assistant.has_telemetry(),
        telemetry: assistant.snapshot(),
        config: assistant.config(),
    })
}

#[derive(serde::Deserialize)]
struct AskRequest {
    text: String,
}

#[derive(serde::Serialize)]
struct AskResponse {
    intent: String,
    reply: String,
}

async fn ask(
    State(assistant): State<Assistant>,
    Json(req): Json<AskRequest>,
) -> Json<AskResponse> {
    let intent = classify(&req.text);
    let reply = assistant.handle_utterance(&req.text).await;
    Json(AskResponse {
        intent: format!("{intent:?}"),
        reply,
    })
}

async fn get_config(State(assistant): State<Assistant>) -> Json<AssistantConfig> {
    Json(assistant.config())
}

#[derive(serde::Deserialize)]
struct ConfigPatch {
    wake_word: Option<String>,
    hotkey: Option<String>,
    prompt_mode: Option<PromptMode>,
}

#[derive(serde::Serialize)]
struct ConfigResponse {
    ok: bool,
    config: AssistantConfig,
}

async fn set_config(
    State(assistant): State<Assistant>,
    Json(patch): Json<ConfigPatch>,
) -> Json<ConfigResponse> {
    let mut results = Vec::new();
    if let Some(wake_word) = patch.wake_word {
        results.push(assistant.set_wake_word(wake_word));
    }
    if let Some(hotkey) = patch.hotkey {
        results.push(assistant.set_hotkey(hotkey));
    }
    if let Some(mode) = patch.prompt_mode {
        results.push(assistant.set_prompt_mode(mode));
    }

    let mut ok = true;
    for result in results {
        if let Err(e) = result {
            warn!("config update failed: {e}");
            ok = false;
        }
    }

    Json(ConfigResponse {
        ok,
        config: assistant.config(),
    })
}
