//! chief CLI — cockpit assistant daemon and client.
//!
//! ```text
//! chief serve [--port 8520] [--host 127.0.0.1] [--reference-dir ./data/reference] [--voice]
//! chief ask "what's my flap rip speed?" [--server http://127.0.0.1:8520]
//! chief status [--server ...]
//! chief config [--wake-word chief] [--hotkey capslock+q] [--mode instructor] [--server ...]
//! ```

use clap::{Parser, Subcommand};

use chief_lib::assistant::{Assistant, VoiceBackends};
use chief_lib::chief_core::prompt::PromptMode;
use chief_lib::llm::{Completer, OpenAiChat};
use chief_lib::reference::ReferenceStore;
use chief_lib::state::AssistantState;
use chief_lib::stt::WhisperHttpStt;
use chief_lib::telemetry::{TelemetryConfig, TelemetryReader};
use chief_lib::trigger::{trigger_channel, HotkeyListener, WakeWordListener};
use chief_lib::tts::ElevenLabsTts;

/// chief — telemetry-aware cockpit voice assistant
#[derive(Parser)]
#[command(name = "chief", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the assistant daemon
    Serve {
        /// Listen port for the control API
        #[arg(long, default_value = "8520")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Game telemetry endpoint
        #[arg(long, default_value = "http://127.0.0.1:8111/state")]
        telemetry_url: String,
        /// Directory of per-vehicle reference JSON files
        #[arg(long, default_value = "./data/reference")]
        reference_dir: String,
        /// Config file path
        #[arg(long, default_value = "./chief.json")]
        config: String,
        /// Enable the microphone/STT/TTS voice loop
        #[arg(long)]
        voice: bool,
    },
    /// Ask the running daemon a question in text form
    Ask {
        /// The question
        text: String,
        /// Daemon URL
        #[arg(long, default_value = "http://127.0.0.1:8520")]
        server: String,
    },
    /// Print daemon status (telemetry snapshot + config)
    Status {
        #[arg(long, default_value = "http://127.0.0.1:8520")]
        server: String,
    },
    /// Update wake word, hotkey, or persona
    Config {
        #[arg(long)]
        wake_word: Option<String>,
        #[arg(long)]
        hotkey: Option<String>,
        /// "crew_chief" or "instructor"
        #[arg(long)]
        mode: Option<String>,
        #[arg(long, default_value = "http://127.0.0.1:8520")]
        server: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chief=info,chief_lib=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            host,
            telemetry_url,
            reference_dir,
            config,
            voice,
        } => {
            serve(port, host, telemetry_url, reference_dir, config, voice).await;
        }

        Command::Ask { text, server } => {
            let resp = reqwest::Client::new()
                .post(format!("{server}/ask"))
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await
                .expect("request failed");
            println!("{}", resp.text().await.unwrap_or_default());
        }

        Command::Status { server } => {
            let resp = reqwest::Client::new()
                .get(format!("{server}/status"))
                .send()
                .await
                .expect("request failed");
            println!("{}", resp.text().await.unwrap_or_default());
        }

        Command::Config {
            wake_word,
            hotkey,
            mode,
            server,
        } => {
            let prompt_mode = mode.map(|m| parse_mode(&m));
            let resp = reqwest::Client::new()
                .post(format!("{server}/config"))
                .json(&serde_json::json!({
                    "wake_word": wake_word,
                    "hotkey": hotkey,
                    "prompt_mode": prompt_mode,
                }))
                .send()
                .await
                .expect("request failed");
            println!("{}", resp.text().await.unwrap_or_default());
        }
    }
}

async fn serve(
    port: u16,
    host: String,
    telemetry_url: String,
    reference_dir: String,
    config_path: String,
    voice: bool,
) {
    let state = AssistantState::new(&config_path);
    let store = ReferenceStore::new(&reference_dir);

    // One concrete LLM backend, selected at startup; without credentials
    // the rule-based responder runs alone.
    let completer: Option<Box<dyn Completer>> = match OpenAiChat::from_env() {
        Ok(chat) => Some(Box::new(chat)),
        Err(e) => {
            tracing::info!("LLM backend not configured: {e}");
            None
        }
    };

    let assistant = Assistant::new(state, store, completer);

    let reader = TelemetryReader::new(TelemetryConfig {
        endpoint: telemetry_url,
        ..Default::default()
    });
    let telemetry = assistant.clone();
    tokio::spawn(async move { telemetry.run_telemetry(reader).await });

    if voice {
        let synthesizer = ElevenLabsTts::from_env().expect("TTS backend not configured");
        let backends = VoiceBackends {
            transcriber: Box::new(WhisperHttpStt::default()),
            synthesizer: Box::new(synthesizer),
        };

        let (tx, rx) = trigger_channel();
        let config = assistant.config();
        tokio::spawn(WakeWordListener::new(config.wake_word, tx.clone()).run());
        tokio::spawn(HotkeyListener::new(config.hotkey, tx).run());

        let voice_assistant = assistant.clone();
        tokio::spawn(async move { voice_assistant.run_voice(rx, backends).await });
    }

    let app = chief_lib::server::router(assistant);
    let addr = format!("{host}:{port}");
    eprintln!("chief listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}

fn parse_mode(mode: &str) -> PromptMode {
    if mode.to_lowercase().contains("instructor") {
        PromptMode::Instructor
    } else {
        PromptMode::CrewChief
    }
}
