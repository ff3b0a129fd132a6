//! Text-to-speech boundary and playback.
//!
//! Synthesis is an opaque call taking text and returning WAV bytes; the
//! concrete backend is picked at process start. Playback decodes the bytes
//! with rodio and blocks until the sink drains.

use std::io::Cursor;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};

use crate::{Error, Result};

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// ElevenLabs HTTP backend.
pub struct ElevenLabsTts {
    api_key: String,
    voice_id: String,
    model_id: String,
    client: reqwest::Client,
}

impl ElevenLabsTts {
    pub fn new(api_key: String, voice_id: String) -> Self {
        Self {
            api_key,
            voice_id,
            model_id: "eleven_multilingual_v2".into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from `ELEVENLABS_API_KEY` / `ELEVENLABS_VOICE_ID`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .map_err(|_| Error::Config("ELEVENLABS_API_KEY is not configured".into()))?;
        let voice_id = std::env::var("ELEVENLABS_VOICE_ID")
            .map_err(|_| Error::Config("ELEVENLABS_VOICE_ID is not configured".into()))?;
        Ok(Self::new(api_key, voice_id))
    }
}

#[async_trait]
impl Synthesizer for ElevenLabsTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}",
            self.voice_id
        );
        let body = serde_json::json!({
            "text": text,
            "model_id": self.model_id,
        });

        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/wav")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("synthesis failed ({status}): {detail}")));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

/// Play WAV bytes on the default output device, blocking until done.
///
/// Runs rodio on the calling thread; the orchestrator wraps this in
/// `spawn_blocking` so the async runtime is never stalled.
pub fn play_wav(wav_bytes: Vec<u8>) -> Result<()> {
    if wav_bytes.is_empty() {
        return Ok(());
    }
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| Error::Audio(format!("no output device: {e}")))?;
    let sink = Sink::try_new(&handle).map_err(|e| Error::Audio(format!("sink error: {e}")))?;
    let source = Decoder::new(Cursor::new(wav_bytes))
        .map_err(|e| Error::Audio(format!("undecodable audio: {e}")))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_audio_is_a_noop() {
        // No reply text synthesized means nothing to play; must not touch
        // the audio device.
        assert!(play_wav(Vec::new()).is_ok());
    }
}
