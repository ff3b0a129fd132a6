//! Speech-to-text boundary.
//!
//! The assistant treats transcription as an opaque call taking WAV bytes
//! and returning text. One concrete backend is selected at process start;
//! the default posts to a local whisper-server instance.

use async_trait::async_trait;

use crate::{Error, Result};

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav_bytes: &[u8]) -> Result<String>;
}

/// Whisper-server backend: multipart upload to the OpenAI-compatible
/// transcription endpoint of a local whisper.cpp server.
pub struct WhisperHttpStt {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl WhisperHttpStt {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for WhisperHttpStt {
    fn default() -> Self {
        Self::new("http://localhost:2022/v1/audio/transcriptions", "base")
    }
}

#[async_trait]
impl Transcriber for WhisperHttpStt {
    async fn transcribe(&self, wav_bytes: &[u8]) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(wav_bytes.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Stt(format!("mime error: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", "en")
            .text("response_format", "json");

        let resp = self.client.post(&self.url).multipart(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Stt(format!("transcription failed ({status}): {body}")));
        }

        let value: serde_json::Value = resp.json().await?;
        let raw = value.get("text").and_then(|v| v.as_str()).unwrap_or("");
        Ok(scrub_transcript(raw))
    }
}

/// Drop whisper's non-speech markers and trim.
pub fn scrub_transcript(raw: &str) -> String {
    raw.replace("[BLANK_AUDIO]", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_removes_blank_audio_markers() {
        assert_eq!(
            scrub_transcript(" chief, what's my flap rip speed? [BLANK_AUDIO]"),
            "chief, what's my flap rip speed?"
        );
    }

    #[test]
    fn scrub_of_silence_is_empty() {
        assert_eq!(scrub_transcript("[BLANK_AUDIO]"), "");
        assert_eq!(scrub_transcript("   "), "");
    }
}
