//! Language-model boundary.
//!
//! Chat messages in, one assistant reply out. The default backend speaks
//! the OpenAI chat-completions wire format; [`CannedCompleter`] stands in
//! when no provider is configured, answering with a fixed line.

use async_trait::async_trait;
use tracing::info;

use chief_core::types::ChatMessage;

use crate::{Error, Result};

#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// OpenAI-compatible chat-completions backend.
pub struct OpenAiChat {
    url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiChat {
    pub fn new(url: impl Into<String>, api_key: String, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from `OPENAI_API_KEY`, with optional `OPENAI_BASE_URL` and
    /// `OPENAI_MODEL` overrides.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Config("OPENAI_API_KEY is not configured".into()))?;
        let base = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".into());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Ok(Self::new(format!("{base}/v1/chat/completions"), api_key, model))
    }
}

#[async_trait]
impl Completer for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        info!("LLM call with {} messages", messages.len());

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("completion failed ({status}): {detail}")));
        }

        let value: serde_json::Value = resp.json().await?;
        value
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| Error::Llm("response missing choices[0].message.content".into()))
    }
}

/// Offline stand-in returning a fixed reply. Used by tests and demo runs.
pub struct CannedCompleter {
    reply: String,
}

impl CannedCompleter {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl Completer for CannedCompleter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        info!("canned LLM call with {} messages", messages.len());
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn canned_completer_echoes_fixed_reply() {
        let completer = CannedCompleter::new("Combat: 450 km/h");
        let reply = completer
            .complete(&[ChatMessage::user("flap speed?")])
            .await
            .unwrap();
        assert_eq!(reply, "Combat: 450 km/h");
    }
}
