//! Telemetry reader for the game's local HTTP telemetry endpoint.
//!
//! The endpoint serves one JSON object of live game state. It disappears
//! between missions and changes shape across vehicles, so the reader
//! tolerates unknown fields, maps missing fields to `None`, and treats a
//! failed poll as "keep the previous snapshot" rather than an error.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use chief_core::types::TelemetrySnapshot;

/// Configuration for polling the local telemetry endpoint.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub endpoint: String,
    pub poll_interval: Duration,
    /// Per-request timeout. The endpoint is local; anything slower than
    /// this means the game is not serving.
    pub request_timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8111/state".into(),
            poll_interval: Duration::from_millis(250),
            request_timeout: Duration::from_millis(200),
        }
    }
}

/// Polls the telemetry endpoint and keeps the latest good snapshot.
pub struct TelemetryReader {
    config: TelemetryConfig,
    client: reqwest::Client,
    last: TelemetrySnapshot,
}

impl TelemetryReader {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            last: TelemetrySnapshot::default(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    /// Poll once. On success the returned snapshot is the normalized fresh
    /// state; on any network or parse failure it is the previous snapshot
    /// (the default, empty snapshot before the first success). A single
    /// failed poll never surfaces as an error.
    pub async fn poll(&mut self) -> TelemetrySnapshot {
        match self.fetch().await {
            Ok(raw) => self.last = normalize_snapshot(&raw),
            Err(e) => debug!("telemetry poll failed: {e}"),
        }
        self.last.clone()
    }

    async fn fetch(&self) -> reqwest::Result<Value> {
        self.client
            .get(&self.config.endpoint)
            .timeout(self.config.request_timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// Normalize a raw telemetry object into a [`TelemetrySnapshot`].
///
/// Field mapping follows the game's state endpoint: the vehicle name comes
/// from `name` with `plane_name` as fallback, IAS from `speed.kmh` with a
/// flat `ias` fallback, and a fractional `fuel` value is scaled to percent.
/// Unknown extra fields are ignored.
pub fn normalize_snapshot(raw: &Value) -> TelemetrySnapshot {
    let vehicle = raw
        .get("name")
        .and_then(Value::as_str)
        .or_else(|| raw.get("plane_name").and_then(Value::as_str))
        .map(str::to_string);

    let ias_kmh = raw
        .pointer("/speed/kmh")
        .and_then(Value::as_f64)
        .or_else(|| raw.get("ias").and_then(Value::as_f64));

    // Integer fuel is already percent; a float is the 0.0–1.0 fraction.
    let fuel_percent = raw.get("fuel").and_then(|v| {
        v.as_u64()
            .map(|n| n as f64)
            .or_else(|| v.as_f64().map(|f| f * 100.0))
    });

    let damage = raw
        .get("damage")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .map(|(part, state)| {
                    let rendered = match state {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (part.clone(), rendered)
                })
                .collect()
        })
        .unwrap_or_default();

    TelemetrySnapshot {
        vehicle,
        ias_kmh,
        altitude_m: raw.get("altitude").and_then(Value::as_f64),
        fuel_percent,
        aoa_deg: raw.get("aoa").and_then(Value::as_f64),
        pitch_deg: raw.get("pitch").and_then(Value::as_f64),
        roll_deg: raw.get("roll").and_then(Value::as_f64),
        g_load: raw.get("g_force").and_then(Value::as_f64),
        g_status: raw
            .get("g_status")
            .and_then(Value::as_str)
            .map(str::to_string),
        gear_percent: raw.get("gear").and_then(Value::as_f64),
        flaps_percent: raw.get("flaps").and_then(Value::as_f64),
        ammo: raw.get("ammo").and_then(Value::as_u64),
        damage,
    }
}
