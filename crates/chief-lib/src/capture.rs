//! Microphone capture via cpal.
//!
//! Delivers 16 kHz mono i16 samples regardless of the device's native
//! format, and implements the push-to-talk capture loop: record from the
//! trigger until the speaker goes quiet.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use tokio::sync::mpsc;
use tracing::warn;

use chief_core::wav::{compute_rms, SAMPLE_RATE};

use crate::{Error, Result};

/// Samples per `read_chunk()` call — 100 ms at 16 kHz mono.
const CHUNK_SAMPLES: usize = 1_600;

// End-of-phrase detection
const SILENCE_THRESHOLD: f32 = 0.004;
const MIN_SPEECH_MS: u64 = 180;
const SILENCE_DURATION_MS: u64 = 700;
const MAX_CAPTURE_MS: u64 = 12_000;
const NO_SPEECH_TIMEOUT_MS: u64 = 7_000;

pub struct MicrophoneStream {
    rx: mpsc::UnboundedReceiver<Vec<i16>>,
    buf: Vec<i16>,
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl MicrophoneStream {
    /// Open the default input device and start capturing.
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no microphone found".into()))?;
        let supported = device
            .default_input_config()
            .map_err(|e| Error::Audio(format!("no input config: {e}")))?;

        let native_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let (tx, rx) = mpsc::unbounded_channel::<Vec<i16>>();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_thread = stop.clone();

        // The cpal Stream is !Send on some hosts; it lives on its own OS
        // thread for the lifetime of the capture.
        let thread = std::thread::spawn(move || {
            let deliver = move |samples: Vec<i16>| {
                let mono = downmix(&samples, channels);
                let _ = tx.send(resample(&mono, native_rate, SAMPLE_RATE));
            };

            let stream = match sample_format {
                SampleFormat::I16 => {
                    let stop = stop_thread.clone();
                    device.build_input_stream(
                        &config,
                        move |data: &[i16], _: &cpal::InputCallbackInfo| {
                            if !stop.load(Ordering::Relaxed) {
                                deliver(data.to_vec());
                            }
                        },
                        |err| warn!("capture error: {err}"),
                        None,
                    )
                }
                SampleFormat::F32 => {
                    let stop = stop_thread.clone();
                    device.build_input_stream(
                        &config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            if !stop.load(Ordering::Relaxed) {
                                let quantized = data
                                    .iter()
                                    .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                                    .collect();
                                deliver(quantized);
                            }
                        },
                        |err| warn!("capture error: {err}"),
                        None,
                    )
                }
                other => {
                    warn!("unsupported sample format: {other:?}");
                    return;
                }
            };

            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    warn!("failed to build capture stream: {e}");
                    return;
                }
            };
            if let Err(e) = stream.play() {
                warn!("failed to start capture stream: {e}");
                return;
            }

            // Park until told to stop; dropping the stream ends capture.
            loop {
                std::thread::park();
                if stop_thread.load(Ordering::Relaxed) {
                    break;
                }
            }
        });

        Ok(Self {
            rx,
            buf: Vec::new(),
            stop,
            thread: Some(thread),
        })
    }

    /// Read exactly [`CHUNK_SAMPLES`] samples.
    async fn read_chunk(&mut self) -> Result<Vec<i16>> {
        while self.buf.len() < CHUNK_SAMPLES {
            match self.rx.recv().await {
                Some(samples) => self.buf.extend_from_slice(&samples),
                None => return Err(Error::Audio("capture stream ended".into())),
            }
        }
        Ok(self.buf.drain(..CHUNK_SAMPLES).collect())
    }

    /// Record one spoken phrase: wait for speech, accumulate it, and stop
    /// after a sustained pause. Returns an empty buffer when no speech
    /// arrives before the timeout.
    pub async fn capture_phrase(&mut self) -> Result<Vec<i16>> {
        let start = Instant::now();
        let mut audio: Vec<i16> = Vec::new();
        let mut speech_started: Option<Instant> = None;
        let mut silence_started: Option<Instant> = None;

        loop {
            let chunk = match tokio::time::timeout(Duration::from_millis(500), self.read_chunk())
                .await
            {
                Ok(Ok(chunk)) => chunk,
                Ok(Err(e)) if audio.is_empty() => return Err(e),
                Ok(Err(_)) => break,
                Err(_) if audio.is_empty() => {
                    return Err(Error::Audio("capture read timeout".into()));
                }
                // A stalled device mid-phrase still yields what was heard.
                Err(_) => break,
            };

            let speaking = compute_rms(&chunk) > SILENCE_THRESHOLD;
            if speaking {
                silence_started = None;
                speech_started.get_or_insert_with(Instant::now);
                audio.extend_from_slice(&chunk);
            } else if let Some(since) = speech_started {
                audio.extend_from_slice(&chunk);
                if since.elapsed() >= Duration::from_millis(MIN_SPEECH_MS) {
                    let quiet = silence_started.get_or_insert_with(Instant::now);
                    if quiet.elapsed() >= Duration::from_millis(SILENCE_DURATION_MS) {
                        break;
                    }
                }
            }

            if speech_started.is_none()
                && start.elapsed() >= Duration::from_millis(NO_SPEECH_TIMEOUT_MS)
            {
                return Ok(Vec::new());
            }
            if speech_started.is_some() && start.elapsed() >= Duration::from_millis(MAX_CAPTURE_MS)
            {
                break;
            }
        }

        Ok(audio)
    }
}

impl Drop for MicrophoneStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

/// Average multi-channel frames down to mono.
fn downmix(input: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return input.to_vec();
    }
    input
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Linear-interpolation resampling. Sufficient for speech.
fn resample(input: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (input.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);
    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;
        let s0 = input[idx] as f64;
        let s1 = if idx + 1 < input.len() {
            input[idx + 1] as f64
        } else {
            s0
        };
        output.push((s0 + frac * (s1 - s0)) as i16);
    }
    output
}
