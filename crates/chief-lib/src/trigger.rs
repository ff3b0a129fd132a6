//! Activation triggers — wake word and global hotkey.
//!
//! Both listeners are stubs with the interface the rest of the engine
//! expects: they hold their configured phrase or chord, log that they are
//! waiting, and push a [`TriggerEvent`] when fired. A real wake-word engine
//! or OS hotkey hook plugs in behind the same channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

/// What woke the assistant up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    WakeWord,
    Hotkey,
}

/// Create the trigger channel shared by all listeners.
pub fn trigger_channel() -> (mpsc::UnboundedSender<TriggerEvent>, mpsc::UnboundedReceiver<TriggerEvent>) {
    mpsc::unbounded_channel()
}

/// Stub wake-word listener.
pub struct WakeWordListener {
    wake_word: String,
    tx: mpsc::UnboundedSender<TriggerEvent>,
}

impl WakeWordListener {
    pub fn new(wake_word: String, tx: mpsc::UnboundedSender<TriggerEvent>) -> Self {
        Self { wake_word, tx }
    }

    /// Blocking loop that would feed a detection engine. Stub mode only
    /// logs the configured wake word.
    pub async fn run(self) {
        info!("wake word listener running (stub mode)");
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            debug!("waiting for wake word: {}", self.wake_word);
        }
    }

    /// Fire the trigger manually, for tests and demos.
    pub fn fire(&self) {
        info!("wake word manually triggered");
        let _ = self.tx.send(TriggerEvent::WakeWord);
    }
}

/// Stub global-hotkey listener.
pub struct HotkeyListener {
    hotkey: String,
    tx: mpsc::UnboundedSender<TriggerEvent>,
}

impl HotkeyListener {
    pub fn new(hotkey: String, tx: mpsc::UnboundedSender<TriggerEvent>) -> Self {
        Self { hotkey, tx }
    }

    pub async fn run(self) {
        info!("hotkey listener running (stub mode)");
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            debug!("waiting for hotkey: {}", self.hotkey);
        }
    }

    pub fn fire(&self) {
        info!("hotkey manually triggered");
        let _ = self.tx.send(TriggerEvent::Hotkey);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fired_triggers_arrive_on_the_channel() {
        let (tx, mut rx) = trigger_channel();
        let wake = WakeWordListener::new("chief".into(), tx.clone());
        let hotkey = HotkeyListener::new("capslock+q".into(), tx);

        wake.fire();
        hotkey.fire();

        assert_eq!(rx.recv().await, Some(TriggerEvent::WakeWord));
        assert_eq!(rx.recv().await, Some(TriggerEvent::Hotkey));
    }
}
