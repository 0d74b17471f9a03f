//! Speech Session
//!
//! Wraps the leased speech engine: availability check, start/stop,
//! and the single transcript subscription.

use crate::error::{DrawerError, DrawerResult};
use crate::platform::{DeviceLease, SpeechEngine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Text of one completed utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    text: String,
    timestamp: DateTime<Utc>,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self::at(text, Utc::now())
    }

    pub fn at(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

/// Receiving end of the result subscription
#[derive(Debug)]
pub struct TranscriptStream {
    rx: mpsc::UnboundedReceiver<Transcript>,
}

impl TranscriptStream {
    /// Next completed utterance, in completion order.
    /// Returns `None` once the subscription is cleared or replaced.
    pub async fn next(&mut self) -> Option<Transcript> {
        while let Some(transcript) = self.rx.recv().await {
            let text = transcript.text().trim();
            if text.is_empty() {
                debug!("Skipping empty utterance");
                continue;
            }
            return Some(Transcript::at(text, transcript.timestamp()));
        }
        None
    }
}

pub struct SpeechSession {
    engine: Option<DeviceLease<dyn SpeechEngine>>,
    available: Option<bool>,
    state: ListeningState,
}

impl SpeechSession {
    pub fn new(engine: DeviceLease<dyn SpeechEngine>) -> Self {
        Self {
            engine: Some(engine),
            available: None,
            state: ListeningState::Idle,
        }
    }

    /// Ask the engine whether recognition exists on this device.
    /// Must run before [`start`](Self::start). Engine failures count as unavailable.
    pub async fn check_availability(&mut self) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let available = match engine.is_available().await {
            Ok(available) => available,
            Err(e) => {
                warn!("⚠️ Speech availability check failed: {}", e);
                false
            }
        };
        info!("🎙️ Speech engine '{}' available: {}", engine.name(), available);
        self.available = Some(available);
        available
    }

    pub fn is_available(&self) -> bool {
        self.available == Some(true)
    }

    pub fn listening_state(&self) -> ListeningState {
        self.state
    }

    pub async fn start(&mut self, locale: &str) -> DrawerResult<()> {
        if !self.is_available() {
            return Err(DrawerError::SessionUnavailable);
        }
        if self.state == ListeningState::Listening {
            return Err(DrawerError::SessionBusy("already listening"));
        }
        let engine = self.engine.as_mut().ok_or(DrawerError::SessionUnavailable)?;

        engine.start(locale).await.map_err(DrawerError::engine)?;
        self.state = ListeningState::Listening;
        info!("👂 Listening ({})", locale);
        Ok(())
    }

    /// Stop listening. No-op when already idle.
    ///
    /// On engine failure the session still falls back to Idle.
    pub async fn stop(&mut self) -> DrawerResult<()> {
        if self.state == ListeningState::Idle {
            return Ok(());
        }
        self.state = ListeningState::Idle;
        let engine = self.engine.as_mut().ok_or(DrawerError::SessionUnavailable)?;
        engine.stop().await.map_err(DrawerError::engine)?;
        info!("🔇 Stopped listening");
        Ok(())
    }

    /// Install the single result subscriber, closing any previous one
    pub fn subscribe(&mut self) -> TranscriptStream {
        let (tx, rx) = mpsc::unbounded_channel();
        match self.engine.as_mut() {
            Some(engine) => engine.set_result_sink(Some(tx)),
            None => drop(tx),
        }
        TranscriptStream { rx }
    }

    /// Release the engine and its subscription
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.set_result_sink(None);
            engine.dispose();
            self.state = ListeningState::Idle;
            info!("🗑️ Speech session disposed");
        }
    }
}

impl Drop for SpeechSession {
    fn drop(&mut self) {
        self.release();
    }
}
