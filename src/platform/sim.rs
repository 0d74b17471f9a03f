//! Simulated platform services
//!
//! Used by the `voicedrawer` binary so the controller can be driven
//! from a terminal without device hardware.

use super::{CameraEngine, CameraHandle, PermissionChannel, ResultSink, SpeechEngine};
use crate::camera::CameraFacing;
use crate::permissions::Capability;
use crate::speech::Transcript;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Permission channel with fixed answers
#[derive(Debug, Clone)]
pub struct SimPermissions {
    pub microphone: bool,
    pub camera: bool,
    pub implicit: bool,
}

impl SimPermissions {
    pub fn granting_all() -> Self {
        Self {
            microphone: true,
            camera: true,
            implicit: false,
        }
    }
}

#[async_trait]
impl PermissionChannel for SimPermissions {
    async fn request_permission(&self, capability: Capability) -> Result<bool> {
        debug!("Simulated prompt for {}", capability);
        Ok(match capability {
            Capability::Microphone => self.microphone,
            Capability::Camera => self.camera,
        })
    }

    fn prompts(&self) -> bool {
        !self.implicit
    }
}

/// Speech engine fed by a [`SimSpeaker`]
pub struct SimSpeechEngine {
    available: bool,
    sink: Arc<Mutex<Option<ResultSink>>>,
    listening: Arc<AtomicBool>,
}

impl SimSpeechEngine {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            sink: Arc::new(Mutex::new(None)),
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for injecting utterances
    pub fn speaker(&self) -> SimSpeaker {
        SimSpeaker {
            sink: Arc::clone(&self.sink),
            listening: Arc::clone(&self.listening),
        }
    }
}

#[async_trait]
impl SpeechEngine for SimSpeechEngine {
    async fn is_available(&mut self) -> Result<bool> {
        Ok(self.available)
    }

    async fn start(&mut self, locale: &str) -> Result<()> {
        if !self.available {
            anyhow::bail!("no recognizer installed");
        }
        debug!("Simulated recognizer listening ({})", locale);
        self.listening.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.listening.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_result_sink(&mut self, sink: Option<ResultSink>) {
        if let Ok(mut slot) = self.sink.lock() {
            *slot = sink;
        }
    }

    fn dispose(&mut self) {
        self.listening.store(false, Ordering::SeqCst);
        self.set_result_sink(None);
    }

    fn name(&self) -> &str {
        "sim-speech"
    }
}

/// Injects utterances into a [`SimSpeechEngine`]
#[derive(Clone)]
pub struct SimSpeaker {
    sink: Arc<Mutex<Option<ResultSink>>>,
    listening: Arc<AtomicBool>,
}

impl SimSpeaker {
    /// Deliver one completed utterance. Returns false when nobody heard it.
    pub fn say(&self, text: &str) -> bool {
        if !self.listening.load(Ordering::SeqCst) {
            debug!("Recognizer idle, dropping '{}'", text);
            return false;
        }
        match self.sink.lock() {
            Ok(sink) => sink
                .as_ref()
                .map(|tx| tx.send(Transcript::new(text)).is_ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

/// Camera engine that hands out numbered handles
#[derive(Debug, Default)]
pub struct SimCameraEngine {
    next_id: u64,
    open: Vec<u64>,
}

impl SimCameraEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_handles(&self) -> usize {
        self.open.len()
    }
}

#[async_trait]
impl CameraEngine for SimCameraEngine {
    async fn open(&mut self, facing: CameraFacing) -> Result<CameraHandle> {
        self.next_id += 1;
        self.open.push(self.next_id);
        debug!("Simulated camera #{} opened ({})", self.next_id, facing);
        Ok(CameraHandle::new(self.next_id, facing))
    }

    fn close(&mut self, handle: CameraHandle) -> Result<()> {
        let before = self.open.len();
        self.open.retain(|id| *id != handle.id());
        if self.open.len() == before {
            anyhow::bail!("camera handle #{} is not open", handle.id());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "sim-camera"
    }
}
