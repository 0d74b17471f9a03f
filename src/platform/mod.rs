//! Platform Capability Services
//!
//! Traits for the device services the controller consumes:
//! - PermissionChannel: runtime permission prompts
//! - SpeechEngine: the process-wide speech recognizer
//! - CameraEngine: the process-wide camera capture device
//!
//! The recognizer and camera allow a single owner at a time. Each is
//! wrapped in a [`DeviceSlot`] that hands out an exclusive [`DeviceLease`];
//! a second controller waits in `acquire` until the first one releases.

pub mod sim;

use crate::camera::CameraFacing;
use crate::permissions::Capability;
use crate::speech::Transcript;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tracing::debug;

/// Trait for runtime permission prompts
#[async_trait]
pub trait PermissionChannel: Send + Sync {
    /// Ask the OS for a capability; may suspend on a user prompt
    async fn request_permission(&self, capability: Capability) -> Result<bool>;

    /// Whether this platform prompts at all.
    /// Platforms with implicit permissions return false.
    fn prompts(&self) -> bool {
        true
    }
}

/// Receives one [`Transcript`] per completed utterance, stamped by the
/// engine when the utterance ends
pub type ResultSink = mpsc::UnboundedSender<Transcript>;

/// Trait for speech recognition engines
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Check whether a recognizer exists on this device
    async fn is_available(&mut self) -> Result<bool>;

    /// Begin streaming recognition in the given locale
    async fn start(&mut self, locale: &str) -> Result<()>;

    /// Stop recognition
    async fn stop(&mut self) -> Result<()>;

    /// Install (or clear, with `None`) the single result subscriber
    fn set_result_sink(&mut self, sink: Option<ResultSink>);

    /// Release recognizer resources
    fn dispose(&mut self);

    /// Get the engine name
    fn name(&self) -> &str {
        "speech"
    }
}

/// Trait for camera capture engines
#[async_trait]
pub trait CameraEngine: Send + Sync {
    /// Open a capture handle on the given sensor
    async fn open(&mut self, facing: CameraFacing) -> Result<CameraHandle>;

    /// Close a handle. Consumes it, so a handle is closed at most once.
    fn close(&mut self, handle: CameraHandle) -> Result<()>;

    /// Get the engine name
    fn name(&self) -> &str {
        "camera"
    }
}

/// An open camera capture handle.
///
/// Deliberately not `Clone`: the only way to get rid of one is to hand it
/// back to [`CameraEngine::close`].
#[derive(Debug, PartialEq, Eq)]
pub struct CameraHandle {
    id: u64,
    facing: CameraFacing,
}

impl CameraHandle {
    pub fn new(id: u64, facing: CameraFacing) -> Self {
        Self { id, facing }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }
}

/// A single-owner device resource
pub struct DeviceSlot<E: ?Sized> {
    name: &'static str,
    inner: Arc<Mutex<Box<E>>>,
}

pub type SpeechSlot = DeviceSlot<dyn SpeechEngine>;
pub type CameraSlot = DeviceSlot<dyn CameraEngine>;

impl<E: ?Sized> Clone for DeviceSlot<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: ?Sized> fmt::Debug for DeviceSlot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSlot")
            .field("name", &self.name)
            .field("held", &self.is_held())
            .finish()
    }
}

impl<E: ?Sized> DeviceSlot<E> {
    pub fn new(name: &'static str, engine: Box<E>) -> Self {
        Self {
            name,
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Wait until the device is free, then take it
    pub async fn acquire(&self) -> DeviceLease<E> {
        if self.is_held() {
            debug!("⏳ Waiting for {} device to be released", self.name);
        }
        let guard = Arc::clone(&self.inner).lock_owned().await;
        debug!("🔐 Acquired {} device", self.name);
        DeviceLease {
            name: self.name,
            guard,
        }
    }

    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl SpeechSlot {
    pub fn speech(engine: impl SpeechEngine + 'static) -> Self {
        Self::new("speech", Box::new(engine))
    }
}

impl CameraSlot {
    pub fn camera(engine: impl CameraEngine + 'static) -> Self {
        Self::new("camera", Box::new(engine))
    }
}

/// Exclusive ownership of a device; released on drop
pub struct DeviceLease<E: ?Sized> {
    name: &'static str,
    guard: OwnedMutexGuard<Box<E>>,
}

impl<E: ?Sized> Deref for DeviceLease<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &**self.guard
    }
}

impl<E: ?Sized> DerefMut for DeviceLease<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut **self.guard
    }
}

impl<E: ?Sized> Drop for DeviceLease<E> {
    fn drop(&mut self) {
        debug!("🔓 Released {} device", self.name);
    }
}

/// Everything a controller needs from the host platform
pub struct Platform {
    pub permissions: Box<dyn PermissionChannel>,
    pub speech: SpeechSlot,
    pub camera: CameraSlot,
}

impl Platform {
    pub fn new(
        permissions: impl PermissionChannel + 'static,
        speech: SpeechSlot,
        camera: CameraSlot,
    ) -> Self {
        Self {
            permissions: Box::new(permissions),
            speech,
            camera,
        }
    }
}
