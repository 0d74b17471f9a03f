//! Camera Session
//!
//! Owns the leased camera engine and at most one open capture handle.
//! The handle is always closed before the lease goes back to the slot.

use crate::error::{DrawerError, DrawerResult};
use crate::permissions::PermissionStatus;
use crate::platform::{CameraEngine, CameraHandle, DeviceLease};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraFacing {
    Front,
    #[default]
    Back,
}

impl CameraFacing {
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
        }
    }
}

pub struct CameraSession {
    engine: DeviceLease<dyn CameraEngine>,
    handle: Option<CameraHandle>,
    facing: CameraFacing,
}

impl CameraSession {
    pub fn new(engine: DeviceLease<dyn CameraEngine>) -> Self {
        Self {
            engine,
            handle: None,
            facing: CameraFacing::default(),
        }
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the capture handle if camera permission was granted.
    ///
    /// Returns `Ok(false)` without touching the device otherwise.
    pub async fn initialize(&mut self, permission: PermissionStatus) -> DrawerResult<bool> {
        if !permission.is_granted() {
            debug!("Camera permission {:?}, not opening device", permission);
            return Ok(false);
        }
        if self.handle.is_some() {
            return Ok(true);
        }

        let handle = self
            .engine
            .open(self.facing)
            .await
            .map_err(DrawerError::engine)?;
        info!("📷 Camera #{} opened ({})", handle.id(), self.facing);
        self.handle = Some(handle);
        Ok(true)
    }

    /// Switch between front and back sensors.
    ///
    /// Without an open handle this does nothing. With one, the handle is
    /// reopened on the other sensor; if that fails the facing reverts and
    /// the session is left closed.
    pub async fn toggle_facing(&mut self) -> DrawerResult<()> {
        let Some(handle) = self.handle.take() else {
            debug!("No camera handle open, ignoring flip");
            return Ok(());
        };

        let previous = self.facing;
        self.close(handle);
        self.facing = previous.flipped();

        match self.engine.open(self.facing).await {
            Ok(handle) => {
                info!("🔄 Camera #{} now facing {}", handle.id(), self.facing);
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.facing = previous;
                Err(DrawerError::engine(e))
            }
        }
    }

    /// Close the capture handle if one is open
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.close(handle);
        }
    }

    fn close(&mut self, handle: CameraHandle) {
        let id = handle.id();
        match self.engine.close(handle) {
            Ok(()) => info!("📷 Camera #{} released", id),
            Err(e) => warn!("⚠️ Camera #{} close failed: {}", id, e),
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}
