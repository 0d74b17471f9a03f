//! Mock Camera Engine for Testing
//!
//! Tracks opened and closed handles; can delay or fail opens.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use voicedrawer::camera::CameraFacing;
use voicedrawer::platform::{CameraEngine, CameraHandle};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraCalls {
    pub opens: usize,
    pub closes: usize,
    /// Ids currently open
    pub open_ids: Vec<u64>,
    pub facings: Vec<CameraFacing>,
}

pub struct MockCamera {
    open_delay: Option<Duration>,
    /// Opens after this many successful ones fail
    fail_after: Option<usize>,
    calls: Arc<Mutex<CameraCalls>>,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCamera {
    pub fn new() -> Self {
        Self {
            open_delay: None,
            fail_after: None,
            calls: Arc::new(Mutex::new(CameraCalls::default())),
        }
    }

    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    pub fn failing_after(mut self, successful_opens: usize) -> Self {
        self.fail_after = Some(successful_opens);
        self
    }

    pub fn recorder(&self) -> CameraRecorder {
        CameraRecorder {
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl CameraEngine for MockCamera {
    async fn open(&mut self, facing: CameraFacing) -> Result<CameraHandle> {
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }
        let mut calls = self.calls.lock().unwrap();
        if self.fail_after.is_some_and(|n| calls.opens >= n) {
            return Err(anyhow::anyhow!("Mock camera unplugged"));
        }
        calls.opens += 1;
        let id = calls.opens as u64;
        calls.open_ids.push(id);
        calls.facings.push(facing);
        Ok(CameraHandle::new(id, facing))
    }

    fn close(&mut self, handle: CameraHandle) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.closes += 1;
        calls.open_ids.retain(|id| *id != handle.id());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Clone)]
pub struct CameraRecorder {
    calls: Arc<Mutex<CameraCalls>>,
}

impl CameraRecorder {
    pub fn calls(&self) -> CameraCalls {
        self.calls.lock().unwrap().clone()
    }
}
