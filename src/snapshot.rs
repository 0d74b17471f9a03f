//! Read-only screen state published by the controller

use crate::camera::CameraFacing;
use crate::drawer::DrawerState;
use crate::permissions::PermissionStatus;
use crate::speech::{ListeningState, Transcript};
use serde::Serialize;

/// A one-shot user-visible failure message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Increases with every notice, so a host can show each one once
    pub id: u64,
    pub message: String,
}

/// Everything the hosting screen needs to render
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScreenSnapshot {
    /// True once the mount sequence has finished, false again after teardown
    pub mounted: bool,
    pub drawer_state: DrawerState,
    /// 0.0 closed .. 1.0 open, mid-slide values while animating
    pub drawer_offset: f32,
    pub listening_state: ListeningState,
    pub camera_facing: CameraFacing,
    pub camera_active: bool,
    pub microphone: PermissionStatus,
    pub camera: PermissionStatus,
    pub voice_enabled: bool,
    pub last_transcript: Option<Transcript>,
    pub notice: Option<Notice>,
}

impl ScreenSnapshot {
    /// Short single-line summary for terminal output
    pub fn summary(&self) -> String {
        format!(
            "drawer={:?}({:.2}) listening={:?} camera={}{} mic={:?} cam={:?} heard={}",
            self.drawer_state,
            self.drawer_offset,
            self.listening_state,
            self.camera_facing,
            if self.camera_active { "" } else { "(off)" },
            self.microphone,
            self.camera,
            self.last_transcript
                .as_ref()
                .map(|t| format!("'{}'", t.text()))
                .unwrap_or_else(|| "-".into()),
        )
    }
}
