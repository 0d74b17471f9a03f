#![allow(dead_code)]

pub mod mock_camera;
pub mod mock_permissions;
pub mod mock_speech;

use mock_camera::{CameraRecorder, MockCamera};
use mock_permissions::MockPermissions;
use mock_speech::{MockSpeech, SpeechRecorder};
use voicedrawer::platform::{CameraSlot, Platform, SpeechSlot};

/// A platform built from mocks, plus recorders to inspect them afterwards
pub struct TestPlatform {
    pub platform: Platform,
    pub speech: SpeechRecorder,
    pub camera: CameraRecorder,
    pub speech_slot: SpeechSlot,
    pub camera_slot: CameraSlot,
}

impl TestPlatform {
    pub fn new(permissions: MockPermissions, speech: MockSpeech, camera: MockCamera) -> Self {
        let speech_recorder = speech.recorder();
        let camera_recorder = camera.recorder();
        let speech_slot = SpeechSlot::speech(speech);
        let camera_slot = CameraSlot::camera(camera);
        Self {
            platform: Platform::new(permissions, speech_slot.clone(), camera_slot.clone()),
            speech: speech_recorder,
            camera: camera_recorder,
            speech_slot,
            camera_slot,
        }
    }

    /// Everything granted and available
    pub fn granted() -> Self {
        Self::new(
            MockPermissions::granting_all(),
            MockSpeech::new(true),
            MockCamera::new(),
        )
    }
}
