//! Mock Permission Channel for Testing
//!
//! Scripted answers per capability, with a prompt counter.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use voicedrawer::permissions::Capability;
use voicedrawer::platform::PermissionChannel;

/// `Some(answer)` is a user decision, `None` makes the prompt fail
pub struct MockPermissions {
    answers: HashMap<Capability, Option<bool>>,
    implicit: bool,
    hang: bool,
    pub prompts: Arc<Mutex<Vec<Capability>>>,
}

impl MockPermissions {
    pub fn new(microphone: Option<bool>, camera: Option<bool>) -> Self {
        Self {
            answers: HashMap::from([
                (Capability::Microphone, microphone),
                (Capability::Camera, camera),
            ]),
            implicit: false,
            hang: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn granting_all() -> Self {
        Self::new(Some(true), Some(true))
    }

    /// Every prompt stays open forever, as if the user never answers
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::granting_all()
        }
    }

    /// Platform without prompts; every answer is ignored
    pub fn implicit() -> Self {
        Self {
            implicit: true,
            ..Self::new(Some(false), Some(false))
        }
    }
}

#[async_trait]
impl PermissionChannel for MockPermissions {
    async fn request_permission(&self, capability: Capability) -> Result<bool> {
        self.prompts.lock().unwrap().push(capability);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.answers
            .get(&capability)
            .copied()
            .flatten()
            .ok_or_else(|| anyhow::anyhow!("Mock permission service failure"))
    }

    fn prompts(&self) -> bool {
        !self.implicit
    }
}
