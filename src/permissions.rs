//! Permission Gateway
//!
//! Requests microphone/camera access and caches each decision for the
//! lifetime of the mounted controller.

use crate::platform::PermissionChannel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// A protected device feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Microphone,
    Camera,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Microphone => write!(f, "microphone"),
            Capability::Camera => write!(f, "camera"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PermissionStatus {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

pub struct PermissionGateway {
    channel: Box<dyn PermissionChannel>,
    statuses: HashMap<Capability, PermissionStatus>,
}

impl PermissionGateway {
    pub fn new(channel: Box<dyn PermissionChannel>) -> Self {
        Self {
            channel,
            statuses: HashMap::new(),
        }
    }

    /// Current decision without prompting
    pub fn status(&self, capability: Capability) -> PermissionStatus {
        self.statuses
            .get(&capability)
            .copied()
            .unwrap_or_default()
    }

    /// Resolve a capability, prompting only if it is still Unknown.
    ///
    /// A failed prompt resolves to Denied; callers cannot tell the two apart.
    pub async fn request(&mut self, capability: Capability) -> PermissionStatus {
        let cached = self.status(capability);
        if cached != PermissionStatus::Unknown {
            debug!("{} permission already {:?}", capability, cached);
            return cached;
        }

        let status = if !self.channel.prompts() {
            debug!("Platform grants {} implicitly", capability);
            PermissionStatus::Granted
        } else {
            match self.channel.request_permission(capability).await {
                Ok(true) => PermissionStatus::Granted,
                Ok(false) => PermissionStatus::Denied,
                Err(e) => {
                    warn!("⚠️ {} permission request failed: {}", capability, e);
                    PermissionStatus::Denied
                }
            }
        };

        info!("🔑 {} permission: {:?}", capability, status);
        self.statuses.insert(capability, status);
        status
    }

    /// Return every capability to Unknown
    pub fn reset(&mut self) {
        self.statuses.clear();
    }
}
