//! VoiceDrawer Error Types
//!
//! Centralized error handling for the controller and its sessions.

use crate::permissions::Capability;
use thiserror::Error;

/// Central error type for VoiceDrawer
#[derive(Error, Debug)]
pub enum DrawerError {
    #[error("{0} permission denied")]
    PermissionDenied(Capability),

    #[error("Speech recognition is not available on this device")]
    SessionUnavailable,

    #[error("Session busy: {0}")]
    SessionBusy(&'static str),

    #[error("Engine error: {0}")]
    Engine(#[source] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DrawerError {
    /// Wrap a platform failure
    pub fn engine(err: impl Into<anyhow::Error>) -> Self {
        DrawerError::Engine(err.into())
    }

    /// Whether this error should be shown to the user as a notice.
    ///
    /// Permission and availability failures only degrade features, and
    /// `SessionBusy` is a race that gets logged and ignored.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, DrawerError::Engine(_))
    }
}

/// Result type alias for VoiceDrawer operations
pub type DrawerResult<T> = Result<T, DrawerError>;
