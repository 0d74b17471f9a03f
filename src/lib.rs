//! VoiceDrawer Library
//!
//! A screen controller that drives a sliding drawer from taps and voice
//! commands while managing microphone/camera permissions and the
//! speech and camera device sessions.

pub mod camera;
pub mod commands;
pub mod config;
pub mod controller;
pub mod drawer;
pub mod error;
pub mod permissions;
pub mod platform;
pub mod snapshot;
pub mod speech;

pub use controller::{ControllerHandle, DrawerController};
pub use error::{DrawerError, DrawerResult};
