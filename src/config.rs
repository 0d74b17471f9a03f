use crate::error::{DrawerError, DrawerResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DRAWER_ANIMATION_DURATION_MS: u64 = 200;
pub const RECOGNITION_LOCALE: &str = "en-US";
pub const OPEN_PHRASE: &str = "open menu";
pub const CLOSE_PHRASE: &str = "close menu";
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Drawer
    pub drawer_animation_duration_ms: u64,
    pub frame_interval_ms: u64,

    // Speech
    pub recognition_locale: String,
    pub open_phrase: String,
    pub close_phrase: String,
    pub auto_listen: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            drawer_animation_duration_ms: DRAWER_ANIMATION_DURATION_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            recognition_locale: RECOGNITION_LOCALE.to_string(),
            open_phrase: OPEN_PHRASE.to_string(),
            close_phrase: CLOSE_PHRASE.to_string(),
            auto_listen: true,
        }
    }
}

impl Config {
    /// Load config overrides from a JSON file, or fall back to defaults
    pub fn load(path: Option<&Path>) -> DrawerResult<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = match Self::from_json_str(&content) {
            Ok(config) => config,
            Err(e) => {
                // Graceful degradation: log warning and use defaults
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                return Ok(Self::default());
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> DrawerResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reject values the animator and interpreter cannot work with
    pub fn validate(&self) -> DrawerResult<()> {
        if self.drawer_animation_duration_ms == 0 {
            return Err(DrawerError::Config(
                "drawer_animation_duration_ms must be positive".into(),
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(DrawerError::Config("frame_interval_ms must be positive".into()));
        }
        let open = self.open_phrase.trim().to_lowercase();
        let close = self.close_phrase.trim().to_lowercase();
        if open.is_empty() || close.is_empty() {
            return Err(DrawerError::Config("command phrases must not be empty".into()));
        }
        if open == close {
            return Err(DrawerError::Config(format!(
                "open and close phrases are identical: '{}'",
                open
            )));
        }
        if self.recognition_locale.trim().is_empty() {
            return Err(DrawerError::Config("recognition_locale must not be empty".into()));
        }
        Ok(())
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.drawer_animation_duration_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voicedrawer")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.drawer_animation_duration_ms, 200);
        assert_eq!(config.recognition_locale, "en-US");
        assert_eq!(config.open_phrase, "open menu");
        assert_eq!(config.close_phrase, "close menu");
        assert!(config.auto_listen);
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = Config::from_json_str(r#"{"drawer_animation_duration_ms": 350}"#)
            .expect("Failed to parse");
        assert_eq!(config.animation_duration(), Duration::from_millis(350));
        assert_eq!(config.open_phrase, OPEN_PHRASE);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            drawer_animation_duration_ms: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(DrawerError::Config(_))));

        let config = Config {
            close_phrase: "OPEN MENU".into(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(DrawerError::Config(_))));

        let config = Config {
            open_phrase: "  ".into(),
            ..Config::default()
        };
        tokio_test::assert_err!(config.validate());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config::load(Some(&dir.path().join("nope.json"))).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_corrupt_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{{ not valid json").expect("write");
        let config = Config::load(Some(file.path())).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_values_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(file, r#"{{"frame_interval_ms": 0}}"#).expect("write");
        assert!(Config::load(Some(file.path())).is_err());
    }
}
