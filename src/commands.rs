//! Command interpretation
//!
//! Maps a transcript to a drawer intent by case-insensitive substring match.

use crate::config::{Config, CLOSE_PHRASE, OPEN_PHRASE};
use crate::speech::Transcript;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    OpenDrawer,
    CloseDrawer,
    None,
}

impl Intent {
    /// Drawer target for this intent, if it has one
    pub fn drawer_target(self) -> Option<bool> {
        match self {
            Intent::OpenDrawer => Some(true),
            Intent::CloseDrawer => Some(false),
            Intent::None => None,
        }
    }
}

/// Stateless phrase matcher
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    open_phrase: String,
    close_phrase: String,
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new(OPEN_PHRASE, CLOSE_PHRASE)
    }
}

impl CommandInterpreter {
    pub fn new(open_phrase: &str, close_phrase: &str) -> Self {
        Self {
            open_phrase: open_phrase.trim().to_lowercase(),
            close_phrase: close_phrase.trim().to_lowercase(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.open_phrase, &config.close_phrase)
    }

    /// The open phrase is checked first, so it wins when both are spoken.
    /// An empty phrase never matches.
    pub fn interpret(&self, transcript: &Transcript) -> Intent {
        let text_lower = transcript.text().to_lowercase();
        let spoken = |phrase: &str| !phrase.is_empty() && text_lower.contains(phrase);

        let intent = if spoken(&self.open_phrase) {
            Intent::OpenDrawer
        } else if spoken(&self.close_phrase) {
            Intent::CloseDrawer
        } else {
            Intent::None
        };

        debug!("'{}' -> {:?}", transcript.text(), intent);
        intent
    }
}

/// Interpret with the default phrases
pub fn interpret(transcript: &Transcript) -> Intent {
    CommandInterpreter::default().interpret(transcript)
}
