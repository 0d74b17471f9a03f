//! Mock Speech Engine for Testing
//!
//! Counts every engine call and lets tests emit utterances.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use voicedrawer::platform::{ResultSink, SpeechEngine};
use voicedrawer::speech::Transcript;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechCalls {
    pub availability_checks: usize,
    pub starts: usize,
    pub stops: usize,
    pub disposes: usize,
    pub locales: Vec<String>,
}

type Sink = Arc<Mutex<Option<ResultSink>>>;

pub struct MockSpeech {
    available: bool,
    fail_start: bool,
    hang_start: bool,
    calls: Arc<Mutex<SpeechCalls>>,
    sink: Sink,
}

impl MockSpeech {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            fail_start: false,
            hang_start: false,
            calls: Arc::new(Mutex::new(SpeechCalls::default())),
            sink: Arc::new(Mutex::new(None)),
        }
    }

    /// Engine whose `start` always errors
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Engine whose `start` never completes
    pub fn hanging_start(mut self) -> Self {
        self.hang_start = true;
        self
    }

    pub fn recorder(&self) -> SpeechRecorder {
        SpeechRecorder {
            calls: Arc::clone(&self.calls),
            sink: Arc::clone(&self.sink),
        }
    }
}

#[async_trait]
impl SpeechEngine for MockSpeech {
    async fn is_available(&mut self) -> Result<bool> {
        self.calls.lock().unwrap().availability_checks += 1;
        Ok(self.available)
    }

    async fn start(&mut self, locale: &str) -> Result<()> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.starts += 1;
            calls.locales.push(locale.to_string());
        }
        if self.hang_start {
            std::future::pending::<()>().await;
        }
        if self.fail_start {
            return Err(anyhow::anyhow!("Mock recognizer crashed"));
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.calls.lock().unwrap().stops += 1;
        Ok(())
    }

    fn set_result_sink(&mut self, sink: Option<ResultSink>) {
        *self.sink.lock().unwrap() = sink;
    }

    fn dispose(&mut self) {
        self.calls.lock().unwrap().disposes += 1;
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Test-side view of a [`MockSpeech`] after it moved into its slot
#[derive(Clone)]
pub struct SpeechRecorder {
    calls: Arc<Mutex<SpeechCalls>>,
    sink: Sink,
}

impl SpeechRecorder {
    pub fn calls(&self) -> SpeechCalls {
        self.calls.lock().unwrap().clone()
    }

    /// Deliver an utterance to the current subscriber.
    /// Returns false when nobody is subscribed.
    pub fn emit(&self, text: &str) -> bool {
        self.emit_at(text, Utc::now())
    }

    /// Deliver an utterance that completed at `timestamp`
    pub fn emit_at(&self, text: &str, timestamp: DateTime<Utc>) -> bool {
        self.sink
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.send(Transcript::at(text, timestamp)).is_ok())
            .unwrap_or(false)
    }
}
