//! Spoken narration of data points
//!
//! Platforms announce their available voices asynchronously. The pool
//! is the process-wide registry for them, with an explicit ready
//! signal so callers can wait for voices instead of guessing at
//! callback timing. Actual speech goes through a pluggable backend;
//! the default one prints narration lines.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use once_cell::sync::Lazy;
use tokio::sync::watch;

/// One available voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub language: String,
}

impl Voice {
    /// Create a voice
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// Turns narration text into audible (or visible) speech
pub trait SpeechBackend {
    /// Speak the text, optionally with a specific voice
    fn speak(&mut self, voice: Option<&Voice>, text: &str) -> Result<()>;

    /// Cancel any utterance in progress
    fn cancel(&mut self) -> Result<()>;
}

/// Backend that prints narration lines to stdout
pub struct ConsoleBackend;

impl SpeechBackend for ConsoleBackend {
    fn speak(&mut self, voice: Option<&Voice>, text: &str) -> Result<()> {
        match voice {
            Some(v) => println!("[{}] {}", v.name, text),
            None => println!("[narration] {}", text),
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        Ok(())
    }
}

struct PoolState {
    voices: Vec<Voice>,
    preferred_name: Option<String>,
    language: Option<String>,
}

/// Process-wide voice registry
pub struct VoicePool {
    state: Mutex<PoolState>,
    ready_tx: watch::Sender<bool>,
}

impl VoicePool {
    /// Create an empty, not-yet-ready pool
    pub fn new() -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(PoolState {
                voices: Vec::new(),
                preferred_name: None,
                language: None,
            }),
            ready_tx,
        }
    }

    /// The process-wide pool
    pub fn global() -> Arc<VoicePool> {
        static POOL: Lazy<Arc<VoicePool>> = Lazy::new(|| Arc::new(VoicePool::new()));
        Arc::clone(&POOL)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record which voice (exact name) and language prefix to prefer
    pub fn set_preference(&self, voice: Option<String>, language: Option<String>) {
        let mut state = self.lock();
        state.preferred_name = voice;
        state.language = language;
    }

    /// Install the announced voices and mark the pool ready
    ///
    /// Replaces any previously installed set.
    pub fn install(&self, voices: Vec<Voice>) {
        self.lock().voices = voices;
        self.ready_tx.send_replace(true);
    }

    /// Drop all voices and return to the not-ready state
    pub fn clear(&self) {
        self.lock().voices.clear();
        self.ready_tx.send_replace(false);
    }

    /// Whether voices have been announced
    pub fn ready(&self) -> bool {
        *self.ready_tx.borrow()
    }

    /// Wait until voices have been announced
    pub async fn when_ready(&self) {
        let mut rx = self.ready_tx.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// All installed voices
    pub fn voices(&self) -> Vec<Voice> {
        self.lock().voices.clone()
    }

    /// Resolve the preferred voice
    ///
    /// Exact name match first, then the first voice whose language
    /// starts with the configured prefix, else None (backend default).
    pub fn preferred(&self) -> Option<Voice> {
        let state = self.lock();

        if let Some(name) = &state.preferred_name {
            if let Some(voice) = state.voices.iter().find(|v| &v.name == name) {
                return Some(voice.clone());
            }
            log::debug!("preferred voice '{}' not available", name);
        }

        if let Some(language) = &state.language {
            if let Some(voice) = state
                .voices
                .iter()
                .find(|v| v.language.starts_with(language.as_str()))
            {
                return Some(voice.clone());
            }
        }

        None
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Speaks data points through a backend
pub struct Narrator {
    pool: Arc<VoicePool>,
    backend: Box<dyn SpeechBackend>,
}

impl Narrator {
    /// Create a narrator
    pub fn new(pool: Arc<VoicePool>, backend: Box<dyn SpeechBackend>) -> Self {
        Self { pool, backend }
    }

    /// Speak a line, cancelling any utterance still in progress
    pub fn say(&mut self, text: &str) -> Result<()> {
        self.backend.cancel()?;
        let voice = self.pool.preferred();
        self.backend.speak(voice.as_ref(), text)
    }

    /// Announce one record
    pub fn describe(&mut self, label: &str, value: f64) -> Result<()> {
        self.say(&format!("{}: {}", label, value))
    }

    /// Stop speaking
    pub fn stop(&mut self) -> Result<()> {
        self.backend.cancel()
    }
}
