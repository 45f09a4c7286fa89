//! Sonification session
//!
//! Binds a dataset slice to a target pitch range and plays single
//! values as notes through an injected sound sink.

use std::time::Duration;

use thiserror::Error;

use crate::mapping::{LinearMapper, Mapper, NoteName, PitchQuantizer};

/// Target pitch range, in MIDI index space (60 = C4)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchRange {
    pub low: f64,
    pub high: f64,
}

impl PitchRange {
    /// Create a pitch range; `low` should not exceed `high`
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Sound-emission collaborator
///
/// Implementations turn a note into something audible: a synth tone, a
/// MIDI message, or (in tests) a log entry. `stop` silences whatever is
/// currently sounding.
pub trait NoteSink {
    /// Emit a note
    fn play(&mut self, note: NoteName, frequency: f64, duration: Duration) -> anyhow::Result<()>;

    /// Silence any in-flight sound
    fn stop(&mut self) -> anyhow::Result<()>;
}

/// Sink that discards every note
///
/// For dry runs and offline rendering, where only the mapping matters.
pub struct NullSink;

impl NoteSink for NullSink {
    fn play(&mut self, _: NoteName, _: f64, _: Duration) -> anyhow::Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Errors a session can report
///
/// All of these are local to the offending call: a failed play skips
/// that note and leaves the session usable.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not ready: configure it with a non-empty dataset first")]
    NotReady,

    #[error("index {index} out of bounds for {len} values")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("sound emission failed: {0}")]
    Sink(anyhow::Error),
}

/// A configured mapping from dataset values to playable notes
pub struct SonificationSession {
    values: Vec<f64>,
    source_range: Option<(f64, f64)>,
    target: PitchRange,
    quantizer: PitchQuantizer,
    note_duration: Duration,
    sink: Box<dyn NoteSink>,
}

impl SonificationSession {
    /// Create a session; it is not ready until `configure` is called
    pub fn new(quantizer: PitchQuantizer, note_duration: Duration, sink: Box<dyn NoteSink>) -> Self {
        Self {
            values: Vec::new(),
            source_range: None,
            target: PitchRange::new(48.0, 72.0),
            quantizer,
            note_duration,
            sink,
        }
    }

    /// Bind a dataset slice and a target pitch range
    ///
    /// Computes the source range as (min, max) of `values` and replaces
    /// any previous configuration entirely. An empty slice leaves the
    /// session not ready.
    pub fn configure(&mut self, values: Vec<f64>, target: PitchRange) {
        self.source_range = if values.is_empty() {
            None
        } else {
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            Some((min, max))
        };
        self.values = values;
        self.target = target;
    }

    /// Number of configured values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the session has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the session can play
    pub fn is_ready(&self) -> bool {
        self.source_range.is_some()
    }

    /// How long each emitted note lasts
    pub fn note_duration(&self) -> Duration {
        self.note_duration
    }

    /// The value at an index, if any
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Map one value to its note without emitting anything
    ///
    /// This is the pure half of `play`: for a fixed configuration the
    /// same index always yields the same note.
    pub fn note_for(&self, index: usize) -> Result<NoteName, SessionError> {
        let (min, max) = self.source_range.ok_or(SessionError::NotReady)?;
        let value = self
            .values
            .get(index)
            .copied()
            .ok_or(SessionError::IndexOutOfBounds {
                index,
                len: self.values.len(),
            })?;

        let mapper = LinearMapper::new("pitch", min, max, self.target.low, self.target.high);
        Ok(self.quantizer.quantize(mapper.map(value)))
    }

    /// Map one value to its note and emit it through the sink
    pub fn play(&mut self, index: usize) -> Result<NoteName, SessionError> {
        let note = self.note_for(index)?;
        self.sink
            .play(note, note.frequency(), self.note_duration)
            .map_err(SessionError::Sink)?;
        Ok(note)
    }

    /// Silence the sink
    pub fn stop(&mut self) -> anyhow::Result<()> {
        self.sink.stop()
    }
}
