//! Playback scheduling
//!
//! Playback order is an explicit list of steps consumed one at a time
//! by a single-threaded sequencer, not an artifact of timer offsets.
//! Spacing comes from one fixed interval between steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::mapping::NoteName;
use crate::session::SonificationSession;

/// Cancellation flag shared between a running sequence and whoever
/// wants to stop it (a Ctrl-C handler, a newer playback)
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// One playback step: which dataset index to sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
}

/// Ordered list of playback steps
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    /// Create a sequence from explicit steps
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// A left-to-right sweep over the first `len` indices
    pub fn sweep(len: usize) -> Self {
        Self::from_indices(0..len)
    }

    /// Create a sequence from dataset indices, in the given order
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            steps: indices.into_iter().map(|index| Step { index }).collect(),
        }
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The steps, in playback order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// What happened at one step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Position in the sequence (0-based)
    pub position: usize,
    /// Dataset index the step asked for
    pub index: usize,
    /// The note that sounded, or None if the step was skipped
    pub note: Option<NoteName>,
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    pub played: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

/// Consumes a sequence against a session, one step per interval
pub struct Sequencer {
    sequence: Sequence,
    interval: Duration,
    position: usize,
}

impl Sequencer {
    /// Create a sequencer
    pub fn new(sequence: Sequence, interval: Duration) -> Self {
        Self {
            sequence,
            interval,
            position: 0,
        }
    }

    /// The spacing between steps
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.sequence.len().saturating_sub(self.position)
    }

    /// Rewind to the first step
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Consume exactly one step
    ///
    /// Returns None once the sequence is exhausted. A step whose play
    /// fails (out of bounds, empty session) is reported with
    /// `note: None` and logged; the sequence keeps going. Playback is
    /// best-effort: one bad index must not mute the rest of the
    /// dataset.
    pub fn advance(&mut self, session: &mut SonificationSession) -> Option<StepOutcome> {
        let step = *self.sequence.steps().get(self.position)?;
        let position = self.position;
        self.position += 1;

        let note = match session.play(step.index) {
            Ok(note) => Some(note),
            Err(e) => {
                log::warn!("skipping step {} (index {}): {}", position, step.index, e);
                None
            }
        };

        Some(StepOutcome {
            position,
            index: step.index,
            note,
        })
    }

    /// Run the whole sequence
    ///
    /// Silences the sink before the first step (a new run must not
    /// overlap a previous run's tail) and after the last. `on_step` is
    /// invoked after each step so callers can sync highlights or
    /// narration. Cancellation is honored between steps.
    pub fn run(
        &mut self,
        session: &mut SonificationSession,
        cancel: &CancelToken,
        mut on_step: impl FnMut(&StepOutcome),
    ) -> PlaybackReport {
        let mut report = PlaybackReport::default();

        if let Err(e) = session.stop() {
            log::warn!("could not silence previous playback: {}", e);
        }

        while !cancel.is_cancelled() {
            let Some(outcome) = self.advance(session) else {
                break;
            };

            if outcome.note.is_some() {
                report.played += 1;
            } else {
                report.skipped += 1;
            }
            on_step(&outcome);

            // The last note gets its full slot before the sink is cut
            std::thread::sleep(self.interval);
        }

        report.cancelled = cancel.is_cancelled();
        if let Err(e) = session.stop() {
            log::warn!("could not silence playback on exit: {}", e);
        }
        report
    }
}
