//! One-shot tone voice
//!
//! A single note: oscillator through an attack/decay envelope, with an
//! optional exponential frequency sweep across the note (low to high,
//! the glide rising faster or slower depending on the data value that
//! produced it).

use super::{ArEnvelope, Oscillator, Waveform};

/// Exponential frequency glide over the note duration
#[derive(Debug, Clone, Copy)]
struct Sweep {
    start_hz: f64,
    end_hz: f64,
}

/// A single sounding note
pub struct ToneVoice {
    oscillator: Oscillator,
    envelope: ArEnvelope,
    sample_rate: f64,
    duration: f64,
    elapsed: f64,
    sweep: Option<Sweep>,
}

impl ToneVoice {
    /// A note at a fixed frequency
    pub fn note(sample_rate: f64, waveform: Waveform, frequency: f64, duration: f64) -> Self {
        let mut envelope = ArEnvelope::new(sample_rate);
        envelope.trigger(duration);

        Self {
            oscillator: Oscillator::new(waveform, frequency, sample_rate),
            envelope,
            sample_rate,
            duration,
            elapsed: 0.0,
            sweep: None,
        }
    }

    /// A tone gliding exponentially from `start_hz` to `end_hz`
    ///
    /// Frequencies must be positive; non-positive inputs are pinned to
    /// an audible floor so the glide stays defined.
    pub fn sweep(
        sample_rate: f64,
        waveform: Waveform,
        start_hz: f64,
        end_hz: f64,
        duration: f64,
    ) -> Self {
        let start_hz = start_hz.max(1.0);
        let end_hz = end_hz.max(1.0);
        let mut voice = Self::note(sample_rate, waveform, start_hz, duration);
        voice.sweep = Some(Sweep { start_hz, end_hz });
        voice
    }

    /// Current oscillator frequency
    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency()
    }

    /// Whether the note has fully decayed
    pub fn is_finished(&self) -> bool {
        !self.envelope.is_active()
    }

    /// Generate the next sample
    pub fn process(&mut self) -> f64 {
        if self.is_finished() {
            return 0.0;
        }

        if let Some(sweep) = self.sweep {
            // f(t) = f0 * (f1/f0)^(t/T): equal musical intervals per
            // unit time, which is how a glide is heard as linear
            let progress = (self.elapsed / self.duration).min(1.0);
            let frequency = sweep.start_hz * (sweep.end_hz / sweep.start_hz).powf(progress);
            self.oscillator.set_frequency(frequency);
        }

        self.elapsed += 1.0 / self.sample_rate;
        self.oscillator.generate() * self.envelope.process()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_produces_audio() {
        let mut voice = ToneVoice::note(44100.0, Waveform::Sine, 440.0, 0.1);

        let mut peak = 0.0f64;
        for _ in 0..2000 {
            peak = peak.max(voice.process().abs());
        }
        assert!(peak > 0.1, "expected audible output, got peak {}", peak);
    }

    #[test]
    fn test_tone_finishes_after_duration() {
        let mut voice = ToneVoice::note(44100.0, Waveform::Sine, 440.0, 0.05);

        for _ in 0..(44100 / 10) {
            voice.process();
        }
        assert!(voice.is_finished());
        assert_eq!(voice.process(), 0.0);
    }

    #[test]
    fn test_sweep_rises_between_endpoints() {
        let mut voice = ToneVoice::sweep(44100.0, Waveform::Saw, 100.0, 800.0, 0.1);

        voice.process();
        let early = voice.frequency();
        for _ in 0..2000 {
            voice.process();
        }
        let late = voice.frequency();

        assert!(early < late, "sweep must rise: {} -> {}", early, late);
        assert!((100.0..=800.0).contains(&early));
        assert!((100.0..=800.0).contains(&late));
    }

    #[test]
    fn test_sweep_guards_non_positive_frequency() {
        let mut voice = ToneVoice::sweep(44100.0, Waveform::Sine, 0.0, 440.0, 0.1);

        for _ in 0..100 {
            let sample = voice.process();
            assert!(sample.is_finite());
        }
        assert!(voice.frequency() >= 1.0);
    }

    #[test]
    fn test_sweep_exponential_midpoint() {
        // Geometric midpoint, not arithmetic: 100 -> 400 passes 200
        // halfway through
        let mut voice = ToneVoice::sweep(1000.0, Waveform::Sine, 100.0, 400.0, 1.0);

        for _ in 0..500 {
            voice.process();
        }
        assert!(
            (voice.frequency() - 200.0).abs() < 5.0,
            "expected ~200 Hz at midpoint, got {}",
            voice.frequency()
        );
    }
}
