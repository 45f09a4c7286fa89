//! Attack/decay envelope
//!
//! Amplitude shaping for one-shot tones: a short linear attack to full
//! level, then an exponential decay to silence over the remainder of
//! the note. Without the attack ramp a tone starts with an audible
//! click.

/// Level below which the envelope counts as silent
const SILENCE_FLOOR: f64 = 0.001;

/// One-shot attack/decay envelope
pub struct ArEnvelope {
    sample_rate: f64,
    attack: f64,
    duration: f64,
    elapsed: f64,
    active: bool,
}

impl ArEnvelope {
    /// Create an envelope with the default 10ms attack
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            attack: 0.01,
            duration: 0.0,
            elapsed: 0.0,
            active: false,
        }
    }

    /// Set the attack time in seconds
    pub fn set_attack(&mut self, seconds: f64) {
        self.attack = seconds.max(0.001);
    }

    /// Start the envelope for a note of the given length in seconds
    pub fn trigger(&mut self, duration: f64) {
        self.duration = duration.max(self.attack * 2.0);
        self.elapsed = 0.0;
        self.active = true;
    }

    /// Cut the envelope immediately
    pub fn reset(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
    }

    /// Whether the envelope is still sounding
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Generate the next envelope level
    pub fn process(&mut self) -> f64 {
        if !self.active {
            return 0.0;
        }

        let t = self.elapsed;
        self.elapsed += 1.0 / self.sample_rate;

        if self.elapsed >= self.duration {
            self.active = false;
        }

        if t < self.attack {
            t / self.attack
        } else {
            // Exponential decay from full level at the end of the
            // attack down to the silence floor at the end of the note
            let decay_span = self.duration - self.attack;
            let progress = ((t - self.attack) / decay_span).min(1.0);
            SILENCE_FLOOR.powf(progress)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_idle_is_silent() {
        let mut env = ArEnvelope::new(44100.0);
        assert!(!env.is_active());
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn test_envelope_attack_rises() {
        let mut env = ArEnvelope::new(44100.0);
        env.trigger(0.5);

        let first = env.process();
        let mut last = first;
        // 10ms attack at 44100 Hz is 441 samples
        for _ in 0..440 {
            let level = env.process();
            assert!(level >= last, "attack must be non-decreasing");
            last = level;
        }
        assert!(last > 0.9, "expected near-full level, got {}", last);
    }

    #[test]
    fn test_envelope_decays_to_silence() {
        let mut env = ArEnvelope::new(44100.0);
        env.trigger(0.1);

        let mut last_level = 0.0;
        for _ in 0..(44100 / 10) {
            last_level = env.process();
        }

        assert!(!env.is_active());
        assert!(last_level < 0.01, "expected silence, got {}", last_level);
    }

    #[test]
    fn test_envelope_reset_cuts_immediately() {
        let mut env = ArEnvelope::new(44100.0);
        env.trigger(1.0);
        for _ in 0..100 {
            env.process();
        }

        env.reset();
        assert!(!env.is_active());
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn test_envelope_short_note_still_has_attack() {
        let mut env = ArEnvelope::new(44100.0);
        // Shorter than the attack itself; duration gets stretched so
        // the ramp still exists
        env.trigger(0.001);
        assert!(env.is_active());

        let mut peak = 0.0f64;
        while env.is_active() {
            peak = peak.max(env.process());
        }
        assert!(peak > 0.5, "expected an audible peak, got {}", peak);
    }
}
