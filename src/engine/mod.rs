//! Audio engine for Chime
//!
//! Holds the currently sounding tone and mixes it to output. Only one
//! tone is ever active: triggering a note replaces whatever was
//! playing, so hovering quickly across a dataset never stacks voices.

mod midi;
mod output;
mod recorder;

pub use midi::{list_midi_ports, MidiSink};
pub use output::{list_output_devices, Output, SynthSink};
pub use recorder::{render_sequence, Recorder};

use crate::synth::{ToneVoice, Waveform};

/// The main audio engine
pub struct Engine {
    sample_rate: f64,
    volume: f64,
    voice: Option<ToneVoice>,
}

impl Engine {
    /// Create a new engine
    pub fn new(sample_rate: f64, volume: f64) -> Self {
        Self {
            sample_rate,
            volume: volume.clamp(0.0, 1.0),
            voice: None,
        }
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Start a note, replacing any tone that is still sounding
    pub fn trigger_note(&mut self, waveform: Waveform, frequency: f64, duration: f64) {
        self.voice = Some(ToneVoice::note(
            self.sample_rate,
            waveform,
            frequency,
            duration,
        ));
    }

    /// Start a rising sweep, replacing any tone that is still sounding
    pub fn trigger_sweep(
        &mut self,
        waveform: Waveform,
        start_hz: f64,
        end_hz: f64,
        duration: f64,
    ) {
        self.voice = Some(ToneVoice::sweep(
            self.sample_rate,
            waveform,
            start_hz,
            end_hz,
            duration,
        ));
    }

    /// Drop the active tone immediately
    pub fn silence(&mut self) {
        self.voice = None;
    }

    /// Whether nothing is sounding
    pub fn is_idle(&self) -> bool {
        self.voice.is_none()
    }

    /// Generate the next sample
    pub fn process(&mut self) -> f64 {
        let Some(voice) = self.voice.as_mut() else {
            return 0.0;
        };

        let sample = voice.process();
        if voice.is_finished() {
            self.voice = None;
        }
        sample * self.volume
    }

    /// Fill a buffer with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_starts_idle() {
        let mut engine = Engine::new(44100.0, 0.7);
        assert!(engine.is_idle());
        assert_eq!(engine.process(), 0.0);
    }

    #[test]
    fn test_engine_note_produces_audio() {
        let mut engine = Engine::new(44100.0, 0.7);
        engine.trigger_note(Waveform::Sine, 440.0, 0.1);

        let mut peak = 0.0f64;
        for _ in 0..1000 {
            peak = peak.max(engine.process().abs());
        }
        assert!(peak > 0.0, "expected non-zero audio output");
    }

    #[test]
    fn test_engine_tone_ends_and_goes_idle() {
        let mut engine = Engine::new(44100.0, 1.0);
        engine.trigger_note(Waveform::Sine, 440.0, 0.02);

        for _ in 0..4410 {
            engine.process();
        }
        assert!(engine.is_idle());
    }

    #[test]
    fn test_engine_retrigger_replaces_tone() {
        let mut engine = Engine::new(44100.0, 1.0);
        engine.trigger_note(Waveform::Sine, 220.0, 10.0);
        engine.trigger_note(Waveform::Sine, 880.0, 0.1);

        // Only one voice: silencing leaves nothing behind
        engine.silence();
        assert!(engine.is_idle());
        assert_eq!(engine.process(), 0.0);
    }

    #[test]
    fn test_engine_sweep_produces_audio() {
        let mut engine = Engine::new(44100.0, 0.7);
        engine.trigger_sweep(Waveform::Saw, 100.0, 800.0, 0.1);

        let mut peak = 0.0f64;
        for _ in 0..2000 {
            peak = peak.max(engine.process().abs());
        }
        assert!(peak > 0.0);

        for _ in 0..4410 {
            engine.process();
        }
        assert!(engine.is_idle());
    }

    #[test]
    fn test_engine_volume_scales_output() {
        let mut loud = Engine::new(44100.0, 1.0);
        let mut quiet = Engine::new(44100.0, 0.1);
        loud.trigger_note(Waveform::Saw, 440.0, 0.1);
        quiet.trigger_note(Waveform::Saw, 440.0, 0.1);

        let mut loud_peak = 0.0f64;
        let mut quiet_peak = 0.0f64;
        for _ in 0..1000 {
            loud_peak = loud_peak.max(loud.process().abs());
            quiet_peak = quiet_peak.max(quiet.process().abs());
        }
        assert!(loud_peak > quiet_peak * 5.0);
    }

    #[test]
    fn test_engine_fill_buffer() {
        let mut engine = Engine::new(44100.0, 0.7);
        engine.trigger_note(Waveform::Saw, 440.0, 0.5);

        let mut buffer = vec![0.0f32; 512];
        engine.fill_buffer(&mut buffer);

        let has_audio = buffer.iter().any(|&s| s.abs() > 0.0);
        assert!(has_audio);
    }
}
