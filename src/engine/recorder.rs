//! WAV file recorder
//!
//! Records audio output to WAV files and renders melodies offline.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

use super::Engine;
use crate::sched::{PlaybackReport, Sequence};
use crate::session::SonificationSession;
use crate::synth::Waveform;

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    samples_written: u64,
}

impl Recorder {
    /// Create a new recorder
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            samples_written: 0,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of samples written
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    /// Write a single sample
    pub fn write_sample(&mut self, sample: f32) -> Result<()> {
        self.writer
            .write_sample(sample)
            .context("failed to write sample")?;
        self.samples_written += 1;
        Ok(())
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the
    /// header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}

/// Render a sequence to the recorder without touching an audio device
///
/// Drives the engine sample-by-sample: each step triggers its note via
/// the session's pure mapping, then one interval's worth of samples is
/// written. Bad steps are skipped like in live playback. The tail of
/// the final note is written after the last step so it is not cut off.
pub fn render_sequence(
    session: &SonificationSession,
    sequence: &Sequence,
    interval: Duration,
    engine: &mut Engine,
    waveform: Waveform,
    recorder: &mut Recorder,
) -> Result<PlaybackReport> {
    let mut report = PlaybackReport::default();
    let step_samples = (interval.as_secs_f64() * engine.sample_rate()) as usize;

    for step in sequence.steps() {
        match session.note_for(step.index) {
            Ok(note) => {
                engine.trigger_note(
                    waveform,
                    note.frequency(),
                    session.note_duration().as_secs_f64(),
                );
                report.played += 1;
            }
            Err(e) => {
                log::warn!("skipping index {} in render: {}", step.index, e);
                report.skipped += 1;
            }
        }

        for _ in 0..step_samples {
            recorder.write_sample(engine.process() as f32)?;
        }
    }

    while !engine.is_idle() {
        recorder.write_sample(engine.process() as f32)?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::PitchQuantizer;
    use crate::session::{NullSink, PitchRange};
    use tempfile::NamedTempFile;

    fn test_session(values: Vec<f64>) -> SonificationSession {
        let mut session = SonificationSession::new(
            PitchQuantizer::chromatic(),
            Duration::from_millis(50),
            Box::new(NullSink),
        );
        session.configure(values, PitchRange::new(48.0, 72.0));
        session
    }

    #[test]
    fn test_recorder_creation() {
        let file = NamedTempFile::new().unwrap();
        let recorder = Recorder::new(file.path(), 44100).unwrap();

        assert_eq!(recorder.sample_rate(), 44100);
        assert_eq!(recorder.samples_written(), 0);
        assert_eq!(recorder.duration_secs(), 0.0);
    }

    #[test]
    fn test_recorder_write_sample() {
        let file = NamedTempFile::new().unwrap();
        let mut recorder = Recorder::new(file.path(), 44100).unwrap();

        recorder.write_sample(0.5).unwrap();
        recorder.write_sample(-0.5).unwrap();

        assert_eq!(recorder.samples_written(), 2);
    }

    #[test]
    fn test_recorder_produces_valid_wav() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        {
            let mut recorder = Recorder::new(&path, 44100).unwrap();
            for i in 0..1000 {
                let sample = (i as f32 / 1000.0 * std::f32::consts::PI * 2.0).sin();
                recorder.write_sample(sample).unwrap();
            }
            recorder.finalize().unwrap();
        }

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();

        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let samples: Vec<f32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 1000);
    }

    #[test]
    fn test_render_sequence_writes_melody() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let session = test_session(vec![100.0, 200.0, 300.0]);
        let mut engine = Engine::new(8000.0, 0.7);
        let mut recorder = Recorder::new(&path, 8000).unwrap();

        let report = render_sequence(
            &session,
            &Sequence::sweep(3),
            Duration::from_millis(100),
            &mut engine,
            Waveform::Sine,
            &mut recorder,
        )
        .unwrap();

        assert_eq!(report.played, 3);
        assert_eq!(report.skipped, 0);
        // Three 100ms steps at 8 kHz, plus whatever tail remained
        assert!(recorder.samples_written() >= 2400);
        recorder.finalize().unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<f32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert!(samples.iter().any(|s| s.abs() > 0.01), "render was silent");
    }

    #[test]
    fn test_render_sequence_skips_bad_indices() {
        let file = NamedTempFile::new().unwrap();
        let session = test_session(vec![100.0]);
        let mut engine = Engine::new(8000.0, 0.7);
        let mut recorder = Recorder::new(file.path(), 8000).unwrap();

        let report = render_sequence(
            &session,
            &Sequence::from_indices([0, 7]),
            Duration::from_millis(10),
            &mut engine,
            Waveform::Sine,
            &mut recorder,
        )
        .unwrap();

        assert_eq!(report.played, 1);
        assert_eq!(report.skipped, 1);
    }
}
