//! Configuration schema definitions

use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::DataFormat;
use crate::mapping::NoteSet;
use crate::session::PitchRange;
use crate::synth::Waveform;

/// Main configuration for Chime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChimeConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Playback settings (pitch range, scale, pacing)
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// The dataset to sonify
    pub dataset: DatasetConfig,

    /// Spoken narration settings
    #[serde(default)]
    pub narration: NarrationConfig,

    /// MIDI output settings
    #[serde(default)]
    pub midi: MidiConfig,
}

impl ChimeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }

        let playback = &self.playback;
        if playback.volume < 0.0 || playback.volume > 1.0 {
            bail!("Volume must be between 0.0 and 1.0");
        }
        if !(0.0..=127.0).contains(&playback.note_low)
            || !(0.0..=127.0).contains(&playback.note_high)
        {
            bail!("Pitch range must stay within MIDI indices 0-127");
        }
        if playback.note_low > playback.note_high {
            bail!("note_low must not exceed note_high");
        }
        if playback.step_ms == 0 {
            bail!("step_ms must be at least 1");
        }
        if playback.note_ms == 0 {
            bail!("note_ms must be at least 1");
        }
        if NoteSet::from_name(&playback.scale).is_none() {
            bail!("Unknown scale '{}'", playback.scale);
        }
        if Waveform::from_name(&playback.wave).is_none() {
            bail!("Unknown waveform '{}'", playback.wave);
        }

        match (&self.dataset.path, &self.dataset.url) {
            (Some(_), Some(_)) => bail!("Dataset must set either 'path' or 'url', not both"),
            (None, None) => bail!("Dataset must set 'path' or 'url'"),
            _ => {}
        }
        if self.dataset.label_column.is_empty() || self.dataset.value_column.is_empty() {
            bail!("Dataset needs 'label_column' and 'value_column'");
        }

        if self.midi.channel > 15 {
            bail!("MIDI channel must be 0-15");
        }
        if self.midi.velocity > 127 {
            bail!("MIDI velocity must be 0-127");
        }

        Ok(())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in samples (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

/// Playback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Bottom of the target pitch range, MIDI index (default: 48 = C3)
    #[serde(default = "default_note_low")]
    pub note_low: f64,

    /// Top of the target pitch range, MIDI index (default: 72 = C5)
    #[serde(default = "default_note_high")]
    pub note_high: f64,

    /// Note grid to snap to (default: chromatic)
    #[serde(default = "default_scale")]
    pub scale: String,

    /// Oscillator waveform (default: sine)
    #[serde(default = "default_wave")]
    pub wave: String,

    /// Milliseconds between steps (default: 400)
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,

    /// Length of each note in milliseconds (default: 300)
    #[serde(default = "default_note_ms")]
    pub note_ms: u64,

    /// Output volume 0.0-1.0 (default: 0.7)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl PlaybackConfig {
    /// Spacing between sequence steps
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    /// Length of each note
    pub fn note_duration(&self) -> Duration {
        Duration::from_millis(self.note_ms)
    }

    /// The target pitch range
    pub fn pitch_range(&self) -> PitchRange {
        PitchRange::new(self.note_low, self.note_high)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            note_low: default_note_low(),
            note_high: default_note_high(),
            scale: default_scale(),
            wave: default_wave(),
            step_ms: default_step_ms(),
            note_ms: default_note_ms(),
            volume: default_volume(),
        }
    }
}

fn default_note_low() -> f64 { 48.0 }
fn default_note_high() -> f64 { 72.0 }
fn default_scale() -> String { "chromatic".to_string() }
fn default_wave() -> String { "sine".to_string() }
fn default_step_ms() -> u64 { 400 }
fn default_note_ms() -> u64 { 300 }
fn default_volume() -> f32 { 0.7 }

/// Sort order for dataset records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Local file path (mutually exclusive with url)
    #[serde(default)]
    pub path: Option<String>,

    /// http(s) URL (mutually exclusive with path)
    #[serde(default)]
    pub url: Option<String>,

    /// Data format; inferred from the extension when omitted
    #[serde(default)]
    pub format: Option<DataFormat>,

    /// Column holding the record labels
    pub label_column: String,

    /// Column holding the numeric values
    pub value_column: String,

    /// Sum values sharing a label before playback
    #[serde(default)]
    pub group_sum: bool,

    /// Sort records by value before playback
    #[serde(default)]
    pub sort: Option<SortOrder>,

    /// Keep only the first N records (after sorting)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Spoken narration configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Announce each record as it plays
    #[serde(default)]
    pub enabled: bool,

    /// Preferred voice name (exact match)
    #[serde(default)]
    pub voice: Option<String>,

    /// Fallback language prefix (e.g. "en", "es-ES")
    #[serde(default)]
    pub language: Option<String>,
}

/// MIDI output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiConfig {
    /// Port name substring (None = first port)
    #[serde(default)]
    pub port: Option<String>,

    /// MIDI channel 0-15 (default: 0)
    #[serde(default)]
    pub channel: u8,

    /// Note velocity 0-127 (default: 100)
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            port: None,
            channel: 0,
            velocity: default_velocity(),
        }
    }
}

fn default_velocity() -> u8 { 100 }

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        r#"
dataset:
  path: cars.csv
  label_column: Model
  value_column: Time
"#
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: ChimeConfig = serde_yaml::from_str(minimal_yaml()).unwrap();

        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.buffer_size, 512);
        assert_eq!(config.playback.note_low, 48.0);
        assert_eq!(config.playback.note_high, 72.0);
        assert_eq!(config.playback.scale, "chromatic");
        assert_eq!(config.playback.step_ms, 400);
        assert!(!config.narration.enabled);
        assert_eq!(config.midi.velocity, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
audio:
  sample_rate: 48000
  device: "USB DAC"

playback:
  note_low: 60
  note_high: 84
  scale: natural
  wave: sawtooth
  step_ms: 250
  note_ms: 200
  volume: 0.5

dataset:
  url: https://example.com/sales.csv
  label_column: month
  value_column: total
  group_sum: true
  sort: descending
  limit: 10

narration:
  enabled: true
  voice: "Alvaro"
  language: es
"#;
        let config: ChimeConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.playback.scale, "natural");
        assert_eq!(config.dataset.sort, Some(SortOrder::Descending));
        assert_eq!(config.dataset.limit, Some(10));
        assert!(config.narration.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_playback_helpers() {
        let config: ChimeConfig = serde_yaml::from_str(minimal_yaml()).unwrap();

        assert_eq!(config.playback.step_interval(), Duration::from_millis(400));
        assert_eq!(config.playback.note_duration(), Duration::from_millis(300));
        assert_eq!(config.playback.pitch_range(), PitchRange::new(48.0, 72.0));
    }

    #[test]
    fn test_validate_rejects_inverted_pitch_range() {
        let mut config: ChimeConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.playback.note_low = 80.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_scale() {
        let mut config: ChimeConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.playback.scale = "klingon".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_path_and_url() {
        let mut config: ChimeConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.dataset.url = Some("https://example.com/x.csv".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_loud_volume() {
        let mut config: ChimeConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.playback.volume = 1.5;
        assert!(config.validate().is_err());
    }
}
