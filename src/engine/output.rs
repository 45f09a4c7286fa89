//! Real-time audio output using cpal
//!
//! The device stream is acquired lazily: nothing touches the audio
//! device until the first note actually plays. Platforms tie audio
//! availability to an explicit user action, so startup must not grab
//! the device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};

use super::Engine;
use crate::mapping::NoteName;
use crate::session::NoteSink;
use crate::synth::Waveform;

/// Lazily initialized audio output stream
pub struct Output {
    engine: Arc<Mutex<Engine>>,
    device_name: Option<String>,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Output {
    /// Create an output for the given engine; no device is touched yet
    pub fn new(engine: Arc<Mutex<Engine>>, device_name: Option<String>) -> Self {
        Self {
            engine,
            device_name,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the stream is up and playing
    pub fn ready(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Acquire the device and start the stream if not already running
    pub fn ensure_started(&mut self) -> Result<()> {
        if self.ready() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = match &self.device_name {
            Some(name) => host
                .output_devices()?
                .find(|d| d.name().map(|n| n.contains(name)).unwrap_or(false))
                .ok_or_else(|| anyhow!("audio device '{}' not found", name))?,
            None => host
                .default_output_device()
                .ok_or_else(|| anyhow!("no output device available"))?,
        };

        let config = device.default_output_config()?;
        let sample_format = config.sample_format();
        let stream_config: StreamConfig = config.into();

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let engine = Arc::clone(&self.engine);

        let stream = match sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(&device, &stream_config, engine, running)?,
            SampleFormat::I16 => self.build_stream::<i16>(&device, &stream_config, engine, running)?,
            SampleFormat::U16 => self.build_stream::<u16>(&device, &stream_config, engine, running)?,
            _ => {
                self.running.store(false, Ordering::SeqCst);
                return Err(anyhow!("unsupported sample format"));
            }
        };

        stream.play()?;
        self.stream = Some(stream);
        log::debug!("audio stream started");

        Ok(())
    }

    /// Tear the stream down
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
        &self,
        device: &Device,
        config: &StreamConfig,
        engine: Arc<Mutex<Engine>>,
        running: Arc<AtomicBool>,
    ) -> Result<Stream> {
        let channels = config.channels as usize;

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if !running.load(Ordering::SeqCst) {
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(0.0f32);
                    }
                    return;
                }

                if let Ok(mut eng) = engine.try_lock() {
                    for frame in data.chunks_mut(channels) {
                        let sample = eng.process() as f32;
                        for channel_sample in frame.iter_mut() {
                            *channel_sample = T::from_sample(sample);
                        }
                    }
                } else {
                    // Mutex contended, fill with silence
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(0.0f32);
                    }
                }
            },
            |err| {
                log::error!("audio stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Plays session notes through the synth engine
pub struct SynthSink {
    engine: Arc<Mutex<Engine>>,
    output: Output,
    waveform: Waveform,
}

impl SynthSink {
    /// Create a sink for the given engine and waveform
    pub fn new(engine: Arc<Mutex<Engine>>, device_name: Option<String>, waveform: Waveform) -> Self {
        let output = Output::new(Arc::clone(&engine), device_name);
        Self {
            engine,
            output,
            waveform,
        }
    }

    fn lock_engine(&self) -> Result<std::sync::MutexGuard<'_, Engine>> {
        self.engine
            .lock()
            .map_err(|_| anyhow!("audio engine lock poisoned"))
    }
}

impl NoteSink for SynthSink {
    fn play(&mut self, _note: NoteName, frequency: f64, duration: Duration) -> Result<()> {
        self.output.ensure_started()?;
        self.lock_engine()?
            .trigger_note(self.waveform, frequency, duration.as_secs_f64());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.lock_engine()?.silence();
        Ok(())
    }
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
