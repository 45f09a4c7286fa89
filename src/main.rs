//! Chime - Turn small datasets into melodies

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait};

use chime::config::{self, ChimeConfig};
use chime::data::{self, Dataset};
use chime::engine::{self, Engine, MidiSink, Recorder, SynthSink};
use chime::mapping::{NoteSet, PitchQuantizer};
use chime::narration::{ConsoleBackend, Narrator, Voice, VoicePool};
use chime::sched::{CancelToken, Sequence, Sequencer};
use chime::session::{NoteSink, NullSink, SonificationSession};
use chime::synth::Waveform;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config: config_path,
            narrate,
            midi,
        } => {
            println!("Loading configuration from {:?}...", config_path);
            let cfg = config::load_config(&config_path)?;
            let dataset = load_dataset(&cfg)?;

            if dataset.is_empty() {
                println!("Nothing to play.");
                return Ok(());
            }

            let waveform = parse_waveform(&cfg)?;
            let sink: Box<dyn NoteSink> = if midi {
                Box::new(MidiSink::new(
                    cfg.midi.port.as_deref(),
                    cfg.midi.channel,
                    cfg.midi.velocity,
                )?)
            } else {
                let engine = Arc::new(Mutex::new(Engine::new(
                    cfg.audio.sample_rate as f64,
                    cfg.playback.volume as f64,
                )));
                Box::new(SynthSink::new(engine, cfg.audio.device.clone(), waveform))
            };

            let mut session = build_session(&cfg, &dataset, sink)?;
            let mut narrator = if narrate || cfg.narration.enabled {
                Some(build_narrator(&cfg))
            } else {
                None
            };

            let cancel = CancelToken::new();
            let handler = cancel.clone();
            ctrlc::set_handler(move || handler.cancel())?;

            println!(
                "Playing '{}': {} notes, {} ms apart. Ctrl-C stops.\n",
                dataset.name(),
                dataset.len(),
                cfg.playback.step_ms
            );

            let mut sequencer = Sequencer::new(
                Sequence::sweep(dataset.len()),
                cfg.playback.step_interval(),
            );
            let report = sequencer.run(&mut session, &cancel, |outcome| {
                let label = dataset.label(outcome.index).unwrap_or("?");
                let value = dataset.records().get(outcome.index).map(|r| r.value);
                match (outcome.note, value) {
                    (Some(note), Some(value)) => {
                        println!(
                            "  {:>3}. {:<24} {:>12.2}  {}",
                            outcome.position + 1,
                            label,
                            value,
                            note
                        );
                        if let Some(narrator) = narrator.as_mut() {
                            if let Err(e) = narrator.describe(label, value) {
                                log::warn!("narration failed: {}", e);
                            }
                        }
                    }
                    _ => println!("  {:>3}. {:<24} (skipped)", outcome.position + 1, label),
                }
            });

            println!(
                "\nPlayed {} notes, skipped {}{}",
                report.played,
                report.skipped,
                if report.cancelled { " (cancelled)" } else { "" }
            );
        }

        Commands::Render {
            config: config_path,
            output,
        } => {
            println!("Loading configuration from {:?}...", config_path);
            let cfg = config::load_config(&config_path)?;
            let dataset = load_dataset(&cfg)?;

            if dataset.is_empty() {
                println!("Nothing to render.");
                return Ok(());
            }

            let waveform = parse_waveform(&cfg)?;
            let session = build_session(&cfg, &dataset, Box::new(NullSink))?;
            let mut engine = Engine::new(
                cfg.audio.sample_rate as f64,
                cfg.playback.volume as f64,
            );
            let mut recorder = Recorder::new(&output, cfg.audio.sample_rate)?;

            let report = engine::render_sequence(
                &session,
                &Sequence::sweep(dataset.len()),
                cfg.playback.step_interval(),
                &mut engine,
                waveform,
                &mut recorder,
            )?;
            let seconds = recorder.duration_secs();
            recorder.finalize()?;

            println!(
                "Rendered {} notes ({} skipped) to {:?}, {:.1}s of audio",
                report.played, report.skipped, output, seconds
            );
        }

        Commands::Notes { config: config_path } => {
            let cfg = config::load_config(&config_path)?;
            let dataset = load_dataset(&cfg)?;
            let session = build_session(&cfg, &dataset, Box::new(NullSink))?;

            if dataset.is_empty() {
                println!("Dataset is empty.");
                return Ok(());
            }

            println!(
                "'{}' mapped into {}..{} on the {} grid:\n",
                dataset.name(),
                cfg.playback.note_low,
                cfg.playback.note_high,
                cfg.playback.scale
            );

            for (i, record) in dataset.records().iter().enumerate() {
                match session.note_for(i) {
                    Ok(note) => println!(
                        "  {:<24} {:>12.2}  {:>4}  {:>8.2} Hz",
                        record.label,
                        record.value,
                        note.to_string(),
                        note.frequency()
                    ),
                    Err(e) => println!(
                        "  {:<24} {:>12.2}  (unmapped: {})",
                        record.label, record.value, e
                    ),
                }
            }
        }

        Commands::Devices => {
            println!("Available audio output devices:\n");

            let host = cpal::default_host();
            if let Some(device) = host.default_output_device() {
                println!("Default output: {}", device.name().unwrap_or_default());
                if let Ok(config) = device.default_output_config() {
                    println!(
                        "  Sample rate: {} Hz, Channels: {}",
                        config.sample_rate().0,
                        config.channels()
                    );
                }
                println!();
            }

            println!("Output devices:");
            for (name, config) in engine::list_output_devices() {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }

            println!("\nMIDI output ports:");
            match engine::list_midi_ports() {
                Ok(ports) if ports.is_empty() => println!("  (none)"),
                Ok(ports) => {
                    for port in ports {
                        println!("  - {}", port);
                    }
                }
                Err(e) => println!("  Error listing ports: {}", e),
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!(
                        "  Pitch range: {} - {} ({})",
                        cfg.playback.note_low, cfg.playback.note_high, cfg.playback.scale
                    );
                    println!("  Waveform: {}", cfg.playback.wave);
                    println!(
                        "  Step: {} ms, note: {} ms",
                        cfg.playback.step_ms, cfg.playback.note_ms
                    );
                    println!("  Volume: {:.0}%", cfg.playback.volume * 100.0);
                    match (&cfg.dataset.path, &cfg.dataset.url) {
                        (Some(path), _) => println!(
                            "  Dataset: {} ({} -> {})",
                            path, cfg.dataset.label_column, cfg.dataset.value_column
                        ),
                        (_, Some(url)) => println!(
                            "  Dataset: {} ({} -> {})",
                            url, cfg.dataset.label_column, cfg.dataset.value_column
                        ),
                        _ => {}
                    }
                    println!(
                        "  Narration: {}",
                        if cfg.narration.enabled { "enabled" } else { "disabled" }
                    );
                }
                Err(e) => {
                    println!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../chime.example.yaml");

            let path = "chime.yaml";
            if Path::new(path).exists() {
                println!("chime.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created chime.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

/// Load the configured dataset on a fresh runtime
fn load_dataset(cfg: &ChimeConfig) -> Result<Dataset> {
    let rt = tokio::runtime::Runtime::new()?;
    let dataset = rt.block_on(data::load(&cfg.dataset))?;
    println!("Loaded '{}' with {} records", dataset.name(), dataset.len());
    Ok(dataset)
}

fn parse_waveform(cfg: &ChimeConfig) -> Result<Waveform> {
    Waveform::from_name(&cfg.playback.wave)
        .ok_or_else(|| anyhow!("unknown waveform '{}'", cfg.playback.wave))
}

/// Build a session configured for the dataset
fn build_session(
    cfg: &ChimeConfig,
    dataset: &Dataset,
    sink: Box<dyn NoteSink>,
) -> Result<SonificationSession> {
    let set = NoteSet::from_name(&cfg.playback.scale)
        .ok_or_else(|| anyhow!("unknown scale '{}'", cfg.playback.scale))?;

    let mut session =
        SonificationSession::new(PitchQuantizer::new(set), cfg.playback.note_duration(), sink);
    session.configure(dataset.values(), cfg.playback.pitch_range());
    Ok(session)
}

fn build_narrator(cfg: &ChimeConfig) -> Narrator {
    let pool = VoicePool::global();
    pool.set_preference(cfg.narration.voice.clone(), cfg.narration.language.clone());
    // The console backend offers exactly one voice
    pool.install(vec![Voice::new("console", "en")]);
    Narrator::new(pool, Box::new(ConsoleBackend))
}
