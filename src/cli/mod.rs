//! CLI interface for Chime

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turn small datasets into melodies
#[derive(Parser)]
#[command(name = "chime")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play the configured dataset as a melody
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "chime.yaml")]
        config: PathBuf,

        /// Announce each record as it plays
        #[arg(long)]
        narrate: bool,

        /// Send notes to a MIDI port instead of the built-in synth
        #[arg(long)]
        midi: bool,
    },

    /// Render the melody to a WAV file
    Render {
        /// Configuration file path
        #[arg(short, long, default_value = "chime.yaml")]
        config: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the value-to-note table without playing anything
    Notes {
        /// Configuration file path
        #[arg(short, long, default_value = "chime.yaml")]
        config: PathBuf,
    },

    /// List audio output devices and MIDI ports
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "chime.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
