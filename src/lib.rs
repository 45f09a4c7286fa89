//! Chime - Turn small datasets into melodies
//!
//! Loads a table, maps one numeric column into a pitch range, snaps
//! each value to a named note, and plays the result as a melody
//! through a synth, into a WAV file, or out a MIDI port.

pub mod config;
pub mod data;
pub mod engine;
pub mod mapping;
pub mod narration;
pub mod sched;
pub mod session;
pub mod synth;

pub use config::ChimeConfig;
pub use session::SonificationSession;
