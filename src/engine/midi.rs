//! MIDI note output
//!
//! Sends session notes to a MIDI port instead of the built-in synth.
//! Output is monophonic: each note-on is preceded by a note-off for
//! the previous note, so an external instrument never accumulates
//! hanging notes.

use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use midir::MidiOutput;

use crate::mapping::NoteName;
use crate::session::NoteSink;

/// MIDI message types
#[derive(Debug, Clone, Copy)]
pub enum MidiMessage {
    /// Note on: channel (0-15), note (0-127), velocity (0-127)
    NoteOn(u8, u8, u8),
    /// Note off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff(u8, u8, u8),
}

impl MidiMessage {
    /// Convert to raw MIDI bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOn(ch, note, vel) => vec![0x90 | (ch & 0x0F), note & 0x7F, vel & 0x7F],
            MidiMessage::NoteOff(ch, note, vel) => {
                vec![0x80 | (ch & 0x0F), note & 0x7F, vel & 0x7F]
            }
        }
    }
}

enum MidiCommand {
    Send(MidiMessage),
    Stop,
}

/// MIDI note sink
pub struct MidiSink {
    sender: Sender<MidiCommand>,
    channel: u8,
    velocity: u8,
    last_note: Option<u8>,
}

impl MidiSink {
    /// Create a sink connected to the given port (first port if None)
    pub fn new(port_name: Option<&str>, channel: u8, velocity: u8) -> Result<Self> {
        let midi_out = MidiOutput::new("Chime MIDI Output")?;
        let ports = midi_out.ports();

        if ports.is_empty() {
            return Err(anyhow!("no MIDI output ports available"));
        }

        let port = if let Some(name) = port_name {
            ports
                .iter()
                .find(|p| {
                    midi_out
                        .port_name(p)
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| anyhow!("MIDI port '{}' not found", name))?
                .clone()
        } else {
            ports[0].clone()
        };

        let port_name_actual = midi_out.port_name(&port)?;
        let conn = midi_out
            .connect(&port, "chime-output")
            .map_err(|e| anyhow!("failed to connect to MIDI port: {}", e))?;

        let (sender, receiver) = mpsc::channel::<MidiCommand>();

        // Spawn thread to handle MIDI messages
        thread::spawn(move || {
            let mut conn = conn;
            while let Ok(cmd) = receiver.recv() {
                match cmd {
                    MidiCommand::Send(msg) => {
                        let bytes = msg.to_bytes();
                        let _ = conn.send(&bytes);
                    }
                    MidiCommand::Stop => break,
                }
            }
        });

        log::debug!("MIDI output connected to: {}", port_name_actual);

        Ok(Self {
            sender,
            channel: channel & 0x0F,
            velocity: velocity & 0x7F,
            last_note: None,
        })
    }

    fn send(&self, msg: MidiMessage) -> Result<()> {
        self.sender
            .send(MidiCommand::Send(msg))
            .map_err(|_| anyhow!("MIDI thread is gone"))
    }

    fn release_last(&mut self) -> Result<()> {
        if let Some(note) = self.last_note.take() {
            self.send(MidiMessage::NoteOff(self.channel, note, 0))?;
        }
        Ok(())
    }
}

impl NoteSink for MidiSink {
    fn play(&mut self, note: NoteName, _frequency: f64, _duration: Duration) -> Result<()> {
        // A MIDI note rings until its note-off, so the duration is up
        // to the receiving instrument; the next step or stop ends it.
        let midi_note = note.midi().clamp(0, 127) as u8;

        self.release_last()?;
        self.send(MidiMessage::NoteOn(self.channel, midi_note, self.velocity))?;
        self.last_note = Some(midi_note);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.release_last()
    }
}

impl Drop for MidiSink {
    fn drop(&mut self) {
        let _ = self.release_last();
        let _ = self.sender.send(MidiCommand::Stop);
    }
}

/// List available MIDI output ports
pub fn list_midi_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new("Chime MIDI List")?;
    let ports = midi_out.ports();

    let names: Vec<String> = ports
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_message_note_on() {
        let msg = MidiMessage::NoteOn(0, 60, 100);
        assert_eq!(msg.to_bytes(), vec![0x90, 60, 100]);
    }

    #[test]
    fn test_midi_message_note_on_channel() {
        let msg = MidiMessage::NoteOn(5, 72, 80);
        assert_eq!(msg.to_bytes(), vec![0x95, 72, 80]);
    }

    #[test]
    fn test_midi_message_note_off() {
        let msg = MidiMessage::NoteOff(0, 60, 0);
        assert_eq!(msg.to_bytes(), vec![0x80, 60, 0]);
    }

    #[test]
    fn test_midi_message_masks_out_of_range() {
        let msg = MidiMessage::NoteOn(0, 200, 100);
        assert_eq!(msg.to_bytes()[1], 200 & 0x7F);
    }

    #[test]
    fn test_list_midi_ports() {
        // Just verify it doesn't panic
        let result = list_midi_ports();
        assert!(result.is_ok());
    }
}
