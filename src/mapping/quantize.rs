//! Pitch quantization and note naming
//!
//! Snaps continuous pitch indices to named notes on a selectable
//! pitch-class grid.

use std::fmt;

/// The twelve semitone names within an octave, C first
const SEMITONE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Ordered subset of the twelve pitch classes (offsets from C)
#[derive(Debug, Clone)]
pub struct NoteSet {
    name: String,
    offsets: Vec<u8>,
}

impl NoteSet {
    /// Create a new note set
    pub fn new(name: &str, offsets: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            offsets,
        }
    }

    /// All twelve semitones
    pub fn chromatic() -> Self {
        Self::new("chromatic", (0..12).collect())
    }

    /// The seven natural pitch classes (C, D, E, F, G, A, B)
    pub fn natural() -> Self {
        Self::new("natural", vec![0, 2, 4, 5, 7, 9, 11])
    }

    /// Major pentatonic (root, M2, M3, P5, M6)
    pub fn major_pentatonic() -> Self {
        Self::new("major_pentatonic", vec![0, 2, 4, 7, 9])
    }

    /// Minor pentatonic (root, m3, P4, P5, m7)
    pub fn minor_pentatonic() -> Self {
        Self::new("minor_pentatonic", vec![0, 3, 5, 7, 10])
    }

    /// Whole tone scale
    pub fn whole_tone() -> Self {
        Self::new("whole_tone", vec![0, 2, 4, 6, 8, 10])
    }

    /// Get a note set by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "chromatic" | "semitones" => Some(Self::chromatic()),
            "natural" | "naturals" => Some(Self::natural()),
            "major_pentatonic" | "majorpentatonic" => Some(Self::major_pentatonic()),
            "minor_pentatonic" | "minorpentatonic" | "pentatonic" => {
                Some(Self::minor_pentatonic())
            }
            "whole_tone" | "wholetone" => Some(Self::whole_tone()),
            _ => None,
        }
    }

    /// Get the name of this set
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the pitch-class offsets
    pub fn offsets(&self) -> &[u8] {
        &self.offsets
    }
}

/// A named musical pitch: pitch class plus octave
///
/// Follows the MIDI convention where index 60 is C4 (middle C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    class: u8,
    octave: i32,
}

impl NoteName {
    /// Create a note name from a pitch class (0-11, C = 0) and octave
    pub fn new(class: u8, octave: i32) -> Self {
        Self {
            class: class % 12,
            octave,
        }
    }

    /// The pitch-class label ("C", "F#", ...)
    pub fn class_name(&self) -> &'static str {
        SEMITONE_NAMES[self.class as usize]
    }

    /// The octave number (C4 is octave 4)
    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// The MIDI pitch index of this note (C4 -> 60)
    pub fn midi(&self) -> i32 {
        (self.octave + 1) * 12 + self.class as i32
    }

    /// Frequency in Hz, equal temperament with A4 = 440
    pub fn frequency(&self) -> f64 {
        440.0 * 2.0_f64.powf((self.midi() as f64 - 69.0) / 12.0)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class_name(), self.octave)
    }
}

/// Quantizes pitch indices to the nearest note of a set
pub struct PitchQuantizer {
    set: NoteSet,
}

impl PitchQuantizer {
    /// Create a quantizer over the given note set
    pub fn new(set: NoteSet) -> Self {
        Self { set }
    }

    /// Quantizer over all twelve semitones
    pub fn chromatic() -> Self {
        Self::new(NoteSet::chromatic())
    }

    /// Quantizer over the natural notes only
    pub fn natural() -> Self {
        Self::new(NoteSet::natural())
    }

    /// Get the note set in use
    pub fn set(&self) -> &NoteSet {
        &self.set
    }

    /// Snap a pitch index to the nearest note of the set and name it
    ///
    /// The octave is floor(index / 12) - 1 (MIDI convention), the pitch
    /// class is the Euclidean remainder, so negative indices are
    /// well-defined. Each set entry is considered both in place and one
    /// octave up so values near the top of the octave can wrap to the
    /// next one. Distance ties resolve to the earlier (lower-pitched)
    /// entry: quantize(61.0) over the naturals is C4, not D4.
    pub fn quantize(&self, index: f64) -> NoteName {
        let octave_base = (index / 12.0).floor();
        let normalized = index - octave_base * 12.0; // in [0, 12)

        let mut best = self.set.offsets[0] as f64;
        let mut best_dist = f64::MAX;
        for &offset in &self.set.offsets {
            for candidate in [offset as f64, offset as f64 + 12.0] {
                let dist = (normalized - candidate).abs();
                if dist < best_dist {
                    best_dist = dist;
                    best = candidate;
                }
            }
        }

        let mut class = best as i32;
        let mut octave = octave_base as i32 - 1;
        if class >= 12 {
            class -= 12;
            octave += 1;
        }

        NoteName::new(class as u8, octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_set_from_name() {
        assert!(NoteSet::from_name("chromatic").is_some());
        assert!(NoteSet::from_name("natural").is_some());
        assert!(NoteSet::from_name("minor_pentatonic").is_some());
        assert!(NoteSet::from_name("unknown").is_none());
    }

    #[test]
    fn test_note_set_natural_offsets() {
        let set = NoteSet::natural();
        assert_eq!(set.name(), "natural");
        assert_eq!(set.offsets(), &[0, 2, 4, 5, 7, 9, 11]);
    }

    #[test]
    fn test_note_name_display() {
        assert_eq!(NoteName::new(0, 4).to_string(), "C4");
        assert_eq!(NoteName::new(6, 5).to_string(), "F#5");
        assert_eq!(NoteName::new(11, -2).to_string(), "B-2");
    }

    #[test]
    fn test_note_name_midi_roundtrip() {
        let note = NoteName::new(0, 4);
        assert_eq!(note.midi(), 60);

        let note = NoteName::new(9, 4); // A4
        assert_eq!(note.midi(), 69);
    }

    #[test]
    fn test_note_name_frequency() {
        let a4 = NoteName::new(9, 4);
        assert!((a4.frequency() - 440.0).abs() < 0.001);

        let c4 = NoteName::new(0, 4);
        assert!((c4.frequency() - 261.63).abs() < 0.01);

        let a5 = NoteName::new(9, 5);
        assert!((a5.frequency() - 880.0).abs() < 0.001);
    }

    #[test]
    fn test_quantize_chromatic_anchors() {
        let q = PitchQuantizer::chromatic();

        assert_eq!(q.quantize(60.0).to_string(), "C4");
        assert_eq!(q.quantize(61.0).to_string(), "C#4");
        assert_eq!(q.quantize(72.0).to_string(), "C5");
        assert_eq!(q.quantize(48.0).to_string(), "C3");
    }

    #[test]
    fn test_quantize_fractional_input() {
        let q = PitchQuantizer::chromatic();

        assert_eq!(q.quantize(60.4).to_string(), "C4");
        assert_eq!(q.quantize(60.6).to_string(), "C#4");
        // Halfway ties to the lower semitone
        assert_eq!(q.quantize(60.5).to_string(), "C4");
    }

    #[test]
    fn test_quantize_natural_tie_break() {
        let q = PitchQuantizer::natural();

        // 61 is equidistant from C (60) and D (62); the earlier table
        // entry wins
        assert_eq!(q.quantize(61.0).to_string(), "C4");
        assert_eq!(q.quantize(63.0).to_string(), "D4");
    }

    #[test]
    fn test_quantize_natural_passthrough() {
        let q = PitchQuantizer::natural();

        for (index, name) in [(60.0, "C4"), (62.0, "D4"), (64.0, "E4"), (71.0, "B4")] {
            assert_eq!(q.quantize(index).to_string(), name);
        }
    }

    #[test]
    fn test_quantize_octave_wrap() {
        let q = PitchQuantizer::natural();

        // 59.6 is closer to C4 (60) than to B3 (59)
        assert_eq!(q.quantize(59.6).to_string(), "C4");
        // 59.4 stays on B3
        assert_eq!(q.quantize(59.4).to_string(), "B3");
    }

    #[test]
    fn test_quantize_negative_index() {
        let q = PitchQuantizer::chromatic();

        let note = q.quantize(-1.0);
        assert_eq!(note.to_string(), "B-2");
        assert_eq!(note.midi(), -1);
    }

    #[test]
    fn test_quantize_pentatonic_snaps() {
        let q = PitchQuantizer::new(NoteSet::minor_pentatonic());

        // 61 (C#) snaps to the nearest pentatonic degree: C (offset 0)
        assert_eq!(q.quantize(61.0).to_string(), "C4");
        // 64 (E) snaps to D# (offset 3); distances are E->D#=1, E->F=1,
        // lower entry wins
        assert_eq!(q.quantize(64.0).to_string(), "D#4");
    }
}
