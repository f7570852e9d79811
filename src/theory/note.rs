// Note - Pitch classes and string tuning
// Pitch-class arithmetic is modulo 12, C = 0 .. B = 11

use std::fmt;

/// Display names indexed by pitch class
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A pitch class in [0, 11]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Note(u8);

impl Note {
    pub const C: Note = Note(0);
    pub const CS: Note = Note(1);
    pub const D: Note = Note(2);
    pub const DS: Note = Note(3);
    pub const E: Note = Note(4);
    pub const F: Note = Note(5);
    pub const FS: Note = Note(6);
    pub const G: Note = Note(7);
    pub const GS: Note = Note(8);
    pub const A: Note = Note(9);
    pub const AS: Note = Note(10);
    pub const B: Note = Note(11);

    /// Build a pitch class from any integer (wraps modulo 12)
    pub fn from_semitones(semitones: i64) -> Self {
        Note(semitones.rem_euclid(12) as u8)
    }

    /// Pitch class index (0-11)
    pub fn index(&self) -> u8 {
        self.0
    }

    /// Display name, e.g. "F#"
    pub fn name(&self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }

    /// Semitone distance going up from `root` to `self` (0-11)
    pub fn interval_from(&self, root: Note) -> u8 {
        (self.0 + 12 - root.0) % 12
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Note sounding at `fret` on a string tuned to `open_string_note`.
///
/// The mute sentinel (-1) has no pitch: callers convert the marker fret with
/// `u32::try_from` and skip muted strings before calling this.
pub fn calculate_note(open_string_note: Note, fret: u32) -> Note {
    Note(((open_string_note.0 as u32 + fret) % 12) as u8)
}

/// Case-insensitive exact match against the 12 note names
pub fn try_parse_note_name(text: &str) -> Option<Note> {
    let text = text.trim();
    NOTE_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(text))
        .map(|index| Note(index as u8))
}

/// Lenient note parsing: unknown names fall back to C with a warning
pub fn parse_note_name(text: &str) -> Note {
    match try_parse_note_name(text) {
        Some(note) => note,
        None => {
            log::warn!("Unknown note name {:?}, defaulting to C", text);
            Note::C
        }
    }
}

/// Number of strings the fretboard model supports
pub const STRING_COUNT: usize = 6;

/// Open-string notes, index 0 = lowest-pitched string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tuning([Note; STRING_COUNT]);

impl Tuning {
    /// Standard tuning E A D G B E
    pub const STANDARD: Tuning = Tuning([Note::E, Note::A, Note::D, Note::G, Note::B, Note::E]);

    /// Drop D tuning D A D G B E
    pub const DROP_D: Tuning = Tuning([Note::D, Note::A, Note::D, Note::G, Note::B, Note::E]);

    pub fn new(strings: [Note; STRING_COUNT]) -> Self {
        Self(strings)
    }

    /// Open note of a string, `None` when the index is off the fretboard
    pub fn open_note(&self, string_index: usize) -> Option<Note> {
        self.0.get(string_index).copied()
    }

    /// Note at (string, fret); `None` for muted frets or unknown strings
    pub fn note_at(&self, string_index: usize, fret: i32) -> Option<Note> {
        let open = self.open_note(string_index)?;
        let fret = u32::try_from(fret).ok()?;
        Some(calculate_note(open, fret))
    }

    pub fn strings(&self) -> &[Note; STRING_COUNT] {
        &self.0
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_calculate_note_basics() {
        assert_eq!(calculate_note(Note::E, 0), Note::E);
        assert_eq!(calculate_note(Note::E, 12), Note::E);
        assert_eq!(calculate_note(Note::E, 5), Note::A);
        assert_eq!(calculate_note(Note::A, 3), Note::C);
    }

    #[test]
    fn test_calculate_note_is_periodic() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let open = Note::from_semitones(rng.gen_range(0..12));
            let fret = rng.gen_range(0..48u32);
            assert_eq!(calculate_note(open, fret), calculate_note(open, fret + 12));
        }
    }

    #[test]
    fn test_parse_note_name() {
        assert_eq!(parse_note_name("A"), Note::A);
        assert_eq!(parse_note_name("f#"), Note::FS);
        assert_eq!(parse_note_name(" c# "), Note::CS);
        // Unknown names default to C
        assert_eq!(parse_note_name("H"), Note::C);
        assert_eq!(parse_note_name(""), Note::C);
        assert_eq!(try_parse_note_name("Bb"), None);
    }

    #[test]
    fn test_tuning_note_at() {
        let tuning = Tuning::STANDARD;
        assert_eq!(tuning.note_at(0, 3), Some(Note::G));
        assert_eq!(tuning.note_at(5, 0), Some(Note::E));
        assert_eq!(tuning.note_at(0, -1), None);
        assert_eq!(tuning.note_at(6, 0), None);
        assert_eq!(Tuning::DROP_D.note_at(0, 2), Some(Note::E));
    }

    #[test]
    fn test_interval_and_display() {
        assert_eq!(Note::C.interval_from(Note::A), 3);
        assert_eq!(Note::A.interval_from(Note::A), 0);
        assert_eq!(Note::AS.to_string(), "A#");
        assert_eq!(Note::from_semitones(-1), Note::B);
    }
}
