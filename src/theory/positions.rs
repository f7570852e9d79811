// Positions - CAGED box shapes for common scales
// Pure data table; relative frets are measured from the box start fret

use super::note::Note;

/// One CAGED box position of a scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxPosition {
    /// 1-based position number
    pub index: u8,
    /// Number of frets the box covers
    pub fret_span: u8,
    /// Strings carrying the root, in guitar numbering (6 = low E, 1 = high e)
    pub root_strings: &'static [u8],
    /// Offset of the box start from the root fret on the low E string
    pub start_offset: u8,
    /// Relative frets per string, index 0 = lowest string
    pub note_patterns: [&'static [u8]; 6],
    /// Finger per relative fret, parallel to `note_patterns`
    pub finger_patterns: [&'static [u8]; 6],
}

impl BoxPosition {
    /// Inclusive fret range covered by this box for a given root fret
    pub fn fret_range(&self, root_fret: u32) -> (u32, u32) {
        let start = root_fret + self.start_offset as u32;
        let end = start + self.fret_span as u32 - 1;
        (start, end)
    }

    /// (string_index, fret, finger) for every note of the box, low string first
    pub fn fingered_frets(&self, root_fret: u32) -> Vec<(usize, u32, u8)> {
        let (start, _) = self.fret_range(root_fret);
        let mut frets = Vec::new();
        for (string_index, (pattern, fingers)) in self
            .note_patterns
            .iter()
            .zip(self.finger_patterns.iter())
            .enumerate()
        {
            for (relative, finger) in pattern.iter().zip(fingers.iter()) {
                frets.push((string_index, start + *relative as u32, *finger));
            }
        }
        frets
    }
}

/// Fret of `root` on the low E string (0-11)
pub fn root_fret_on_low_string(root: Note) -> u32 {
    root.interval_from(Note::E) as u32
}

/// All CAGED boxes for a scale
pub fn scale_positions(scale_name: &str) -> Option<&'static [BoxPosition]> {
    match scale_name {
        "minor_pentatonic" => Some(MINOR_PENTATONIC),
        "major_pentatonic" => Some(MAJOR_PENTATONIC),
        "blues" => Some(BLUES),
        "major" => Some(MAJOR),
        "minor" => Some(MINOR),
        _ => None,
    }
}

/// Box by 1-based index
pub fn position(scale_name: &str, index: u8) -> Option<&'static BoxPosition> {
    let positions = scale_positions(scale_name)?;
    if index == 0 {
        return None;
    }
    positions.get(index as usize - 1)
}

/// Number of boxes known for a scale
pub fn position_count(scale_name: &str) -> usize {
    scale_positions(scale_name).map_or(0, |positions| positions.len())
}

const P02: &[u8] = &[0, 2];
const P03: &[u8] = &[0, 3];
const P013: &[u8] = &[0, 1, 3];
const P012: &[u8] = &[0, 1, 2];
const P023: &[u8] = &[0, 2, 3];
const P0123: &[u8] = &[0, 1, 2, 3];
const P024: &[u8] = &[0, 2, 4];
const P134: &[u8] = &[1, 3, 4];

const F13: &[u8] = &[1, 3];
const F14: &[u8] = &[1, 4];
const F124: &[u8] = &[1, 2, 4];
const F123: &[u8] = &[1, 2, 3];
const F134: &[u8] = &[1, 3, 4];
const F1234: &[u8] = &[1, 2, 3, 4];

const MINOR_PENTATONIC: &[BoxPosition] = &[
    BoxPosition {
        index: 1,
        fret_span: 4,
        root_strings: &[6, 4, 1],
        start_offset: 0,
        note_patterns: [P03, P02, P02, P02, P03, P03],
        finger_patterns: [F14, F13, F13, F13, F14, F14],
    },
    BoxPosition {
        index: 2,
        fret_span: 4,
        root_strings: &[2, 4],
        start_offset: 3,
        note_patterns: [P02, P013, P02, P02, P02, P02],
        finger_patterns: [F13, F124, F13, F13, F13, F13],
    },
    BoxPosition {
        index: 3,
        fret_span: 4,
        root_strings: &[2, 5],
        start_offset: 5,
        note_patterns: [P02, P02, P013, P02, P02, P02],
        finger_patterns: [F13, F13, F124, F13, F13, F13],
    },
    BoxPosition {
        index: 4,
        fret_span: 4,
        root_strings: &[3, 5],
        start_offset: 7,
        note_patterns: [P02, P02, P02, P013, P02, P02],
        finger_patterns: [F13, F13, F13, F124, F13, F13],
    },
    BoxPosition {
        index: 5,
        fret_span: 4,
        root_strings: &[1, 3, 6],
        start_offset: 10,
        note_patterns: [P02, P02, P02, P02, P013, P02],
        finger_patterns: [F13, F13, F13, F13, F124, F13],
    },
];

const MAJOR_PENTATONIC: &[BoxPosition] = &[
    BoxPosition {
        index: 1,
        fret_span: 4,
        root_strings: &[1, 3, 6],
        start_offset: 0,
        note_patterns: [P02, P02, P02, P013, P02, P02],
        finger_patterns: [F13, F13, F13, F124, F13, F13],
    },
    BoxPosition {
        index: 2,
        fret_span: 4,
        root_strings: &[2, 4],
        start_offset: 2,
        note_patterns: [P02, P02, P013, P02, P02, P02],
        finger_patterns: [F13, F13, F124, F13, F13, F13],
    },
    BoxPosition {
        index: 3,
        fret_span: 4,
        root_strings: &[2, 5],
        start_offset: 4,
        note_patterns: [P02, P013, P02, P02, P02, P02],
        finger_patterns: [F13, F124, F13, F13, F13, F13],
    },
    BoxPosition {
        index: 4,
        fret_span: 4,
        root_strings: &[3, 5],
        start_offset: 5,
        note_patterns: [P02, P02, P02, P013, P02, P02],
        finger_patterns: [F13, F13, F13, F124, F13, F13],
    },
    BoxPosition {
        index: 5,
        fret_span: 4,
        root_strings: &[1, 4, 6],
        start_offset: 7,
        note_patterns: [P03, P02, P02, P02, P03, P03],
        finger_patterns: [F14, F13, F13, F13, F14, F14],
    },
];

const BLUES: &[BoxPosition] = &[
    BoxPosition {
        index: 1,
        fret_span: 4,
        root_strings: &[6, 4, 1],
        start_offset: 0,
        note_patterns: [P023, P012, P012, P012, P023, P023],
        finger_patterns: [F134, F123, F123, F123, F134, F134],
    },
    BoxPosition {
        index: 2,
        fret_span: 4,
        root_strings: &[2, 4],
        start_offset: 3,
        note_patterns: [P012, P0123, P012, P012, P012, P012],
        finger_patterns: [F123, F1234, F123, F123, F123, F123],
    },
    BoxPosition {
        index: 3,
        fret_span: 4,
        root_strings: &[2, 5],
        start_offset: 5,
        note_patterns: [P012, P012, P0123, P012, P012, P012],
        finger_patterns: [F123, F123, F1234, F123, F123, F123],
    },
    BoxPosition {
        index: 4,
        fret_span: 4,
        root_strings: &[3, 5],
        start_offset: 7,
        note_patterns: [P012, P012, P012, P0123, P012, P012],
        finger_patterns: [F123, F123, F123, F1234, F123, F123],
    },
    BoxPosition {
        index: 5,
        fret_span: 4,
        root_strings: &[1, 3, 6],
        start_offset: 10,
        note_patterns: [P012, P012, P012, P012, P0123, P012],
        finger_patterns: [F123, F123, F123, F123, F1234, F123],
    },
];

const MAJOR: &[BoxPosition] = &[
    BoxPosition {
        index: 1,
        fret_span: 5,
        root_strings: &[6, 4, 1],
        start_offset: 0,
        note_patterns: [P024, P024, P134, P024, P024, P134],
        finger_patterns: [F124, F124, F134, F124, F124, F134],
    },
    BoxPosition {
        index: 2,
        fret_span: 4,
        root_strings: &[2, 4],
        start_offset: 2,
        note_patterns: [P024, P134, P024, P013, P024, P024],
        finger_patterns: [F124, F134, F124, F123, F124, F124],
    },
    BoxPosition {
        index: 3,
        fret_span: 4,
        root_strings: &[2, 5],
        start_offset: 4,
        note_patterns: [P024, P024, P134, P024, P024, P024],
        finger_patterns: [F124, F124, F134, F124, F124, F124],
    },
    BoxPosition {
        index: 4,
        fret_span: 5,
        root_strings: &[3, 5],
        start_offset: 5,
        note_patterns: [P024, P024, P024, P134, P024, P024],
        finger_patterns: [F124, F124, F124, F134, F124, F124],
    },
    BoxPosition {
        index: 5,
        fret_span: 4,
        root_strings: &[1, 3, 6],
        start_offset: 7,
        note_patterns: [P024, P024, P024, P024, P134, P024],
        finger_patterns: [F124, F124, F124, F124, F134, F124],
    },
];

const MINOR: &[BoxPosition] = &[
    BoxPosition {
        index: 1,
        fret_span: 5,
        root_strings: &[6, 4, 1],
        start_offset: 0,
        note_patterns: [P023, P023, P134, P023, P023, P134],
        finger_patterns: [F123, F123, F134, F123, F123, F134],
    },
    BoxPosition {
        index: 2,
        fret_span: 4,
        root_strings: &[2, 4],
        start_offset: 2,
        note_patterns: [P023, P134, P023, P013, P023, P023],
        finger_patterns: [F123, F134, F123, F123, F123, F123],
    },
    BoxPosition {
        index: 3,
        fret_span: 4,
        root_strings: &[2, 5],
        start_offset: 4,
        note_patterns: [P023, P023, P134, P023, P023, P023],
        finger_patterns: [F123, F123, F134, F123, F123, F123],
    },
    BoxPosition {
        index: 4,
        fret_span: 5,
        root_strings: &[3, 5],
        start_offset: 5,
        note_patterns: [P023, P023, P023, P134, P023, P023],
        finger_patterns: [F123, F123, F123, F134, F123, F123],
    },
    BoxPosition {
        index: 5,
        fret_span: 4,
        root_strings: &[1, 3, 6],
        start_offset: 7,
        note_patterns: [P023, P023, P023, P023, P134, P023],
        finger_patterns: [F123, F123, F123, F123, F134, F123],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::note::Tuning;
    use crate::theory::scale::is_note_in_scale;

    #[test]
    fn test_position_lookup() {
        assert_eq!(position_count("minor_pentatonic"), 5);
        assert_eq!(position_count("dorian"), 0);
        assert!(position("minor_pentatonic", 0).is_none());
        assert!(position("minor_pentatonic", 6).is_none());
        assert_eq!(position("blues", 3).map(|p| p.index), Some(3));
    }

    #[test]
    fn test_fret_range() {
        let root_fret = root_fret_on_low_string(Note::A);
        assert_eq!(root_fret, 5);

        let first = position("minor_pentatonic", 1).unwrap();
        assert_eq!(first.fret_range(root_fret), (5, 8));

        let fifth = position("minor_pentatonic", 5).unwrap();
        assert_eq!(fifth.fret_range(root_fret), (15, 18));
    }

    #[test]
    fn test_patterns_are_parallel() {
        for scale in ["minor_pentatonic", "major_pentatonic", "blues", "major", "minor"] {
            for pos in scale_positions(scale).unwrap() {
                for (notes, fingers) in pos.note_patterns.iter().zip(pos.finger_patterns.iter()) {
                    assert_eq!(notes.len(), fingers.len(), "{} box {}", scale, pos.index);
                }
            }
        }
    }

    #[test]
    fn test_a_minor_box_one_is_in_scale() {
        let pos = position("minor_pentatonic", 1).unwrap();
        let tuning = Tuning::STANDARD;
        for (string_index, fret, _) in pos.fingered_frets(5) {
            let note = tuning.note_at(string_index, fret as i32).unwrap();
            assert!(is_note_in_scale(note, Note::A, "minor_pentatonic"));
        }
    }
}
