// Scale - Scale formulas and membership tests

use super::note::Note;

/// Semitone offsets from the root that belong to a scale
pub type ScaleFormula = &'static [u8];

/// Known scales, keyed by identifier
pub const SCALES: &[(&str, ScaleFormula)] = &[
    ("chromatic", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
    ("major", &[0, 2, 4, 5, 7, 9, 11]),
    ("minor", &[0, 2, 3, 5, 7, 8, 10]),
    ("minor_pentatonic", &[0, 3, 5, 7, 10]),
    ("major_pentatonic", &[0, 2, 4, 7, 9]),
    ("blues", &[0, 3, 5, 6, 7, 10]),
    ("dorian", &[0, 2, 3, 5, 7, 9, 10]),
    ("phrygian", &[0, 1, 3, 5, 7, 8, 10]),
    ("lydian", &[0, 2, 4, 6, 7, 9, 11]),
    ("mixolydian", &[0, 2, 4, 5, 7, 9, 10]),
    ("locrian", &[0, 1, 3, 5, 6, 8, 10]),
];

/// Look up a scale formula by name
pub fn scale_formula(scale_name: &str) -> Option<ScaleFormula> {
    SCALES
        .iter()
        .find(|(name, _)| *name == scale_name)
        .map(|(_, formula)| *formula)
}

/// Whether `target` belongs to `scale_name` rooted at `root`.
/// Unknown scale names match nothing.
pub fn is_note_in_scale(target: Note, root: Note, scale_name: &str) -> bool {
    match scale_formula(scale_name) {
        Some(formula) => formula.contains(&target.interval_from(root)),
        None => false,
    }
}
