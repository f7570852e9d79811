// Theory module - Pitch classes, scales and box shapes
// Pure functions, no state

pub mod note;
pub mod positions;
pub mod scale;

pub use note::{
    NOTE_NAMES, Note, STRING_COUNT, Tuning, calculate_note, parse_note_name, try_parse_note_name,
};
pub use positions::{BoxPosition, position, root_fret_on_low_string, scale_positions};
pub use scale::{SCALES, is_note_in_scale, scale_formula};
