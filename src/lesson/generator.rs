// Generator - Scale exercises synthesized from a root, scale and fret box

use crate::lesson::loader::{LessonError, LoadOptions};
use crate::lesson::model::{Lesson, Marker, Step};
use crate::theory::{
    Note, STRING_COUNT, Tuning, is_note_in_scale, position, root_fret_on_low_string, scale_formula,
};

/// Order in which the collected notes are played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Scale exercise parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub root: Note,
    pub scale: String,
    pub start_fret: u32,
    pub end_fret: u32,
    pub direction: Direction,
}

impl GeneratorConfig {
    pub fn new(root: Note, scale: impl Into<String>, start_fret: u32, end_fret: u32) -> Self {
        Self {
            root,
            scale: scale.into(),
            start_fret,
            end_fret,
            direction: Direction::Ascending,
        }
    }

    /// Fret box of a CAGED position of `scale` for `root`
    pub fn from_position(root: Note, scale: &str, index: u8) -> Option<Self> {
        let pos = position(scale, index)?;
        let (start_fret, end_fret) = pos.fret_range(root_fret_on_low_string(root));
        Some(Self::new(root, scale, start_fret, end_fret))
    }

    pub fn descending(mut self) -> Self {
        self.direction = Direction::Descending;
        self
    }
}

/// Simple positional fingering: first fret of the box gets finger 1, capped at 4
fn box_finger(fret: u32, start_fret: u32) -> u8 {
    let finger = fret.saturating_sub(start_fret) + 1;
    finger.clamp(1, 4) as u8
}

/// One marker per step, beats 1, 2, 3, ...
fn package_steps(mut markers: Vec<Marker>, direction: Direction) -> Vec<Step> {
    if direction == Direction::Descending {
        markers.reverse();
    }
    markers
        .into_iter()
        .enumerate()
        .map(|(i, marker)| Step::new(i as u32 + 1, vec![marker]))
        .collect()
}

fn check_scale(scale: &str, options: &LoadOptions) -> Result<(), LessonError> {
    if scale_formula(scale).is_none() {
        if options.strict_names {
            return Err(LessonError::UnknownScale(scale.to_string()));
        }
        log::warn!("Unknown scale {:?}, generated exercise will be empty", scale);
    }
    Ok(())
}

/// Sweep every string (low to high) across the fret box and keep scale members
pub fn generate_steps(
    config: &GeneratorConfig,
    options: &LoadOptions,
) -> Result<Vec<Step>, LessonError> {
    check_scale(&config.scale, options)?;

    let tuning: &Tuning = &options.tuning;
    let mut markers = Vec::new();

    for string_index in 0..STRING_COUNT {
        for fret in config.start_fret..=config.end_fret {
            let fret = fret as i32;
            let Some(note) = tuning.note_at(string_index, fret) else {
                continue;
            };
            if is_note_in_scale(note, config.root, &config.scale) {
                let finger = box_finger(fret as u32, config.start_fret);
                markers.push(Marker::new(string_index, fret, finger, tuning));
            }
        }
    }

    Ok(package_steps(markers, config.direction))
}

/// Steps for a CAGED box, fingered from the position table
pub fn generate_box_steps(
    root: Note,
    scale: &str,
    index: u8,
    direction: Direction,
    options: &LoadOptions,
) -> Result<Vec<Step>, LessonError> {
    check_scale(scale, options)?;

    let Some(pos) = position(scale, index) else {
        log::warn!("No box position {} for scale {:?}", index, scale);
        return Ok(Vec::new());
    };

    let markers = pos
        .fingered_frets(root_fret_on_low_string(root))
        .into_iter()
        .map(|(string_index, fret, finger)| {
            Marker::new(string_index, fret as i32, finger, &options.tuning)
        })
        .collect();

    Ok(package_steps(markers, direction))
}

fn scale_title(root: Note, scale: &str) -> String {
    format!("{} {}", root, scale.replace('_', " "))
}

/// Complete lesson from a generator config
pub fn generate_lesson(
    config: &GeneratorConfig,
    bpm: u32,
    options: &LoadOptions,
) -> Result<Lesson, LessonError> {
    let steps = generate_steps(config, options)?;
    let title = format!(
        "{} (frets {}-{})",
        scale_title(config.root, &config.scale),
        config.start_fret,
        config.end_fret
    );
    Ok(Lesson::new(
        title,
        "generated",
        config.root.name(),
        bpm,
        steps,
        &options.tuning,
    ))
}

/// Complete lesson from a CAGED box
pub fn generate_box_lesson(
    root: Note,
    scale: &str,
    index: u8,
    bpm: u32,
    options: &LoadOptions,
) -> Result<Lesson, LessonError> {
    let steps = generate_box_steps(root, scale, index, Direction::Ascending, options)?;
    let title = format!("{} box {}", scale_title(root, scale), index);
    Ok(Lesson::new(title, "generated", root.name(), bpm, steps, &options.tuning))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_finger_clamp() {
        assert_eq!(box_finger(5, 5), 1);
        assert_eq!(box_finger(7, 5), 3);
        assert_eq!(box_finger(12, 5), 4);
        assert_eq!(box_finger(3, 5), 1);
    }

    #[test]
    fn test_a_minor_pentatonic_box() {
        let config = GeneratorConfig::new(Note::A, "minor_pentatonic", 5, 8);
        let steps = generate_steps(&config, &LoadOptions::default()).unwrap();

        // Two notes per string in the first box
        assert_eq!(steps.len(), 12);
        let first = &steps[0].markers[0];
        assert_eq!((first.string_index, first.fret, first.finger), (0, 5, 1));
        let second = &steps[1].markers[0];
        assert_eq!((second.string_index, second.fret, second.finger), (0, 8, 4));

        // Beats increase monotonically
        let beats: Vec<u32> = steps.iter().map(|s| s.beat).collect();
        assert_eq!(beats, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_descending_reverses_markers() {
        let config = GeneratorConfig::new(Note::A, "minor_pentatonic", 5, 8).descending();
        let steps = generate_steps(&config, &LoadOptions::default()).unwrap();
        let first = &steps[0].markers[0];
        assert_eq!((first.string_index, first.fret), (5, 8));
        assert_eq!(steps[0].beat, 1);
    }

    #[test]
    fn test_unknown_scale() {
        let config = GeneratorConfig::new(Note::A, "hyperlydian", 5, 8);
        let steps = generate_steps(&config, &LoadOptions::default()).unwrap();
        assert!(steps.is_empty());

        let strict = generate_steps(&config, &LoadOptions::strict());
        assert!(matches!(strict, Err(LessonError::UnknownScale(_))));
    }

    #[test]
    fn test_from_position_matches_box_generation() {
        let config = GeneratorConfig::from_position(Note::A, "minor_pentatonic", 1).unwrap();
        assert_eq!((config.start_fret, config.end_fret), (5, 8));

        let options = LoadOptions::default();
        let swept = generate_steps(&config, &options).unwrap();
        let boxed =
            generate_box_steps(Note::A, "minor_pentatonic", 1, Direction::Ascending, &options)
                .unwrap();
        let frets = |steps: &[Step]| -> Vec<(usize, i32)> {
            steps
                .iter()
                .map(|s| (s.markers[0].string_index, s.markers[0].fret))
                .collect()
        };
        assert_eq!(frets(&swept), frets(&boxed));
    }

    #[test]
    fn test_generate_box_lesson() {
        let lesson =
            generate_box_lesson(Note::A, "minor_pentatonic", 1, 90, &LoadOptions::default())
                .unwrap();
        assert_eq!(lesson.title, "A minor pentatonic box 1");
        assert_eq!(lesson.actual_key, Note::A);
        assert_eq!(lesson.bpm, 90);
        assert!(lesson.is_ordered());
    }
}
