// Tab parser - ASCII tablature to lesson steps
//
// Input layout:
//
//   TITLE: A minor box 1
//   KEY: A
//   BPM: 80
//   e|--5(f1:d)--|--8(f4:u)--|------|
//   B|-----------|-----------|--7b9-|
//   ...
//
// Every cell between two `|` is one beat. Lines for the same string are
// concatenated, so a lesson may span several bars. Parsing stops at a line
// starting with `NOTES:` or `LEGEND:`.

use std::collections::HashMap;

use crate::lesson::model::{
    Lesson, Marker, Picking, SlideDirection, Step, Technique, TechniqueParams, VibratoWidth,
    default_bpm,
};
use crate::theory::{STRING_COUNT, Tuning};

/// Section headers that end the tab body
const STOP_PREFIXES: [&str; 2] = ["NOTES:", "LEGEND:"];

/// String label → string index (0 = low E)
fn string_index_for_label(label: &str) -> Option<usize> {
    match label {
        "E" => Some(0),
        "A" => Some(1),
        "D" => Some(2),
        "G" => Some(3),
        "B" => Some(4),
        "e" => Some(5),
        _ => None,
    }
}

/// Accumulates metadata and per-string tab content
#[derive(Debug, Default)]
pub struct TabParser {
    metadata: HashMap<String, String>,
    tab_lines: [Option<String>; STRING_COUNT],
}

impl TabParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the whole tab text
    pub fn feed(&mut self, text: &str) {
        let mut in_tab_section = false;

        for line in text.lines() {
            let trimmed = line.trim_start();
            if STOP_PREFIXES.iter().any(|prefix| trimmed.starts_with(prefix)) {
                break;
            }

            if self.push_tab_line(line) {
                in_tab_section = true;
                continue;
            }

            // Metadata is only read before the first tab line
            if !in_tab_section && let Some((key, value)) = line.split_once(':') {
                self.metadata
                    .insert(key.trim().to_ascii_uppercase(), value.trim().to_string());
            }
        }
    }

    /// Store a `<label>|cells...` line; false if the line is not a tab line
    fn push_tab_line(&mut self, line: &str) -> bool {
        let Some((label, content)) = line.split_once('|') else {
            return false;
        };
        let Some(index) = string_index_for_label(label.trim()) else {
            return false;
        };

        let slot = &mut self.tab_lines[index];
        match slot {
            Some(existing) => {
                // Keep a bar between concatenated lines so cells never merge
                if !existing.ends_with('|') {
                    existing.push('|');
                }
                existing.push_str(content);
            }
            None => *slot = Some(content.to_string()),
        }
        true
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Build the lesson from everything fed so far
    pub fn build_lesson(&self, tuning: &Tuning) -> Lesson {
        let bpm = match self.metadata("BPM") {
            Some(text) => text.parse::<u32>().ok().filter(|bpm| *bpm > 0).unwrap_or_else(|| {
                log::warn!("Invalid BPM {:?} in tab, using {}", text, default_bpm());
                default_bpm()
            }),
            None => default_bpm(),
        };

        Lesson::new(
            self.metadata("TITLE").unwrap_or_default(),
            self.metadata("CATEGORY").unwrap_or_default().to_lowercase(),
            self.metadata("KEY").unwrap_or_default(),
            bpm,
            self.parse_steps(tuning),
            tuning,
        )
    }

    /// Split every string into beat cells and assemble one step per column
    pub fn parse_steps(&self, tuning: &Tuning) -> Vec<Step> {
        let beat_cells: Vec<Vec<&str>> = self
            .tab_lines
            .iter()
            .map(|line| line.as_deref().map(split_beat_cells).unwrap_or_default())
            .collect();

        let column_count = beat_cells.iter().map(Vec::len).max().unwrap_or(0);
        let mut steps: Vec<Step> = Vec::with_capacity(column_count);

        for column in 0..column_count {
            let beat = steps.len() as u32 + 1;
            let mut markers = Vec::new();
            let mut all_empty = true;

            for (string_index, cells) in beat_cells.iter().enumerate() {
                // Strings with fewer cells rest for the missing beats
                let Some(raw) = cells.get(column) else {
                    continue;
                };
                let cell = strip_padding(raw);
                if cell.is_empty() {
                    continue;
                }
                all_empty = false;
                match parse_cell(string_index, &cell, tuning) {
                    Some(marker) => markers.push(marker),
                    None => log::debug!(
                        "Ignoring malformed tab cell {:?} on string {} column {}",
                        cell,
                        string_index,
                        column + 1
                    ),
                }
            }

            // Empty columns are rests; columns holding only malformed cells
            // are dropped without taking a beat
            if all_empty || !markers.is_empty() {
                steps.push(Step::new(beat, markers));
            }
        }

        steps
    }
}

/// Parse a tab text into a lesson
pub fn parse_tab(text: &str, tuning: &Tuning) -> Lesson {
    let mut parser = TabParser::new();
    parser.feed(text);
    parser.build_lesson(tuning)
}

/// Split concatenated string content on `|`.
///
/// One leading and one trailing blank cell come from the line's own boundary
/// bars and are dropped; interior blank cells are rest beats and are kept.
fn split_beat_cells(content: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = content.split('|').collect();
    if cells.last().is_some_and(|cell| cell.trim().is_empty()) {
        cells.pop();
    }
    if cells.first().is_some_and(|cell| cell.trim().is_empty()) {
        cells.remove(0);
    }
    cells
}

/// Remove decorative dashes and surrounding whitespace
fn strip_padding(cell: &str) -> String {
    cell.replace('-', "").trim().to_string()
}

/// Parse one cell (single string, single beat).
///
/// Grammar: `x` muted, `<N>` natural harmonic, or a fret number followed by an
/// optional `(fN)`, `(fN:p)`, `(p)` or legacy `(N)` suffix and an optional
/// technique suffix. Anything else yields `None`.
pub fn parse_cell(string_index: usize, cell: &str, tuning: &Tuning) -> Option<Marker> {
    if cell == "x" || cell == "X" {
        return Some(Marker::muted(string_index));
    }

    if let Some(inner) = cell.strip_prefix('<') {
        let (fret, _) = inner.split_once('>')?;
        let fret = parse_fret(fret)?;
        return Some(
            Marker::new(string_index, fret, 0, tuning)
                .with_technique(Technique::Harmonic, TechniqueParams::default()),
        );
    }

    if !cell.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let digits_end = cell
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(cell.len());
    let fret = parse_fret(&cell[..digits_end])?;

    let (annotation, technique_text) = split_annotation(cell);
    let (finger, picking) = annotation.map(parse_annotation).unwrap_or((0, Picking::None));
    let (technique, params) = parse_technique(&technique_text);

    Some(
        Marker::new(string_index, fret, finger, tuning)
            .with_technique(technique, params)
            .with_picking(picking),
    )
}

fn parse_fret(text: &str) -> Option<i32> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Separate the parenthesized annotation from the rest of the token
fn split_annotation(cell: &str) -> (Option<&str>, String) {
    if let Some(open) = cell.find('(')
        && let Some(close_offset) = cell[open..].find(')')
    {
        let close = open + close_offset;
        let mut rest = String::with_capacity(cell.len());
        rest.push_str(&cell[..open]);
        rest.push_str(&cell[close + 1..]);
        return (Some(&cell[open + 1..close]), rest);
    }
    (None, cell.to_string())
}

/// `f1`, `f1:d`, `d` or legacy `1`
fn parse_annotation(content: &str) -> (u8, Picking) {
    let (finger_text, picking_text) = if content.len() == 1
        && content.starts_with(|c: char| c.is_ascii_digit())
    {
        (Some(content), None)
    } else if let Some(rest) = content.strip_prefix('f') {
        match rest.split_once(':') {
            Some((finger, picking)) => (Some(finger), Some(picking)),
            None => (Some(rest), None),
        }
    } else {
        (None, Some(content))
    };

    let finger = finger_text
        .and_then(|text| text.parse::<u8>().ok())
        .filter(|finger| {
            let valid = *finger <= 4;
            if !valid {
                log::debug!("Finger {} out of range, treating as unspecified", finger);
            }
            valid
        })
        .unwrap_or(0);

    let picking = picking_text
        .and_then(|text| Picking::from_code(text.trim()))
        .unwrap_or(Picking::None);

    (finger, picking)
}

/// Split `text` on `separator` into exactly two parts
fn split_pair(text: &str, separator: char) -> Option<(&str, &str)> {
    let mut parts = text.split(separator);
    let first = parts.next()?;
    let second = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first, second))
}

fn targeted(text: &str, separator: char) -> Option<i32> {
    split_pair(text, separator).and_then(|(_, target)| parse_fret(target))
}

/// Technique suffix; first match in fixed priority order wins
fn parse_technique(text: &str) -> (Technique, TechniqueParams) {
    if let Some(target) = targeted(text, 'b') {
        return (Technique::Bend, TechniqueParams::with_target(target));
    }

    for (separator, towards, out) in [
        ('/', SlideDirection::Up, SlideDirection::OutUp),
        ('\\', SlideDirection::Down, SlideDirection::OutDown),
    ] {
        if let Some((_, target)) = split_pair(text, separator) {
            if target.is_empty() {
                let params = TechniqueParams {
                    slide: Some(out),
                    ..TechniqueParams::default()
                };
                return (Technique::Slide, params);
            }
            if let Some(target) = parse_fret(target) {
                let params = TechniqueParams {
                    target_fret: Some(target),
                    slide: Some(towards),
                    ..TechniqueParams::default()
                };
                return (Technique::Slide, params);
            }
        }
    }

    for (separator, technique) in [
        ('h', Technique::Hammer),
        ('p', Technique::PullOff),
        ('l', Technique::Trill),
    ] {
        if let Some(target) = targeted(text, separator) {
            return (technique, TechniqueParams::with_target(target));
        }
    }

    let tildes = text.matches('~').count();
    if tildes > 0 {
        let width = if tildes >= 2 {
            VibratoWidth::Wide
        } else {
            VibratoWidth::Normal
        };
        let params = TechniqueParams {
            vibrato_width: Some(width),
            ..TechniqueParams::default()
        };
        return (Technique::Vibrato, params);
    }

    if text.ends_with('t') {
        return (Technique::Tap, TechniqueParams::default());
    }
    if text.ends_with('*') {
        return (Technique::Pinch, TechniqueParams::default());
    }

    (Technique::None, TechniqueParams::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::Note;

    fn cell(text: &str) -> Option<Marker> {
        parse_cell(5, text, &Tuning::STANDARD)
    }

    #[test]
    fn test_plain_and_muted_cells() {
        let marker = cell("12").unwrap();
        assert_eq!(marker.fret, 12);
        assert_eq!(marker.note, Some(Note::E));
        assert_eq!(marker.technique, Technique::None);

        let muted = cell("X").unwrap();
        assert_eq!(muted.fret, -1);
        assert_eq!(muted.note, None);

        assert!(cell("q").is_none());
        assert!(cell("~5").is_none());
    }

    #[test]
    fn test_annotation_forms() {
        let m = cell("5(f1:d)").unwrap();
        assert_eq!((m.fret, m.finger, m.picking), (5, 1, Picking::Down));

        let m = cell("7(f3)").unwrap();
        assert_eq!((m.finger, m.picking), (3, Picking::None));

        let m = cell("7(u)").unwrap();
        assert_eq!((m.finger, m.picking), (0, Picking::Up));

        let m = cell("3(2)").unwrap();
        assert_eq!((m.finger, m.picking), (2, Picking::None));

        let m = cell("3(f9:s)").unwrap();
        assert_eq!((m.finger, m.picking), (0, Picking::Sweep));
    }

    #[test]
    fn test_techniques() {
        let m = cell("7b9").unwrap();
        assert_eq!((m.fret, m.technique), (7, Technique::Bend));
        assert_eq!(m.tech_params.target_fret, Some(9));

        let m = cell("5/7").unwrap();
        assert_eq!(m.technique, Technique::Slide);
        assert_eq!(m.tech_params.slide, Some(SlideDirection::Up));
        assert_eq!(m.tech_params.target_fret, Some(7));

        let m = cell("7\\5").unwrap();
        assert_eq!(m.tech_params.slide, Some(SlideDirection::Down));

        let m = cell("5/").unwrap();
        assert_eq!(m.tech_params.slide, Some(SlideDirection::OutUp));
        assert_eq!(m.tech_params.target_fret, None);

        let m = cell("7\\").unwrap();
        assert_eq!(m.tech_params.slide, Some(SlideDirection::OutDown));

        assert_eq!(cell("5h7").unwrap().technique, Technique::Hammer);
        assert_eq!(cell("7p5").unwrap().technique, Technique::PullOff);
        assert_eq!(cell("5l7").unwrap().technique, Technique::Trill);
        assert_eq!(cell("12t").unwrap().technique, Technique::Tap);
        assert_eq!(cell("7*").unwrap().technique, Technique::Pinch);

        let m = cell("5~").unwrap();
        assert_eq!(m.tech_params.vibrato_width, Some(VibratoWidth::Normal));
        let m = cell("5~~~").unwrap();
        assert_eq!(m.tech_params.vibrato_width, Some(VibratoWidth::Wide));
    }

    #[test]
    fn test_technique_after_annotation() {
        let m = cell("7(f3:d)b9").unwrap();
        assert_eq!(m.technique, Technique::Bend);
        assert_eq!(m.finger, 3);
        assert_eq!(m.picking, Picking::Down);

        // Tremolo picking code is not read as a tap
        let m = cell("5(f1:t)").unwrap();
        assert_eq!(m.technique, Technique::None);
        assert_eq!(m.picking, Picking::Tremolo);
    }

    #[test]
    fn test_harmonic() {
        let m = cell("<12>").unwrap();
        assert_eq!(m.fret, 12);
        assert_eq!(m.technique, Technique::Harmonic);
        assert!(cell("<>").is_none());
        // Unclosed harmonic is not a marker
        assert!(cell("<12").is_none());
    }

    #[test]
    fn test_strip_padding_keeps_inner_spaces() {
        assert_eq!(strip_padding(" --5-- "), "5");
        assert_eq!(strip_padding("-----"), "");
        assert_eq!(strip_padding(" 5 7 "), "5 7");
        assert_eq!(cell(&strip_padding(" 5 7 ")).map(|m| m.fret), Some(5));
    }

    #[test]
    fn test_split_beat_cells_keeps_interior_rests() {
        assert_eq!(split_beat_cells("--5--||--7--|"), vec!["--5--", "", "--7--"]);
        assert_eq!(split_beat_cells("--5--|-----|"), vec!["--5--", "-----"]);
        assert!(split_beat_cells("").is_empty());
    }

    #[test]
    fn test_metadata_stops_at_first_tab_line() {
        let mut parser = TabParser::new();
        parser.feed("TITLE: Box\nbpm: 90\ne|--5(f1:d)--|\nKEY: G\n");
        assert_eq!(parser.metadata("TITLE"), Some("Box"));
        assert_eq!(parser.metadata("BPM"), Some("90"));
        assert_eq!(parser.metadata("KEY"), None);
    }
}
