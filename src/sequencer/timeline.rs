// Timeline - Per-beat queries over an immutable lesson
// Answers which markers sound now, which come next and the overall shape

use std::collections::HashMap;
use std::fmt;

use crate::lesson::{Lesson, Marker};
use crate::sequencer::display::{ActiveLabel, Background, DisplayMode};
use crate::theory::{STRING_COUNT, Tuning};

/// Default lookahead window in steps
pub const DEFAULT_LOOKAHEAD: usize = 3;

/// Fretboard cell, independent of time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    pub string_index: usize,
    pub fret: i32,
}

impl PositionKey {
    pub fn new(string_index: usize, fret: i32) -> Self {
        Self { string_index, fret }
    }

    pub fn of(marker: &Marker) -> Self {
        Self::new(marker.string_index, marker.fret)
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.string_index, self.fret)
    }
}

/// A marker sounding at the current beat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveItem<'a> {
    pub marker: &'a Marker,
    /// 1-based index of the step the marker belongs to
    pub order: usize,
}

/// A position coming up within the lookahead window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingItem {
    /// Steps ahead of the anchor, starting at 1
    pub distance: usize,
    pub finger: u8,
}

/// First touch of a position anywhere in the lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceItem {
    /// 1-based step order
    pub order: usize,
    pub finger: u8,
}

pub type UpcomingMap = HashMap<PositionKey, UpcomingItem>;
pub type SequenceMap = HashMap<PositionKey, SequenceItem>;

/// Markers whose `[beat, beat + duration - 1]` window contains `current_beat`.
///
/// Every step is scanned, so held notes keep sounding after their step.
pub fn active_items(lesson: &Lesson, current_beat: u32) -> Vec<ActiveItem<'_>> {
    if current_beat < 1 {
        return Vec::new();
    }

    let mut items = Vec::new();
    for (i, step) in lesson.steps.iter().enumerate() {
        for marker in &step.markers {
            let end_beat = step
                .beat
                .saturating_add(marker.effective_duration())
                .saturating_sub(1);
            if step.beat <= current_beat && current_beat <= end_beat {
                items.push(ActiveItem { marker, order: i + 1 });
            }
        }
    }
    items
}

/// Index of the most recently started step, `None` before the first step
pub fn current_step_index(lesson: &Lesson, current_beat: u32) -> Option<usize> {
    lesson
        .steps
        .iter()
        .take_while(|step| step.beat <= current_beat)
        .count()
        .checked_sub(1)
}

/// Positions of the next `lookahead` steps after the anchor, wrapping past the
/// end of the lesson. The nearest occurrence of a position wins.
pub fn upcoming_markers(lesson: &Lesson, anchor: Option<usize>, lookahead: usize) -> UpcomingMap {
    let mut upcoming = UpcomingMap::new();
    let step_count = lesson.steps.len();
    if step_count == 0 {
        return upcoming;
    }

    // Without an anchor the window starts at the first step
    let base = anchor.map_or(step_count - 1, |index| index % step_count);

    for distance in 1..=lookahead {
        let index = (base + distance) % step_count;
        for marker in &lesson.steps[index].markers {
            upcoming
                .entry(PositionKey::of(marker))
                .or_insert(UpcomingItem {
                    distance,
                    finger: marker.finger,
                });
        }
    }
    upcoming
}

/// First-occurrence order of every position in the lesson
pub fn scale_sequence(lesson: &Lesson) -> SequenceMap {
    let mut sequence = SequenceMap::new();
    for (i, step) in lesson.steps.iter().enumerate() {
        for marker in &step.markers {
            sequence
                .entry(PositionKey::of(marker))
                .or_insert(SequenceItem {
                    order: i + 1,
                    finger: marker.finger,
                });
        }
    }
    sequence
}

/// Beat after `current_beat`, looping from `total_beats` back to 1
pub fn next_beat(current_beat: u32, total_beats: u32) -> u32 {
    if total_beats == 0 {
        return current_beat;
    }
    (current_beat % total_beats) + 1
}

/// Query handle over a lesson at a given beat
#[derive(Debug, Clone, Copy)]
pub struct LessonTimeline<'a> {
    lesson: &'a Lesson,
    current_beat: u32,
    current_step: Option<usize>,
}

impl<'a> LessonTimeline<'a> {
    pub fn new(lesson: &'a Lesson, current_beat: u32) -> Self {
        Self {
            lesson,
            current_beat,
            current_step: current_step_index(lesson, current_beat),
        }
    }

    /// Re-anchor on another beat
    pub fn seek(&mut self, current_beat: u32) {
        self.current_beat = current_beat;
        self.current_step = current_step_index(self.lesson, current_beat);
    }

    pub fn lesson(&self) -> &'a Lesson {
        self.lesson
    }

    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }

    pub fn current_step_index(&self) -> Option<usize> {
        self.current_step
    }

    pub fn total_beats(&self) -> u32 {
        self.lesson.total_beats()
    }

    pub fn active_items(&self) -> Vec<ActiveItem<'a>> {
        active_items(self.lesson, self.current_beat)
    }

    pub fn upcoming_markers(&self, lookahead: usize) -> UpcomingMap {
        upcoming_markers(self.lesson, self.current_step, lookahead)
    }

    pub fn scale_sequence(&self) -> SequenceMap {
        scale_sequence(self.lesson)
    }

    pub fn next_beat(&self) -> u32 {
        next_beat(self.current_beat, self.total_beats())
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FretboardView<'a> {
    pub tuning: Tuning,
    pub fret_count: u32,
    pub mode: DisplayMode,
    pub current_beat: u32,
    pub active: Vec<ActiveItem<'a>>,
    pub upcoming: UpcomingMap,
    pub sequence: SequenceMap,
}

impl<'a> FretboardView<'a> {
    /// Build the views the display mode needs; views it hides stay empty
    pub fn build(
        lesson: Option<&'a Lesson>,
        current_beat: u32,
        mode: DisplayMode,
        tuning: Tuning,
        fret_count: u32,
        lookahead: usize,
    ) -> Self {
        let mut view = Self {
            tuning,
            fret_count,
            mode,
            current_beat,
            active: Vec::new(),
            upcoming: UpcomingMap::new(),
            sequence: SequenceMap::new(),
        };

        let Some(lesson) = lesson else {
            return view;
        };

        let timeline = LessonTimeline::new(lesson, current_beat);
        view.active = timeline.active_items();
        if mode.needs_upcoming() {
            view.upcoming = timeline.upcoming_markers(lookahead);
        }
        if mode.needs_sequence() {
            view.sequence = timeline.scale_sequence();
        }
        view
    }

    /// Text on an active marker
    pub fn active_label(&self, item: &ActiveItem<'_>) -> String {
        let marker = item.marker;
        match self.mode.active_label() {
            ActiveLabel::StepOrder => item.order.to_string(),
            ActiveLabel::Finger if marker.finger > 0 => marker.finger.to_string(),
            ActiveLabel::Finger => String::new(),
            ActiveLabel::Fret if marker.is_muted() => "x".to_string(),
            ActiveLabel::Fret => marker.fret.to_string(),
            ActiveLabel::NoteName => marker
                .note
                .map_or_else(|| "x".to_string(), |note| note.name().to_string()),
        }
    }

    /// Text on a background position, `None` when the position is not drawn.
    /// Notes mode labels every visible cell; the other backgrounds only
    /// label cells of the scale sequence.
    pub fn background_label(&self, key: &PositionKey) -> Option<String> {
        if self.mode.background() == Background::Notes {
            if !self.is_visible(key) {
                return None;
            }
            return self
                .tuning
                .note_at(key.string_index, key.fret)
                .map(|note| note.name().to_string());
        }

        let item = self.sequence.get(key)?;
        match self.mode.background() {
            Background::Notes => None,
            Background::Shape => Some(item.order.to_string()),
            Background::Fingers if item.finger > 0 => Some(item.finger.to_string()),
            Background::Fingers => Some(String::new()),
            Background::None => None,
        }
    }

    /// Whether a cell belongs to the lesson's scale sequence (highlighted)
    pub fn in_sequence(&self, key: &PositionKey) -> bool {
        self.sequence.contains_key(key)
    }

    /// Every cell of the drawn board, string by string, open string first
    pub fn cells(&self) -> impl Iterator<Item = PositionKey> + '_ {
        (0..STRING_COUNT).flat_map(move |string_index| {
            (0..=self.fret_count as i32).map(move |fret| PositionKey::new(string_index, fret))
        })
    }

    /// Whether a fret fits on the drawn board
    pub fn is_visible(&self, key: &PositionKey) -> bool {
        key.fret >= 0 && (key.fret as u32) <= self.fret_count
    }
}
