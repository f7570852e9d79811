// Lesson model - Markers, steps and lessons
// A lesson is built once at load time and read-only afterwards

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::theory::{Note, Tuning, parse_note_name};

/// Fret value reserved for a muted/deadened string
pub const MUTED_FRET: i32 = -1;

/// Left-hand technique applied to a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technique {
    #[default]
    None,
    Bend,
    #[serde(alias = "pre-bend", alias = "pre_bend")]
    PreBend,
    Slide,
    #[serde(alias = "hammer-on", alias = "hammer_on")]
    Hammer,
    #[serde(alias = "pull-off", alias = "pull_off")]
    PullOff,
    Vibrato,
    Tap,
    Harmonic,
    Pinch,
    Trill,
}

/// Direction of a slide; the `Out*` variants have no target fret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideDirection {
    Up,
    Down,
    OutUp,
    OutDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VibratoWidth {
    #[default]
    Normal,
    Wide,
}

/// Auxiliary technique parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TechniqueParams {
    /// Destination fret for bend, slide, hammer-on, pull-off and trill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_fret: Option<i32>,
    /// Bend amount in semitones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bend_amount: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrato_width: Option<VibratoWidth>,
    #[serde(alias = "slide_type", skip_serializing_if = "Option::is_none")]
    pub slide: Option<SlideDirection>,
}

impl TechniqueParams {
    pub fn with_target(target_fret: i32) -> Self {
        Self {
            target_fret: Some(target_fret),
            ..Self::default()
        }
    }
}

/// Right-hand picking annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Picking {
    #[default]
    None,
    Down,
    Up,
    Alternate,
    Tremolo,
    Sweep,
    Economy,
}

impl Picking {
    /// One-character tab code: d u a t s e
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "d" => Some(Picking::Down),
            "u" => Some(Picking::Up),
            "a" => Some(Picking::Alternate),
            "t" => Some(Picking::Tremolo),
            "s" => Some(Picking::Sweep),
            "e" => Some(Picking::Economy),
            _ => None,
        }
    }

    /// Symbol shown on the picking line
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Picking::None => None,
            Picking::Down => Some("∏"),
            Picking::Up => Some("V"),
            Picking::Alternate => Some("d-u"),
            Picking::Tremolo => Some("≈"),
            Picking::Sweep => Some("→"),
            Picking::Economy => Some("e"),
        }
    }
}

/// One fretted (or muted) position within a beat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// 0 = lowest string, 5 = highest string
    #[serde(rename = "string")]
    pub string_index: usize,

    /// Fret number, `MUTED_FRET` for a muted string
    pub fret: i32,

    /// 0 = open/unspecified, 1-4 = fretting finger
    #[serde(default)]
    pub finger: u8,

    /// Beats the note is held; values <= 0 behave as 1
    #[serde(default = "default_duration")]
    pub duration: i32,

    #[serde(default)]
    pub technique: Technique,

    #[serde(default)]
    pub tech_params: TechniqueParams,

    #[serde(default)]
    pub picking: Picking,

    /// Derived from (string, fret, tuning); `None` when muted
    #[serde(skip)]
    pub note: Option<Note>,
}

fn default_duration() -> i32 {
    1
}

impl Marker {
    /// Create a plain marker and derive its note from the tuning
    pub fn new(string_index: usize, fret: i32, finger: u8, tuning: &Tuning) -> Self {
        let mut marker = Self {
            string_index,
            fret,
            finger,
            duration: 1,
            technique: Technique::None,
            tech_params: TechniqueParams::default(),
            picking: Picking::None,
            note: None,
        };
        marker.resolve_note(tuning);
        marker
    }

    /// Muted string marker (no pitch)
    pub fn muted(string_index: usize) -> Self {
        Self {
            string_index,
            fret: MUTED_FRET,
            finger: 0,
            duration: 1,
            technique: Technique::None,
            tech_params: TechniqueParams::default(),
            picking: Picking::None,
            note: None,
        }
    }

    pub fn with_technique(mut self, technique: Technique, params: TechniqueParams) -> Self {
        self.technique = technique;
        self.tech_params = params;
        self
    }

    pub fn with_picking(mut self, picking: Picking) -> Self {
        self.picking = picking;
        self
    }

    pub fn with_duration(mut self, duration: i32) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_muted(&self) -> bool {
        self.fret < 0
    }

    /// Duration in beats, never less than 1
    pub fn effective_duration(&self) -> u32 {
        if self.duration > 0 {
            self.duration as u32
        } else {
            1
        }
    }

    /// Recompute `note` from the tuning
    pub fn resolve_note(&mut self, tuning: &Tuning) {
        self.note = tuning.note_at(self.string_index, self.fret);
    }

    /// Technique symbol for the technique line, e.g. "↗9" or "~"
    pub fn technique_symbol(&self) -> Option<String> {
        let target = self.tech_params.target_fret.unwrap_or_default();
        let symbol = match self.technique {
            Technique::None => return None,
            Technique::Bend | Technique::PreBend => format!("↗{}", target),
            Technique::Slide => match self.tech_params.slide {
                Some(SlideDirection::Up) => format!("→{}", target),
                Some(SlideDirection::Down) => format!("←{}", target),
                _ => "→".to_string(),
            },
            Technique::Hammer => format!("ʰ{}", target),
            Technique::PullOff => format!("ᵖ{}", target),
            Technique::Vibrato => "~".to_string(),
            Technique::Tap => "ᵀ".to_string(),
            Technique::Harmonic => "◊".to_string(),
            Technique::Pinch => "*".to_string(),
            Technique::Trill => format!("≈{}", target),
        };
        Some(symbol)
    }

    /// Fret label with inline technique, e.g. "7↗9"; "x" for muted strings
    pub fn fret_label(&self) -> String {
        if self.is_muted() {
            return "x".to_string();
        }
        match self.technique_symbol() {
            Some(symbol) => format!("{}{}", self.fret, symbol),
            None => self.fret.to_string(),
        }
    }
}

/// One beat-aligned unit of a lesson; empty markers = rest
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position in the lesson timeline
    pub beat: u32,

    #[serde(default)]
    pub markers: Vec<Marker>,

    /// Picking pattern such as "d u d u"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picking_pattern: Option<String>,

    #[serde(default)]
    pub accent: bool,
}

impl Step {
    pub fn new(beat: u32, markers: Vec<Marker>) -> Self {
        Self {
            beat,
            markers,
            picking_pattern: None,
            accent: false,
        }
    }

    pub fn rest(beat: u32) -> Self {
        Self::new(beat, Vec::new())
    }

    pub fn is_rest(&self) -> bool {
        self.markers.is_empty()
    }
}

/// A complete practice unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,

    #[serde(default)]
    pub category: String,

    /// Target tempo
    #[serde(default = "default_bpm")]
    pub bpm: u32,

    /// Display key, e.g. "A"
    #[serde(rename = "key", default)]
    pub key: String,

    #[serde(default)]
    pub steps: Vec<Step>,

    /// Parsed from `key` at load time
    #[serde(skip)]
    pub actual_key: Note,
}

pub(crate) fn default_bpm() -> u32 {
    120
}

impl Lesson {
    /// Build a lesson and derive every computed field
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        key: impl Into<String>,
        bpm: u32,
        steps: Vec<Step>,
        tuning: &Tuning,
    ) -> Self {
        let mut lesson = Self {
            title: title.into(),
            category: category.into(),
            bpm,
            key: key.into(),
            steps,
            actual_key: Note::C,
        };
        lesson.resolve(tuning);
        lesson
    }

    /// Derive `actual_key` and every marker note.
    /// Called once after deserialization; the lesson is read-only afterwards.
    pub fn resolve(&mut self, tuning: &Tuning) {
        self.actual_key = parse_note_name(&self.key);
        if self.bpm == 0 {
            log::warn!("Lesson {:?} has bpm 0, using {}", self.title, default_bpm());
            self.bpm = default_bpm();
        }
        for step in &mut self.steps {
            for marker in &mut step.markers {
                if tuning.open_note(marker.string_index).is_none() {
                    log::warn!(
                        "Lesson {:?} beat {}: string index {} is off the fretboard",
                        self.title,
                        step.beat,
                        marker.string_index
                    );
                }
                marker.resolve_note(tuning);
            }
        }
    }

    /// Beat value of the last step (0 for an empty lesson)
    pub fn total_beats(&self) -> u32 {
        self.steps.last().map_or(0, |step| step.beat)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether step beats never decrease
    pub fn is_ordered(&self) -> bool {
        self.steps.windows(2).all(|pair| pair[0].beat <= pair[1].beat)
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Key: {} | BPM: {})", self.title, self.key, self.bpm)
    }
}
