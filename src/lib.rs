// Fretboard Trainer - Library exports for tests and benchmarks

pub mod audio;
pub mod config;
pub mod lesson;
pub mod messaging;
pub mod sequencer;
pub mod theory;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioOutput};
pub use config::{ConfigError, PracticeConfig};
pub use lesson::{
    Lesson, LessonError, LoadOptions, Marker, Step, load_lessons_from_sources, parse_tab,
};
pub use messaging::{BeatEvent, ClockCommand, ClockStatus, PlayState};
pub use sequencer::{
    DisplayMode, FretboardView, LessonTimeline, MetronomeClock, MetronomeConfig, PracticeSession,
    Tempo, TimeSignature,
};
pub use theory::{Note, Tuning};
