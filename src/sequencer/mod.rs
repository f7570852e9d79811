// Sequencer module - Lesson timeline, display modes, practice transport
// and the metronome clock

pub mod display;
pub mod metronome;
pub mod tempo;
pub mod timeline;
pub mod transport;

pub use display::{ActiveLabel, Background, DisplayMode};
pub use metronome::{ClickSink, ClockState, MetronomeClock, SilentSink, Tick};
pub use tempo::{ClickType, MetronomeConfig, SoundType, Tempo, TimeSignature};
pub use timeline::{
    ActiveItem, FretboardView, LessonTimeline, PositionKey, SequenceItem, UpcomingItem,
    active_items, current_step_index, next_beat, scale_sequence, upcoming_markers,
};
pub use transport::{Action, PracticeSession};
