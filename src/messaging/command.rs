// Command types - Practice loop → metronome clock

use std::sync::mpsc::Sender;

use crate::sequencer::tempo::{SoundType, Tempo, TimeSignature};

/// Clock transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

/// Snapshot answered to a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockStatus {
    pub state: PlayState,
    /// 0-based position within the measure
    pub current_beat: u32,
    /// Beats per measure
    pub total_beats: u32,
    pub tempo: Tempo,
    pub time_signature: TimeSignature,
    pub accent_first: bool,
    pub volume: u8,
    pub sound_type: SoundType,
}

#[derive(Debug, Clone)]
pub enum ClockCommand {
    Play,
    Pause,
    Stop,
    SetBpm(u32),
    SetTimeSignature(TimeSignature),
    SetAccentFirst(bool),
    SetVolume(u8),
    SetSoundType(SoundType),
    Query(Sender<ClockStatus>),
    Shutdown,
}

/// One metronome click as seen by the practice loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatEvent {
    /// 0-based position within the measure that just sounded
    pub position: u32,
    pub accent: bool,
}
