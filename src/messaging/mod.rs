// Messaging - Commands and lock-free channels between the practice loop,
// the metronome worker and the audio callback

pub mod channels;
pub mod command;

pub use channels::{create_beat_channel, create_click_channel};
pub use command::{BeatEvent, ClockCommand, ClockStatus, PlayState};
