// Module audio - Metronome click synthesis and the cpal output device

pub mod click;
pub mod output;

pub use click::{ClickBank, ClickRequest, ClickVoice};
pub use output::{AudioError, AudioOutput, CpalClickSink};
