// Metronome - Beat clock running on its own thread
//
// The worker owns all clock state. The practice loop talks to it only
// through commands (mpsc) and reads beat events from a single-slot ring
// buffer. A paused or stopped clock keeps its timer running but stays silent.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use ringbuf::traits::{Consumer, Producer};

use crate::audio::AudioOutput;
use crate::messaging::channels::{BeatConsumer, BeatProducer, create_beat_channel};
use crate::messaging::command::{BeatEvent, ClockCommand, ClockStatus, PlayState};
use crate::sequencer::tempo::{ClickType, MetronomeConfig, SoundType, Tempo};

/// Receives the clicks the clock wants to hear
pub trait ClickSink: Send {
    fn play(&mut self, click: ClickType, sound: SoundType, gain: f32);
}

/// Sink that discards every click
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ClickSink for SilentSink {
    fn play(&mut self, _click: ClickType, _sound: SoundType, _gain: f32) {}
}

/// One sounded beat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub event: BeatEvent,
    pub click: ClickType,
    pub sound: SoundType,
    pub gain: f32,
}

/// Clock state machine, independent of any timer
#[derive(Debug, Clone)]
pub struct ClockState {
    config: MetronomeConfig,
    state: PlayState,
    /// 0-based position of the next click within the measure
    position: u32,
    reset_pending: bool,
}

impl ClockState {
    pub fn new(config: MetronomeConfig) -> Self {
        Self {
            config,
            state: PlayState::Stopped,
            position: 0,
            reset_pending: false,
        }
    }

    /// Apply a state command; `Query` and `Shutdown` are handled by the worker
    pub fn apply(&mut self, command: ClockCommand) {
        match command {
            ClockCommand::Play => self.state = PlayState::Playing,
            ClockCommand::Pause => self.state = PlayState::Paused,
            ClockCommand::Stop => {
                self.state = PlayState::Stopped;
                self.position = 0;
            }
            ClockCommand::SetBpm(bpm) => {
                self.config.tempo = Tempo::new(bpm);
                // Coalesced: a second request before the timer picks it up is a no-op
                self.reset_pending = true;
            }
            ClockCommand::SetTimeSignature(time_signature) => {
                self.config.time_signature = time_signature;
                self.position = 0;
            }
            ClockCommand::SetAccentFirst(accent_first) => self.config.accent_first = accent_first,
            ClockCommand::SetVolume(volume) => self.config.volume = volume.min(100),
            ClockCommand::SetSoundType(sound_type) => self.config.sound_type = sound_type,
            ClockCommand::Query(_) | ClockCommand::Shutdown => {}
        }
    }

    /// Advance one period. Returns the sounded beat, `None` when silent.
    pub fn tick(&mut self) -> Option<Tick> {
        if self.state != PlayState::Playing {
            return None;
        }

        let position = self.position;
        let click = self.config.click_for(position);
        self.position = (position + 1) % self.config.time_signature.beats_per_measure();

        Some(Tick {
            event: BeatEvent {
                position,
                accent: click == ClickType::Accent,
            },
            click,
            sound: self.config.sound_type,
            gain: self.config.gain(),
        })
    }

    /// Whether the timer period must be rebuilt; clears the request
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_pending)
    }

    pub fn beat_duration(&self) -> Duration {
        self.config.tempo.beat_duration()
    }

    pub fn config(&self) -> &MetronomeConfig {
        &self.config
    }

    pub fn status(&self) -> ClockStatus {
        ClockStatus {
            state: self.state,
            current_beat: self.position,
            total_beats: self.config.time_signature.beats_per_measure(),
            tempo: self.config.tempo,
            time_signature: self.config.time_signature,
            accent_first: self.config.accent_first,
            volume: self.config.volume,
            sound_type: self.config.sound_type,
        }
    }
}

/// Handle on the running clock
pub struct MetronomeClock {
    command_tx: Sender<ClockCommand>,
    beat_rx: BeatConsumer,
    worker: Option<thread::JoinHandle<()>>,
    output: Option<AudioOutput>,
}

impl MetronomeClock {
    /// Start the clock thread with an explicit click sink
    pub fn new(config: MetronomeConfig, sink: Box<dyn ClickSink>) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (beat_tx, beat_rx) = create_beat_channel();

        let worker = Self::spawn_worker(ClockState::new(config), command_rx, sink, beat_tx);

        Self {
            command_tx,
            beat_rx,
            worker: Some(worker),
            output: None,
        }
    }

    /// Start the clock and give it ownership of the audio output
    pub fn with_output(config: MetronomeConfig, mut output: AudioOutput) -> Self {
        let sink: Box<dyn ClickSink> = match output.click_sink() {
            Some(sink) => Box::new(sink),
            None => {
                log::warn!("Audio output already feeds another clock, metronome will be silent");
                Box::new(SilentSink)
            }
        };
        let mut clock = Self::new(config, sink);
        clock.output = Some(output);
        clock
    }

    fn spawn_worker(
        mut state: ClockState,
        command_rx: Receiver<ClockCommand>,
        mut sink: Box<dyn ClickSink>,
        mut beat_tx: BeatProducer,
    ) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let mut period = state.beat_duration();
            let mut next_tick = Instant::now() + period;

            loop {
                let timeout = next_tick.saturating_duration_since(Instant::now());
                match command_rx.recv_timeout(timeout) {
                    Ok(ClockCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Ok(ClockCommand::Query(reply)) => {
                        let _ = reply.send(state.status());
                    }
                    Ok(command) => state.apply(command),
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some(tick) = state.tick() {
                            sink.play(tick.click, tick.sound, tick.gain);
                            if beat_tx.try_push(tick.event).is_err() {
                                log::trace!("Beat {} dropped, previous one unread", tick.event.position);
                            }
                        }

                        next_tick += period;
                        // Fell behind (e.g. suspended): resume from now instead of bursting
                        let now = Instant::now();
                        if next_tick < now {
                            next_tick = now + period;
                        }
                    }
                }

                if state.take_reset() {
                    period = state.beat_duration();
                    next_tick = Instant::now() + period;
                    log::debug!("Metronome period now {:?}", period);
                }
            }

            log::debug!("Metronome thread stopped");
        })
    }

    /// Send a command; false once the clock is closed
    pub fn send(&self, command: ClockCommand) -> bool {
        self.worker.is_some() && self.command_tx.send(command).is_ok()
    }

    pub fn play(&self) {
        self.send(ClockCommand::Play);
    }

    pub fn pause(&self) {
        self.send(ClockCommand::Pause);
    }

    pub fn stop(&self) {
        self.send(ClockCommand::Stop);
    }

    pub fn set_bpm(&self, bpm: u32) {
        self.send(ClockCommand::SetBpm(bpm));
    }

    /// Current clock snapshot, `None` once closed
    pub fn status(&self) -> Option<ClockStatus> {
        let (reply_tx, reply_rx) = mpsc::channel();
        if !self.send(ClockCommand::Query(reply_tx)) {
            return None;
        }
        reply_rx.recv().ok()
    }

    /// 0-based position of the next click within the measure
    pub fn current_beat(&self) -> u32 {
        self.status().map_or(0, |status| status.current_beat)
    }

    /// Beats per measure
    pub fn total_beats(&self) -> u32 {
        self.status().map_or(0, |status| status.total_beats)
    }

    /// Take the pending beat event, if any
    pub fn poll_beat(&mut self) -> Option<BeatEvent> {
        self.beat_rx.try_pop()
    }

    /// Stop the worker and release the audio output. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.command_tx.send(ClockCommand::Shutdown);
            if worker.join().is_err() {
                log::error!("Metronome thread panicked");
            }
        }
        if self.output.take().is_some() {
            log::info!("Audio output released");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.worker.is_none()
    }
}

impl Drop for MetronomeClock {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::tempo::TimeSignature;

    fn playing(config: MetronomeConfig) -> ClockState {
        let mut state = ClockState::new(config);
        state.apply(ClockCommand::Play);
        state
    }

    #[test]
    fn test_accent_cycle() {
        let mut state = playing(MetronomeConfig::default());
        let clicks: Vec<ClickType> = (0..5).filter_map(|_| state.tick()).map(|t| t.click).collect();
        assert_eq!(
            clicks,
            vec![
                ClickType::Accent,
                ClickType::Regular,
                ClickType::Regular,
                ClickType::Regular,
                ClickType::Accent,
            ]
        );
    }

    #[test]
    fn test_paused_is_silent_and_keeps_position() {
        let mut state = playing(MetronomeConfig::default());
        state.tick();
        state.tick();
        state.apply(ClockCommand::Pause);
        assert!(state.tick().is_none());
        assert_eq!(state.status().current_beat, 2);

        state.apply(ClockCommand::Play);
        assert_eq!(state.tick().map(|t| t.event.position), Some(2));
    }

    #[test]
    fn test_stop_resets_position() {
        let mut state = playing(MetronomeConfig::default());
        state.tick();
        state.apply(ClockCommand::Stop);
        assert_eq!(state.status().current_beat, 0);
        assert_eq!(state.status().state, PlayState::Stopped);
        assert!(state.tick().is_none());
    }

    #[test]
    fn test_time_signature_resets_position() {
        let mut state = playing(MetronomeConfig::default());
        state.tick();
        state.apply(ClockCommand::SetTimeSignature(TimeSignature::ThreeFour));
        let status = state.status();
        assert_eq!((status.current_beat, status.total_beats), (0, 3));
    }

    #[test]
    fn test_bpm_reset_is_coalesced() {
        let mut state = ClockState::new(MetronomeConfig::default());
        assert!(!state.take_reset());
        state.apply(ClockCommand::SetBpm(90));
        state.apply(ClockCommand::SetBpm(300));
        assert!(state.take_reset());
        assert!(!state.take_reset());
        assert_eq!(state.config().tempo.bpm(), 240);
        assert_eq!(state.beat_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_volume_and_accent_settings() {
        let mut state = playing(MetronomeConfig::default());
        state.apply(ClockCommand::SetAccentFirst(false));
        state.apply(ClockCommand::SetVolume(150));
        state.apply(ClockCommand::SetSoundType(SoundType::Digital));
        let tick = state.tick().unwrap();
        assert_eq!(tick.click, ClickType::Regular);
        assert!(!tick.event.accent);
        assert_eq!(tick.gain, 1.0);
        assert_eq!(tick.sound, SoundType::Digital);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut clock = MetronomeClock::new(MetronomeConfig::default(), Box::new(SilentSink));
        assert_eq!(clock.total_beats(), 4);
        clock.close();
        clock.close();
        assert!(clock.is_closed());
        assert!(clock.status().is_none());
        assert!(!clock.send(ClockCommand::Play));
    }
}
