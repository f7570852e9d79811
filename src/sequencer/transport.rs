// Transport - Practice session state driven by user actions and beats
//
// Every transition is synchronous and never blocks. Changes the metronome
// must hear are returned as `ClockCommand`s for the caller to send.

use crate::config::PracticeConfig;
use crate::lesson::Lesson;
use crate::messaging::command::{BeatEvent, ClockCommand};
use crate::sequencer::display::DisplayMode;
use crate::sequencer::tempo::{MetronomeConfig, TimeSignature};
use crate::sequencer::timeline::{FretboardView, next_beat};
use crate::theory::Tuning;

/// BPM change per increase/decrease
pub const BPM_STEP: i32 = 5;

/// User intents understood by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleNotes,
    ToggleFingers,
    ToggleShape,
    ToggleUpcoming,
    ToggleFretCount,
    TogglePlay,
    ToggleMetronomePanel,
    IncreaseBpm,
    DecreaseBpm,
    SetTimeSignature(TimeSignature),
    CycleSound,
    SelectLesson(usize),
    Quit,
}

impl Action {
    /// Keyboard binding. Digits, `+`/`-` and `s` act on the metronome only
    /// while its panel is open; `S` always toggles the shape view.
    pub fn from_key(key: &str, metronome_panel: bool) -> Option<Action> {
        let action = match key {
            "q" | "ctrl+c" => Action::Quit,
            "f" => Action::ToggleFretCount,
            "tab" => Action::ToggleNotes,
            "h" | "H" => Action::ToggleFingers,
            "u" | "U" => Action::ToggleUpcoming,
            " " => Action::TogglePlay,
            "m" | "M" => Action::ToggleMetronomePanel,
            "S" => Action::ToggleShape,
            "s" if metronome_panel => Action::CycleSound,
            "s" => Action::ToggleShape,
            "+" | "=" if metronome_panel => Action::IncreaseBpm,
            "-" | "_" if metronome_panel => Action::DecreaseBpm,
            "1" if metronome_panel => Action::SetTimeSignature(TimeSignature::FourFour),
            "2" if metronome_panel => Action::SetTimeSignature(TimeSignature::ThreeFour),
            "3" if metronome_panel => Action::SetTimeSignature(TimeSignature::SixEight),
            "4" if metronome_panel => Action::SetTimeSignature(TimeSignature::TwoFour),
            _ => return None,
        };
        Some(action)
    }
}

/// State of one practice run
#[derive(Debug, Clone)]
pub struct PracticeSession {
    lessons: Vec<Lesson>,
    selected: Option<usize>,
    /// 1-based beat within the selected lesson
    current_beat: u32,
    playing: bool,
    mode: DisplayMode,
    fret_count: u32,
    lookahead: usize,
    tuning: Tuning,
    metronome: MetronomeConfig,
    metronome_panel: bool,
    quit: bool,
}

impl PracticeSession {
    pub fn new(lessons: Vec<Lesson>, config: &PracticeConfig) -> Self {
        Self {
            lessons,
            selected: None,
            current_beat: 1,
            playing: false,
            mode: DisplayMode::default(),
            fret_count: config.fret_count,
            lookahead: config.lookahead,
            tuning: config.load_options().tuning,
            metronome: config.metronome,
            metronome_panel: false,
            quit: false,
        }
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.selected.and_then(|index| self.lessons.get(index))
    }

    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }

    pub fn total_beats(&self) -> u32 {
        self.current_lesson().map_or(0, Lesson::total_beats)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn fret_count(&self) -> u32 {
        self.fret_count
    }

    pub fn metronome(&self) -> &MetronomeConfig {
        &self.metronome
    }

    pub fn metronome_panel_open(&self) -> bool {
        self.metronome_panel
    }

    /// Apply a key press; unbound keys do nothing
    pub fn handle_key(&mut self, key: &str) -> Vec<ClockCommand> {
        match Action::from_key(key, self.metronome_panel) {
            Some(action) => self.apply(action),
            None => Vec::new(),
        }
    }

    pub fn apply(&mut self, action: Action) -> Vec<ClockCommand> {
        let mut commands = Vec::new();

        match action {
            Action::ToggleNotes => self.mode.toggle_notes(),
            Action::ToggleFingers => self.mode.toggle_fingers(),
            Action::ToggleShape => self.mode.toggle_shape(),
            Action::ToggleUpcoming => self.mode.toggle_upcoming(),
            Action::ToggleFretCount => {
                self.fret_count = if self.fret_count == 12 { 24 } else { 12 };
            }
            Action::TogglePlay => {
                self.playing = !self.playing;
                commands.push(if self.playing {
                    ClockCommand::Play
                } else {
                    ClockCommand::Pause
                });
            }
            Action::ToggleMetronomePanel => self.metronome_panel = !self.metronome_panel,
            Action::IncreaseBpm | Action::DecreaseBpm => {
                let delta = if action == Action::IncreaseBpm {
                    BPM_STEP
                } else {
                    -BPM_STEP
                };
                self.metronome.tempo = self.metronome.tempo.offset(delta);
                commands.push(ClockCommand::SetBpm(self.metronome.tempo.bpm()));
            }
            Action::SetTimeSignature(time_signature) => {
                self.metronome.time_signature = time_signature;
                commands.push(ClockCommand::SetTimeSignature(time_signature));
            }
            Action::CycleSound => {
                self.metronome.sound_type = self.metronome.sound_type.next();
                commands.push(ClockCommand::SetSoundType(self.metronome.sound_type));
            }
            Action::SelectLesson(index) => commands.extend(self.select_lesson(index)),
            Action::Quit => self.quit = true,
        }

        commands
    }

    /// Select a lesson: restart at beat 1 and take over its tempo.
    /// Playback is not started.
    pub fn select_lesson(&mut self, index: usize) -> Option<ClockCommand> {
        let Some(lesson) = self.lessons.get(index) else {
            log::warn!("No lesson at index {}", index);
            return None;
        };

        log::info!("Selected lesson: {}", lesson);
        let bpm = lesson.bpm;
        self.selected = Some(index);
        self.current_beat = 1;

        if bpm > 0 {
            self.metronome.tempo = bpm.into();
            return Some(ClockCommand::SetBpm(self.metronome.tempo.bpm()));
        }
        None
    }

    /// Advance one beat while playing a non-empty lesson. Returns whether the
    /// beat moved.
    pub fn on_tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        let total_beats = self.total_beats();
        if total_beats == 0 {
            return false;
        }
        self.current_beat = next_beat(self.current_beat, total_beats);
        true
    }

    /// Metronome beats drive the lesson the same way as ticks
    pub fn on_metronome_beat(&mut self, _event: BeatEvent) -> bool {
        self.on_tick()
    }

    /// Views for the current frame
    pub fn view(&self) -> FretboardView<'_> {
        FretboardView::build(
            self.current_lesson(),
            self.current_beat,
            self.mode,
            self.tuning,
            self.fret_count,
            self.lookahead,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::{Marker, Step};
    use crate::sequencer::tempo::SoundType;

    fn session() -> PracticeSession {
        let tuning = Tuning::STANDARD;
        let steps = (1..=4)
            .map(|beat| Step::new(beat, vec![Marker::new(0, 4 + beat as i32, 1, &tuning)]))
            .collect();
        let lessons = vec![
            Lesson::new("Four", "scales", "A", 90, steps, &tuning),
            Lesson::new("Empty", "scales", "C", 100, Vec::new(), &tuning),
        ];
        PracticeSession::new(lessons, &PracticeConfig::default())
    }

    #[test]
    fn test_select_lesson_sets_tempo_and_resets_beat() {
        let mut s = session();
        let commands = s.apply(Action::SelectLesson(0));
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], ClockCommand::SetBpm(90)));
        assert_eq!(s.current_beat(), 1);
        assert!(!s.is_playing());
        assert!(s.apply(Action::SelectLesson(7)).is_empty());
        assert_eq!(s.current_lesson().map(|l| l.title.as_str()), Some("Four"));
    }

    #[test]
    fn test_ticks_advance_only_while_playing() {
        let mut s = session();
        s.select_lesson(0);
        assert!(!s.on_tick());
        assert_eq!(s.current_beat(), 1);

        let commands = s.apply(Action::TogglePlay);
        assert!(matches!(commands.as_slice(), [ClockCommand::Play]));
        for _ in 0..3 {
            s.on_tick();
        }
        assert_eq!(s.current_beat(), 4);
        s.on_metronome_beat(BeatEvent {
            position: 0,
            accent: true,
        });
        assert_eq!(s.current_beat(), 1);

        assert!(matches!(s.apply(Action::TogglePlay).as_slice(), [ClockCommand::Pause]));
    }

    #[test]
    fn test_empty_lesson_never_advances() {
        let mut s = session();
        s.select_lesson(1);
        s.apply(Action::TogglePlay);
        assert!(!s.on_tick());
        assert_eq!(s.current_beat(), 1);
        assert!(s.view().active.is_empty());
    }

    #[test]
    fn test_metronome_settings() {
        let mut s = session();
        s.select_lesson(0);
        s.apply(Action::IncreaseBpm);
        assert_eq!(s.metronome().tempo.bpm(), 95);
        for _ in 0..20 {
            s.apply(Action::DecreaseBpm);
        }
        assert_eq!(s.metronome().tempo.bpm(), 40);

        s.apply(Action::CycleSound);
        assert_eq!(s.metronome().sound_type, SoundType::Mechanical);
        s.apply(Action::SetTimeSignature(TimeSignature::SixEight));
        assert_eq!(s.metronome().time_signature, TimeSignature::SixEight);
    }

    #[test]
    fn test_key_bindings_depend_on_panel() {
        let mut s = session();
        s.handle_key("s");
        assert!(s.mode().shows_shape());
        assert!(s.handle_key("+").is_empty());

        s.handle_key("m");
        assert!(s.metronome_panel_open());
        assert!(matches!(
            s.handle_key("s").as_slice(),
            [ClockCommand::SetSoundType(SoundType::Mechanical)]
        ));
        assert!(matches!(
            s.handle_key("2").as_slice(),
            [ClockCommand::SetTimeSignature(TimeSignature::ThreeFour)]
        ));

        // Uppercase S still toggles the shape view
        s.handle_key("S");
        assert!(!s.mode().shows_shape());

        s.handle_key("f");
        assert_eq!(s.fret_count(), 24);
        s.handle_key("f");
        assert_eq!(s.fret_count(), 12);

        s.handle_key("q");
        assert!(s.should_quit());
    }
}
