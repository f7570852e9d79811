// Click - Pre-generated metronome click waveforms
// One short buffer per (sound type, click type), rendered once per sample rate

use std::f32::consts::PI;

use crate::sequencer::tempo::{ClickType, SoundType};

/// A click queued for the audio callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickRequest {
    pub click: ClickType,
    pub sound: SoundType,
    /// Linear gain in [0, 1]
    pub gain: f32,
}

/// Synthesis recipe for one click
#[derive(Debug, Clone, Copy)]
struct ClickShape {
    /// (frequency Hz, relative amplitude)
    partials: &'static [(f32, f32)],
    attack_ms: f32,
    decay_ms: f32,
    length_ms: f32,
    level: f32,
}

fn click_shape(sound: SoundType, click: ClickType) -> ClickShape {
    match (sound, click) {
        (SoundType::Wood, ClickType::Accent) => ClickShape {
            partials: &[(1800.0, 1.0), (3600.0, 0.3)],
            attack_ms: 2.0,
            decay_ms: 40.0,
            length_ms: 42.0,
            level: 1.0,
        },
        (SoundType::Wood, ClickType::Regular) => ClickShape {
            partials: &[(1400.0, 1.0), (2800.0, 0.3)],
            attack_ms: 1.0,
            decay_ms: 30.0,
            length_ms: 31.0,
            level: 1.0,
        },
        (SoundType::Mechanical, ClickType::Accent) => ClickShape {
            partials: &[(2400.0, 1.0)],
            attack_ms: 1.0,
            decay_ms: 15.0,
            length_ms: 15.0,
            level: 1.0,
        },
        (SoundType::Mechanical, ClickType::Regular) => ClickShape {
            partials: &[(2000.0, 1.0)],
            attack_ms: 1.0,
            decay_ms: 12.0,
            length_ms: 12.0,
            level: 1.0,
        },
        (SoundType::Digital, ClickType::Accent) => ClickShape {
            partials: &[(880.0, 1.0)],
            attack_ms: 5.0,
            decay_ms: 20.0,
            length_ms: 80.0,
            level: 0.6,
        },
        (SoundType::Digital, ClickType::Regular) => ClickShape {
            partials: &[(440.0, 1.0)],
            attack_ms: 5.0,
            decay_ms: 20.0,
            length_ms: 60.0,
            level: 0.6,
        },
    }
}

fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    (ms * sample_rate / 1000.0).round() as usize
}

/// Linear attack 0 → 1, linear decay 1 → 0, then silence
fn envelope(index: usize, attack: usize, decay: usize) -> f32 {
    if index < attack {
        index as f32 / attack as f32
    } else if index < attack + decay {
        1.0 - (index - attack) as f32 / decay as f32
    } else {
        0.0
    }
}

fn render(shape: &ClickShape, sample_rate: f32) -> Vec<f32> {
    let length = ms_to_samples(shape.length_ms, sample_rate);
    let attack = ms_to_samples(shape.attack_ms, sample_rate);
    let decay = ms_to_samples(shape.decay_ms, sample_rate);

    (0..length)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let tone: f32 = shape
                .partials
                .iter()
                .map(|(frequency, amplitude)| (2.0 * PI * frequency * t).sin() * amplitude)
                .sum();
            tone * envelope(i, attack, decay) * shape.level
        })
        .collect()
}

const fn slot(sound: SoundType, click: ClickType) -> usize {
    let sound_index = match sound {
        SoundType::Wood => 0,
        SoundType::Mechanical => 1,
        SoundType::Digital => 2,
    };
    let click_index = match click {
        ClickType::Accent => 0,
        ClickType::Regular => 1,
    };
    sound_index * 2 + click_index
}

/// All click buffers for one sample rate
#[derive(Debug, Clone)]
pub struct ClickBank {
    buffers: Vec<Vec<f32>>,
}

impl ClickBank {
    pub fn new(sample_rate: f32) -> Self {
        let mut buffers = vec![Vec::new(); SoundType::ALL.len() * 2];
        for sound in SoundType::ALL {
            for click in [ClickType::Accent, ClickType::Regular] {
                buffers[slot(sound, click)] = render(&click_shape(sound, click), sample_rate);
            }
        }
        Self { buffers }
    }

    pub fn get(&self, sound: SoundType, click: ClickType) -> &[f32] {
        &self.buffers[slot(sound, click)]
    }
}

#[derive(Debug, Clone, Copy)]
struct ClickPlayback {
    request: ClickRequest,
    position: usize,
}

/// Plays one click at a time; a new trigger replaces the ringing one
#[derive(Debug, Clone)]
pub struct ClickVoice {
    bank: ClickBank,
    current: Option<ClickPlayback>,
}

impl ClickVoice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            bank: ClickBank::new(sample_rate),
            current: None,
        }
    }

    pub fn trigger(&mut self, request: ClickRequest) {
        self.current = Some(ClickPlayback {
            request,
            position: 0,
        });
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Next mono sample, 0.0 when idle
    pub fn next_sample(&mut self) -> f32 {
        let Some(playback) = self.current.as_mut() else {
            return 0.0;
        };

        let request = playback.request;
        let samples = self.bank.get(request.sound, request.click);
        match samples.get(playback.position) {
            Some(sample) => {
                playback.position += 1;
                (sample * request.gain).clamp(-1.0, 1.0)
            }
            None => {
                self.current = None;
                0.0
            }
        }
    }

    pub fn process_buffer(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
