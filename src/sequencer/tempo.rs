// Tempo - Metronome tempo, meter and sound settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Tempo in beats per minute, clamped to the practice range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Tempo {
    bpm: u32,
}

impl Tempo {
    pub const MIN_BPM: u32 = 40;
    pub const MAX_BPM: u32 = 240;

    /// Out-of-range values are clamped, never rejected
    pub fn new(bpm: u32) -> Self {
        Self {
            bpm: bpm.clamp(Self::MIN_BPM, Self::MAX_BPM),
        }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Tempo moved by `delta` BPM, clamped
    pub fn offset(&self, delta: i32) -> Self {
        Self::new(self.bpm.saturating_add_signed(delta))
    }

    /// Duration of one beat (60000 ms / bpm)
    pub fn beat_duration(&self) -> Duration {
        Duration::from_secs(60) / self.bpm
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(120)
    }
}

impl From<u32> for Tempo {
    fn from(bpm: u32) -> Self {
        Self::new(bpm)
    }
}

impl From<Tempo> for u32 {
    fn from(tempo: Tempo) -> Self {
        tempo.bpm
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.bpm)
    }
}

/// Supported meters; only the accent cycle length depends on it.
/// Serialized as its "n/d" string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSignature {
    TwoFour,
    ThreeFour,
    #[default]
    FourFour,
    SixEight,
}

impl TimeSignature {
    pub const ALL: [TimeSignature; 4] = [
        TimeSignature::FourFour,
        TimeSignature::ThreeFour,
        TimeSignature::SixEight,
        TimeSignature::TwoFour,
    ];

    /// Number of clicks in one measure
    pub fn beats_per_measure(&self) -> u32 {
        match self {
            TimeSignature::TwoFour => 2,
            TimeSignature::ThreeFour => 3,
            TimeSignature::FourFour => 4,
            TimeSignature::SixEight => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSignature::TwoFour => "2/4",
            TimeSignature::ThreeFour => "3/4",
            TimeSignature::FourFour => "4/4",
            TimeSignature::SixEight => "6/8",
        }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSignature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSignature::ALL
            .into_iter()
            .find(|sig| sig.as_str() == s.trim())
            .ok_or_else(|| format!("Unsupported time signature: {}", s))
    }
}

impl TryFrom<String> for TimeSignature {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeSignature> for String {
    fn from(time_signature: TimeSignature) -> Self {
        time_signature.as_str().to_string()
    }
}

/// Synthesized click timbre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    #[default]
    Wood,
    Mechanical,
    Digital,
}

impl SoundType {
    pub const ALL: [SoundType; 3] = [SoundType::Wood, SoundType::Mechanical, SoundType::Digital];

    /// Cycle wood → mechanical → digital → wood
    pub fn next(&self) -> Self {
        match self {
            SoundType::Wood => SoundType::Mechanical,
            SoundType::Mechanical => SoundType::Digital,
            SoundType::Digital => SoundType::Wood,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundType::Wood => "wood",
            SoundType::Mechanical => "mechanical",
            SoundType::Digital => "digital",
        }
    }
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundType {
    type Err = String;

    /// Unknown names (including the legacy "click") map to wood
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SoundType::ALL
            .into_iter()
            .find(|sound| sound.as_str().eq_ignore_ascii_case(s.trim()))
            .unwrap_or_default())
    }
}

/// Click on the first beat of the measure vs the other beats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickType {
    Accent,
    Regular,
}

/// Metronome settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetronomeConfig {
    pub tempo: Tempo,
    pub time_signature: TimeSignature,
    pub accent_first: bool,
    /// 0-100
    pub volume: u8,
    pub sound_type: SoundType,
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            tempo: Tempo::default(),
            time_signature: TimeSignature::FourFour,
            accent_first: true,
            volume: 80,
            sound_type: SoundType::Wood,
        }
    }
}

impl MetronomeConfig {
    /// Click to play at a 0-based position within the measure
    pub fn click_for(&self, position: u32) -> ClickType {
        if self.accent_first && position == 0 {
            ClickType::Accent
        } else {
            ClickType::Regular
        }
    }

    /// Volume as a gain in [0, 1]
    pub fn gain(&self) -> f32 {
        self.volume.min(100) as f32 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo_clamp() {
        assert_eq!(Tempo::new(10).bpm(), 40);
        assert_eq!(Tempo::new(500).bpm(), 240);
        assert_eq!(Tempo::new(120).offset(5).bpm(), 125);
        assert_eq!(Tempo::new(42).offset(-5).bpm(), 40);
        assert_eq!(Tempo::new(238).offset(5).bpm(), 240);
    }

    #[test]
    fn test_beat_duration() {
        assert_eq!(Tempo::new(120).beat_duration(), Duration::from_millis(500));
        assert_eq!(Tempo::new(60).beat_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_time_signature() {
        assert_eq!(TimeSignature::SixEight.beats_per_measure(), 6);
        assert_eq!("3/4".parse::<TimeSignature>(), Ok(TimeSignature::ThreeFour));
        assert!("5/4".parse::<TimeSignature>().is_err());
        assert_eq!(TimeSignature::TwoFour.to_string(), "2/4");
    }

    #[test]
    fn test_sound_cycle() {
        let mut sound = SoundType::Wood;
        sound = sound.next();
        assert_eq!(sound, SoundType::Mechanical);
        sound = sound.next();
        assert_eq!(sound, SoundType::Digital);
        assert_eq!(sound.next(), SoundType::Wood);
        assert_eq!("click".parse::<SoundType>(), Ok(SoundType::Wood));
        assert_eq!("Digital".parse::<SoundType>(), Ok(SoundType::Digital));
    }

    #[test]
    fn test_click_for() {
        let mut config = MetronomeConfig::default();
        assert_eq!(config.click_for(0), ClickType::Accent);
        assert_eq!(config.click_for(1), ClickType::Regular);
        config.accent_first = false;
        assert_eq!(config.click_for(0), ClickType::Regular);
    }

    #[test]
    fn test_config_ron() {
        let text = "(tempo: 300, time_signature: \"6/8\", sound_type: digital)";
        let config: MetronomeConfig = ron::from_str(text).unwrap();
        assert_eq!(config.tempo.bpm(), 240);
        assert_eq!(config.time_signature, TimeSignature::SixEight);
        assert_eq!(config.sound_type, SoundType::Digital);
        assert!(config.accent_first);
        assert_eq!(config.volume, 80);

        let text = ron::to_string(&config).unwrap();
        assert!(text.contains("\"6/8\""));
        assert_eq!(ron::from_str::<MetronomeConfig>(&text).unwrap(), config);
    }
}
