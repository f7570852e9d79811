// Practice configuration - RON file with defaults for every field

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::lesson::LoadOptions;
use crate::sequencer::tempo::MetronomeConfig;
use crate::sequencer::timeline::DEFAULT_LOOKAHEAD;
use crate::theory::Tuning;

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "fretboard_trainer";
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("RON error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// JSON lesson file
    pub lessons_json: PathBuf,
    /// Directory of .tab/.txt lessons
    pub tab_dir: PathBuf,
    /// Steps shown ahead of the current one
    pub lookahead: usize,
    /// 12 or 24
    pub fret_count: u32,
    /// Fail on unknown key and scale names instead of defaulting
    pub strict_names: bool,
    pub metronome: MetronomeConfig,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            lessons_json: PathBuf::from("lessons.json"),
            tab_dir: PathBuf::from("lessons_tab"),
            lookahead: DEFAULT_LOOKAHEAD,
            fret_count: 12,
            strict_names: false,
            metronome: MetronomeConfig::default(),
        }
    }
}

impl PracticeConfig {
    /// `<config dir>/fretboard_trainer/config.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let mut config: PracticeConfig = ron::from_str(text)?;
        if config.fret_count != 12 && config.fret_count != 24 {
            log::warn!("Unsupported fret count {}, using 12", config.fret_count);
            config.fret_count = 12;
        }
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Defaults when the file does not exist; other failures are errors
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            tuning: Tuning::STANDARD,
            strict_names: self.strict_names,
        }
    }
}
