// Lesson loader - JSON lesson files and tab directories

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::lesson::model::Lesson;
use crate::lesson::tab_parser::parse_tab;
use crate::theory::{Tuning, try_parse_note_name};

/// File extensions picked up when scanning a tab directory
pub const TAB_EXTENSIONS: [&str; 2] = ["tab", "txt"];

/// Lesson loading error types
#[derive(Debug, thiserror::Error)]
pub enum LessonError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Directory error: {0}")]
    Directory(#[from] walkdir::Error),

    #[error("No lessons found")]
    NoLessons,

    #[error("Unknown note name {name:?} in lesson {lesson:?}")]
    UnknownNoteName { lesson: String, name: String },

    #[error("Unknown scale: {0}")]
    UnknownScale(String),
}

/// Options for loading lessons
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Tuning used to derive marker notes
    pub tuning: Tuning,
    /// Reject unknown key names instead of defaulting to C
    pub strict_names: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            tuning: Tuning::STANDARD,
            strict_names: false,
        }
    }
}

impl LoadOptions {
    pub fn strict() -> Self {
        Self {
            strict_names: true,
            ..Self::default()
        }
    }

    /// Apply strict name checking to a freshly loaded lesson
    fn check(&self, lesson: &Lesson) -> Result<(), LessonError> {
        if self.strict_names && try_parse_note_name(&lesson.key).is_none() {
            return Err(LessonError::UnknownNoteName {
                lesson: lesson.title.clone(),
                name: lesson.key.clone(),
            });
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, LessonError> {
    fs::read_to_string(path).map_err(|source| LessonError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a JSON array of lessons
pub fn parse_json_lessons(
    text: &str,
    path: &Path,
    options: &LoadOptions,
) -> Result<Vec<Lesson>, LessonError> {
    let mut lessons: Vec<Lesson> =
        serde_json::from_str(text).map_err(|source| LessonError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    for lesson in &mut lessons {
        lesson.resolve(&options.tuning);
        options.check(lesson)?;
        if !lesson.is_ordered() {
            log::warn!("Lesson {:?} has steps out of beat order", lesson.title);
        }
    }

    Ok(lessons)
}

/// Load a JSON lesson file
pub fn load_json_lessons<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<Vec<Lesson>, LessonError> {
    let path = path.as_ref();
    let text = read_file(path)?;
    let lessons = parse_json_lessons(&text, path, options)?;
    log::info!("Loaded {} lessons from {}", lessons.len(), path.display());
    Ok(lessons)
}

/// Load a single tab file as one lesson
pub fn load_tab_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Lesson, LessonError> {
    let path = path.as_ref();
    let text = read_file(path)?;
    let mut lesson = parse_tab(&text, &options.tuning);
    if lesson.title.is_empty() {
        lesson.title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
    }
    options.check(&lesson)?;
    Ok(lesson)
}

fn is_tab_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TAB_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Load every tab file of a directory (non-recursive, sorted by file name).
///
/// Symlinks are followed. An entry or file that fails to load is logged and
/// skipped; only an unreadable directory is an error.
pub fn load_tab_directory<P: AsRef<Path>>(
    dir: P,
    options: &LoadOptions,
) -> Result<Vec<Lesson>, LessonError> {
    let dir = dir.as_ref();
    let mut lessons = Vec::new();

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_tab_file(entry.path()) {
            continue;
        }

        match load_tab_file(entry.path(), options) {
            Ok(lesson) => lessons.push(lesson),
            Err(e) => log::warn!("Skipping tab file {}: {}", entry.path().display(), e),
        }
    }

    log::info!("Loaded {} tab lessons from {}", lessons.len(), dir.display());
    Ok(lessons)
}

/// Load from a JSON file and a tab directory, concatenating what succeeds.
///
/// Fails with `NoLessons` only when both sources yield nothing.
pub fn load_lessons_from_sources(
    json_path: Option<&Path>,
    tab_dir: Option<&Path>,
    options: &LoadOptions,
) -> Result<Vec<Lesson>, LessonError> {
    let mut lessons = Vec::new();

    if let Some(path) = json_path {
        match load_json_lessons(path, options) {
            Ok(mut loaded) => lessons.append(&mut loaded),
            Err(e) => log::warn!("Could not load JSON lessons: {}", e),
        }
    }

    if let Some(dir) = tab_dir {
        match load_tab_directory(dir, options) {
            Ok(mut loaded) => lessons.append(&mut loaded),
            Err(e) => log::warn!("Could not load tab lessons: {}", e),
        }
    }

    if lessons.is_empty() {
        return Err(LessonError::NoLessons);
    }
    Ok(lessons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::Note;

    const JSON: &str = r#"[
        {
            "title": "A minor box",
            "category": "scales",
            "key": "A",
            "bpm": 0,
            "steps": [
                {"beat": 1, "markers": [{"string": 0, "fret": 5, "finger": 1}]},
                {"beat": 2, "markers": [{"string": 0, "fret": 8, "finger": 4, "duration": 2}]}
            ]
        }
    ]"#;

    #[test]
    fn test_parse_json_derives_notes() {
        let lessons = parse_json_lessons(JSON, Path::new("inline.json"), &LoadOptions::default())
            .unwrap();
        assert_eq!(lessons.len(), 1);
        let lesson = &lessons[0];
        assert_eq!(lesson.actual_key, Note::A);
        assert_eq!(lesson.bpm, 120);
        assert_eq!(lesson.steps[1].markers[0].note, Some(Note::C));
        assert_eq!(lesson.total_beats(), 2);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = parse_json_lessons("{not json", Path::new("bad.json"), &LoadOptions::default());
        assert!(matches!(result, Err(LessonError::Json { .. })));
    }

    #[test]
    fn test_strict_names() {
        let json = JSON.replace("\"A\"", "\"H\"");
        let path = Path::new("inline.json");

        let lenient = parse_json_lessons(&json, path, &LoadOptions::default()).unwrap();
        assert_eq!(lenient[0].actual_key, Note::C);

        let strict = parse_json_lessons(&json, path, &LoadOptions::strict());
        assert!(matches!(strict, Err(LessonError::UnknownNoteName { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = load_json_lessons("/nonexistent/lessons.json", &LoadOptions::default());
        assert!(matches!(result, Err(LessonError::Io { .. })));
    }

    #[test]
    fn test_tab_extension_filter() {
        assert!(is_tab_file(Path::new("a/box1.tab")));
        assert!(is_tab_file(Path::new("box1.TXT")));
        assert!(!is_tab_file(Path::new("lessons.json")));
        assert!(!is_tab_file(Path::new("README")));
    }
}
