//! Integration tests for lesson loading from disk
//!
//! JSON lesson files and tab directories written to a temp dir, loaded
//! through the same entry point the practice runner uses.

use fretboard_trainer::lesson::{
    LessonError, LoadOptions, load_lessons_from_sources, load_tab_directory, load_tab_file,
};
use fretboard_trainer::theory::Note;
use std::fs;
use tempfile::TempDir;

const LESSONS_JSON: &str = r#"[
    {
        "title": "E minor pentatonic",
        "category": "scales",
        "key": "E",
        "bpm": 70,
        "steps": [
            {"beat": 1, "markers": [{"string": 0, "fret": 0}]},
            {"beat": 2, "markers": [{"string": 0, "fret": 3, "finger": 3}]},
            {"beat": 3, "markers": [{"string": 1, "fret": 0, "technique": "vibrato"}]}
        ]
    },
    {
        "title": "Rest only",
        "key": "G",
        "steps": []
    }
]"#;

const BOX_TAB: &str = "\
TITLE: A minor box
KEY: A
BPM: 90
e|--5--|--8--|
";

fn lesson_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("lessons.json"), LESSONS_JSON).expect("write json");

    let tabs = dir.path().join("tabs");
    fs::create_dir(&tabs).expect("create tab dir");
    fs::write(tabs.join("b_box.tab"), BOX_TAB).expect("write tab");
    fs::write(tabs.join("a_untitled.txt"), "E|--3--|\n").expect("write tab");
    fs::write(tabs.join("notes.md"), "not a tab").expect("write md");
    // Not valid UTF-8, fails to read and is skipped
    fs::write(tabs.join("c_broken.tab"), [0xff, 0xfe, 0xfd]).expect("write broken tab");
    dir
}

#[test]
fn test_load_both_sources() {
    let dir = lesson_dir();
    let json = dir.path().join("lessons.json");
    let tabs = dir.path().join("tabs");
    let lessons = load_lessons_from_sources(
        Some(json.as_path()),
        Some(tabs.as_path()),
        &LoadOptions::default(),
    )
    .expect("lessons load");

    let titles: Vec<&str> = lessons.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["E minor pentatonic", "Rest only", "a_untitled", "A minor box"]
    );

    let json_lesson = &lessons[0];
    assert_eq!(json_lesson.bpm, 70);
    assert_eq!(json_lesson.actual_key, Note::E);
    assert_eq!(json_lesson.steps[1].markers[0].note, Some(Note::G));

    // Defaults fill in missing fields
    assert_eq!(lessons[1].bpm, 120);
    assert!(lessons[1].is_empty());

    assert_eq!(lessons[3].bpm, 90);
    assert_eq!(lessons[3].actual_key, Note::A);
}

#[test]
fn test_tab_directory_is_sorted_and_filtered() {
    let dir = lesson_dir();
    let lessons =
        load_tab_directory(dir.path().join("tabs"), &LoadOptions::default()).expect("tab dir");
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0].title, "a_untitled");
    assert_eq!(lessons[0].steps[0].markers[0].note, Some(Note::G));
}

#[test]
fn test_missing_tab_directory_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result = load_tab_directory(dir.path().join("nowhere"), &LoadOptions::default());
    assert!(matches!(result, Err(LessonError::Directory(_))));
}

#[cfg(unix)]
#[test]
fn test_dangling_entry_is_skipped() {
    let dir = lesson_dir();
    let tabs = dir.path().join("tabs");
    std::os::unix::fs::symlink(tabs.join("gone.tab"), tabs.join("b_dangling.tab"))
        .expect("create symlink");
    std::os::unix::fs::symlink(tabs.join("b_box.tab"), tabs.join("d_linked.tab"))
        .expect("create symlink");

    let lessons = load_tab_directory(&tabs, &LoadOptions::default()).expect("tab dir");
    let titles: Vec<&str> = lessons.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["a_untitled", "A minor box", "A minor box"]);
}

#[test]
fn test_missing_json_keeps_tab_lessons() {
    let dir = lesson_dir();
    let json = dir.path().join("missing.json");
    let tabs = dir.path().join("tabs");
    let lessons = load_lessons_from_sources(
        Some(json.as_path()),
        Some(tabs.as_path()),
        &LoadOptions::default(),
    )
    .expect("tab lessons still load");
    assert_eq!(lessons.len(), 2);
}

#[test]
fn test_no_lessons_anywhere() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let json = dir.path().join("missing.json");
    let result = load_lessons_from_sources(
        Some(json.as_path()),
        Some(dir.path()),
        &LoadOptions::default(),
    );
    assert!(matches!(result, Err(LessonError::NoLessons)));

    let result = load_lessons_from_sources(None, None, &LoadOptions::default());
    assert!(matches!(result, Err(LessonError::NoLessons)));
}

#[test]
fn test_strict_mode_rejects_unknown_key() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("odd_key.tab");
    fs::write(&path, "KEY: H\ne|--5--|\n").expect("write tab");

    let lenient = load_tab_file(&path, &LoadOptions::default()).expect("lenient load");
    assert_eq!(lenient.actual_key, Note::C);
    assert_eq!(lenient.title, "odd_key");

    let strict = load_tab_file(&path, &LoadOptions::strict());
    assert!(matches!(strict, Err(LessonError::UnknownNoteName { .. })));
}
