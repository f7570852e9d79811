// Lesson module - Lesson model, tab parsing, generation and loading

pub mod generator;
pub mod loader;
pub mod model;
pub mod tab_parser;

pub use generator::{
    Direction, GeneratorConfig, generate_box_lesson, generate_box_steps, generate_lesson,
    generate_steps,
};
pub use loader::{
    LessonError, LoadOptions, load_json_lessons, load_lessons_from_sources, load_tab_directory,
    load_tab_file,
};
pub use model::{
    Lesson, MUTED_FRET, Marker, Picking, SlideDirection, Step, Technique, TechniqueParams,
    VibratoWidth,
};
pub use tab_parser::{TabParser, parse_cell, parse_tab};
