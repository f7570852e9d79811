use fretboard_trainer::lesson::load_lessons_from_sources;
use fretboard_trainer::sequencer::{Action, FretboardView, PositionKey};
use fretboard_trainer::{AudioOutput, MetronomeClock, PracticeConfig, PracticeSession};
use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

// Frame period of the practice loop; beat events are picked up at this rate
const FRAME_INTERVAL: Duration = Duration::from_millis(10);

fn load_config() -> PracticeConfig {
    let Some(path) = PracticeConfig::default_path() else {
        log::info!("No config directory on this platform, using defaults");
        return PracticeConfig::default();
    };
    match PracticeConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring config {}: {}", path.display(), e);
            PracticeConfig::default()
        }
    }
}

/// Forward stdin lines to the practice loop
fn spawn_input_thread() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_frame(view: &FretboardView<'_>, total_beats: u32) {
    let active: Vec<String> = view
        .active
        .iter()
        .map(|item| {
            let marker = item.marker;
            let mut text = format!(
                "s{}f{}:{}",
                marker.string_index + 1,
                marker.fret_label(),
                view.active_label(item)
            );
            if let Some(symbol) = marker.picking.symbol() {
                text.push_str(&format!(" [{}]", symbol));
            }
            text
        })
        .collect();

    let mut upcoming: Vec<(&PositionKey, usize)> = view
        .upcoming
        .iter()
        .filter(|(key, _)| view.is_visible(key))
        .map(|(key, item)| (key, item.distance))
        .collect();
    upcoming.sort_by_key(|(key, distance)| (*distance, **key));
    let upcoming: Vec<String> = upcoming
        .iter()
        .map(|(key, distance)| format!("+{} s{}f{}", distance, key.string_index + 1, key.fret))
        .collect();

    println!(
        "Beat {:>3}/{:<3} | {} | {}",
        view.current_beat,
        total_beats,
        if active.is_empty() {
            "rest".to_string()
        } else {
            active.join("  ")
        },
        upcoming.join("  ")
    );
}

fn main() {
    env_logger::init();

    println!("=== Fretboard Trainer ===");

    let config = load_config();

    let lessons = match load_lessons_from_sources(
        Some(config.lessons_json.as_path()),
        Some(config.tab_dir.as_path()),
        &config.load_options(),
    ) {
        Ok(lessons) => lessons,
        Err(e) => {
            log::error!("{}", e);
            Vec::new()
        }
    };

    for (i, lesson) in lessons.iter().enumerate() {
        println!("{:>2}. {}", i + 1, lesson);
    }

    let output = match AudioOutput::open() {
        Ok(output) => output,
        Err(e) => {
            log::error!("Audio initialisation failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut clock = MetronomeClock::with_output(config.metronome, output);
    let mut session = PracticeSession::new(lessons, &config);

    if !session.lessons().is_empty() {
        for command in session.apply(Action::SelectLesson(0)) {
            clock.send(command);
        }
    }

    println!("Enter a lesson number to select it, an empty line to play/pause, q to quit.");
    println!("Keys: tab notes, h fingers, s shape, u upcoming, f frets, m metronome panel");

    let input = spawn_input_thread();

    while !session.should_quit() {
        match input.recv_timeout(FRAME_INTERVAL) {
            Ok(line) => {
                let line = line.trim();
                // Digits are time signatures while the metronome panel is open
                let commands = match line.parse::<usize>() {
                    _ if line.is_empty() => session.apply(Action::TogglePlay),
                    Ok(number) if number > 0 && !session.metronome_panel_open() => {
                        session.apply(Action::SelectLesson(number - 1))
                    }
                    _ => session.handle_key(line),
                };
                for command in commands {
                    clock.send(command);
                }
                print_frame(&session.view(), session.total_beats());
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        while let Some(event) = clock.poll_beat() {
            if session.on_metronome_beat(event) {
                print_frame(&session.view(), session.total_beats());
            }
        }
    }

    clock.close();
    println!("Bye");
}
