// Drives Menu::run end to end with scripted button presses.

use std::fs;
use std::time::Duration;

use chrono::NaiveDateTime;
use movestay::{
    board::Board,
    config::{Config, WorkoutDefaults},
    hardware::mock::{RecordingLcd, ScriptedPins},
    menu::{Menu, MenuStep},
    records::{History, RecordLog},
    runtime::ManualClock,
    session::Mode,
};
use tempfile::tempdir;

const PIR: u8 = 8;
const B1: u8 = 22;
const B2: u8 = 23;
const B4: u8 = 25;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn noon() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-10-19 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn scripted_menu(config: Config, dir: &std::path::Path) -> (ScriptedPins, RecordingLcd, Menu) {
    let clock = ManualClock::new();
    let pins = ScriptedPins::new(clock.clone());
    let lcd = RecordingLcd::new();
    let board = Board::default()
        .with_clock(clock)
        .with_pins(pins.clone())
        .with_lcd(lcd.clone());
    let history = History::in_dir(dir, config.level);
    let menu = Menu::new(board, config, history).with_calendar(noon);
    (pins, lcd, menu)
}

#[test]
fn full_workout_from_the_menu_is_logged() {
    let dir = tempdir().unwrap();
    let config = Config {
        workout: WorkoutDefaults {
            mode: Mode::Move,
            exercise_secs: 3,
            rest_secs: 2,
            sets: 2,
            ..WorkoutDefaults::default()
        },
        ..Config::default()
    };
    let (pins, lcd, mut menu) = scripted_menu(config, dir.path());

    pins.constant(PIR, true);
    // six taps on "next": five steps, then past the last one to start
    pins.script(B2, |t| {
        let at = t.as_millis();
        Ok(at < 3000 && at % 500 < 100)
    });
    // dismiss the completion screen, then hold back to quit
    pins.high_between(B1, ms(20_000), ms(20_100));
    pins.high_after(B4, ms(25_000));

    menu.run();

    assert_eq!(menu.context().step, MenuStep::Mode);
    assert_eq!(lcd.count_starting_with("PAUSED"), 0);
    assert_eq!(lcd.count_starting_with("Complete!"), 1);
    assert!(lcd.texts().contains(&"Back to Menu".to_string()));
    assert_eq!(lcd.last_text().as_deref(), Some("Goodbye!"));

    let records = RecordLog::new(dir.path().join("workout_log.csv"))
        .load(&Default::default())
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].total_secs, 6);
    assert_eq!(records[0].sets, 2);
    assert_eq!(records[0].level, "Lv 0");

    let total = fs::read_to_string(dir.path().join("total_time.txt")).unwrap();
    assert_eq!(total, "6");
}

#[test]
fn holding_stop_at_the_menu_quits_without_writing() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("workout_log.csv");
    let existing = "timestamp,exercise_secs,sets,total_secs,level\n\
                    2026-10-01 08:00:00,30,3,90,Lv 0\n";
    fs::write(&log, existing).unwrap();

    let (pins, lcd, mut menu) = scripted_menu(Config::default(), dir.path());
    pins.constant(B4, true);

    menu.run();

    assert_eq!(lcd.last_text().as_deref(), Some("Goodbye!"));
    assert_eq!(fs::read_to_string(&log).unwrap(), existing);
    assert!(!dir.path().join("total_time.txt").exists());
}
