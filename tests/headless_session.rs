// Headless session runs on a virtual clock with scripted pins.
// Every wait goes through ManualClock, so these finish instantly and the
// timings asserted below are exact virtual times.

use std::io;
use std::time::Duration;

use assert_matches::assert_matches;
use movestay::{
    board::Board,
    config::{PinMap, Timing},
    hardware::mock::{MusicCall, RecordingBuzzer, RecordingLcd, RecordingMusic, ScriptedPins},
    runtime::{Clock, ManualClock},
    session::{Mode, Outcome, SessionRunner, WorkoutConfig},
};

const PIR: u8 = 8;
const B1: u8 = 22;
const STOP: u8 = 25;

struct Rig {
    clock: ManualClock,
    pins: ScriptedPins,
    lcd: RecordingLcd,
    buzzer: RecordingBuzzer,
    music: RecordingMusic,
    board: Board,
}

impl Rig {
    fn new() -> Self {
        let clock = ManualClock::new();
        let pins = ScriptedPins::new(clock.clone());
        let lcd = RecordingLcd::new();
        let buzzer = RecordingBuzzer::new(clock.clone());
        let music = RecordingMusic::new();
        let board = Board::default()
            .with_clock(clock.clone())
            .with_pins(pins.clone())
            .with_lcd(lcd.clone())
            .with_buzzer(buzzer.clone())
            .with_music(music.clone());
        Self {
            clock,
            pins,
            lcd,
            buzzer,
            music,
            board,
        }
    }

    fn run(&mut self, workout: WorkoutConfig) -> Outcome {
        SessionRunner::new(&mut self.board, &PinMap::default(), &Timing::default()).run(&workout)
    }

    fn paused_screens(&self) -> usize {
        self.lcd.count_starting_with("PAUSED")
    }
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn two_sets_with_constant_motion_complete_without_pausing() {
    let mut rig = Rig::new();
    rig.pins.constant(PIR, true);
    rig.pins.high_after(B1, secs(60));

    let workout = WorkoutConfig::new(Mode::Move, 3, 2, 2).unwrap();
    assert_matches!(rig.run(workout), Outcome::Completed);

    assert_eq!(rig.paused_screens(), 0);
    assert_eq!(rig.lcd.count_starting_with("Set 1/2 MOVE"), 3);
    assert_eq!(rig.lcd.count_starting_with("Set 2/2 MOVE"), 3);
    assert_eq!(rig.lcd.count_starting_with("Rest 1/2"), 2);
    assert_eq!(rig.lcd.count_starting_with("Rest 2/2"), 0);
    assert_eq!(rig.lcd.last_text().as_deref(), Some("Complete!\nPress any btn"));

    // alert after each set, start cue before the session and after the rest
    assert_eq!(rig.buzzer.count(ms(400)), 2);
    assert_eq!(rig.buzzer.count(ms(120)), 4);
    assert_eq!(rig.buzzer.count(ms(50)), 0);
    assert_eq!(
        rig.music.calls(),
        vec![MusicCall::Play, MusicCall::Stop, MusicCall::Play, MusicCall::Stop]
    );
}

#[test]
fn countdown_reaches_one_second_remaining() {
    let mut rig = Rig::new();
    rig.pins.constant(PIR, true);
    rig.pins.high_after(B1, secs(60));

    rig.run(WorkoutConfig::new(Mode::Move, 3, 0, 1).unwrap());

    let set_screens: Vec<String> = rig
        .lcd
        .texts()
        .into_iter()
        .filter(|t| t.starts_with("Set"))
        .collect();
    assert_eq!(
        set_screens,
        vec![
            "Set 1/1 MOVE\n░░░░░░░░░░ 3s",
            "Set 1/1 MOVE\n███░░░░░░░ 2s",
            "Set 1/1 MOVE\n██████░░░░ 1s",
        ]
    );
}

#[test]
fn short_set_finishes_before_the_no_motion_threshold() {
    let mut rig = Rig::new();
    rig.pins.constant(PIR, false);
    rig.pins.high_after(B1, secs(60));

    let workout = WorkoutConfig::new(Mode::Move, 3, 2, 1).unwrap();
    assert_matches!(rig.run(workout), Outcome::Completed);

    assert_eq!(rig.paused_screens(), 0);
    assert_eq!(rig.lcd.count_starting_with("Set 1/1"), 3);
}

#[test]
fn stop_mid_tick_does_not_count_the_tick() {
    let mut rig = Rig::new();
    rig.pins.constant(PIR, true);
    // lands inside the third tick's wait
    rig.pins.high_after(STOP, ms(4750));

    let workout = WorkoutConfig::new(Mode::Move, 5, 2, 1).unwrap();
    assert_matches!(rig.run(workout), Outcome::Aborted);

    assert_eq!(rig.lcd.count_starting_with("Set 1/1"), 3);
    assert_eq!(rig.lcd.count_starting_with("Complete!"), 0);
    assert_eq!(rig.lcd.last_text().as_deref(), Some("Stopped\nReturning..."));
    assert_eq!(rig.music.calls(), vec![MusicCall::Play, MusicCall::Stop]);

    // stop seen on the next 100ms poll, then the stopped screen stays 1.5s
    let stopped_at = rig.clock.now() - ms(1500);
    assert!(stopped_at >= ms(4750) && stopped_at <= ms(4850));
}

#[test]
fn stop_during_preroll_aborts_before_any_set() {
    let mut rig = Rig::new();
    rig.pins.constant(PIR, true);
    rig.pins.high_after(STOP, ms(1000));

    let workout = WorkoutConfig::new(Mode::Move, 10, 5, 3).unwrap();
    assert_matches!(rig.run(workout), Outcome::Aborted);

    assert_eq!(rig.lcd.count_starting_with("Set"), 0);
    assert_eq!(rig.lcd.last_text().as_deref(), Some("Stopped\nReturning..."));
}

#[test]
fn stop_during_rest_aborts_remaining_sets() {
    let mut rig = Rig::new();
    rig.pins.constant(PIR, true);
    // set 1 ends around 5.7s; rest runs after that
    rig.pins.high_after(STOP, secs(7));

    let workout = WorkoutConfig::new(Mode::Move, 3, 10, 3).unwrap();
    assert_matches!(rig.run(workout), Outcome::Aborted);

    assert!(rig.lcd.count_starting_with("Rest 1/3") >= 1);
    assert_eq!(rig.lcd.count_starting_with("Set 2/3"), 0);
}

#[test]
fn missing_motion_pauses_then_resumes_and_freezes_the_clock() {
    let mut rig = Rig::new();
    // absent from 3s to 15s, present otherwise
    rig.pins
        .script(PIR, |t| Ok(t < Duration::from_secs(3) || t >= Duration::from_secs(15)));
    rig.pins.high_after(B1, secs(100));

    let workout = WorkoutConfig::new(Mode::Move, 10, 0, 1).unwrap();
    assert_matches!(rig.run(workout), Outcome::Completed);

    assert_eq!(rig.paused_screens(), 1);
    assert!(rig.lcd.texts().contains(&"PAUSED\nNo Motion!".to_string()));
    // one countdown screen per counted second, paused time excluded
    assert_eq!(rig.lcd.count_starting_with("Set 1/1"), 10);
    assert_eq!(rig.buzzer.count(ms(50)), 1);
    assert_eq!(
        rig.music.calls(),
        vec![
            MusicCall::Play,
            MusicCall::Pause,
            MusicCall::Resume,
            MusicCall::Stop
        ]
    );
}

#[test]
fn stay_mode_pauses_on_motion_until_stopped() {
    let mut rig = Rig::new();
    rig.pins.constant(PIR, true);
    rig.pins.high_after(STOP, secs(20));

    let workout = WorkoutConfig::new(Mode::Stay, 30, 10, 2).unwrap();
    assert_matches!(rig.run(workout), Outcome::Aborted);

    assert_eq!(rig.paused_screens(), 1);
    assert!(rig.lcd.texts().contains(&"PAUSED\nMotion Detect!".to_string()));
    // the pause fires on the tick where 8s of motion have accumulated
    assert_eq!(rig.lcd.count_starting_with("Set 1/2"), 6);
    assert!(rig.clock.now() >= secs(20));
}

#[test]
fn failing_pir_reads_as_no_motion() {
    let mut rig = Rig::new();
    rig.pins
        .script(PIR, |_| Err(io::Error::new(io::ErrorKind::Other, "bus error")));
    rig.pins.high_after(STOP, secs(20));

    let workout = WorkoutConfig::new(Mode::Move, 30, 10, 1).unwrap();
    assert_matches!(rig.run(workout), Outcome::Aborted);

    assert!(rig.lcd.texts().contains(&"PAUSED\nNo Motion!".to_string()));
    assert_eq!(rig.lcd.count_starting_with("Set 1/1 MOVE"), 0);
}

#[test]
fn single_glitch_in_the_pir_window_is_ignored() {
    let mut rig = Rig::new();
    // one positive read every third sample never reaches the 2-of-3 threshold
    let mut n = 0u32;
    rig.pins.script(PIR, move |_| {
        n += 1;
        Ok(n % 3 == 0)
    });
    rig.pins.high_after(B1, secs(60));

    let workout = WorkoutConfig::new(Mode::Stay, 5, 0, 1).unwrap();
    assert_matches!(rig.run(workout), Outcome::Completed);

    assert_eq!(rig.paused_screens(), 0);
    assert_eq!(rig.lcd.count_starting_with("Set 1/1 STAY"), 5);
    assert_eq!(rig.buzzer.count(ms(50)), 0);
}
