//! The exercise session state machine.
//!
//! [`SessionRunner::run`] sequences the sets of one workout. Each set is a
//! one-tick-per-second loop gated by the PIR sensor ([`exercise`]); sets are
//! separated by rest countdowns ([`rest`]). The stop button aborts from any
//! wait, and the abort travels back up as a plain [`Outcome::Aborted`].

mod exercise;
pub mod pause;
mod rest;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::board::{Board, Cue};
use crate::config::{PinMap, Timing};
use crate::error::WorkoutError;
use crate::hardware::Rgb;
use crate::input::{InputSource, StopSignal, Wait};
use crate::light::LightMode;
use crate::motion::MotionSampler;

pub const TICK: Duration = Duration::from_secs(1);

/// What the PIR sensor must report for the timer to keep running
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Mode {
    /// Keep moving; no motion pauses the timer
    #[default]
    Move,
    /// Hold still; motion pauses the timer
    Stay,
}

impl Mode {
    /// Motion value that counts as the valid state
    pub fn required_motion(self) -> bool {
        matches!(self, Mode::Move)
    }
}

/// One configured workout, read-only for the duration of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutConfig {
    mode: Mode,
    exercise_secs: u32,
    rest_secs: u32,
    total_sets: u32,
}

impl WorkoutConfig {
    pub fn new(
        mode: Mode,
        exercise_secs: u32,
        rest_secs: u32,
        total_sets: u32,
    ) -> Result<Self, WorkoutError> {
        if exercise_secs == 0 {
            return Err(WorkoutError::NoExerciseTime);
        }
        if total_sets == 0 {
            return Err(WorkoutError::NoSets);
        }
        Ok(Self {
            mode,
            exercise_secs,
            rest_secs,
            total_sets,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn exercise_secs(&self) -> u32 {
        self.exercise_secs
    }

    pub fn rest_secs(&self) -> u32 {
        self.rest_secs
    }

    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Outcome {
    Completed,
    Aborted,
}

/// Drives one workout on a board
pub struct SessionRunner<'a> {
    board: &'a mut Board,
    timing: Timing,
    sampler: MotionSampler,
    stop: StopSignal,
    input: InputSource,
}

impl<'a> SessionRunner<'a> {
    pub fn new(board: &'a mut Board, pins: &PinMap, timing: &Timing) -> Self {
        Self {
            board,
            timing: *timing,
            sampler: MotionSampler::new(pins, timing),
            stop: StopSignal::new(pins, timing),
            input: InputSource::new(*pins, timing),
        }
    }

    /// Run every set of `workout`.
    ///
    /// On completion the "Complete!" screen stays up until any button is
    /// pressed. Recording the workout is left to the caller.
    pub fn run(&mut self, workout: &WorkoutConfig) -> Outcome {
        log::info!(
            "session start: {} {}s x{} rest {}s",
            workout.mode,
            workout.exercise_secs,
            workout.total_sets,
            workout.rest_secs
        );

        // PIR needs a moment after the menu before its output is trustworthy
        self.board.sleep(Timing::ms(self.timing.pir_warmup_ms));

        self.board.cue(Cue::Start);
        if self.wait(Timing::ms(self.timing.preroll_ms)) == Wait::Stopped {
            return self.stopped();
        }

        for set in 1..=workout.total_sets {
            if self.run_set(set, workout) == Outcome::Aborted {
                log::info!("session aborted during set {set}/{}", workout.total_sets);
                self.board.set_light(LightMode::Off);
                return Outcome::Aborted;
            }
        }

        log::info!("session complete");
        self.board.set_light(LightMode::Complete);
        self.board.show(Rgb::MAGENTA, "Complete!\nPress any btn");
        self.input.wait_any_press(self.board);
        self.board.set_light(LightMode::Off);
        Outcome::Completed
    }

    fn wait(&mut self, duration: Duration) -> Wait {
        self.stop.wait(self.board, duration)
    }

    /// Stop seen: silence the music, say so, and report the abort
    fn stopped(&mut self) -> Outcome {
        show_stopped(self.board, &self.timing);
        Outcome::Aborted
    }
}

pub(crate) fn show_stopped(board: &mut Board, timing: &Timing) {
    board.stop_music();
    board.set_light(LightMode::Off);
    board.show(Rgb::RED, "Stopped\nReturning...");
    board.sleep(Timing::ms(timing.stopped_message_ms));
}
