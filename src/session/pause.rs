//! Motion-gated pausing.
//!
//! The pause timer is a sliding window: `last_valid` moves forward on every
//! tick where the sampled motion matches the mode, and the session pauses
//! once the wrong state has persisted for the mode's threshold.

use std::time::Duration;

use crate::board::{Board, Cue};
use crate::config::Timing;
use crate::hardware::Rgb;
use crate::input::StopSignal;
use crate::light::LightMode;
use crate::motion::MotionSampler;

use super::{show_stopped, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    NoMotion,
    MotionDetected,
}

impl std::fmt::Display for PauseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PauseReason::NoMotion => write!(f, "No Motion!"),
            PauseReason::MotionDetected => write!(f, "Motion Detect!"),
        }
    }
}

/// Snapshot of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseState {
    pub active: bool,
    pub reason: Option<PauseReason>,
    /// Motion value that must reappear before the session resumes
    pub required_motion: bool,
}

/// How a pause ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Resumed,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct PauseController {
    mode: Mode,
    threshold: Duration,
    resume_poll: Duration,
    last_valid: Duration,
    paused: Option<PauseReason>,
}

impl PauseController {
    pub fn new(mode: Mode, timing: &Timing, now: Duration) -> Self {
        Self {
            mode,
            threshold: timing.pause_after(mode),
            resume_poll: Timing::ms(timing.resume_poll_ms),
            last_valid: now,
            paused: None,
        }
    }

    pub fn state(&self) -> PauseState {
        PauseState {
            active: self.paused.is_some(),
            reason: self.paused,
            required_motion: self.mode.required_motion(),
        }
    }

    pub fn required_motion(&self) -> bool {
        self.mode.required_motion()
    }

    pub fn last_valid(&self) -> Duration {
        self.last_valid
    }

    /// Reason to pause now, if the wrong state has lasted long enough
    pub fn check(&self, motion: bool, now: Duration) -> Option<PauseReason> {
        let wrong_for = now.saturating_sub(self.last_valid);
        match self.mode {
            Mode::Move if !motion && wrong_for >= self.threshold => Some(PauseReason::NoMotion),
            Mode::Stay if motion && wrong_for >= self.threshold => {
                Some(PauseReason::MotionDetected)
            }
            _ => None,
        }
    }

    /// Slide the window forward if `motion` is the valid state
    pub fn observe(&mut self, motion: bool, now: Duration) {
        if motion == self.required_motion() {
            self.last_valid = now;
        }
    }

    /// Enter the paused state and block until resumed or stopped.
    ///
    /// Resuming needs the sensor to report the mode's required state again,
    /// not merely something different from what caused the pause.
    pub fn pause(
        &mut self,
        board: &mut Board,
        sampler: &MotionSampler,
        stop: &StopSignal,
        timing: &Timing,
        reason: PauseReason,
    ) -> Resume {
        log::info!("paused: {reason}");
        self.paused = Some(reason);
        board.set_light(LightMode::Pause);
        board.cue(Cue::Cancel);
        board.pause_music();
        board.show(Rgb::ORANGE, &format!("PAUSED\n{reason}"));

        let required = self.required_motion();
        loop {
            if stop.raised(board) {
                log::info!("stopped while paused");
                self.paused = None;
                show_stopped(board, timing);
                return Resume::Stopped;
            }
            if sampler.sample(board) == required {
                break;
            }
            board.sleep(self.resume_poll);
        }

        log::info!("resumed");
        self.paused = None;
        self.last_valid = board.now();
        board.cue(Cue::Ok);
        board.resume_music();
        board.set_light(LightMode::Exercise);
        Resume::Resumed
    }
}
