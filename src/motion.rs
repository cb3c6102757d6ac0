//! Noise-filtered PIR reads.

use std::time::Duration;

use crate::board::Board;
use crate::config::{PinMap, Timing};

/// Majority-style filter over a short window of raw PIR reads.
///
/// A failed read counts as "no motion" for that sample only, so a dead
/// sensor reports no motion forever instead of failing the session.
#[derive(Debug, Clone, Copy)]
pub struct MotionSampler {
    pin: u8,
    samples: u32,
    interval: Duration,
    threshold: u32,
}

impl MotionSampler {
    pub fn new(pins: &PinMap, timing: &Timing) -> Self {
        Self {
            pin: pins.pir,
            samples: timing.pir_samples,
            interval: Timing::ms(timing.pir_interval_ms),
            threshold: timing.pir_motion_threshold,
        }
    }

    /// Blocks for `samples × interval`
    pub fn sample(&self, board: &mut Board) -> bool {
        let mut positive = 0;
        for _ in 0..self.samples {
            match board.pins.read(self.pin) {
                Ok(true) => positive += 1,
                Ok(false) => {}
                Err(e) => log::debug!("PIR read failed, counting as absent: {e}"),
            }
            board.sleep(self.interval);
        }
        positive >= self.threshold
    }

    /// How long one call to [`sample`](Self::sample) blocks
    pub fn window(&self) -> Duration {
        self.interval * self.samples
    }
}
