use crate::board::Cue;
use crate::hardware::Rgb;
use crate::input::Wait;
use crate::light::LightMode;
use crate::util::{progress_bar, BAR_WIDTH};

use super::{Outcome, SessionRunner, WorkoutConfig, TICK};

const REST_COLOR: Rgb = Rgb(0, 150, 255);

impl SessionRunner<'_> {
    /// Countdown between set `set` and the next one; no motion gating
    pub fn run_rest(&mut self, set: u32, workout: &WorkoutConfig) -> Outcome {
        let total = workout.rest_secs;
        self.board.set_light(LightMode::Rest);

        for t in 0..total {
            let text = format!(
                "Rest {set}/{}\n{} {}s",
                workout.total_sets,
                progress_bar(t, total, BAR_WIDTH),
                total - t
            );
            self.board.show(REST_COLOR, &text);

            if self.wait(TICK) == Wait::Stopped {
                return self.stopped();
            }
        }

        self.board.cue(Cue::Start);
        Outcome::Completed
    }
}
