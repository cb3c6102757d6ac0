use crate::board::Cue;
use crate::hardware::Rgb;
use crate::input::Wait;
use crate::light::LightMode;
use crate::util::{progress_bar, BAR_WIDTH};

use super::pause::{PauseController, Resume};
use super::{Outcome, SessionRunner, WorkoutConfig, TICK};

impl SessionRunner<'_> {
    /// One set of exercise, followed by its rest unless it was the last set.
    ///
    /// The elapsed counter only moves after a full, uninterrupted tick; time
    /// spent paused or in a tick cut short by the stop button never counts.
    pub fn run_set(&mut self, set: u32, workout: &WorkoutConfig) -> Outcome {
        let total = workout.exercise_secs;
        let mut pause = PauseController::new(workout.mode, &self.timing, self.board.now());
        let mut last_motion: Option<bool> = None;
        let mut elapsed = 0;

        self.board.play_music();
        self.board.set_light(LightMode::Exercise);

        while elapsed < total {
            let motion = self.sampler.sample(self.board);
            log::debug!("set {set} tick {elapsed}: motion={motion}");

            if last_motion.is_some_and(|last| last != motion) {
                self.board.cue(Cue::StateChange);
            }
            last_motion = Some(motion);

            if let Some(reason) = pause.check(motion, self.board.now()) {
                let resume =
                    pause.pause(self.board, &self.sampler, &self.stop, &self.timing, reason);
                if resume == Resume::Stopped {
                    return Outcome::Aborted;
                }
                last_motion = None;
            }
            pause.observe(motion, self.board.now());

            let status = if motion { "MOVE" } else { "STAY" };
            let text = format!(
                "Set {set}/{} {status}\n{} {}s",
                workout.total_sets,
                progress_bar(elapsed, total, BAR_WIDTH),
                total - elapsed
            );
            self.board.show(Rgb::GREEN, &text);

            if self.wait(TICK) == Wait::Stopped {
                return self.stopped();
            }
            elapsed += 1;
        }

        self.board.stop_music();
        self.board.cue(Cue::Alert);

        if set < workout.total_sets {
            self.run_rest(set, workout)
        } else {
            Outcome::Completed
        }
    }
}
