//! Top-level configuration menu.
//!
//! All menu state lives in a [`MenuContext`]; button presses are dispatched
//! on the current [`MenuStep`]. Moving past the last step starts a workout and
//! lands back on the first step once it ends.

use chrono::{Local, NaiveDateTime};

use crate::board::{Board, Cue};
use crate::climate;
use crate::config::{Config, SavePolicy, Timing, WorkoutDefaults};
use crate::error::WorkoutError;
use crate::hardware::Rgb;
use crate::input::{Button, ButtonEvent, InputSource};
use crate::light::LightMode;
use crate::records::{History, WorkoutRecord};
use crate::session::{Mode, Outcome, SessionRunner, WorkoutConfig};

const SETS_COLOR: Rgb = Rgb(0, 255, 255);
const LEVEL_COLOR: Rgb = Rgb(200, 100, 255);
const NO_RECORDS_COLOR: Rgb = Rgb(255, 100, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum MenuStep {
    Mode,
    Exercise,
    Rest,
    Sets,
    Records,
    Level,
}

impl MenuStep {
    /// `None` past the last step
    pub fn next(self) -> Option<Self> {
        match self {
            MenuStep::Mode => Some(MenuStep::Exercise),
            MenuStep::Exercise => Some(MenuStep::Rest),
            MenuStep::Rest => Some(MenuStep::Sets),
            MenuStep::Sets => Some(MenuStep::Records),
            MenuStep::Records => Some(MenuStep::Level),
            MenuStep::Level => None,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            MenuStep::Mode | MenuStep::Exercise => MenuStep::Mode,
            MenuStep::Rest => MenuStep::Exercise,
            MenuStep::Sets => MenuStep::Rest,
            MenuStep::Records => MenuStep::Sets,
            MenuStep::Level => MenuStep::Records,
        }
    }
}

/// What the mode screen currently offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Selection {
    Move,
    Stay,
    Temp,
    Record,
    Level,
}

impl Selection {
    const ALL: [Selection; 5] = [
        Selection::Move,
        Selection::Stay,
        Selection::Temp,
        Selection::Record,
        Selection::Level,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn color(self) -> Rgb {
        match self {
            Selection::Move => Rgb(0, 255, 0),
            Selection::Stay => Rgb(0, 100, 255),
            Selection::Temp => Rgb(255, 0, 255),
            Selection::Record => Rgb(255, 165, 0),
            Selection::Level => Rgb(255, 255, 255),
        }
    }

    pub fn mode(self) -> Option<Mode> {
        match self {
            Selection::Move => Some(Mode::Move),
            Selection::Stay => Some(Mode::Stay),
            _ => None,
        }
    }
}

impl From<Mode> for Selection {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Move => Selection::Move,
            Mode::Stay => Selection::Stay,
        }
    }
}

/// The values being edited, plus where in the menu we are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuContext {
    pub step: MenuStep,
    pub selection: Selection,
    pub exercise_secs: u32,
    pub rest_secs: u32,
    pub sets: u32,
}

impl MenuContext {
    pub fn new(defaults: &WorkoutDefaults) -> Self {
        Self {
            step: MenuStep::Mode,
            selection: defaults.mode.into(),
            exercise_secs: defaults.exercise_secs,
            rest_secs: defaults.rest_secs,
            sets: defaults.sets,
        }
    }

    pub fn workout(&self) -> Result<WorkoutConfig, WorkoutError> {
        WorkoutConfig::new(
            self.selection.mode().unwrap_or_default(),
            self.exercise_secs,
            self.rest_secs,
            self.sets,
        )
    }
}

/// Paged view over the record log, newest first.
///
/// The log is read once on first use and kept until [`invalidate`] is called.
///
/// [`invalidate`]: RecordBrowser::invalidate
#[derive(Debug, Default)]
pub struct RecordBrowser {
    cache: Option<Vec<WorkoutRecord>>,
    index: usize,
}

impl RecordBrowser {
    pub fn invalidate(&mut self) {
        self.cache = None;
        self.index = 0;
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    pub fn load(&mut self, history: &History) {
        if self.cache.is_some() {
            return;
        }
        let mut records = history.records().unwrap_or_else(|e| {
            log::warn!("cannot read records: {e}");
            Vec::new()
        });
        records.reverse();
        self.index = self.index.min(records.len().saturating_sub(1));
        self.cache = Some(records);
    }

    fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, Vec::len)
    }

    pub fn next(&mut self) {
        if self.len() > 0 {
            self.index = (self.index + 1) % self.len();
        }
    }

    pub fn previous(&mut self) {
        if self.len() > 0 {
            self.index = (self.index + self.len() - 1) % self.len();
        }
    }

    pub fn current(&self) -> Option<&WorkoutRecord> {
        self.cache.as_ref()?.get(self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

pub struct Menu {
    board: Board,
    config: Config,
    history: History,
    input: InputSource,
    ctx: MenuContext,
    records: RecordBrowser,
    calendar: Box<dyn Fn() -> NaiveDateTime>,
}

impl Menu {
    pub fn new(board: Board, config: Config, history: History) -> Self {
        Self {
            input: InputSource::new(config.pins, &config.timing),
            ctx: MenuContext::new(&config.workout),
            records: RecordBrowser::default(),
            calendar: Box::new(|| Local::now().naive_local()),
            board,
            config,
            history,
        }
    }

    /// Wall-clock source for record timestamps and the level window
    pub fn with_calendar(mut self, calendar: impl Fn() -> NaiveDateTime + 'static) -> Self {
        self.calendar = Box::new(calendar);
        self
    }

    pub fn context(&self) -> &MenuContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut MenuContext {
        &mut self.ctx
    }

    pub fn records(&self) -> &RecordBrowser {
        &self.records
    }

    /// Poll the buttons until B4 is held long enough to quit
    pub fn run(&mut self) {
        log::info!("menu ready");
        let idle = Timing::ms(self.config.timing.idle_poll_ms);
        self.board.set_light(LightMode::Off);
        self.render();

        loop {
            match self.input.poll(&mut self.board) {
                Some(ButtonEvent::Quit) => {
                    self.quit();
                    return;
                }
                Some(ButtonEvent::Press(button)) => {
                    self.board.cue(Cue::Ok);
                    self.press(button);
                    self.input.settle(&mut self.board);
                }
                None => self.board.sleep(idle),
            }
        }
    }

    /// Apply one accepted press and redraw
    pub fn press(&mut self, button: Button) {
        log::debug!("{button} on {} ({})", self.ctx.step, self.ctx.selection);

        let on_climate = self.ctx.step == MenuStep::Mode && self.ctx.selection == Selection::Temp;
        if on_climate && button != Button::Previous {
            self.show_climate();
            return;
        }

        match button {
            Button::Increment => self.adjust(Direction::Up),
            Button::Decrement => self.adjust(Direction::Down),
            Button::Next => match self.ctx.step.next() {
                Some(step) => self.ctx.step = step,
                None => self.start_workout(),
            },
            Button::Previous if on_climate => self.ctx.selection = self.ctx.selection.next(),
            Button::Previous => self.ctx.step = self.ctx.step.previous(),
        }
        self.render();
    }

    fn adjust(&mut self, direction: Direction) {
        let limits = self.config.workout;
        let ctx = &mut self.ctx;

        match (ctx.step, direction) {
            (MenuStep::Mode, Direction::Up) => ctx.selection = ctx.selection.next(),
            (MenuStep::Mode, Direction::Down) => ctx.selection = ctx.selection.previous(),
            (MenuStep::Exercise, Direction::Up) => {
                ctx.exercise_secs = ctx.exercise_secs.saturating_add(limits.exercise_step)
            }
            (MenuStep::Exercise, Direction::Down) => {
                ctx.exercise_secs = ctx
                    .exercise_secs
                    .saturating_sub(limits.exercise_step)
                    .max(limits.exercise_min)
            }
            (MenuStep::Rest, Direction::Up) => {
                ctx.rest_secs = ctx.rest_secs.saturating_add(limits.rest_step)
            }
            (MenuStep::Rest, Direction::Down) => {
                ctx.rest_secs = ctx
                    .rest_secs
                    .saturating_sub(limits.rest_step)
                    .max(limits.rest_min)
            }
            (MenuStep::Sets, Direction::Up) => ctx.sets = ctx.sets.saturating_add(1),
            (MenuStep::Sets, Direction::Down) => {
                ctx.sets = ctx.sets.saturating_sub(1).max(limits.sets_min)
            }
            (MenuStep::Records, Direction::Up) => self.records.next(),
            (MenuStep::Records, Direction::Down) => self.records.previous(),
            (MenuStep::Level, _) => {}
        }
    }

    fn render(&mut self) {
        let ctx = self.ctx;
        match ctx.step {
            MenuStep::Mode => self
                .board
                .show(ctx.selection.color(), &ctx.selection.to_string()),
            MenuStep::Exercise => self
                .board
                .show(Rgb::WHITE, &format!("Exercise Time\n{}s", ctx.exercise_secs)),
            MenuStep::Rest => self
                .board
                .show(Rgb::WHITE, &format!("Rest Time\n{}s", ctx.rest_secs)),
            MenuStep::Sets => {
                let text = format!(
                    "M:{} Ex:{} R:{}\nSets:{} (Press>)",
                    ctx.selection.index() + 1,
                    ctx.exercise_secs,
                    ctx.rest_secs,
                    ctx.sets
                );
                self.board.show(SETS_COLOR, &text)
            }
            MenuStep::Records => self.show_record_page(),
            MenuStep::Level => self.show_level(),
        }
    }

    fn show_record_page(&mut self) {
        self.records.load(&self.history);
        match self.records.current() {
            Some(record) => {
                let text = format!(
                    "{} {}x{}\n{}s {}",
                    record.date(),
                    record.exercise_secs,
                    record.sets,
                    record.total_secs,
                    record.level
                );
                self.board.show(Rgb::ORANGE, &text);
            }
            None => self.board.show(NO_RECORDS_COLOR, "NO RECORDS"),
        }
    }

    fn show_level(&mut self) {
        let today = (self.calendar)().date();
        match self.history.recompute(today) {
            Ok(total) => {
                let level = self.history.level(total);
                self.board
                    .show(LEVEL_COLOR, &format!("LEVEL {}\n{total}s", level.value));
            }
            Err(e) => {
                log::warn!("cannot compute level: {e}");
                self.board.show(Rgb::RED, "Records Error");
            }
        }
    }

    fn show_climate(&mut self) {
        let reading = self.board.climate.read();
        let (color, text) = climate::screen(reading);
        self.board.show(color, &text);
    }

    fn start_workout(&mut self) {
        if self.ctx.selection.mode().is_none() {
            self.ctx.selection = Selection::Move;
        }
        self.ctx.step = MenuStep::Mode;

        let workout = match self.ctx.workout() {
            Ok(workout) => workout,
            Err(e) => {
                log::warn!("not starting workout: {e}");
                return;
            }
        };

        let outcome =
            SessionRunner::new(&mut self.board, &self.config.pins, &self.config.timing).run(&workout);
        self.save(&workout, outcome);

        self.board.show(Rgb::GREEN, "Back to Menu");
        self.board
            .sleep(Timing::ms(self.config.timing.back_to_menu_ms));
    }

    fn save(&mut self, workout: &WorkoutConfig, outcome: Outcome) {
        let policy = self.config.save_policy;
        if outcome == Outcome::Aborted && policy == SavePolicy::CompletedOnly {
            log::info!("aborted workout not recorded");
            return;
        }

        let now = (self.calendar)();
        if let Err(e) = self.history.record(workout, now) {
            log::warn!("cannot save workout record: {e}");
            return;
        }
        self.records.invalidate();

        match self.history.recompute(now.date()) {
            Ok(total) => log::info!("accumulated {total}s ({})", self.history.level(total)),
            Err(e) => log::warn!("cannot update accumulated time: {e}"),
        }
    }

    fn quit(&mut self) {
        log::info!("quit requested");
        self.board.cue(Cue::Alert);
        self.board.stop_music();
        self.board.set_light(LightMode::Off);
        self.board.show(Rgb::GREY, "Goodbye!");
    }
}
