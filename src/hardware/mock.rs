//! Scripted and recording peripherals for tests and headless runs.
//!
//! All of them are cheap to clone; clones share state, so a test keeps one
//! handle and gives the other to the `Board`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Buzzer, LedPair, Lcd, Music, Pins, Rgb};
use crate::runtime::{Clock, ManualClock};

type PinScript = Box<dyn FnMut(Duration) -> io::Result<bool>>;

/// Pins whose level is a function of virtual time
#[derive(Clone)]
pub struct ScriptedPins {
    clock: ManualClock,
    scripts: Rc<RefCell<HashMap<u8, PinScript>>>,
    reads: Rc<RefCell<HashMap<u8, usize>>>,
}

impl ScriptedPins {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            scripts: Rc::default(),
            reads: Rc::default(),
        }
    }

    /// Replace the script for `pin`; unscripted pins read low
    pub fn script<F>(&self, pin: u8, f: F)
    where
        F: FnMut(Duration) -> io::Result<bool> + 'static,
    {
        self.scripts.borrow_mut().insert(pin, Box::new(f));
    }

    pub fn constant(&self, pin: u8, level: bool) {
        self.script(pin, move |_| Ok(level));
    }

    /// High from `from` (inclusive) until `until` (exclusive)
    pub fn high_between(&self, pin: u8, from: Duration, until: Duration) {
        self.script(pin, move |t| Ok(t >= from && t < until));
    }

    /// High from `from` onwards
    pub fn high_after(&self, pin: u8, from: Duration) {
        self.script(pin, move |t| Ok(t >= from));
    }

    /// Replays `levels` one read at a time, repeating the last one
    pub fn sequence(&self, pin: u8, levels: Vec<io::Result<bool>>) {
        let mut levels = levels.into_iter();
        let mut last = false;
        self.script(pin, move |_| match levels.next() {
            Some(Ok(level)) => {
                last = level;
                Ok(level)
            }
            Some(Err(e)) => Err(e),
            None => Ok(last),
        });
    }

    pub fn reads(&self, pin: u8) -> usize {
        self.reads.borrow().get(&pin).copied().unwrap_or(0)
    }
}

impl Pins for ScriptedPins {
    fn read(&mut self, pin: u8) -> io::Result<bool> {
        *self.reads.borrow_mut().entry(pin).or_default() += 1;
        let now = self.clock.now();
        match self.scripts.borrow_mut().get_mut(&pin) {
            Some(script) => script(now),
            None => Ok(false),
        }
    }
}

/// Remembers every screen shown
#[derive(Clone, Default)]
pub struct RecordingLcd {
    color: Rc<RefCell<Rgb>>,
    screens: Rc<RefCell<Vec<(Rgb, String)>>>,
}

impl RecordingLcd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screens(&self) -> Vec<(Rgb, String)> {
        self.screens.borrow().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.screens.borrow().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.screens.borrow().last().map(|(_, t)| t.clone())
    }

    /// Number of screens whose text starts with `prefix`
    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.screens
            .borrow()
            .iter()
            .filter(|(_, t)| t.starts_with(prefix))
            .count()
    }
}

impl Lcd for RecordingLcd {
    fn set_color(&mut self, color: Rgb) {
        *self.color.borrow_mut() = color;
    }

    fn set_text(&mut self, text: &str) {
        let color = *self.color.borrow();
        self.screens.borrow_mut().push((color, text.to_string()));
    }
}

/// Reconstructs beep lengths from tone edges on the virtual clock
#[derive(Clone)]
pub struct RecordingBuzzer {
    clock: ManualClock,
    started: Rc<RefCell<Option<Duration>>>,
    beeps: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingBuzzer {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            started: Rc::default(),
            beeps: Rc::default(),
        }
    }

    pub fn beeps(&self) -> Vec<Duration> {
        self.beeps.borrow().clone()
    }

    pub fn count(&self, length: Duration) -> usize {
        self.beeps.borrow().iter().filter(|b| **b == length).count()
    }
}

impl Buzzer for RecordingBuzzer {
    fn tone(&mut self, on: bool) {
        let now = self.clock.now();
        if on {
            *self.started.borrow_mut() = Some(now);
        } else if let Some(start) = self.started.borrow_mut().take() {
            self.beeps.borrow_mut().push(now - start);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCall {
    Play,
    Pause,
    Resume,
    Stop,
}

#[derive(Clone, Default)]
pub struct RecordingMusic {
    calls: Rc<RefCell<Vec<MusicCall>>>,
}

impl RecordingMusic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MusicCall> {
        self.calls.borrow().clone()
    }
}

impl Music for RecordingMusic {
    fn play(&mut self) {
        self.calls.borrow_mut().push(MusicCall::Play);
    }

    fn pause(&mut self) {
        self.calls.borrow_mut().push(MusicCall::Pause);
    }

    fn resume(&mut self) {
        self.calls.borrow_mut().push(MusicCall::Resume);
    }

    fn stop(&mut self) {
        self.calls.borrow_mut().push(MusicCall::Stop);
    }
}

/// LED pair that keeps the last duty cycles it was given
#[derive(Clone, Default)]
pub struct RecordingLeds {
    levels: Arc<Mutex<Vec<(u8, u8)>>>,
}

impl RecordingLeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<(u8, u8)> {
        self.levels.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LedPair for RecordingLeds {
    fn set(&mut self, left: u8, right: u8) {
        if let Ok(mut levels) = self.levels.lock() {
            levels.push((left, right));
        }
    }
}
