//! Debounced button input.
//!
//! Buttons are plain level-sensed pins. A press is accepted on the first poll
//! that reads high, and the caller settles for a fixed debounce delay after
//! handling it. B4 additionally distinguishes a short press from a hold.

use std::time::Duration;

use crate::board::Board;
use crate::config::{PinMap, Timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Button {
    /// B1, value up
    Increment,
    /// B2, next step
    Next,
    /// B3, value down
    Decrement,
    /// B4, previous step; held to quit, doubles as the stop button
    Previous,
}

impl Button {
    pub const ALL: [Button; 4] = [
        Button::Increment,
        Button::Next,
        Button::Decrement,
        Button::Previous,
    ];

    pub fn pin(self, pins: &PinMap) -> u8 {
        pins.buttons[self as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Press(Button),
    /// B4 held past the hold-to-quit threshold
    Quit,
}

/// Turns raw pin levels into discrete button events
#[derive(Debug, Clone, Copy)]
pub struct InputSource {
    pins: PinMap,
    debounce: Duration,
    hold: Duration,
    short_press_max: Duration,
    poll: Duration,
}

impl InputSource {
    pub fn new(pins: PinMap, timing: &Timing) -> Self {
        Self {
            pins,
            debounce: Timing::ms(timing.button_debounce_ms),
            hold: Timing::ms(timing.button_hold_ms),
            short_press_max: Timing::ms(timing.short_press_max_ms),
            poll: Timing::ms(timing.input_poll_ms),
        }
    }

    /// Check B1..B4 in priority order.
    ///
    /// B4 is followed until release: past the hold threshold it yields
    /// `Quit` immediately, a release within the short-press window yields a
    /// press, anything in between is ignored.
    pub fn poll(&self, board: &mut Board) -> Option<ButtonEvent> {
        for button in [Button::Increment, Button::Next, Button::Decrement] {
            if board.pin_high(button.pin(&self.pins)) {
                return Some(ButtonEvent::Press(button));
            }
        }

        let back = Button::Previous.pin(&self.pins);
        if !board.pin_high(back) {
            return None;
        }

        let pressed_at = board.now();
        while board.pin_high(back) {
            if board.now() - pressed_at > self.hold {
                return Some(ButtonEvent::Quit);
            }
            board.sleep(self.poll);
        }

        if board.now() - pressed_at < self.short_press_max {
            Some(ButtonEvent::Press(Button::Previous))
        } else {
            None
        }
    }

    /// Fixed delay after each accepted press
    pub fn settle(&self, board: &mut Board) {
        board.sleep(self.debounce);
    }

    /// Block until any button reads high, with no timeout
    pub fn wait_any_press(&self, board: &mut Board) -> Button {
        loop {
            for button in Button::ALL {
                if board.pin_high(button.pin(&self.pins)) {
                    self.settle(board);
                    return button;
                }
            }
            board.sleep(self.poll);
        }
    }
}

/// Outcome of an interruptible wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    Elapsed,
    Stopped,
}

/// The stop button as seen from inside a session
#[derive(Debug, Clone, Copy)]
pub struct StopSignal {
    pin: u8,
    poll: Duration,
}

impl StopSignal {
    pub fn new(pins: &PinMap, timing: &Timing) -> Self {
        Self {
            pin: pins.stop(),
            poll: Timing::ms(timing.stop_poll_ms),
        }
    }

    pub fn raised(&self, board: &mut Board) -> bool {
        board.pin_high(self.pin)
    }

    /// Sleep the whole of `duration` in poll-sized slices (the last one
    /// shorter if needed), checking the stop button before each one.
    /// Returns as soon as it is seen.
    pub fn wait(&self, board: &mut Board, duration: Duration) -> Wait {
        let slice = if self.poll.is_zero() { duration } else { self.poll };

        let mut left = duration;
        while !left.is_zero() {
            if self.raised(board) {
                return Wait::Stopped;
            }
            let step = left.min(slice);
            board.sleep(step);
            left -= step;
        }
        Wait::Elapsed
    }
}
