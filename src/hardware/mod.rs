//! Capability interfaces for the board's peripherals.
//!
//! The controller only ever talks to these traits. Each one has a null
//! implementation that is injected when the peripheral is not fitted.

pub mod mock;

use std::io;

use crate::error::SensorError;

/// Backlight color of the character display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
    pub const MAGENTA: Rgb = Rgb(255, 0, 255);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GREY: Rgb = Rgb(128, 128, 128);
}

/// Two-line character display with an RGB backlight
pub trait Lcd {
    fn set_color(&mut self, color: Rgb);
    fn set_text(&mut self, text: &str);

    /// Color immediately followed by text; screens are only ever updated as a unit
    fn show(&mut self, color: Rgb, text: &str) {
        self.set_color(color);
        self.set_text(text);
    }
}

/// Piezo buzzer; timing of a beep is owned by the caller's clock
pub trait Buzzer {
    fn tone(&mut self, on: bool);
}

/// Looping background track
pub trait Music {
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
}

/// Level-sensed digital inputs (buttons and the PIR sensor)
pub trait Pins {
    fn read(&mut self, pin: u8) -> io::Result<bool>;
}

/// One temperature/humidity reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    pub celsius: f32,
    pub humidity: f32,
}

impl Climate {
    /// The sensor signals a failed conversion with NaN
    pub fn validated(self) -> Result<Climate, SensorError> {
        if self.celsius.is_nan() || self.humidity.is_nan() {
            Err(SensorError::NotANumber)
        } else {
            Ok(self)
        }
    }
}

pub trait ClimateSensor {
    fn read(&mut self) -> Result<Climate, SensorError>;
}

/// Two PWM-dimmable LEDs, duty cycle 0..=100
pub trait LedPair: Send {
    fn set(&mut self, left: u8, right: u8);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullLcd;

impl Lcd for NullLcd {
    fn set_color(&mut self, _color: Rgb) {}
    fn set_text(&mut self, _text: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullBuzzer;

impl Buzzer for NullBuzzer {
    fn tone(&mut self, _on: bool) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullMusic;

impl Music for NullMusic {
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn resume(&mut self) {}
    fn stop(&mut self) {}
}

/// Every pin reads low
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPins;

impl Pins for NullPins {
    fn read(&mut self, _pin: u8) -> io::Result<bool> {
        Ok(false)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullClimate;

impl ClimateSensor for NullClimate {
    fn read(&mut self) -> Result<Climate, SensorError> {
        Err(SensorError::NoReading)
    }
}

/// Reports the same reading every time, e.g. one given on the command line
#[derive(Debug, Clone, Copy)]
pub struct FixedClimate(pub Option<Climate>);

impl ClimateSensor for FixedClimate {
    fn read(&mut self) -> Result<Climate, SensorError> {
        self.0.ok_or(SensorError::NoReading)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullLeds;

impl LedPair for NullLeds {
    fn set(&mut self, _left: u8, _right: u8) {}
}
