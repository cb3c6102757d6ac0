use std::io;
use std::time::Instant;

use crate::config::PinMap;
use crate::hardware::{Buzzer, LedPair, Lcd, Music, Pins, Rgb};

use super::{MusicState, SharedPanel};

/// 16x2 display drawn by the terminal thread
#[derive(Debug, Clone)]
pub struct TerminalLcd(pub SharedPanel);

impl Lcd for TerminalLcd {
    fn set_color(&mut self, color: Rgb) {
        self.0.lock().color = color;
    }

    fn set_text(&mut self, text: &str) {
        self.0.lock().text = text.to_string();
    }

    fn show(&mut self, color: Rgb, text: &str) {
        let mut panel = self.0.lock();
        panel.color = color;
        panel.text = text.to_string();
    }
}

#[derive(Debug, Clone)]
pub struct PanelBuzzer(pub SharedPanel);

impl Buzzer for PanelBuzzer {
    fn tone(&mut self, on: bool) {
        self.0.lock().buzzing = on;
    }
}

/// Only tracks the transport state; nothing is played
#[derive(Debug, Clone)]
pub struct PanelMusic(pub SharedPanel);

impl Music for PanelMusic {
    fn play(&mut self) {
        self.0.lock().music = MusicState::Playing;
    }

    fn pause(&mut self) {
        let mut panel = self.0.lock();
        if panel.music == MusicState::Playing {
            panel.music = MusicState::Paused;
        }
    }

    fn resume(&mut self) {
        let mut panel = self.0.lock();
        if panel.music == MusicState::Paused {
            panel.music = MusicState::Playing;
        }
    }

    fn stop(&mut self) {
        self.0.lock().music = MusicState::Stopped;
    }
}

/// Buttons from held keys, PIR from the motion toggle
#[derive(Debug, Clone)]
pub struct KeyboardPins {
    panel: SharedPanel,
    pins: PinMap,
}

impl KeyboardPins {
    pub fn new(panel: SharedPanel, pins: PinMap) -> Self {
        Self { panel, pins }
    }
}

impl Pins for KeyboardPins {
    fn read(&mut self, pin: u8) -> io::Result<bool> {
        let panel = self.panel.lock();
        if pin == self.pins.pir {
            if panel.pir_failing {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "PIR not responding"));
            }
            return Ok(panel.motion);
        }
        let now = Instant::now();
        Ok(self
            .pins
            .buttons
            .iter()
            .position(|&b| b == pin)
            .is_some_and(|button| panel.is_held(button, now)))
    }
}

#[derive(Debug, Clone)]
pub struct PanelLeds(pub SharedPanel);

impl LedPair for PanelLeds {
    fn set(&mut self, left: u8, right: u8) {
        self.0.lock().leds = (left, right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pins_follow_the_panel() {
        let panel = SharedPanel::new();
        let mut pins = KeyboardPins::new(panel.clone(), PinMap::default());

        assert!(!pins.read(22).unwrap());
        panel
            .lock()
            .hold(0, Instant::now() + Duration::from_secs(60));
        assert!(pins.read(22).unwrap());
        assert!(!pins.read(23).unwrap());

        panel.lock().motion = true;
        assert!(pins.read(8).unwrap());
        panel.lock().pir_failing = true;
        assert!(pins.read(8).is_err());
    }

    #[test]
    fn music_transport() {
        let panel = SharedPanel::new();
        let mut music = PanelMusic(panel.clone());

        music.resume();
        assert_eq!(panel.snapshot().music, MusicState::Stopped);
        music.play();
        music.pause();
        assert_eq!(panel.snapshot().music, MusicState::Paused);
        music.resume();
        assert_eq!(panel.snapshot().music, MusicState::Playing);
        music.stop();
        assert_eq!(panel.snapshot().music, MusicState::Stopped);
    }

    #[test]
    fn lcd_updates_as_a_unit() {
        let panel = SharedPanel::new();
        let mut lcd = TerminalLcd(panel.clone());
        lcd.show(Rgb::RED, "Stopped\nReturning...");

        let state = panel.snapshot();
        assert_eq!(state.color, Rgb::RED);
        assert_eq!(state.text, "Stopped\nReturning...");
    }
}
