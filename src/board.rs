use std::time::Duration;

use crate::hardware::{
    Buzzer, ClimateSensor, Lcd, Music, NullBuzzer, NullClimate, NullLcd, NullMusic, NullPins,
    Pins, Rgb,
};
use crate::light::{LightHandle, LightMode};
use crate::runtime::{Clock, SystemClock};

/// Fixed vocabulary of buzzer cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Cue {
    /// Button accepted, resumed after a pause
    Ok,
    /// Session paused
    Cancel,
    /// Set finished, quitting
    Alert,
    /// Session or next set about to start
    Start,
    /// Sampled motion flipped between ticks
    StateChange,
}

impl Cue {
    /// (repetitions, beep length, gap after each beep when repeated)
    pub fn pattern(self) -> (u32, Duration, Duration) {
        let ms = Duration::from_millis;
        match self {
            Cue::Ok => (1, ms(120), ms(80)),
            Cue::Cancel => (2, ms(80), ms(80)),
            Cue::Alert => (1, ms(400), ms(0)),
            Cue::Start => (2, ms(120), ms(80)),
            Cue::StateChange => (1, ms(50), ms(0)),
        }
    }
}

/// Every peripheral the controller touches, passed by `&mut` to each step
pub struct Board {
    pub lcd: Box<dyn Lcd>,
    pub buzzer: Box<dyn Buzzer>,
    pub music: Box<dyn Music>,
    pub pins: Box<dyn Pins>,
    pub climate: Box<dyn ClimateSensor>,
    pub clock: Box<dyn Clock>,
    pub light: LightHandle,
}

impl Default for Board {
    /// All peripherals absent, real time
    fn default() -> Self {
        Self {
            lcd: Box::new(NullLcd),
            buzzer: Box::new(NullBuzzer),
            music: Box::new(NullMusic),
            pins: Box::new(NullPins),
            climate: Box::new(NullClimate),
            clock: Box::new(SystemClock::new()),
            light: LightHandle::new(),
        }
    }
}

impl Board {
    pub fn with_lcd(mut self, lcd: impl Lcd + 'static) -> Self {
        self.lcd = Box::new(lcd);
        self
    }

    pub fn with_buzzer(mut self, buzzer: impl Buzzer + 'static) -> Self {
        self.buzzer = Box::new(buzzer);
        self
    }

    pub fn with_music(mut self, music: impl Music + 'static) -> Self {
        self.music = Box::new(music);
        self
    }

    pub fn with_pins(mut self, pins: impl Pins + 'static) -> Self {
        self.pins = Box::new(pins);
        self
    }

    pub fn with_climate(mut self, climate: impl ClimateSensor + 'static) -> Self {
        self.climate = Box::new(climate);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_light(mut self, light: LightHandle) -> Self {
        self.light = light;
        self
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration);
    }

    pub fn show(&mut self, color: Rgb, text: &str) {
        self.lcd.show(color, text);
    }

    /// Blocks for the whole cue
    pub fn cue(&mut self, cue: Cue) {
        let (times, length, gap) = cue.pattern();
        for _ in 0..times {
            self.beep(length);
            if times > 1 {
                self.clock.sleep(gap);
            }
        }
    }

    pub fn beep(&mut self, length: Duration) {
        self.buzzer.tone(true);
        self.clock.sleep(length);
        self.buzzer.tone(false);
    }

    /// Pin level, with a failed read counted as low
    pub fn pin_high(&mut self, pin: u8) -> bool {
        match self.pins.read(pin) {
            Ok(level) => level,
            Err(e) => {
                log::debug!("read of pin {pin} failed: {e}");
                false
            }
        }
    }

    pub fn play_music(&mut self) {
        self.music.play();
        self.light.set_music_playing(true);
    }

    pub fn pause_music(&mut self) {
        self.music.pause();
        self.light.set_music_playing(false);
    }

    pub fn resume_music(&mut self) {
        self.music.resume();
        self.light.set_music_playing(true);
    }

    pub fn stop_music(&mut self) {
        self.music.stop();
        self.light.set_music_playing(false);
    }

    pub fn set_light(&self, mode: LightMode) {
        self.light.set_mode(mode);
    }
}
