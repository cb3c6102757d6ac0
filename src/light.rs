//! Ambient LED effects.
//!
//! The only other thread in the controller. The control loop writes the
//! current [`LightMode`] into an atomic; the effect thread polls it between
//! every step of a pattern and never feeds anything back.

use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::hardware::LedPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[repr(u8)]
pub enum LightMode {
    Off = 0,
    Exercise = 1,
    Rest = 2,
    Pause = 3,
    Complete = 4,
}

impl LightMode {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => LightMode::Exercise,
            2 => LightMode::Rest,
            3 => LightMode::Pause,
            4 => LightMode::Complete,
            _ => LightMode::Off,
        }
    }
}

/// Shared flags between the control loop and the effect thread
#[derive(Debug, Clone, Default)]
pub struct LightHandle {
    mode: Arc<AtomicU8>,
    music_playing: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl LightHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&self, mode: LightMode) {
        self.mode.store(mode as u8, Ordering::Relaxed);
    }

    pub fn mode(&self) -> LightMode {
        LightMode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    pub fn set_music_playing(&self, playing: bool) {
        self.music_playing.store(playing, Ordering::Relaxed);
    }

    pub fn music_playing(&self) -> bool {
        self.music_playing.load(Ordering::Relaxed)
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Effect thread driving a [`LedPair`]
pub struct AmbientLight {
    handle: LightHandle,
    thread: Option<JoinHandle<()>>,
}

impl AmbientLight {
    pub fn spawn<L: LedPair + 'static>(leds: L, handle: LightHandle) -> Self {
        let worker = Effects {
            leds,
            handle: handle.clone(),
        };
        let thread = thread::Builder::new()
            .name("ambient-light".into())
            .spawn(move || worker.run())
            .map_err(|e| log::warn!("ambient light disabled: {e}"))
            .ok();

        Self { handle, thread }
    }

    pub fn handle(&self) -> LightHandle {
        self.handle.clone()
    }

    /// Stop the thread and leave the LEDs dark
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.handle.shutdown.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("ambient light thread panicked");
            }
        }
    }
}

impl Drop for AmbientLight {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Effects<L> {
    leds: L,
    handle: LightHandle,
}

impl<L: LedPair> Effects<L> {
    fn run(mut self) {
        while !self.handle.stopping() {
            match self.handle.mode() {
                LightMode::Off => {
                    self.leds.set(0, 0);
                    self.hold(LightMode::Off, Duration::from_millis(100));
                }
                LightMode::Exercise if self.handle.music_playing() => self.rhythm(),
                LightMode::Exercise => self.heartbeat(),
                LightMode::Rest => self.breathing(),
                LightMode::Pause => self.hazard(),
                LightMode::Complete => self.strobe(),
            }
        }
        self.leds.set(0, 0);
    }

    /// Sleep in short slices; false once the mode changed or shutdown began
    fn hold(&self, mode: LightMode, duration: Duration) -> bool {
        let slice = Duration::from_millis(20);
        let mut left = duration;
        while !left.is_zero() {
            if self.handle.stopping() || self.handle.mode() != mode {
                return false;
            }
            let step = left.min(slice);
            thread::sleep(step);
            left -= step;
        }
        !self.handle.stopping() && self.handle.mode() == mode
    }

    /// Set both LEDs and hold; aborts the pattern on a mode change
    fn frame(&mut self, mode: LightMode, left: u8, right: u8, ms: u64) -> bool {
        self.leds.set(left, right);
        self.hold(mode, Duration::from_millis(ms))
    }

    fn heartbeat(&mut self) {
        let m = LightMode::Exercise;
        let _ = self.frame(m, 100, 100, 100)
            && self.frame(m, 0, 0, 100)
            && self.frame(m, 100, 100, 100)
            && self.frame(m, 0, 0, 1000);
    }

    fn rhythm(&mut self) {
        let m = LightMode::Exercise;
        let mut rng = rand::thread_rng();
        let (left, right) = match rng.gen_range(0..3) {
            0 => (100, 0),
            1 => (0, 100),
            _ => (100, 100),
        };
        let beat = rng.gen_range(100..=300);
        let _ = self.frame(m, left, right, beat) && self.frame(m, 0, 0, 100);
    }

    fn breathing(&mut self) {
        let m = LightMode::Rest;
        for duty in (0..=100).step_by(2) {
            if !self.frame(m, duty, duty, 40) {
                return;
            }
        }
        if !self.hold(m, Duration::from_millis(500)) {
            return;
        }
        for duty in (0..=100).rev().step_by(2) {
            if !self.frame(m, duty, duty, 40) {
                return;
            }
        }
        self.hold(m, Duration::from_millis(1000));
    }

    fn hazard(&mut self) {
        let m = LightMode::Pause;
        let _ = self.frame(m, 100, 100, 500) && self.frame(m, 0, 0, 500);
    }

    fn strobe(&mut self) {
        let m = LightMode::Complete;
        for _ in 0..3 {
            if !(self.frame(m, 100, 0, 50) && self.frame(m, 0, 0, 50)) {
                return;
            }
        }
        for _ in 0..3 {
            if !(self.frame(m, 0, 100, 50) && self.frame(m, 0, 0, 50)) {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::RecordingLeds;

    #[test]
    fn handle_roundtrips_mode() {
        let handle = LightHandle::new();
        assert_eq!(handle.mode(), LightMode::Off);
        handle.set_mode(LightMode::Rest);
        assert_eq!(handle.mode(), LightMode::Rest);
        handle.set_mode(LightMode::Complete);
        assert_eq!(handle.clone().mode(), LightMode::Complete);
    }

    #[test]
    fn effect_thread_follows_mode_and_goes_dark_on_shutdown() {
        let leds = RecordingLeds::new();
        let handle = LightHandle::new();
        let light = AmbientLight::spawn(leds.clone(), handle.clone());

        handle.set_mode(LightMode::Pause);
        thread::sleep(Duration::from_millis(150));
        light.shutdown();

        let history = leds.history();
        assert!(history.contains(&(100, 100)), "hazard pattern lights both LEDs");
        assert_eq!(history.last(), Some(&(0, 0)));
    }
}
