//! Terminal stand-in for the physical board.
//!
//! The control loop talks to the devices in [`devices`], which only read and
//! write a shared [`PanelState`]. A separate UI thread owns the terminal: it
//! feeds key presses into the panel and redraws it with [`panel::PanelView`].

pub mod devices;
pub mod panel;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::hardware::Rgb;
use crate::light::LightHandle;

const DRAW_INTERVAL_MS: u64 = 50;
/// A key counts as held this long after its last (repeat) event
const KEY_HOLD_MS: u64 = 300;
/// Long enough for the hold-to-quit gesture
const QUIT_HOLD_MS: u64 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum MusicState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Everything the simulated board shows or senses
#[derive(Debug, Clone)]
pub struct PanelState {
    pub color: Rgb,
    pub text: String,
    pub buzzing: bool,
    pub music: MusicState,
    pub motion: bool,
    pub pir_failing: bool,
    pub leds: (u8, u8),
    /// Per button (B1..B4), the instant until which it reads as held
    held_until: [Option<Instant>; 4],
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            text: String::new(),
            buzzing: false,
            music: MusicState::Stopped,
            motion: false,
            pir_failing: false,
            leds: (0, 0),
            held_until: [None; 4],
        }
    }
}

impl PanelState {
    pub fn is_held(&self, button: usize, now: Instant) -> bool {
        self.held_until
            .get(button)
            .copied()
            .flatten()
            .is_some_and(|until| now < until)
    }

    pub fn hold(&mut self, button: usize, until: Instant) {
        if let Some(slot) = self.held_until.get_mut(button) {
            *slot = Some(until);
        }
    }

    /// Apply one key event at `now`
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        let quit = now + Duration::from_millis(QUIT_HOLD_MS);
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.hold(3, quit),
            KeyCode::Char('q') => self.hold(3, quit),
            KeyCode::Char(c @ '1'..='4') => {
                let button = c as usize - '1' as usize;
                self.hold(button, now + Duration::from_millis(KEY_HOLD_MS));
            }
            KeyCode::Char('m') => self.motion = !self.motion,
            KeyCode::Char('f') => self.pir_failing = !self.pir_failing,
            _ => {}
        }
    }
}

/// Cloneable handle on the panel
#[derive(Debug, Clone, Default)]
pub struct SharedPanel(Arc<Mutex<PanelState>>);

impl SharedPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> PanelState {
        self.lock().clone()
    }
}

/// Terminal thread handle; [`UiThread::finish`] stops it and hands the
/// terminal back for teardown
pub struct UiThread<B: Backend + Send + 'static> {
    done: Arc<AtomicBool>,
    handle: JoinHandle<(Terminal<B>, io::Result<()>)>,
}

impl<B: Backend + Send + 'static> UiThread<B> {
    pub fn spawn(terminal: Terminal<B>, panel: SharedPanel, light: LightHandle) -> Self {
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        let handle = thread::spawn(move || {
            let mut terminal = terminal;
            let result = drive(&mut terminal, &panel, &light, &flag);
            (terminal, result)
        });
        Self { done, handle }
    }

    pub fn finish(self) -> io::Result<Terminal<B>> {
        self.done.store(true, Ordering::Relaxed);
        match self.handle.join() {
            Ok((terminal, result)) => result.map(|_| terminal),
            Err(_) => Err(io::Error::other("terminal thread panicked")),
        }
    }
}

fn drive<B: Backend>(
    terminal: &mut Terminal<B>,
    panel: &SharedPanel,
    light: &LightHandle,
    done: &AtomicBool,
) -> io::Result<()> {
    while !done.load(Ordering::Relaxed) {
        let state = panel.snapshot();
        terminal.draw(|f| f.render_widget(panel::PanelView::new(&state, light.mode()), f.area()))?;

        if event::poll(Duration::from_millis(DRAW_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                panel.lock().handle_key(key, Instant::now());
            }
        }
    }
    Ok(())
}
