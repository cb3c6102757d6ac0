use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::Mode;

/// GPIO assignment. Buttons are B1 (+), B2 (next), B3 (-), B4 (back / stop).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PinMap {
    pub buttons: [u8; 4],
    pub pir: u8,
    pub buzzer: u8,
    pub led_left: u8,
    pub led_right: u8,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            buttons: [22, 23, 24, 25],
            pir: 8,
            buzzer: 3,
            led_left: 5,
            led_right: 6,
        }
    }
}

impl PinMap {
    /// B4 doubles as the stop button during a session
    pub fn stop(&self) -> u8 {
        self.buttons[3]
    }
}

/// Every polling interval and threshold of the control loop, in one place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Timing {
    pub button_debounce_ms: u64,
    pub button_hold_ms: u64,
    pub short_press_max_ms: u64,
    /// Granularity of interruptible waits (stop button polling)
    pub stop_poll_ms: u64,
    /// Granularity of button polling while waiting on a held or awaited button
    pub input_poll_ms: u64,
    /// Sleep of the idle menu loop when no button is down
    pub idle_poll_ms: u64,
    pub pir_samples: u32,
    pub pir_interval_ms: u64,
    pub pir_motion_threshold: u32,
    pub pir_warmup_ms: u64,
    pub pause_on_no_motion_secs: u64,
    pub pause_on_motion_secs: u64,
    pub resume_poll_ms: u64,
    pub preroll_ms: u64,
    pub stopped_message_ms: u64,
    pub back_to_menu_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            button_debounce_ms: 150,
            button_hold_ms: 2000,
            short_press_max_ms: 500,
            stop_poll_ms: 100,
            input_poll_ms: 50,
            idle_poll_ms: 10,
            pir_samples: 3,
            pir_interval_ms: 100,
            pir_motion_threshold: 2,
            pir_warmup_ms: 500,
            pause_on_no_motion_secs: 8,
            pause_on_motion_secs: 8,
            resume_poll_ms: 300,
            preroll_ms: 500,
            stopped_message_ms: 1500,
            back_to_menu_ms: 500,
        }
    }
}

impl Timing {
    pub fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// How long the wrong motion state may persist before the session pauses
    pub fn pause_after(&self, mode: Mode) -> Duration {
        match mode {
            Mode::Move => Duration::from_secs(self.pause_on_no_motion_secs),
            Mode::Stay => Duration::from_secs(self.pause_on_motion_secs),
        }
    }
}

/// Starting values and step sizes of the configuration menu
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkoutDefaults {
    pub mode: Mode,
    pub exercise_secs: u32,
    pub rest_secs: u32,
    pub sets: u32,
    pub exercise_step: u32,
    pub exercise_min: u32,
    pub rest_step: u32,
    pub rest_min: u32,
    pub sets_min: u32,
}

impl Default for WorkoutDefaults {
    fn default() -> Self {
        Self {
            mode: Mode::Move,
            exercise_secs: 30,
            rest_secs: 10,
            sets: 3,
            exercise_step: 10,
            exercise_min: 10,
            rest_step: 5,
            rest_min: 5,
            sets_min: 1,
        }
    }
}

/// How accumulated exercise time turns into a level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LevelPolicy {
    /// Only count records from the last N days; `None` counts everything
    pub window_days: Option<u32>,
    pub seconds_per_level: u64,
    pub max_level: u32,
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self {
            window_days: Some(180),
            seconds_per_level: 100,
            max_level: 10,
        }
    }
}

/// Whether an aborted session still leaves a record behind
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    #[default]
    CompletedOnly,
    Always,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub pins: PinMap,
    pub timing: Timing,
    pub workout: WorkoutDefaults,
    pub level: LevelPolicy,
    pub save_policy: SavePolicy,
    /// Where records, the accumulator and the log file live
    pub data_dir: Option<PathBuf>,
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "movestay") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("movestay_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("cannot read config {}: {e}", self.path.display()),
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
