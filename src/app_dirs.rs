use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const RECORDS_FILE: &str = "workout_log.csv";
pub const ACCUMULATOR_FILE: &str = "total_time.txt";
pub const LOG_FILE: &str = "movestay.log";

/// Centralized application directory resolution
#[derive(Debug, Clone)]
pub struct AppDirs {
    data_dir: PathBuf,
}

impl AppDirs {
    /// Use `explicit` when configured, otherwise `$HOME/.local/state/movestay`
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let data_dir = match explicit {
            Some(dir) => dir.to_path_buf(),
            None => Self::default_data_dir().unwrap_or_else(|| PathBuf::from(".")),
        };
        Self { data_dir }
    }

    fn default_data_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("movestay"),
            )
        } else {
            ProjectDirs::from("", "", "movestay").map(|proj_dirs| proj_dirs.data_local_dir().into())
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }

    pub fn accumulator_path(&self) -> PathBuf {
        self.data_dir.join(ACCUMULATOR_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}
