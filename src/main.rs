use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    thread,
    time::Duration,
};

use movestay::{
    app_dirs::AppDirs,
    board::Board,
    config::{Config, ConfigStore, FileConfigStore, SavePolicy},
    hardware::{Climate, FixedClimate},
    light::{AmbientLight, LightHandle},
    menu::Menu,
    records::{Accumulator, History, RecordLog},
    session::Mode,
    ui::{
        devices::{KeyboardPins, PanelBuzzer, PanelLeds, PanelMusic, TerminalLcd},
        SharedPanel, UiThread,
    },
};

/// Time the goodbye screen stays up before the terminal is restored
const GOODBYE_MS: u64 = 800;

/// motion-gated exercise timer
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A motion-gated exercise timer: a PIR sensor pauses the countdown when you stop moving (MOVE) or start fidgeting (STAY). Runs against a simulated board in the terminal."
)]
pub struct Cli {
    /// config file to use instead of the platform default
    #[clap(long)]
    config: Option<PathBuf>,

    /// directory holding the record log, accumulator and log file
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// initial mode shown in the menu
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// initial exercise time per set, in seconds
    #[clap(short = 'e', long)]
    exercise: Option<u32>,

    /// initial rest time between sets, in seconds
    #[clap(short = 'r', long)]
    rest: Option<u32>,

    /// initial number of sets
    #[clap(short = 's', long)]
    sets: Option<u32>,

    /// level from every record ever logged instead of a recent window
    #[clap(long, conflicts_with = "window_days")]
    all_time: bool,

    /// only count records from the last N days towards the level
    #[clap(long)]
    window_days: Option<u32>,

    /// also record sessions that were stopped early
    #[clap(long)]
    save_on_abort: bool,

    /// simulated temperature sensor reading (°C)
    #[clap(long, requires = "humidity")]
    temperature: Option<f32>,

    /// simulated humidity sensor reading (%)
    #[clap(long, requires = "temperature")]
    humidity: Option<f32>,

    /// run without buzzer and music
    #[clap(long)]
    no_sound: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// recompute the accumulated time and print the level
    Level,
    /// print the workout log
    Records,
    /// print the effective configuration as JSON
    Config {
        /// also save it as the config file, so the overrides stick
        #[clap(long)]
        write: bool,
    },
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(mode) = self.mode {
            config.workout.mode = mode;
        }
        if let Some(exercise) = self.exercise {
            config.workout.exercise_secs = exercise.max(config.workout.exercise_min);
        }
        if let Some(rest) = self.rest {
            config.workout.rest_secs = rest.max(config.workout.rest_min);
        }
        if let Some(sets) = self.sets {
            config.workout.sets = sets.max(config.workout.sets_min);
        }
        if self.all_time {
            config.level.window_days = None;
        } else if let Some(days) = self.window_days {
            config.level.window_days = Some(days);
        }
        if self.save_on_abort {
            config.save_policy = SavePolicy::Always;
        }
    }

    fn climate(&self) -> Option<Climate> {
        Some(Climate {
            celsius: self.temperature?,
            humidity: self.humidity?,
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut config = store.load();
    cli.apply(&mut config);

    let dirs = AppDirs::resolve(config.data_dir.as_deref());
    init_logging(&dirs);

    let history = History::new(
        RecordLog::new(dirs.records_path()),
        Accumulator::new(dirs.accumulator_path()),
        config.level,
    );

    match cli.command {
        Some(Command::Level) => return print_level(&history),
        Some(Command::Records) => return print_records(&history),
        Some(Command::Config { write }) => {
            if write {
                store.save(&config)?;
                log::info!("config written to {}", store.path().display());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        None => {}
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    let panel = SharedPanel::new();
    let light = AmbientLight::spawn(PanelLeds(panel.clone()), LightHandle::new());
    let ui = UiThread::spawn(terminal, panel.clone(), light.handle());

    let board = build_board(&cli, &config, &panel, light.handle());
    let mut menu = Menu::new(board, config, history);
    menu.run();

    thread::sleep(Duration::from_millis(GOODBYE_MS));
    light.shutdown();
    let mut terminal = ui.finish()?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    Ok(())
}

fn build_board(cli: &Cli, config: &Config, panel: &SharedPanel, light: LightHandle) -> Board {
    let mut board = Board::default()
        .with_lcd(TerminalLcd(panel.clone()))
        .with_pins(KeyboardPins::new(panel.clone(), config.pins))
        .with_light(light);

    if !cli.no_sound {
        board = board
            .with_buzzer(PanelBuzzer(panel.clone()))
            .with_music(PanelMusic(panel.clone()));
    }
    if let Some(climate) = cli.climate() {
        board = board.with_climate(FixedClimate(Some(climate)));
    }
    board
}

/// Log records go to a file in the data directory; the terminal is taken
fn init_logging(dirs: &AppDirs) {
    let file = fs::create_dir_all(dirs.data_dir()).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dirs.log_path())
    });
    let target = match file {
        Ok(file) => env_logger::Target::Pipe(Box::new(file)),
        Err(_) => env_logger::Target::Stderr,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(target)
        .init();
}

fn print_level(history: &History) -> Result<(), Box<dyn Error>> {
    let total = history.recompute(Local::now().date_naive())?;
    let window = match history.policy().window_days {
        Some(days) => format!("in the last {days} days"),
        None => "all time".to_string(),
    };
    println!("{}", history.level(total));
    println!("{total}s {window}");
    Ok(())
}

fn print_records(history: &History) -> Result<(), Box<dyn Error>> {
    let records = history.records()?;
    if records.is_empty() {
        println!("no records");
        return Ok(());
    }
    for record in records.iter().rev() {
        println!(
            "{}  {:>4}s x {:<2} = {:>5}s  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.exercise_secs,
            record.sets,
            record.total_secs,
            record.level
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_leave_config_alone() {
        let cli = Cli::parse_from(["movestay"]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config, Config::default());
        assert_eq!(cli.command, None);
        assert_eq!(cli.climate(), None);
    }

    #[test]
    fn test_cli_workout_overrides() {
        let cli = Cli::parse_from([
            "movestay", "--mode", "stay", "-e", "60", "-r", "15", "-s", "5",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.workout.mode, Mode::Stay);
        assert_eq!(config.workout.exercise_secs, 60);
        assert_eq!(config.workout.rest_secs, 15);
        assert_eq!(config.workout.sets, 5);
    }

    #[test]
    fn test_cli_overrides_respect_minimums() {
        let cli = Cli::parse_from(["movestay", "-e", "1", "-r", "0", "-s", "0"]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.workout.exercise_secs, 10);
        assert_eq!(config.workout.rest_secs, 5);
        assert_eq!(config.workout.sets, 1);
    }

    #[test]
    fn test_cli_level_and_save_policy() {
        let cli = Cli::parse_from(["movestay", "--all-time", "--save-on-abort"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.level.window_days, None);
        assert_eq!(config.save_policy, SavePolicy::Always);

        let cli = Cli::parse_from(["movestay", "--window-days", "30"]);
        cli.apply(&mut config);
        assert_eq!(config.level.window_days, Some(30));
    }

    #[test]
    fn test_cli_all_time_conflicts_with_window() {
        assert!(Cli::try_parse_from(["movestay", "--all-time", "--window-days", "30"]).is_err());
    }

    #[test]
    fn test_cli_climate_needs_both_values() {
        assert!(Cli::try_parse_from(["movestay", "--temperature", "20"]).is_err());

        let cli = Cli::parse_from(["movestay", "--temperature", "20.5", "--humidity", "45"]);
        assert_eq!(
            cli.climate(),
            Some(Climate {
                celsius: 20.5,
                humidity: 45.0
            })
        );
    }

    #[test]
    fn test_cli_subcommands() {
        assert_eq!(
            Cli::parse_from(["movestay", "level"]).command,
            Some(Command::Level)
        );
        assert_eq!(
            Cli::parse_from(["movestay", "--data-dir", "/tmp/x", "records"]).command,
            Some(Command::Records)
        );
        assert_eq!(
            Cli::parse_from(["movestay", "config", "--write"]).command,
            Some(Command::Config { write: true })
        );
    }

    #[test]
    fn test_build_board_uses_panel_devices() {
        let cli = Cli::parse_from(["movestay"]);
        let panel = SharedPanel::new();
        let mut board = build_board(&cli, &Config::default(), &panel, LightHandle::new());

        board.show(movestay::hardware::Rgb::GREEN, "MOVE");
        assert_eq!(panel.snapshot().text, "MOVE");

        panel.lock().motion = true;
        assert!(board.pin_high(Config::default().pins.pir));
    }
}
