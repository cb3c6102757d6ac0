//! Workout history, the accumulated-time file and the level derived from it.
//!
//! The record log is append-only CSV. The accumulator is a single integer that
//! is always recomputed from the full log and overwritten, never incremented.

use chrono::{Days, NaiveDate, NaiveDateTime};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::LevelPolicy;
use crate::error::{Result, StorageError};
use crate::session::WorkoutConfig;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const HEADER: [&str; 5] = ["timestamp", "exercise_secs", "sets", "total_secs", "level"];

/// Level 0..=max, with the top level shown as "Master"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Level {
    pub value: u32,
    pub max: u32,
}

impl Level {
    pub fn for_total(total_secs: u64, policy: &LevelPolicy) -> Self {
        let per_level = policy.seconds_per_level.max(1);
        let value = (total_secs / per_level).min(policy.max_level as u64) as u32;
        Self {
            value,
            max: policy.max_level,
        }
    }

    pub fn is_master(&self) -> bool {
        self.value >= self.max
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_master() {
            write!(f, "Master")
        } else {
            write!(f, "Lv {}", self.value)
        }
    }
}

/// One finished workout; never modified once written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutRecord {
    pub timestamp: NaiveDateTime,
    pub exercise_secs: u32,
    pub sets: u32,
    pub total_secs: u64,
    pub level: String,
}

impl WorkoutRecord {
    pub fn new(timestamp: NaiveDateTime, exercise_secs: u32, sets: u32, policy: &LevelPolicy) -> Self {
        let total_secs = exercise_secs as u64 * sets as u64;
        Self {
            timestamp,
            exercise_secs,
            sets,
            total_secs,
            level: Level::for_total(total_secs, policy).to_string(),
        }
    }

    pub fn from_workout(workout: &WorkoutConfig, timestamp: NaiveDateTime, policy: &LevelPolicy) -> Self {
        Self::new(timestamp, workout.exercise_secs(), workout.total_sets(), policy)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    fn to_row(&self) -> [String; 5] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.exercise_secs.to_string(),
            self.sets.to_string(),
            self.total_secs.to_string(),
            self.level.clone(),
        ]
    }

    /// Parse one CSV row, accepting the full five-field layout and the older
    /// `date,total` layout. Anything else is `None`.
    fn from_row(row: &csv::StringRecord, policy: &LevelPolicy) -> Option<Self> {
        match row.len() {
            5 => {
                let timestamp = NaiveDateTime::parse_from_str(&row[0], TIMESTAMP_FORMAT).ok()?;
                let exercise_secs: u32 = row[1].parse().ok()?;
                let sets: u32 = row[2].parse().ok()?;
                let total_secs: u64 = row[3].parse().ok()?;
                if total_secs != exercise_secs as u64 * sets as u64 {
                    return None;
                }
                Some(Self {
                    timestamp,
                    exercise_secs,
                    sets,
                    total_secs,
                    level: row[4].to_string(),
                })
            }
            2 => {
                let date = NaiveDate::parse_from_str(&row[0], DATE_FORMAT).ok()?;
                let total: u32 = row[1].parse().ok()?;
                Some(Self::new(date.and_hms_opt(0, 0, 0)?, total, 1, policy))
            }
            _ => None,
        }
    }
}

/// Append-only CSV file of [`WorkoutRecord`]s
#[derive(Debug, Clone)]
pub struct RecordLog {
    path: PathBuf,
}

impl RecordLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &WorkoutRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        // If the log doesn't exist yet, it gets a header row
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record(HEADER)
                .map_err(|e| StorageError::csv(&self.path, e))?;
        }
        writer
            .write_record(record.to_row())
            .map_err(|e| StorageError::csv(&self.path, e))?;
        writer.flush().map_err(|e| StorageError::io(&self.path, e))?;

        log::info!(
            "recorded {}s ({}) in {}",
            record.total_secs,
            record.level,
            self.path.display()
        );
        Ok(())
    }

    /// Every readable record, oldest first.
    ///
    /// A missing file is an empty history. Blank, header and malformed rows
    /// are skipped one by one.
    pub fn load(&self, policy: &LevelPolicy) -> Result<Vec<WorkoutRecord>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            match row {
                Ok(row) if row.iter().all(str::is_empty) => {}
                Ok(row) => match WorkoutRecord::from_row(&row, policy) {
                    Some(record) => records.push(record),
                    None if row.get(0) == Some(HEADER[0]) => {}
                    None => log::warn!("skipping malformed record on line {}: {row:?}", line + 1),
                },
                Err(e) => log::warn!("skipping unreadable record on line {}: {e}", line + 1),
            }
        }
        Ok(records)
    }
}

/// Single-integer file holding the accumulated exercise seconds
#[derive(Debug, Clone)]
pub struct Accumulator {
    path: PathBuf,
}

impl Accumulator {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn read(&self) -> Result<Option<u64>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };
        content
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StorageError::InvalidAccumulator {
                path: self.path.clone(),
                content,
            })
    }

    /// Overwrites the file
    pub fn write(&self, total_secs: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        fs::write(&self.path, total_secs.to_string()).map_err(|e| StorageError::io(&self.path, e))
    }
}

/// Sum of record totals, optionally limited to the last `window_days` days
pub fn accumulate(records: &[WorkoutRecord], policy: &LevelPolicy, today: NaiveDate) -> u64 {
    let cutoff = policy
        .window_days
        .and_then(|days| today.checked_sub_days(Days::new(days as u64)));

    records
        .iter()
        .filter(|r| cutoff.map_or(true, |cutoff| r.date() >= cutoff))
        .map(|r| r.total_secs)
        .sum()
}

/// Record log + accumulator under one level policy
#[derive(Debug, Clone)]
pub struct History {
    log: RecordLog,
    accumulator: Accumulator,
    policy: LevelPolicy,
}

impl History {
    pub fn new(log: RecordLog, accumulator: Accumulator, policy: LevelPolicy) -> Self {
        Self {
            log,
            accumulator,
            policy,
        }
    }

    pub fn in_dir<P: AsRef<Path>>(dir: P, policy: LevelPolicy) -> Self {
        let dir = dir.as_ref();
        Self::new(
            RecordLog::new(dir.join(crate::app_dirs::RECORDS_FILE)),
            Accumulator::new(dir.join(crate::app_dirs::ACCUMULATOR_FILE)),
            policy,
        )
    }

    pub fn policy(&self) -> &LevelPolicy {
        &self.policy
    }

    pub fn log(&self) -> &RecordLog {
        &self.log
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn records(&self) -> Result<Vec<WorkoutRecord>> {
        self.log.load(&self.policy)
    }

    /// Append the record of a finished workout
    pub fn record(&self, workout: &WorkoutConfig, now: NaiveDateTime) -> Result<WorkoutRecord> {
        let record = WorkoutRecord::from_workout(workout, now, &self.policy);
        self.log.append(&record)?;
        Ok(record)
    }

    /// Re-read the whole log, rewrite the accumulator and return its total
    pub fn recompute(&self, today: NaiveDate) -> Result<u64> {
        let records = self.records()?;
        let total = accumulate(&records, &self.policy, today);
        self.accumulator.write(total)?;
        Ok(total)
    }

    pub fn level(&self, total_secs: u64) -> Level {
        Level::for_total(total_secs, &self.policy)
    }
}
