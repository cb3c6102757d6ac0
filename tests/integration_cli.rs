// The non-interactive subcommands, run through the compiled binary.

use std::fs;
use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use tempfile::tempdir;

fn movestay(dir: &Path, args: &[&str]) -> Output {
    Command::cargo_bin("movestay")
        .unwrap()
        .arg("--config")
        .arg(dir.join("config.json"))
        .arg("--data-dir")
        .arg(dir)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_log(dir: &Path) {
    fs::write(
        dir.join("workout_log.csv"),
        "timestamp,exercise_secs,sets,total_secs,level\n\
         2020-01-01 08:00:00,30,3,90,Lv 0\n\
         not,a,record\n\
         2020-01-02,60\n",
    )
    .unwrap();
}

#[test]
fn level_recomputes_the_accumulator() {
    let dir = tempdir().unwrap();
    write_log(dir.path());

    let output = movestay(dir.path(), &["--all-time", "level"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Lv 1"), "{text}");
    assert!(text.contains("150s all time"), "{text}");
    assert_eq!(
        fs::read_to_string(dir.path().join("total_time.txt")).unwrap(),
        "150"
    );
}

#[test]
fn windowed_level_ignores_old_records() {
    let dir = tempdir().unwrap();
    write_log(dir.path());

    let output = movestay(dir.path(), &["--window-days", "30", "level"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Lv 0"), "{text}");
    assert!(text.contains("0s in the last 30 days"), "{text}");
}

#[test]
fn records_lists_newest_first() {
    let dir = tempdir().unwrap();
    write_log(dir.path());

    let output = movestay(dir.path(), &["records"]);
    assert!(output.status.success());

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2020-01-02 00:00:00"));
    assert!(lines[1].starts_with("2020-01-01 08:00:00"));
}

#[test]
fn records_on_empty_data_dir() {
    let dir = tempdir().unwrap();
    let output = movestay(dir.path(), &["records"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "no records");
}

#[test]
fn config_prints_effective_settings() {
    let dir = tempdir().unwrap();
    let output = movestay(dir.path(), &["--save-on-abort", "--sets", "5", "config"]);
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["save_policy"], "always");
    assert_eq!(config["workout"]["sets"], 5);
    assert_eq!(config["timing"]["pir_samples"], 3);
}

#[test]
fn config_write_persists_overrides() {
    let dir = tempdir().unwrap();
    assert!(!dir.path().join("config.json").exists());

    let output = movestay(dir.path(), &["--sets", "5", "--all-time", "config", "--write"]);
    assert!(output.status.success());
    assert!(dir.path().join("config.json").exists());

    // A later run with no overrides picks up the saved settings
    let output = movestay(dir.path(), &["config"]);
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["workout"]["sets"], 5);
    assert!(config["level"]["window_days"].is_null());
}

#[test]
fn plain_config_does_not_write() {
    let dir = tempdir().unwrap();
    let output = movestay(dir.path(), &["--sets", "5", "config"]);
    assert!(output.status.success());
    assert!(!dir.path().join("config.json").exists());
}

#[test]
fn log_file_lands_in_the_data_dir() {
    let dir = tempdir().unwrap();
    let output = movestay(dir.path(), &["level"]);
    assert!(output.status.success());
    assert!(dir.path().join("movestay.log").exists());
}
