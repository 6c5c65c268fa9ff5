use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

// Isolated home so the user's config and exercise document never leak into a run.
fn repcount(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("repcount").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(home.path().join("config.json"));
    cmd
}

// One JSON line with the left elbow bent to `degrees`.
fn elbow_line(seq: u64, degrees: f64) -> String {
    let t = degrees.to_radians();
    format!(
        r#"{{"seq": {seq}, "joints": {{"left_shoulder": {{"x": 1.0, "y": 0.0, "visibility": 0.9}}, "left_elbow": {{"x": 0.0, "y": 0.0, "visibility": 0.9}}, "left_wrist": {{"x": {:.6}, "y": {:.6}, "visibility": 0.9}}}}}}"#,
        t.cos(),
        t.sin()
    )
}

fn write_frames(path: &Path, angles: &[f64]) {
    let lines: Vec<String> = angles
        .iter()
        .enumerate()
        .map(|(seq, deg)| elbow_line(seq as u64, *deg))
        .collect();
    fs::write(path, lines.join("\n")).unwrap();
}

#[test]
fn test_help_command() {
    let home = tempdir().unwrap();
    repcount(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("count"));
}

#[test]
fn test_list_bundled_catalog() {
    let home = tempdir().unwrap();
    repcount(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("squat"))
        .stdout(predicate::str::contains("overhead_press"))
        .stdout(predicate::str::contains("Push-up"));
}

#[test]
fn test_list_custom_catalog() {
    let home = tempdir().unwrap();
    let doc = home.path().join("exercises.json");
    fs::write(
        &doc,
        r#"{"exercises": {"wall_sit": {"down_angle": 95, "up_angle": 150, "left_points": [23, 25, 27], "right_points": [24, 26, 28], "is_leg_exercise": true}}}"#,
    )
    .unwrap();

    repcount(&home)
        .arg("list")
        .arg("--catalog")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("wall_sit"))
        .stdout(predicate::str::contains("legs"))
        .stdout(predicate::str::contains("squat").not());
}

#[test]
fn test_check_reports_rejected_definitions() {
    let home = tempdir().unwrap();
    let doc = home.path().join("exercises.json");
    fs::write(
        &doc,
        r#"{"exercises": {
            "curl": {"down_angle": 50, "up_angle": 150, "left_points": [11, 13, 15], "right_points": [12, 14, 16]},
            "broken": {"down_angle": 90, "up_angle": 90, "left_points": [11, 13, 15], "right_points": [12, 14, 16]}
        }}"#,
    )
    .unwrap();

    repcount(&home)
        .arg("check")
        .arg(&doc)
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 valid exercise definition(s)"))
        .stdout(predicate::str::contains("rejected"))
        .stdout(predicate::str::contains("broken"));
}

#[test]
fn test_check_valid_document() {
    let home = tempdir().unwrap();
    let doc = home.path().join("exercises.json");
    fs::write(
        &doc,
        r#"{"exercises": {"curl": {"down_angle": 50, "up_angle": 150, "left_points": [11, 13, 15], "right_points": [12, 14, 16]}}}"#,
    )
    .unwrap();

    repcount(&home)
        .arg("check")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 valid exercise definition(s)"));
}

#[test]
fn test_check_missing_file_fails() {
    let home = tempdir().unwrap();
    repcount(&home)
        .arg("check")
        .arg(home.path().join("nope.json"))
        .assert()
        .failure();
}

#[test]
fn test_count_from_file() {
    let home = tempdir().unwrap();
    let frames = home.path().join("frames.jsonl");
    write_frames(&frames, &[165.0, 85.0, 165.0, 85.0, 165.0]);

    repcount(&home)
        .args(["count", "--exercise", "pushup", "--quiet", "--input"])
        .arg(&frames)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"rep_completed""#))
        .stdout(predicate::str::contains(r#""new_count":2"#))
        .stdout(predicate::str::contains("angle_sample").not())
        .stderr(predicate::str::contains("pushup: 2 rep(s) from 5 frame(s), 0 dropped"));
}

#[test]
fn test_count_from_stdin_with_csv_log() {
    let home = tempdir().unwrap();
    let csv = home.path().join("log").join("events.csv");
    let input: Vec<String> = [40.0, 160.0, 40.0, 160.0]
        .iter()
        .enumerate()
        .map(|(seq, deg)| elbow_line(seq as u64, *deg))
        .collect();

    repcount(&home)
        .args(["count", "--exercise", "bicep_curl", "--milestone-interval", "2", "--csv"])
        .arg(&csv)
        .write_stdin(input.join("\n"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"milestone_reached""#))
        .stdout(predicate::str::contains(r#""event":"angle_sample""#));

    let logged = fs::read_to_string(&csv).unwrap();
    assert!(logged.starts_with("date,event,exercise_id,side,angle,phase,count"));
    assert!(logged.contains("rep_completed"));
}

#[test]
fn test_count_unknown_exercise_fails() {
    let home = tempdir().unwrap();
    let frames = home.path().join("frames.jsonl");
    write_frames(&frames, &[165.0]);

    repcount(&home)
        .args(["count", "--exercise", "burpee", "--input"])
        .arg(&frames)
        .assert()
        .failure()
        .stderr(predicate::str::contains("burpee"));
}

#[test]
fn test_count_rejects_malformed_frames() {
    let home = tempdir().unwrap();
    let frames = home.path().join("frames.jsonl");
    fs::write(&frames, format!("{}\nnot json\n", elbow_line(0, 165.0))).unwrap();

    repcount(&home)
        .args(["count", "--exercise", "pushup", "--input"])
        .arg(&frames)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_count_rejects_nan_confidence() {
    let home = tempdir().unwrap();
    let frames = home.path().join("frames.jsonl");
    write_frames(&frames, &[165.0]);

    repcount(&home)
        .args(["count", "--exercise", "pushup", "--min-confidence", "NaN", "--input"])
        .arg(&frames)
        .assert()
        .failure()
        .stderr(predicate::str::contains("min-confidence"));
}

#[test]
fn test_first_run_writes_default_config() {
    let home = tempdir().unwrap();
    repcount(&home).arg("list").assert().success();

    let written = fs::read_to_string(home.path().join("config.json")).unwrap();
    assert!(written.contains("\"default_exercise\": \"overhead_press\""));
}
