#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::io::Write;
use tempfile::NamedTempFile;

const SCHEDULE: &str = "\
CRN,Actv,Days,Time,Bldg/Rm
40101,LEC,MWF,9:00-9:50am,HALL 101
40102,LEC,TR,11:00-1:50pm,HALL 101
40103,LEC,MW,10:00-11:15am,SCI 210
40104,LAB,MW,9:00-11:50am,SCI 110
";

fn schedule_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp file");
    file.write_all(SCHEDULE.as_bytes()).expect("write schedule");
    file
}

#[allow(deprecated)]
fn run_cli(schedule: &NamedTempFile, script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.arg(schedule.path())
        .env_remove("ROOM_FINDER_SCHEDULE")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_reports_loaded_schedule() {
    let file = schedule_file();
    run_cli(&file, "quit\n")
        .success()
        .stdout(str_contains("3 meetings, 2 rooms"));
}

#[test]
fn cli_find_lists_available_and_occupied() {
    let file = schedule_file();
    let assert = run_cli(&file, "find M 09:30 10:30\nquit\n").success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let occupied = output.split("Occupied:").nth(1).unwrap_or_default();
    assert!(occupied.contains("HALL 101"), "output:\n{output}");
    assert!(occupied.contains("SCI 210"), "output:\n{output}");
    assert!(!output.contains("SCI 110"), "lab room leaked:\n{output}");
}

#[test]
fn cli_find_json_output() {
    let file = schedule_file();
    run_cli(&file, "find T 12:00 13:00 json\nquit\n")
        .success()
        .stdout(str_contains("\"available\""))
        .stdout(str_contains("\"SCI 210\""));
}

#[test]
fn cli_ask_prompts_for_each_value() {
    let file = schedule_file();
    run_cli(&file, "ask\nW\n09:50\n10:00\nquit\n")
        .success()
        .stdout(str_contains("What day are you looking at (M/T/W/R/F)?"))
        .stdout(str_contains("Until what time (military, HH:MM)?"))
        .stdout(str_contains("Available rooms:\n  HALL 101\n  SCI 210"));
}

#[test]
fn cli_rejects_invalid_query() {
    let file = schedule_file();
    run_cli(&file, "find S 09:00 10:00\nfind M 11:00 10:00\nquit\n")
        .success()
        .stdout(str_contains("invalid query"));
}

#[test]
fn cli_room_shows_meetings_on_day() {
    let file = schedule_file();
    run_cli(&file, "room HALL 101 R\nroom SCI 210 F\nquit\n")
        .success()
        .stdout(str_contains("11:00-13:50 40102"))
        .stdout(str_contains("SCI 210 has no meetings on"));
}

#[test]
fn cli_summary_counts_dropped_rows() {
    let file = schedule_file();
    run_cli(&file, "summary\nquit\n")
        .success()
        .stdout(str_contains("4 rows read, 3 kept"));
}

#[test]
#[allow(deprecated)]
fn cli_fails_when_schedule_is_missing() {
    Command::cargo_bin("cli")
        .expect("cli binary")
        .arg("/no/such/schedule.csv")
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(str_contains("unavailable"));
}
