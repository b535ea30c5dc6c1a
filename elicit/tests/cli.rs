//! CLI tests for `elicit`.
//!
//! Spawns the binary and checks exit codes and printed JSON.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use elicit::exit_codes;
use elicit::io::config::{ElicitConfig, load_config};
use serde_json::{Value, json};

fn elicit_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_elicit"));
    cmd.current_dir(dir);
    cmd
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

#[test]
fn fixup_accepted_exits_ok() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = elicit_cmd(temp.path())
        .args([
            "fixup",
            "--input",
            r#"{"departure":"Berlin","arrival":"London","date":"2026-10-04","passengers":2}"#,
        ])
        .output()
        .expect("elicit fixup");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout_json(&output)["tag"], json!("accepted"));
}

#[test]
fn fixup_rejected_exits_with_rejected_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input_path = temp.path().join("input.json");
    std::fs::write(&input_path, r#"{"departure":"London","arrival":"Tokyo"}"#).expect("write");

    let output = elicit_cmd(temp.path())
        .args(["fixup", "--input-file"])
        .arg(&input_path)
        .output()
        .expect("elicit fixup");

    assert_eq!(output.status.code(), Some(exit_codes::REJECTED));
    let outcome = stdout_json(&output);
    assert_eq!(
        outcome["validationResults"]["arrival"]["allowedOptions"],
        json!(["New York"])
    );
}

#[test]
fn fixup_schema_violation_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = elicit_cmd(temp.path())
        .args(["fixup", "--input", r#"{"passengers":0}"#])
        .output()
        .expect("elicit fixup");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("schema validation failed"));
}

#[test]
fn custom_flights_file_is_used() {
    let temp = tempfile::tempdir().expect("tempdir");
    let flights = temp.path().join("flights.json");
    std::fs::write(
        &flights,
        r#"[{"departure":"Oslo","arrival":"Rome","date":"2026-11-01","seats":3}]"#,
    )
    .expect("write");

    let output = elicit_cmd(temp.path())
        .arg("--flights")
        .arg(&flights)
        .args(["fixup", "--input", "{}"])
        .output()
        .expect("elicit fixup");

    assert_eq!(output.status.code(), Some(exit_codes::REJECTED));
    assert_eq!(
        stdout_json(&output)["validationResults"]["departure"]["allowedOptions"],
        json!(["Oslo"])
    );
}

#[test]
fn ask_reads_answers_from_stdin() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut child = elicit_cmd(temp.path())
        .args(["ask", "--set", "departure=Berlin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn elicit ask");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"London\n2026-10-04\n2\n")
        .expect("write answers");
    let output = child.wait_with_output().expect("wait");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please provide a value for `arrival`."));
    assert!(stderr.contains("passengers> "));
    assert_eq!(
        stdout_json(&output),
        json!({
            "departure": "Berlin",
            "arrival": "London",
            "date": "2026-10-04",
            "passengers": 2,
        })
    );
}

#[test]
fn ask_refuses_when_no_option_is_left() {
    let temp = tempfile::tempdir().expect("tempdir");
    let flights = temp.path().join("flights.json");
    std::fs::write(&flights, "[]").expect("write");

    let mut child = elicit_cmd(temp.path())
        .arg("--flights")
        .arg(&flights)
        .arg("ask")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn elicit ask");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"Anywhere\n")
        .expect("write answers");
    let output = child.wait_with_output().expect("wait");

    assert_eq!(output.status.code(), Some(exit_codes::REFUSED));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no options available for 'departure'"));
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("elicit.toml");

    let output = elicit_cmd(temp.path()).arg("init").output().expect("elicit init");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&config).expect("load"), ElicitConfig::default());

    std::fs::write(&config, "max_steps = 7\n").expect("edit config");
    let output = elicit_cmd(temp.path()).arg("init").output().expect("elicit init");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&config).expect("load").max_steps, 7);

    let output = elicit_cmd(temp.path())
        .args(["init", "--force"])
        .output()
        .expect("elicit init --force");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&config).expect("load"), ElicitConfig::default());
}

#[test]
fn check_prints_evaluation_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = elicit_cmd(temp.path())
        .arg("check")
        .output()
        .expect("elicit check");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("arrival: requires [departure], influenced_by [date]"));
    assert!(stdout.contains("evaluation order: departure -> arrival -> date -> passengers"));
}
