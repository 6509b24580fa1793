//! Exit status of the `trap_runner` binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_config(dir: &TempDir, units: &str) -> PathBuf {
    let path = dir.path().join("runner.toml");
    let content = format!(
        r#"
[shared]
log_level = "warn"
service_name = "cli-test"

[trap]
mode = "checkpoint-resume"
{units}"#
    );
    fs::write(&path, content).unwrap();
    path
}

fn run_runner(config: &std::path::Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trap_runner"))
        .arg("--config")
        .arg(config)
        .output()
        .expect("spawn trap_runner")
}

#[test]
fn all_units_completing_exits_zero() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[[unit]]
name = "ok"
depth = 3

[[unit]]
name = "recovers"
depth = 5
checkpoint_at = 2
fail = "handled inside"
"#,
    );

    let output = run_runner(&path);
    assert!(output.status.success(), "status: {:?}", output.status);
}

#[test]
fn failed_unit_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[[unit]]
name = "fails"
depth = 4
fail = "bad input"
"#,
    );

    let output = run_runner(&path);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_config_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let output = run_runner(&dir.path().join("absent.toml"));
    assert_eq!(output.status.code(), Some(1));
}
