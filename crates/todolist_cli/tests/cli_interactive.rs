use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn run_interactive(dir: &Path, script: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_todolist"))
        .env("TODOLIST_STORE_PATH", dir.join("storage.json"))
        .env("TODOLIST_CONFIG_PATH", dir.join("config.json"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start interactive session");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(script.as_bytes())
        .expect("failed to write script");

    child.wait_with_output().expect("failed to wait for session")
}

#[test]
fn interactive_session_runs_commands_until_exit() {
    let dir = TempDir::new().unwrap();
    let output = run_interactive(
        dir.path(),
        "add \"Buy milk\"\nlist --json\nexit\nadd \"never reached\"\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Buy milk"));
    assert!(stdout.contains("\"text\":\"Buy milk\""));
    assert!(!stdout.contains("never reached"));
}

#[test]
fn interactive_session_reports_errors_and_continues() {
    let dir = TempDir::new().unwrap();
    let output = run_interactive(dir.path(), "done abc\nadd \"oops\nadd fine\n");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("ERROR: invalid_input").count(), 2);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: fine"));
}

#[test]
fn interactive_help_prints_usage() {
    let dir = TempDir::new().unwrap();
    let output = run_interactive(dir.path(), "help\nquit\n");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}
