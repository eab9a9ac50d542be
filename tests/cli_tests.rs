use assert_cmd::Command;
use predicates::prelude::*;

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn help_lists_flags() {
    Command::cargo_bin("diff-review")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--no-highlight"));
}

#[test]
fn fails_outside_a_repository() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("diff-review")
        .unwrap()
        .current_dir(dir.path())
        .env("GIT_CEILING_DIRECTORIES", dir.path().parent().unwrap())
        .arg("--repo")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn malformed_config_fails_before_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[display\n").unwrap();
    Command::cargo_bin("diff-review")
        .unwrap()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}
