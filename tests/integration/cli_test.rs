use predicates::prelude::*;
use tempfile::TempDir;

use super::support::{config_path, keyline_cmd};

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    keyline_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("The official Keyline CLI"))
        .stdout(predicate::str::contains("--no-check-version"))
        .stdout(predicate::str::contains("--print-config"));
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    for flag in ["--version", "-v"] {
        keyline_cmd(&home)
            .arg(flag)
            .assert()
            .success()
            .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
    }
}

#[test]
fn test_no_subcommand_prints_usage() {
    let home = TempDir::new().unwrap();
    keyline_cmd(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_unknown_flag_exits_one() {
    let home = TempDir::new().unwrap();
    let output = keyline_cmd(&home).arg("--bogus").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_timeout_exits_one() {
    let home = TempDir::new().unwrap();
    let output = keyline_cmd(&home)
        .args(["--timeout", "whenever", "configure"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_read_only_commands_do_not_create_config() {
    let home = TempDir::new().unwrap();
    keyline_cmd(&home)
        .args(["--no-check-version", "configure", "get", "api-host", "--plain"])
        .assert()
        .success()
        .stdout("https://api.keyline.dev\n");
    assert!(!config_path(&home).exists());
}
