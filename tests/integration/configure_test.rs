use predicates::prelude::*;
use tempfile::TempDir;

use super::support::{config_path, keyline_cmd, write_config};

const ROOT_TOKEN_CONFIG: &str = r#"
[scoped."/"]
token = "file-token"
"#;

#[test]
fn test_flag_overrides_config_for_one_invocation() {
    let home = TempDir::new().unwrap();
    write_config(&home, ROOT_TOKEN_CONFIG);
    let before = std::fs::read_to_string(config_path(&home)).unwrap();

    keyline_cmd(&home)
        .args(["--token", "flag-token", "configure", "get", "token", "--plain"])
        .assert()
        .success()
        .stdout("flag-token\n");

    // the override is never written back
    let after = std::fs::read_to_string(config_path(&home)).unwrap();
    assert_eq!(before, after);

    keyline_cmd(&home)
        .args(["configure", "get", "token", "--plain"])
        .assert()
        .success()
        .stdout("file-token\n");
}

#[test]
fn test_env_overrides_config_unless_disabled() {
    let home = TempDir::new().unwrap();
    write_config(&home, ROOT_TOKEN_CONFIG);

    keyline_cmd(&home)
        .env("KEYLINE_TOKEN", "env-token")
        .args(["configure", "get", "token", "--plain"])
        .assert()
        .success()
        .stdout("env-token\n");

    keyline_cmd(&home)
        .env("KEYLINE_TOKEN", "env-token")
        .args(["--no-read-env", "configure", "get", "token", "--plain"])
        .assert()
        .success()
        .stdout("file-token\n");
}

#[test]
fn test_deepest_scope_wins() {
    let home = TempDir::new().unwrap();
    write_config(
        &home,
        r#"
[scoped."/"]
project = "root-project"

[scoped."/work/app"]
project = "app-project"
"#,
    );

    keyline_cmd(&home)
        .args(["--scope", "/work/app/src", "configure", "get", "project", "--plain"])
        .assert()
        .success()
        .stdout("app-project\n");

    keyline_cmd(&home)
        .args(["--scope", "/elsewhere", "configure", "get", "project", "--plain"])
        .assert()
        .success()
        .stdout("root-project\n");
}

#[test]
fn test_set_and_unset_persist() {
    let home = TempDir::new().unwrap();

    keyline_cmd(&home)
        .args([
            "--scope",
            "/work/app",
            "configure",
            "set",
            "project=backend",
            "config=dev",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("backend"));

    let content = std::fs::read_to_string(config_path(&home)).unwrap();
    assert!(content.contains("[scoped.\"/work/app\"]"));
    assert!(content.contains("project = \"backend\""));

    keyline_cmd(&home)
        .args(["--scope", "/work/app", "configure", "unset", "project", "config"])
        .assert()
        .success();

    let content = std::fs::read_to_string(config_path(&home)).unwrap();
    assert!(!content.contains("/work/app"));
}

#[test]
fn test_set_unknown_option_fails() {
    let home = TempDir::new().unwrap();
    keyline_cmd(&home)
        .args(["configure", "set", "password=hunter2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration option"));
    assert!(!config_path(&home).exists());
}

#[test]
fn test_show_all_scopes_json() {
    let home = TempDir::new().unwrap();
    write_config(
        &home,
        r#"
[scoped."/"]
token = "root-token"

[scoped."/work"]
config = "stg"
"#,
    );

    let output = keyline_cmd(&home)
        .args(["--json", "configure", "--all"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let scopes = json.as_array().unwrap();
    assert_eq!(scopes.len(), 2);
    assert_eq!(scopes[0]["scope"], "/");
    assert_eq!(scopes[0]["options"]["token"], "root-token");
    assert_eq!(scopes[1]["options"]["config"], "stg");
}

#[test]
fn test_reset_requires_confirmation() {
    let home = TempDir::new().unwrap();
    write_config(&home, ROOT_TOKEN_CONFIG);

    keyline_cmd(&home)
        .args(["configure", "reset"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    keyline_cmd(&home)
        .args(["configure", "reset", "--yes"])
        .assert()
        .success();

    let content = std::fs::read_to_string(config_path(&home)).unwrap();
    assert!(!content.contains("file-token"));
}

#[test]
fn test_silent_suppresses_info() {
    let home = TempDir::new().unwrap();

    keyline_cmd(&home)
        .args(["configure", "set", "project=backend"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved configuration"));

    keyline_cmd(&home)
        .args(["--silent", "configure", "set", "config=dev"])
        .assert()
        .success()
        .stderr("");
}

#[test]
fn test_print_config_ignores_silent() {
    let home = TempDir::new().unwrap();
    write_config(&home, ROOT_TOKEN_CONFIG);

    keyline_cmd(&home)
        .args(["--silent", "--print-config", "configure", "get", "token", "--plain"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Active configuration\n"))
        .stdout(predicate::str::contains("file-token"))
        .stdout(predicate::str::contains("config file"));
}

#[test]
fn test_print_config_json_reports_sources() {
    let home = TempDir::new().unwrap();
    write_config(&home, ROOT_TOKEN_CONFIG);

    keyline_cmd(&home)
        .args(["--print-config", "--json", "--api-host", "http://localhost:9"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""source": "flag""#))
        .stdout(predicate::str::contains(r#""source": "config_file""#))
        .stdout(predicate::str::contains(r#""source": "default""#));
}

#[test]
fn test_debug_with_silent_warns() {
    let home = TempDir::new().unwrap();
    keyline_cmd(&home)
        .args(["--debug", "--silent", "configure", "get", "token"])
        .assert()
        .success()
        .stderr(predicate::str::contains("--silent has no effect when used with --debug"))
        .stderr(predicate::str::contains("Warning:").not());
}
