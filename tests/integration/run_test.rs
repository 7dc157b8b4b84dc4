use predicates::prelude::*;
use tempfile::TempDir;

use super::support::{keyline_cmd, serve};

const DOWNLOAD: &str = r#"{"API_KEY":"sk-123","DB_URL":"postgres://localhost/app"}"#;

#[cfg(unix)]
#[test]
fn test_run_injects_secrets() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, DOWNLOAD)]);

    keyline_cmd(&home)
        .args([
            "--api-host",
            &url,
            "--token",
            "kl_test",
            "run",
            "-p",
            "backend",
            "-c",
            "dev",
            "--",
            "sh",
            "-c",
            "echo \"$API_KEY|$DB_URL\"",
        ])
        .assert()
        .success()
        .stdout("sk-123|postgres://localhost/app\n");
    server.join().unwrap();
}

#[cfg(unix)]
#[test]
fn test_run_forwards_child_exit_code() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, DOWNLOAD)]);

    let output = keyline_cmd(&home)
        .args([
            "--api-host", &url, "--token", "kl_test", "run", "-p", "backend", "-c", "dev", "--",
            "sh", "-c", "exit 42",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(42));
    server.join().unwrap();
}

#[cfg(unix)]
#[test]
fn test_run_hides_token_from_child() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, DOWNLOAD)]);

    keyline_cmd(&home)
        .env("KEYLINE_TOKEN", "kl_env")
        .env("KEYLINE_PROJECT", "backend")
        .env("KEYLINE_CONFIG", "dev")
        .args([
            "--api-host",
            &url,
            "run",
            "--",
            "sh",
            "-c",
            "echo \"token=[$KEYLINE_TOKEN]\"",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("token=[]"));

    let requests = server.join().unwrap();
    assert!(requests[0]
        .to_lowercase()
        .contains("authorization: bearer kl_env"));
}

#[test]
fn test_run_requires_command() {
    let home = TempDir::new().unwrap();
    keyline_cmd(&home)
        .args(["--token", "kl_test", "run", "-p", "backend", "-c", "dev"])
        .assert()
        .code(1);
}
