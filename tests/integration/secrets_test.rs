use predicates::prelude::*;
use tempfile::TempDir;

use super::support::{keyline_cmd, serve};

const SECRETS: &str = r#"{"secrets":{"API_KEY":{"raw":"sk-123","computed":"sk-123"},"DB_URL":{"raw":"${HOST}/db","computed":"pg.local/db"}}}"#;
const DOWNLOAD: &str = r#"{"API_KEY":"sk-123","GREETING":"hello world"}"#;

fn base_args(url: &str) -> Vec<String> {
    ["--api-host", url, "--token", "kl_test", "secrets", "-p", "backend", "-c", "dev"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_list_secrets() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, SECRETS)]);

    keyline_cmd(&home)
        .args(base_args(&url))
        .assert()
        .success()
        .stdout(predicate::str::contains("API_KEY"))
        .stdout(predicate::str::contains("pg.local/db"));

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("GET /v3/configs/config/secrets?project=backend&config=dev "));
}

#[test]
fn test_list_only_names() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, SECRETS)]);

    let mut args = base_args(&url);
    args.push("--only-names".into());
    keyline_cmd(&home)
        .args(args)
        .assert()
        .success()
        .stdout("API_KEY\nDB_URL\n");
    server.join().unwrap();
}

#[test]
fn test_get_plain_in_argument_order() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, SECRETS)]);

    let mut args = base_args(&url);
    args.extend(["get", "DB_URL", "API_KEY", "--plain"].map(String::from));
    keyline_cmd(&home)
        .args(args)
        .assert()
        .success()
        .stdout("pg.local/db\nsk-123\n");
    server.join().unwrap();
}

#[test]
fn test_get_raw_value() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, SECRETS)]);

    let mut args = base_args(&url);
    args.extend(["get", "DB_URL", "--plain", "--raw"].map(String::from));
    keyline_cmd(&home)
        .args(args)
        .assert()
        .success()
        .stdout("${HOST}/db\n");
    server.join().unwrap();
}

#[test]
fn test_get_unknown_secret_json_error() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, SECRETS)]);

    let mut args = base_args(&url);
    args.extend(["get", "NOPE", "--json"].map(String::from));
    let output = keyline_cmd(&home).args(args).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(json["error"]["code"], "not_found");
    server.join().unwrap();
}

#[test]
fn test_set_posts_changes() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(
        200,
        r#"{"secrets":{"API_KEY":{"raw":"sk-123","computed":"sk-123"},"NEW":{"raw":"a=b","computed":"a=b"}}}"#,
    )]);

    let mut args = base_args(&url);
    args.extend(["--json", "set", "NEW=a=b"].map(String::from));
    let output = keyline_cmd(&home).args(args).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["NEW"]["computed"], "a=b");
    assert!(json.get("API_KEY").is_none());

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("POST /v3/configs/config/secrets "));
    assert!(requests[0].contains(r#""secrets":{"NEW":"a=b"}"#));
}

#[test]
fn test_delete_requires_yes_when_non_interactive() {
    let home = TempDir::new().unwrap();
    keyline_cmd(&home)
        .args(["--token", "kl_test", "secrets", "-p", "backend", "-c", "dev", "delete", "API_KEY"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_delete_sends_null() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, r#"{"secrets":{}}"#)]);

    let mut args = base_args(&url);
    args.extend(["delete", "API_KEY", "--yes"].map(String::from));
    keyline_cmd(&home).args(args).assert().success();

    let requests = server.join().unwrap();
    assert!(requests[0].contains(r#""secrets":{"API_KEY":null}"#));
}

#[test]
fn test_download_no_file_is_silent() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, DOWNLOAD)]);

    let mut args = base_args(&url);
    args.extend(["download", "--no-file", "--format", "env"].map(String::from));
    keyline_cmd(&home)
        .args(args)
        .assert()
        .success()
        .stdout("API_KEY=sk-123\nGREETING=\"hello world\"\n")
        .stderr("");

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("GET /v3/configs/config/secrets/download?"));
    assert!(requests[0].contains("format=json"));
}

#[test]
fn test_download_to_file() {
    let home = TempDir::new().unwrap();
    let (url, server) = serve(vec![(200, DOWNLOAD)]);
    let out = home.path().join("secrets.json");

    let mut args = base_args(&url);
    args.extend(["download", "--output", out.to_str().unwrap()].map(String::from));
    keyline_cmd(&home)
        .args(args)
        .assert()
        .success()
        .stderr(predicate::str::contains("Downloaded 2 secret(s)"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["GREETING"], "hello world");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&out).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
    server.join().unwrap();
}
