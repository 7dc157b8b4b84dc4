use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use assert_cmd::Command;
use tempfile::TempDir;

const KEYLINE_ENV: [&str; 8] = [
    "KEYLINE_TOKEN",
    "KEYLINE_API_HOST",
    "KEYLINE_DASHBOARD_HOST",
    "KEYLINE_VERIFY_TLS",
    "KEYLINE_PROJECT",
    "KEYLINE_CONFIG",
    "KEYLINE_CONFIG_DIR",
    "KEYLINE_ENABLE_VERSION_CHECK",
];

/// A `keyline` command isolated in `home`, with no ambient configuration.
pub fn keyline_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("keyline").unwrap();
    cmd.env("HOME", home.path());
    for var in KEYLINE_ENV {
        cmd.env_remove(var);
    }
    cmd.env("KEYLINE_NON_INTERACTIVE", "1");
    cmd.env("KEYLINE_ENABLE_VERSION_CHECK", "false");
    cmd.current_dir(home.path());
    cmd
}

pub fn config_path(home: &TempDir) -> PathBuf {
    home.path().join(".keyline").join("keyline.toml")
}

pub fn write_config(home: &TempDir, content: &str) {
    let path = config_path(home);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Answer canned `(status, body)` responses in order on a local port.
/// Returns the base URL and a handle yielding the raw requests.
///
/// Mirrors `keyline::http::testing::serve`, which is `cfg(test)` and so not
/// visible to this test target.
pub fn serve(responses: Vec<(u16, &str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let responses: Vec<(u16, String)> = responses
        .into_iter()
        .map(|(status, body)| (status, body.to_string()))
        .collect();

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));
            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}
