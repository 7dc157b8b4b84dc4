use std::collections::BTreeMap;
use std::process::Command;

use crate::config::options::ConfigOption;
use crate::error::{KeylineError, Result};

/// Run a subprocess with the given secrets injected as environment variables.
/// Returns the exit code of the subprocess.
pub fn run_with_secrets(command: &[String], secrets: &BTreeMap<String, String>) -> Result<i32> {
    if command.is_empty() {
        return Err(KeylineError::Other("No command specified".into()));
    }

    tracing::debug!(
        "Running '{}' with {} secret(s) injected",
        command[0],
        secrets.len()
    );
    let status = Command::new(&command[0])
        .args(&command[1..])
        .envs(secrets)
        .env_remove(ConfigOption::Token.env_var())
        .status()
        .map_err(|e| KeylineError::Other(format!("Failed to run command '{}': {}", command[0], e)))?;

    Ok(status.code().unwrap_or(1))
}

/// Run a script through the platform shell and return its exit code.
pub fn run_shell(script: &str) -> Result<i32> {
    let status = if cfg!(windows) {
        Command::new("cmd").args(["/C", script]).status()
    } else {
        Command::new("sh").args(["-c", script]).status()
    }
    .map_err(|e| KeylineError::Other(format!("Failed to run shell: {}", e)))?;

    Ok(status.code().unwrap_or(1))
}
