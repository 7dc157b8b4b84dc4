use crate::cli::json_output::UpdateResponse;
use crate::cli::printer;
use crate::cli::root::Context;
use keyline::error::{KeylineError, Result};
use keyline::subprocess;
use keyline::version::{self, GithubReleases, ReleaseSource, Version};

const INSTALL_SCRIPT: &str = "curl -sSfL --retry 3 https://cli.keyline.dev/install.sh | sh";

pub fn run(ctx: &Context, force: bool) -> Result<()> {
    let current = version::current()?;
    let latest = GithubReleases::new(&ctx.http)?.latest_version()?;
    let available = latest > current;

    let installed = if available || force {
        install(&latest)?;
        true
    } else {
        tracing::info!("You are already running the latest version ({})", current);
        false
    };

    if ctx.json {
        return printer::json(&UpdateResponse {
            current: current.to_string(),
            latest: latest.to_string(),
            update_available: available,
            installed,
        });
    }
    Ok(())
}

/// Replace the running CLI with `latest`.
pub fn install(latest: &Version) -> Result<()> {
    if cfg!(windows) {
        return Err(KeylineError::Other(format!(
            "Keyline CLI {} is available. {}",
            latest,
            version::upgrade_instruction()
        )));
    }

    tracing::info!("Installing Keyline CLI {}", latest);
    let code = subprocess::run_shell(INSTALL_SCRIPT)?;
    if code != 0 {
        return Err(KeylineError::Other(format!(
            "Update failed: installer exited with code {}",
            code
        )));
    }
    tracing::info!("Installed Keyline CLI {}", latest);
    Ok(())
}
