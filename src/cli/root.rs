//! Pre-run hooks shared by every command: flag translation, configuration
//! load, `--print-config` and the update check.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cli::{printer, update, Cli, Commands};
use keyline::config::active::{ActiveConfig, Overrides};
use keyline::config::options::{parse_bool_env, ConfigOption};
use keyline::config::{self, UserConfig};
use keyline::error::Result;
use keyline::http::HttpSettings;
use keyline::logging::{self, Verbosity};
use keyline::version::{self, CheckOutcome, GithubReleases, ReleaseSource, Version};

const NON_INTERACTIVE_ENV: &str = "KEYLINE_NON_INTERACTIVE";

/// Everything a command needs after the pre-run hooks.
pub struct Context {
    pub config_path: PathBuf,
    pub config: UserConfig,
    pub active: ActiveConfig,
    pub http: HttpSettings,
    pub verbosity: Verbosity,
    pub json: bool,
}

/// Flag values translated into settings, before any file is read.
#[derive(Debug)]
pub struct Flags {
    pub scope: PathBuf,
    pub config_path: PathBuf,
    pub overrides: Overrides,
    pub read_env: bool,
    pub timeout: Option<std::time::Duration>,
    pub debug: bool,
    pub silent: bool,
    pub json: bool,
    pub check_version: bool,
}

pub fn load_flags(cli: &Cli) -> Result<Flags> {
    let global = &cli.global;
    let scope = config::normalize_scope(&global.scope)?;

    let config_path = global
        .configuration
        .as_ref()
        .map(|p| PathBuf::from(config::expand_tilde(&p.to_string_lossy())))
        .unwrap_or_else(config::default_config_path);

    let mut overrides = Overrides::default();
    if let Some(ref token) = global.token {
        overrides.set(ConfigOption::Token, token);
    }
    if let Some(ref host) = global.api_host {
        overrides.set(ConfigOption::ApiHost, host);
    }
    if let Some(ref host) = global.dashboard_host {
        overrides.set(ConfigOption::DashboardHost, host);
    }
    if global.no_verify_tls {
        overrides.set(ConfigOption::VerifyTls, "false");
    }

    let read_env = !global.no_read_env;
    let silent = global.silent
        || cli
            .command
            .as_ref()
            .is_some_and(|c| c.forces_silent());
    let env_allows_check = !read_env || parse_bool_env(version::ENABLE_CHECK_ENV).unwrap_or(true);

    Ok(Flags {
        scope,
        config_path,
        overrides,
        read_env,
        timeout: (!global.no_timeout).then_some(global.timeout),
        debug: global.debug,
        silent,
        json: global.json,
        check_version: !global.no_check_version && env_allows_check,
    })
}

pub fn prerun(cli: &Cli) -> Result<Context> {
    let flags = load_flags(cli)?;
    let verbosity = Verbosity::from_flags(flags.debug, flags.silent);
    logging::init(verbosity);

    let config = UserConfig::load(&flags.config_path)?;

    if flags.debug && flags.silent {
        tracing::warn!("--silent has no effect when used with --debug");
    }

    let active = ActiveConfig::resolve(&config, &flags.scope, &flags.overrides, flags.read_env)?;
    let http = HttpSettings {
        timeout: flags.timeout,
        verify_tls: active.verify_tls(),
    };

    let mut ctx = Context {
        config_path: flags.config_path,
        config,
        active,
        http,
        verbosity,
        json: flags.json,
    };

    // this output does not honor --silent
    if cli.global.print_config {
        println!("Active configuration");
        printer::active_config(&ctx.active, ctx.json)?;
        println!();
    }

    // only check if the result can be printed
    if ctx.verbosity.can_log_info() && flags.check_version {
        check_version(&mut ctx, cli.command.as_ref());
    }

    Ok(ctx)
}

/// Best-effort update check; never fails the command.
fn check_version(ctx: &mut Context, command: Option<&Commands>) {
    if command.is_some_and(|c| c.skips_version_check()) || version::is_development() {
        return;
    }

    let now = Utc::now();
    if !ctx.config.version_check().is_due(now) {
        return;
    }

    let current = match version::current() {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Skipping update check: {}", e);
            return;
        }
    };
    let source = match GithubReleases::new(&ctx.http) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!("Skipping update check: {}", e);
            return;
        }
    };

    match record_check(&mut ctx.config, &ctx.config_path, &current, now, &source) {
        CheckOutcome::NotDue | CheckOutcome::Failed => {}
        CheckOutcome::UpToDate => tracing::debug!("No CLI updates available"),
        CheckOutcome::UpdateAvailable(latest) => offer_update(&latest),
    }
}

/// Evaluate the gate against `source` and persist the new record, if any.
fn record_check(
    config: &mut UserConfig,
    path: &Path,
    current: &Version,
    now: DateTime<Utc>,
    source: &dyn ReleaseSource,
) -> CheckOutcome {
    let result = version::evaluate(&config.version_check(), current, now, source);
    if let Some(record) = result.record {
        config.set_version_check(record);
        if let Err(e) = config.save(path) {
            tracing::debug!("Unable to save version check: {}", e);
        }
    }
    result.outcome
}

fn offer_update(latest: &Version) {
    if cfg!(windows) {
        tracing::info!("Update: Keyline CLI {} is available\n", latest);
        tracing::info!("{}", version::upgrade_instruction());
        return;
    }

    tracing::info!("{}", console::style("An update is available.").green());
    if !is_interactive() {
        tracing::info!(
            "Keyline CLI {} is available. {}",
            latest,
            version::upgrade_instruction()
        );
        return;
    }

    let install = dialoguer::Confirm::new()
        .with_prompt(format!("Install Keyline CLI {}", latest))
        .default(true)
        .interact()
        .unwrap_or(false);
    if install {
        if let Err(e) = update::install(latest) {
            tracing::warn!("{}", e);
        }
    }
}

/// Whether the user can answer prompts.
pub fn is_interactive() -> bool {
    if std::env::var(NON_INTERACTIVE_ENV)
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        return false;
    }
    std::io::stdin().is_terminal() && console::Term::stderr().is_term()
}
