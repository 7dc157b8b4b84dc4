use crate::cli::root::Context;
use crate::cli::TargetArgs;
use keyline::api::ApiClient;
use keyline::config::options::ConfigOption;
use keyline::error::{KeylineError, Result};

/// Build an API client from the active configuration.
pub fn api_client(ctx: &Context) -> Result<ApiClient> {
    let token = ctx.active.token().ok_or(KeylineError::MissingToken)?;
    tracing::debug!("Using API host {}", ctx.active.api_host());
    ApiClient::new(ctx.active.api_host(), token, &ctx.http)
}

/// Project and config from flags, falling back to the active configuration.
pub fn resolve_target(ctx: &Context, target: &TargetArgs) -> Result<(String, String)> {
    let project = target
        .project
        .clone()
        .or_else(|| ctx.active.value(ConfigOption::Project).map(String::from))
        .ok_or(KeylineError::MissingSetting("project"))?;
    let config = target
        .config
        .clone()
        .or_else(|| ctx.active.value(ConfigOption::Config).map(String::from))
        .ok_or(KeylineError::MissingSetting("config"))?;
    Ok((project, config))
}

/// Split `NAME=VALUE` arguments. The value may itself contain `=`.
pub fn parse_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(name, _)| !name.trim().is_empty())
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .ok_or_else(|| {
                    KeylineError::Other(format!("Invalid argument '{}', expected NAME=VALUE", pair))
                })
        })
        .collect()
}
