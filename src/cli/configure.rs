use std::collections::BTreeMap;
use std::str::FromStr;

use crate::cli::json_output::ScopeOptionsResponse;
use crate::cli::root::{self, Context};
use crate::cli::{common, printer, ConfigureArgs, ConfigureCommands};
use keyline::config::options::{ConfigOption, ScopedOptions};
use keyline::config::UserConfig;
use keyline::error::{KeylineError, Result};

pub fn run(ctx: Context, args: &ConfigureArgs) -> Result<()> {
    match &args.command {
        None => show(&ctx, args.all),
        Some(ConfigureCommands::Get { keys, plain }) => get(&ctx, keys, *plain),
        Some(ConfigureCommands::Set { pairs }) => set(ctx, pairs),
        Some(ConfigureCommands::Unset { keys }) => unset(ctx, keys),
        Some(ConfigureCommands::Reset { yes }) => reset(ctx, *yes),
    }
}

fn show(ctx: &Context, all: bool) -> Result<()> {
    let scopes: Vec<(String, ScopedOptions)> = if all {
        ctx.config
            .scoped
            .iter()
            .map(|(scope, opts)| (scope.clone(), opts.clone()))
            .collect()
    } else {
        let scope = ctx.active.scope().to_string_lossy().to_string();
        let opts = ctx
            .config
            .options_for(ctx.active.scope())
            .cloned()
            .unwrap_or_default();
        vec![(scope, opts)]
    };

    if ctx.json {
        let response: Vec<ScopeOptionsResponse> = scopes
            .into_iter()
            .map(|(scope, opts)| ScopeOptionsResponse {
                scope,
                options: option_map(&opts),
            })
            .collect();
        return printer::json(&response);
    }

    let rows: Vec<Vec<String>> = scopes
        .iter()
        .flat_map(|(scope, opts)| {
            option_map(opts)
                .into_iter()
                .map(move |(key, value)| vec![key, value, scope.clone()])
        })
        .collect();
    printer::table(&["name", "value", "scope"], &rows);
    Ok(())
}

fn get(ctx: &Context, keys: &[String], plain: bool) -> Result<()> {
    let options = keys
        .iter()
        .map(|k| ConfigOption::from_str(k))
        .collect::<Result<Vec<_>>>()?;

    if plain && !ctx.json {
        for option in &options {
            println!("{}", ctx.active.value(*option).unwrap_or(""));
        }
        return Ok(());
    }

    let values: BTreeMap<&str, String> = options
        .iter()
        .map(|opt| (opt.key(), ctx.active.value(*opt).unwrap_or("").to_string()))
        .collect();

    if ctx.json {
        return printer::json(&values);
    }

    let rows: Vec<Vec<String>> = values
        .into_iter()
        .map(|(key, value)| vec![key.to_string(), value])
        .collect();
    printer::table(&["name", "value"], &rows);
    Ok(())
}

fn set(mut ctx: Context, pairs: &[String]) -> Result<()> {
    let scope = ctx.active.scope().to_path_buf();
    for (key, value) in common::parse_pairs(pairs)? {
        let option = ConfigOption::from_str(&key)?;
        ctx.config.set(&scope, option, &value)?;
    }
    ctx.config.save(&ctx.config_path)?;
    tracing::info!("Saved configuration for scope {}", scope.display());

    show(&ctx, false)
}

fn unset(mut ctx: Context, keys: &[String]) -> Result<()> {
    let scope = ctx.active.scope().to_path_buf();
    for key in keys {
        let option = ConfigOption::from_str(key)?;
        ctx.config.unset(&scope, option);
    }
    ctx.config.save(&ctx.config_path)?;
    tracing::info!("Removed {} option(s) from scope {}", keys.len(), scope.display());

    show(&ctx, false)
}

fn reset(mut ctx: Context, yes: bool) -> Result<()> {
    if !yes {
        if !root::is_interactive() {
            return Err(KeylineError::Other(
                "Refusing to reset without confirmation. Use --yes to proceed.".into(),
            ));
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Reset your configuration? This cannot be undone")
            .default(false)
            .interact()
            .map_err(|e| KeylineError::Other(e.to_string()))?;
        if !confirmed {
            return Err(KeylineError::Cancelled);
        }
    }

    ctx.config = UserConfig::default();
    ctx.config.save(&ctx.config_path)?;
    tracing::info!("Configuration has been reset");
    Ok(())
}

fn option_map(opts: &ScopedOptions) -> BTreeMap<String, String> {
    ConfigOption::ALL
        .iter()
        .filter_map(|opt| opts.get(*opt).map(|v| (opt.key().to_string(), v)))
        .collect()
}
