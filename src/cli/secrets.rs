use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::json_output::{SecretItem, SecretsResponse};
use crate::cli::root::{self, Context};
use crate::cli::{common, printer, DownloadFormat, SecretsArgs, SecretsCommands};
use keyline::api::SecretValue;
use keyline::config;
use keyline::error::{KeylineError, Result};

pub fn run(ctx: &Context, args: &SecretsArgs) -> Result<()> {
    match &args.command {
        None => list(ctx, args),
        Some(SecretsCommands::Get { names, plain, raw }) => get(ctx, args, names, *plain, *raw || args.raw),
        Some(SecretsCommands::Set { pairs }) => set(ctx, args, pairs),
        Some(SecretsCommands::Delete { names, yes }) => delete(ctx, args, names, *yes),
        Some(SecretsCommands::Download {
            format,
            output,
            no_file,
        }) => download(ctx, args, *format, output.as_deref(), *no_file),
    }
}

fn list(ctx: &Context, args: &SecretsArgs) -> Result<()> {
    let (project, config) = common::resolve_target(ctx, &args.target)?;
    let secrets = common::api_client(ctx)?.secrets(&project, &config)?;

    if args.only_names {
        if ctx.json {
            let names: Vec<&String> = secrets.keys().collect();
            return printer::json(&names);
        }
        for name in secrets.keys() {
            println!("{}", name);
        }
        return Ok(());
    }

    print_secrets(ctx, &secrets, args.raw)
}

fn get(ctx: &Context, args: &SecretsArgs, names: &[String], plain: bool, raw: bool) -> Result<()> {
    let (project, config) = common::resolve_target(ctx, &args.target)?;
    let secrets = common::api_client(ctx)?.secrets(&project, &config)?;

    let mut selected = BTreeMap::new();
    for name in names {
        let secret = secrets
            .get(name)
            .ok_or_else(|| KeylineError::SecretNotFound(name.clone()))?;
        selected.insert(name.clone(), secret.clone());
    }

    if plain && !ctx.json {
        // keep argument order so output lines up with the names given
        for name in names {
            println!("{}", display_value(&selected[name], raw));
        }
        return Ok(());
    }

    print_secrets(ctx, &selected, raw)
}

fn set(ctx: &Context, args: &SecretsArgs, pairs: &[String]) -> Result<()> {
    let (project, config) = common::resolve_target(ctx, &args.target)?;
    let changes: BTreeMap<String, Option<String>> = common::parse_pairs(pairs)?
        .into_iter()
        .map(|(name, value)| (name, Some(value)))
        .collect();

    let updated = common::api_client(ctx)?.update_secrets(&project, &config, &changes)?;
    tracing::info!("Saved {} secret(s) to {}/{}", changes.len(), project, config);

    let changed: BTreeMap<String, SecretValue> = updated
        .into_iter()
        .filter(|(name, _)| changes.contains_key(name))
        .collect();
    print_secrets(ctx, &changed, args.raw)
}

fn delete(ctx: &Context, args: &SecretsArgs, names: &[String], yes: bool) -> Result<()> {
    let (project, config) = common::resolve_target(ctx, &args.target)?;

    if !yes {
        if !root::is_interactive() {
            return Err(KeylineError::Other(
                "Refusing to delete without confirmation. Use --yes to proceed.".into(),
            ));
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete secret(s) {}", names.join(", ")))
            .default(false)
            .interact()
            .map_err(|e| KeylineError::Other(e.to_string()))?;
        if !confirmed {
            return Err(KeylineError::Cancelled);
        }
    }

    let changes: BTreeMap<String, Option<String>> =
        names.iter().map(|name| (name.clone(), None)).collect();
    let remaining = common::api_client(ctx)?.update_secrets(&project, &config, &changes)?;
    tracing::info!("Deleted {} secret(s) from {}/{}", names.len(), project, config);

    print_secrets(ctx, &remaining, args.raw)
}

fn download(
    ctx: &Context,
    args: &SecretsArgs,
    format: DownloadFormat,
    output: Option<&Path>,
    no_file: bool,
) -> Result<()> {
    let (project, config) = common::resolve_target(ctx, &args.target)?;
    let secrets = common::api_client(ctx)?.download(&project, &config)?;
    let rendered = render(&secrets, format)?;

    if no_file {
        print!("{}", rendered);
        return Ok(());
    }

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format.default_filename()));
    config::write_private(&path, rendered.as_bytes())?;
    tracing::info!("Downloaded {} secret(s) to {}", secrets.len(), path.display());
    Ok(())
}

fn print_secrets(ctx: &Context, secrets: &BTreeMap<String, SecretValue>, raw: bool) -> Result<()> {
    if ctx.json {
        let response: SecretsResponse = secrets
            .iter()
            .map(|(name, value)| {
                (
                    name.clone(),
                    SecretItem {
                        raw: value.raw.clone(),
                        computed: value.computed.clone(),
                    },
                )
            })
            .collect();
        return printer::json(&response);
    }

    let rows: Vec<Vec<String>> = secrets
        .iter()
        .map(|(name, value)| vec![name.clone(), display_value(value, raw).to_string()])
        .collect();
    printer::table(&["name", "value"], &rows);
    Ok(())
}

fn display_value(value: &SecretValue, raw: bool) -> &str {
    let preferred = if raw { &value.raw } else { &value.computed };
    preferred
        .as_deref()
        .or(value.computed.as_deref())
        .or(value.raw.as_deref())
        .unwrap_or("")
}

pub(crate) fn render(secrets: &BTreeMap<String, String>, format: DownloadFormat) -> Result<String> {
    match format {
        DownloadFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(secrets)?)),
        DownloadFormat::Yaml => {
            serde_yaml::to_string(secrets).map_err(|e| KeylineError::Serialization(e.to_string()))
        }
        DownloadFormat::Env => Ok(secrets
            .iter()
            .map(|(name, value)| format!("{}={}\n", name, dotenv_quote(value)))
            .collect()),
    }
}

/// Quote a value for dotenv format.
/// If it contains special chars, wrap in double quotes and escape.
fn dotenv_quote(value: &str) -> String {
    if value.is_empty() {
        return "\"\"".to_string();
    }

    let needs_quoting = value.contains(|c: char| {
        matches!(
            c,
            ' ' | '#' | '"' | '\'' | '\\' | '\n' | '\r' | '\t' | '$' | '`'
        )
    });

    if needs_quoting {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}
