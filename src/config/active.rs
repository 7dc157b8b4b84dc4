//! The per-invocation view of every option.
//!
//! Values are resolved with precedence flag > environment > config file >
//! built-in default. Nothing resolved here is ever written back to disk.

use secrecy::SecretString;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::options::{parse_bool, ConfigOption};
use super::{UserConfig, ROOT_SCOPE};
use crate::error::Result;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Flag,
    Environment,
    ConfigFile,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Flag => "flag",
            Source::Environment => "environment",
            Source::ConfigFile => "config file",
            Source::Default => "default",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopedValue {
    pub value: String,
    pub scope: String,
    pub source: Source,
}

/// Option values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    values: BTreeMap<ConfigOption, String>,
}

impl Overrides {
    pub fn set(&mut self, option: ConfigOption, value: impl Into<String>) {
        self.values.insert(option, value.into());
    }

    pub fn get(&self, option: ConfigOption) -> Option<&str> {
        self.values.get(&option).map(|s| s.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ActiveConfig {
    scope: PathBuf,
    values: BTreeMap<ConfigOption, ScopedValue>,
}

impl ActiveConfig {
    pub fn resolve(
        config: &UserConfig,
        scope: &Path,
        overrides: &Overrides,
        read_env: bool,
    ) -> Result<Self> {
        let scope_str = scope.to_string_lossy().to_string();
        let mut values = BTreeMap::new();

        for option in ConfigOption::ALL {
            let resolved = if let Some(flag) = overrides.get(option) {
                Some(ScopedValue {
                    value: option.normalize_value(flag)?,
                    scope: scope_str.clone(),
                    source: Source::Flag,
                })
            } else if let Some(env) = read_env.then(|| env_value(option)).flatten() {
                Some(ScopedValue {
                    value: option.normalize_value(&env)?,
                    scope: scope_str.clone(),
                    source: Source::Environment,
                })
            } else if let Some((value, from)) = config.lookup(scope, option) {
                Some(ScopedValue {
                    value,
                    scope: from,
                    source: Source::ConfigFile,
                })
            } else {
                option.default_value().map(|value| ScopedValue {
                    value: value.to_string(),
                    scope: ROOT_SCOPE.to_string(),
                    source: Source::Default,
                })
            };

            if let Some(value) = resolved {
                values.insert(option, value);
            }
        }

        Ok(Self {
            scope: scope.to_path_buf(),
            values,
        })
    }

    pub fn scope(&self) -> &Path {
        &self.scope
    }

    pub fn get(&self, option: ConfigOption) -> Option<&ScopedValue> {
        self.values.get(&option)
    }

    pub fn value(&self, option: ConfigOption) -> Option<&str> {
        self.values.get(&option).map(|v| v.value.as_str())
    }

    /// Resolved values in display order.
    pub fn entries(&self) -> impl Iterator<Item = (ConfigOption, &ScopedValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn token(&self) -> Option<SecretString> {
        self.value(ConfigOption::Token)
            .map(|t| SecretString::new(t.to_string()))
    }

    pub fn api_host(&self) -> &str {
        self.value(ConfigOption::ApiHost)
            .unwrap_or(super::options::DEFAULT_API_HOST)
    }

    pub fn dashboard_host(&self) -> &str {
        self.value(ConfigOption::DashboardHost)
            .unwrap_or(super::options::DEFAULT_DASHBOARD_HOST)
    }

    pub fn verify_tls(&self) -> bool {
        self.value(ConfigOption::VerifyTls)
            .and_then(parse_bool)
            .unwrap_or(true)
    }
}

fn env_value(option: ConfigOption) -> Option<String> {
    std::env::var(option.env_var())
        .ok()
        .filter(|v| !v.trim().is_empty())
}
