use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KeylineError, Result};

pub const DEFAULT_API_HOST: &str = "https://api.keyline.dev";
pub const DEFAULT_DASHBOARD_HOST: &str = "https://dashboard.keyline.dev";

/// A setting that can be stored per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigOption {
    Token,
    ApiHost,
    DashboardHost,
    VerifyTls,
    Project,
    Config,
}

impl ConfigOption {
    pub const ALL: [ConfigOption; 6] = [
        ConfigOption::Token,
        ConfigOption::ApiHost,
        ConfigOption::DashboardHost,
        ConfigOption::VerifyTls,
        ConfigOption::Project,
        ConfigOption::Config,
    ];

    /// Name used on the command line and in `configure` output.
    pub fn key(&self) -> &'static str {
        match self {
            ConfigOption::Token => "token",
            ConfigOption::ApiHost => "api-host",
            ConfigOption::DashboardHost => "dashboard-host",
            ConfigOption::VerifyTls => "verify-tls",
            ConfigOption::Project => "project",
            ConfigOption::Config => "config",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigOption::Token => "KEYLINE_TOKEN",
            ConfigOption::ApiHost => "KEYLINE_API_HOST",
            ConfigOption::DashboardHost => "KEYLINE_DASHBOARD_HOST",
            ConfigOption::VerifyTls => "KEYLINE_VERIFY_TLS",
            ConfigOption::Project => "KEYLINE_PROJECT",
            ConfigOption::Config => "KEYLINE_CONFIG",
        }
    }

    /// Built-in fallback when nothing else provides a value.
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            ConfigOption::ApiHost => Some(DEFAULT_API_HOST),
            ConfigOption::DashboardHost => Some(DEFAULT_DASHBOARD_HOST),
            ConfigOption::VerifyTls => Some("true"),
            _ => None,
        }
    }

    /// Check and canonicalize a user-supplied value.
    pub fn normalize_value(&self, value: &str) -> Result<String> {
        let value = value.trim();
        match self {
            ConfigOption::VerifyTls => parse_bool(value)
                .map(|b| b.to_string())
                .ok_or_else(|| KeylineError::InvalidValue {
                    key: self.key().to_string(),
                    reason: format!("expected true or false, got '{}'", value),
                }),
            ConfigOption::ApiHost | ConfigOption::DashboardHost => {
                if !(value.starts_with("https://") || value.starts_with("http://")) {
                    return Err(KeylineError::InvalidValue {
                        key: self.key().to_string(),
                        reason: format!("'{}' must start with http:// or https://", value),
                    });
                }
                Ok(value.trim_end_matches('/').to_string())
            }
            _ => {
                if value.is_empty() {
                    return Err(KeylineError::InvalidValue {
                        key: self.key().to_string(),
                        reason: "value must not be empty".to_string(),
                    });
                }
                Ok(value.to_string())
            }
        }
    }
}

impl fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConfigOption {
    type Err = KeylineError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        ConfigOption::ALL
            .into_iter()
            .find(|opt| opt.key() == normalized)
            .ok_or_else(|| KeylineError::UnknownOption(s.to_string()))
    }
}

/// The settings stored under a single scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_tls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

impl ScopedOptions {
    pub fn get(&self, option: ConfigOption) -> Option<String> {
        match option {
            ConfigOption::Token => self.token.clone(),
            ConfigOption::ApiHost => self.api_host.clone(),
            ConfigOption::DashboardHost => self.dashboard_host.clone(),
            ConfigOption::VerifyTls => self.verify_tls.map(|b| b.to_string()),
            ConfigOption::Project => self.project.clone(),
            ConfigOption::Config => self.config.clone(),
        }
    }

    /// Store `value` after normalizing it for `option`.
    pub fn set(&mut self, option: ConfigOption, value: &str) -> Result<()> {
        let value = option.normalize_value(value)?;
        match option {
            ConfigOption::Token => self.token = Some(value),
            ConfigOption::ApiHost => self.api_host = Some(value),
            ConfigOption::DashboardHost => self.dashboard_host = Some(value),
            ConfigOption::VerifyTls => self.verify_tls = parse_bool(&value),
            ConfigOption::Project => self.project = Some(value),
            ConfigOption::Config => self.config = Some(value),
        }
        Ok(())
    }

    pub fn unset(&mut self, option: ConfigOption) {
        match option {
            ConfigOption::Token => self.token = None,
            ConfigOption::ApiHost => self.api_host = None,
            ConfigOption::DashboardHost => self.dashboard_host = None,
            ConfigOption::VerifyTls => self.verify_tls = None,
            ConfigOption::Project => self.project = None,
            ConfigOption::Config => self.config = None,
        }
    }

    pub fn is_empty(&self) -> bool {
        ConfigOption::ALL.iter().all(|opt| self.get(*opt).is_none())
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Boolean environment variable; unset or unparsable yields `None`.
pub fn parse_bool_env(var: &str) -> Option<bool> {
    std::env::var(var).ok().and_then(|v| parse_bool(&v))
}
