pub mod active;
pub mod options;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::error::{KeylineError, Result};
use crate::version::VersionCheck;
use options::{ConfigOption, ScopedOptions};

pub const CONFIG_DIR_ENV: &str = "KEYLINE_CONFIG_DIR";
const CONFIG_FILENAME: &str = "keyline.toml";

/// Scope that applies to every directory.
pub const ROOT_SCOPE: &str = "/";

/// Configuration file format (~/.keyline/keyline.toml).
///
/// Example:
/// ```toml
/// [version_check]
/// latest_version = "1.4.0"
/// checked_at = "2026-10-18T09:12:44Z"
///
/// [scoped."/"]
/// token = "kl_live_..."
///
/// [scoped."/home/me/app"]
/// project = "backend"
/// config = "dev"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_check: Option<VersionCheck>,
    #[serde(default)]
    pub scoped: BTreeMap<String, ScopedOptions>,
}

impl UserConfig {
    /// Load config from a path. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: UserConfig = toml::from_str(&content).map_err(|e| KeylineError::InvalidConfig {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to a path with atomic rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| KeylineError::Serialization(format!("Config serialize error: {}", e)))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        write_private(&tmp_path, content.as_bytes())?;
        fs::rename(&tmp_path, path)?;
        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Options stored exactly at `scope`.
    pub fn options_for(&self, scope: &Path) -> Option<&ScopedOptions> {
        self.scoped.get(&scope_key(scope))
    }

    /// Scoped entries that apply to `scope`, shallowest first.
    pub fn applicable(&self, scope: &Path) -> Vec<(&str, &ScopedOptions)> {
        let mut matches: Vec<(&str, &ScopedOptions)> = self
            .scoped
            .iter()
            .filter(|(dir, _)| scope.starts_with(Path::new(dir.as_str())))
            .map(|(dir, opts)| (dir.as_str(), opts))
            .collect();
        matches.sort_by_key(|(dir, _)| Path::new(dir).components().count());
        matches
    }

    /// Most specific value for `option` at `scope`, with the scope it came from.
    pub fn lookup(&self, scope: &Path, option: ConfigOption) -> Option<(String, String)> {
        self.applicable(scope)
            .into_iter()
            .rev()
            .find_map(|(dir, opts)| opts.get(option).map(|v| (v, dir.to_string())))
    }

    pub fn set(&mut self, scope: &Path, option: ConfigOption, value: &str) -> Result<()> {
        self.scoped
            .entry(scope_key(scope))
            .or_default()
            .set(option, value)
    }

    /// Remove `option` from `scope`, dropping the scope once it is empty.
    pub fn unset(&mut self, scope: &Path, option: ConfigOption) {
        let key = scope_key(scope);
        if let Some(opts) = self.scoped.get_mut(&key) {
            opts.unset(option);
            if opts.is_empty() {
                self.scoped.remove(&key);
            }
        }
    }

    /// The last recorded version check, or a never-checked record.
    pub fn version_check(&self) -> VersionCheck {
        self.version_check.clone().unwrap_or_default()
    }

    pub fn set_version_check(&mut self, check: VersionCheck) {
        self.version_check = Some(check);
    }
}

/// Get the keyline directory path (~/.keyline, or $KEYLINE_CONFIG_DIR).
pub fn keyline_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".keyline")
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    keyline_dir().join(CONFIG_FILENAME)
}

/// Turn a user-supplied scope into an absolute, lexically clean directory.
///
/// `*` selects the root scope. The directory does not need to exist.
pub fn normalize_scope(scope: &str) -> Result<PathBuf> {
    let trimmed = scope.trim();
    if trimmed.is_empty() {
        return Err(KeylineError::InvalidScope(scope.to_string()));
    }
    if trimmed == "*" {
        return Ok(PathBuf::from(ROOT_SCOPE));
    }

    let path = PathBuf::from(expand_tilde(trimmed));
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(|e| KeylineError::InvalidScope(format!("{} ({})", scope, e)))?
            .join(path)
    };
    Ok(clean_path(&absolute))
}

/// Write `data` to a file only the owner can read. On Unix the file is
/// created with mode 0600; an existing file is narrowed before writing.
pub fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(data)?;
    Ok(())
}

fn scope_key(scope: &Path) -> String {
    scope.to_string_lossy().to_string()
}

fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Expand leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") || path == "~" {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
