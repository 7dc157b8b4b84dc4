use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeylineError {
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    #[error("Invalid configuration file {path}: {reason}")]
    InvalidConfig { path: String, reason: String },

    #[error("Unknown configuration option '{0}'. Valid options: token, api-host, dashboard-host, verify-tls, project, config")]
    UnknownOption(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("You must provide a token (use --token or `keyline configure set token=<token>`)")]
    MissingToken,

    #[error("You must specify a {0} (use --{0} or `keyline configure set {0}=<{0}>`)")]
    MissingSetting(&'static str),

    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Unable to reach {host}: {reason}")]
    Http { host: String, reason: String },

    #[error("API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl KeylineError {
    /// Every handled error terminates the process with the same code.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Return a string error code identifier.
    pub fn error_code(&self) -> &'static str {
        match self {
            KeylineError::InvalidScope(_) => "invalid_scope",
            KeylineError::InvalidConfig { .. } => "invalid_config",
            KeylineError::UnknownOption(_) => "unknown_option",
            KeylineError::InvalidValue { .. } => "invalid_value",
            KeylineError::MissingToken => "missing_token",
            KeylineError::MissingSetting(_) => "missing_setting",
            KeylineError::SecretNotFound(_) => "not_found",
            KeylineError::Http { .. } => "http_error",
            KeylineError::Api { .. } => "api_error",
            KeylineError::InvalidVersion(_) => "invalid_version",
            KeylineError::Serialization(_) => "serialization_error",
            KeylineError::Cancelled => "cancelled",
            KeylineError::Io(_) => "io_error",
            KeylineError::Other(_) => "error",
        }
    }
}

impl From<serde_json::Error> for KeylineError {
    fn from(e: serde_json::Error) -> Self {
        KeylineError::Serialization(e.to_string())
    }
}

/// JSON error response for --json mode.
#[derive(Serialize)]
pub struct JsonError {
    pub error: JsonErrorDetail,
}

#[derive(Serialize)]
pub struct JsonErrorDetail {
    pub code: String,
    pub message: String,
    pub exit_code: i32,
}

impl JsonError {
    pub fn from_error(e: &KeylineError) -> Self {
        Self {
            error: JsonErrorDetail {
                code: e.error_code().to_string(),
                message: e.to_string(),
                exit_code: e.exit_code(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, KeylineError>;
