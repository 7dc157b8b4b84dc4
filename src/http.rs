use std::time::Duration;

use crate::error::{KeylineError, Result};
use crate::version::PROGRAM_VERSION;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by every outbound request of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    /// `None` disables the timeout.
    pub timeout: Option<Duration>,
    pub verify_tls: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            verify_tls: true,
        }
    }
}

impl HttpSettings {
    pub fn client(&self) -> Result<reqwest::blocking::Client> {
        if !self.verify_tls {
            tracing::debug!("TLS certificate verification is disabled");
        }
        reqwest::blocking::Client::builder()
            .user_agent(user_agent())
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.verify_tls)
            .build()
            .map_err(|e| KeylineError::Other(format!("Unable to build HTTP client: {}", e)))
    }
}

pub fn user_agent() -> String {
    format!("keyline-cli/{}", PROGRAM_VERSION)
}

pub(crate) fn transport_error(host: &str, e: reqwest::Error) -> KeylineError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    KeylineError::Http {
        host: host.to_string(),
        reason,
    }
}
