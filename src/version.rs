//! Program version and the throttled update check.
//!
//! The check runs at most once per [`CHECK_INTERVAL_HOURS`]. A failed lookup
//! produces no record to persist, so the next invocation tries again.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{KeylineError, Result};
use crate::http::{self, HttpSettings};

pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const RELEASES_URL: &str = "https://api.github.com/repos/keyline-dev/cli/releases/latest";
pub const CHECK_INTERVAL_HOURS: i64 = 24;
pub const ENABLE_CHECK_ENV: &str = "KEYLINE_ENABLE_VERSION_CHECK";

/// Development builds never check for updates and let panics surface.
pub fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Version of the running binary.
pub fn current() -> Result<Version> {
    PROGRAM_VERSION.parse()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl FromStr for Version {
    type Err = KeylineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || KeylineError::InvalidVersion(s.to_string());
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        // build metadata never affects ordering
        let trimmed = trimmed.split('+').next().unwrap_or(trimmed);

        let (core, pre) = match trimmed.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
            Some(_) => return Err(invalid()),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }
        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Version {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_pre(a, b),
            })
    }
}

/// Dot-separated identifiers compared in turn; numeric ones sort numerically
/// and below alphanumeric ones. A shorter prefix sorts first.
fn compare_pre(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(m), Ok(n)) => m.cmp(&n),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.cmp(y),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

/// Persisted result of the last successful check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub checked_at: DateTime<Utc>,
}

impl VersionCheck {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now > self.checked_at + Duration::hours(CHECK_INTERVAL_HOURS)
    }
}

/// Somewhere to ask for the newest published release.
pub trait ReleaseSource {
    fn latest_version(&self) -> Result<Version>;
}

/// Latest release as published on the GitHub releases API.
pub struct GithubReleases {
    client: reqwest::blocking::Client,
    url: String,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    tag_name: String,
}

impl GithubReleases {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        Self::with_url(settings, RELEASES_URL)
    }

    pub fn with_url(settings: &HttpSettings, url: &str) -> Result<Self> {
        Ok(Self {
            client: settings.client()?,
            url: url.to_string(),
        })
    }
}

impl ReleaseSource for GithubReleases {
    fn latest_version(&self) -> Result<Version> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .map_err(|e| http::transport_error(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeylineError::Api {
                status: status.as_u16(),
                message: "Unable to fetch the latest release".to_string(),
            });
        }

        let release: ReleaseResponse = response
            .json()
            .map_err(|e| KeylineError::Serialization(e.to_string()))?;
        release.tag_name.parse()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Checked within the last interval.
    NotDue,
    /// Lookup failed; try again next run.
    Failed,
    UpToDate,
    UpdateAvailable(Version),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub outcome: CheckOutcome,
    /// Record to persist, if any.
    pub record: Option<VersionCheck>,
}

/// Decide whether an update exists, querying `source` only when a check is due.
pub fn evaluate(
    previous: &VersionCheck,
    current: &Version,
    now: DateTime<Utc>,
    source: &dyn ReleaseSource,
) -> CheckResult {
    if !previous.is_due(now) {
        return CheckResult {
            outcome: CheckOutcome::NotDue,
            record: None,
        };
    }

    let latest = match source.latest_version() {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Unable to check for CLI updates: {}", e);
            return CheckResult {
                outcome: CheckOutcome::Failed,
                record: None,
            };
        }
    };

    if latest > *current {
        CheckResult {
            record: Some(VersionCheck {
                latest_version: Some(latest.to_string()),
                checked_at: now,
            }),
            outcome: CheckOutcome::UpdateAvailable(latest),
        }
    } else {
        CheckResult {
            outcome: CheckOutcome::UpToDate,
            record: Some(VersionCheck {
                latest_version: previous.latest_version.clone(),
                checked_at: now,
            }),
        }
    }
}

/// How to upgrade on this platform when the CLI cannot do it itself.
pub fn upgrade_instruction() -> &'static str {
    if cfg!(windows) {
        "You can update via 'scoop update keyline'"
    } else {
        "Run 'keyline update' to install it."
    }
}
