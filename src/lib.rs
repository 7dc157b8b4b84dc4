//! Command-line front-end for the Keyline secrets service.
//!
//! This library exposes the configuration, version-check, HTTP and API
//! modules for programmatic use. The CLI is gated behind the `cli` feature
//! and is private to the binary.
//!
//! # Quick start
//!
//! ```no_run
//! use keyline::api::ApiClient;
//! use keyline::http::HttpSettings;
//! use secrecy::SecretString;
//!
//! let client = ApiClient::new(
//!     "https://api.keyline.dev",
//!     SecretString::new("kl_live_token".to_string()),
//!     &HttpSettings::default(),
//! )?;
//! let secrets = client.download("backend", "dev")?;
//! # Ok::<(), keyline::error::KeylineError>(())
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod subprocess;
pub mod version;
