//! Typed client for the remote Keyline secrets API.
//!
//! [`ApiClient`] wraps one blocking HTTP client per invocation and maps every
//! non-2xx response to [`KeylineError::Api`] with the server's messages.

use reqwest::blocking::RequestBuilder;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{KeylineError, Result};
use crate::http::{self, HttpSettings};

/// Information about the token in use (`GET /v3/me`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub slug: Option<String>,
    pub workplace: Workplace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workplace {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A secret as stored (`raw`) and after reference expansion (`computed`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretValue {
    pub raw: Option<String>,
    pub computed: Option<String>,
}

#[derive(Deserialize)]
struct ProjectsResponse {
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct SecretsResponse {
    secrets: BTreeMap<String, SecretValue>,
}

#[derive(Serialize)]
struct UpdateSecretsRequest<'a> {
    project: &'a str,
    config: &'a str,
    secrets: &'a BTreeMap<String, Option<String>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    messages: Vec<String>,
}

pub struct ApiClient {
    http: reqwest::blocking::Client,
    host: String,
    token: SecretString,
}

impl ApiClient {
    pub fn new(host: &str, token: SecretString, settings: &HttpSettings) -> Result<Self> {
        Ok(Self {
            http: settings.client()?,
            host: host.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn me(&self) -> Result<TokenInfo> {
        self.send(self.http.get(self.url("/v3/me")))
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        let response: ProjectsResponse = self.send(self.http.get(self.url("/v3/projects")))?;
        Ok(response.projects)
    }

    pub fn secrets(&self, project: &str, config: &str) -> Result<BTreeMap<String, SecretValue>> {
        let request = self
            .http
            .get(self.url("/v3/configs/config/secrets"))
            .query(&[("project", project), ("config", config)]);
        let response: SecretsResponse = self.send(request)?;
        Ok(response.secrets)
    }

    /// Apply `changes` to the config. A `None` value deletes the secret.
    pub fn update_secrets(
        &self,
        project: &str,
        config: &str,
        changes: &BTreeMap<String, Option<String>>,
    ) -> Result<BTreeMap<String, SecretValue>> {
        let body = UpdateSecretsRequest {
            project,
            config,
            secrets: changes,
        };
        let request = self
            .http
            .post(self.url("/v3/configs/config/secrets"))
            .json(&body);
        let response: SecretsResponse = self.send(request)?;
        Ok(response.secrets)
    }

    /// Computed values of every secret, as a flat name → value map.
    pub fn download(&self, project: &str, config: &str) -> Result<BTreeMap<String, String>> {
        let request = self
            .http
            .get(self.url("/v3/configs/config/secrets/download"))
            .query(&[("project", project), ("config", config), ("format", "json")]);
        self.send(request)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(self.token.expose_secret())
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| http::transport_error(&self.host, e))?;

        let status = response.status();
        tracing::debug!("API responded with {}", status);
        let body = response
            .text()
            .map_err(|e| http::transport_error(&self.host, e))?;

        if !status.is_success() {
            return Err(KeylineError::Api {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| KeylineError::Serialization(format!("Invalid API response: {}", e)))
    }
}

fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .filter(|r| !r.messages.is_empty())
        .map(|r| r.messages.join("\n"))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        })
}
