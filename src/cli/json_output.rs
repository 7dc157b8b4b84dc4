use serde::Serialize;
use std::collections::BTreeMap;

/// JSON response for `keyline secrets --json`.
#[derive(Serialize)]
pub struct SecretItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<String>,
}

pub type SecretsResponse = BTreeMap<String, SecretItem>;

/// JSON response for `keyline projects --json`.
#[derive(Serialize)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// JSON response for `keyline configure --json`.
#[derive(Serialize)]
pub struct ScopeOptionsResponse {
    pub scope: String,
    pub options: BTreeMap<String, String>,
}

/// JSON response for `keyline update --json`.
#[derive(Serialize)]
pub struct UpdateResponse {
    pub current: String,
    pub latest: String,
    pub update_available: bool,
    pub installed: bool,
}
