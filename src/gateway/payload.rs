use serde::{Deserialize, Serialize};

use crate::ranking::ScoredCandidate;

#[derive(Debug, Default, Deserialize)]
pub struct TemplatesQuery {
    #[serde(default)]
    pub prompt: String,
    pub k: Option<usize>,
    /// Comma separated.
    pub tags: Option<String>,
}

impl TemplatesQuery {
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CaptionsQuery {
    #[serde(default)]
    pub prompt: String,
    pub template: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub caption: String,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub context: String,
}

#[derive(Debug, Deserialize)]
pub struct SecureRequest {
    pub action: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// `templates` action body.
#[derive(Debug, Default, Deserialize)]
pub struct SecureTemplatesPayload {
    #[serde(default)]
    pub prompt: String,
    pub k: Option<usize>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `search_templates` action body.
#[derive(Debug, Default, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub context: String,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub templates: Vec<ScoredCandidate>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub status: &'static str,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct SecureResponse {
    pub action: String,
    pub result: serde_json::Value,
}
