use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::AnalysisError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/analyze/";

/// Backend model the server should use for the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    /// Fine-tuned DistilBERT classifier, answers with a JSON object
    #[default]
    Custom,
    /// Llama 3, answers with free text
    Llama,
}

impl ModelChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelChoice::Custom => "custom",
            ModelChoice::Llama => "llama",
        }
    }

    pub fn all() -> [ModelChoice; 2] {
        [ModelChoice::Custom, ModelChoice::Llama]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelChoice::Custom => "Custom Model",
            ModelChoice::Llama => "Llama 3",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ModelChoice::Custom => ModelChoice::Llama,
            ModelChoice::Llama => ModelChoice::Custom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub text: String,
    pub model: ModelChoice,
}

/// What the endpoint answered with, keyed on the runtime type of the body.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    /// JSON object, kept exactly as the server sent it
    Structured(Map<String, Value>),
    /// Plain string body
    Text(String),
}

impl AnalysisResult {
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::String(text)) => AnalysisResult::Text(text),
            Ok(Value::Object(map)) => AnalysisResult::Structured(map),
            Ok(other) => AnalysisResult::Text(other.to_string()),
            // Not JSON at all, the raw body is the text
            Err(_) => AnalysisResult::Text(body.to_string()),
        }
    }

    /// Sentiment label, if the server supplied a non-empty one.
    pub fn sentiment(&self) -> Option<String> {
        match self {
            AnalysisResult::Structured(map) => match map.get("sentiment")? {
                Value::Null | Value::Bool(false) => None,
                Value::String(s) if s.is_empty() => None,
                other => Some(value_text(other)),
            },
            AnalysisResult::Text(_) => None,
        }
    }

    /// Present whenever the key is; a null confidence reads as empty.
    pub fn confidence(&self) -> Option<String> {
        match self {
            AnalysisResult::Structured(map) => map.get("confidence").map(|value| match value {
                Value::Null => String::new(),
                other => value_text(other),
            }),
            AnalysisResult::Text(_) => None,
        }
    }

    /// Free text carried by a result: the whole body for `Text`, or a non-empty
    /// `text` field of an object.
    pub fn full_text(&self) -> Option<&str> {
        match self {
            AnalysisResult::Structured(map) => match map.get("text")? {
                Value::String(s) if !s.is_empty() => Some(s.as_str()),
                _ => None,
            },
            AnalysisResult::Text(text) => Some(text.as_str()),
        }
    }
}

/// Strings are shown bare; everything else as compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(detail) => value_text(&detail),
        None => status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One POST, no retry. Every failure comes back already classified.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        info!(endpoint = %self.endpoint, model = request.model.as_str(), "sending request to API");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "analysis request failed");
                AnalysisError::from_transport(&e)
            })?;

        let status = response.status();
        let body = response.text().await;

        if !status.is_success() {
            let body = body.unwrap_or_default();
            let detail = error_detail(status, &body);
            warn!(status = status.as_u16(), %detail, "API returned an error status");
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        let body = body.map_err(|e| {
            warn!(error = %e, "failed to read response body");
            AnalysisError::Client(e.to_string())
        })?;

        let result = AnalysisResult::from_body(&body);
        debug!(?result, "response from API");
        Ok(result)
    }
}
