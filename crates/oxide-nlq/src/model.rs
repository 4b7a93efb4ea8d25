//! Model service boundary.
//!
//! The assistant only needs one operation from a model: text in, text out.
//! [`OllamaClient`] implements it against a local Ollama server; tests and
//! other back ends implement [`ModelService`] directly.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::error::{AssistantError, Result};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model tag.
pub const DEFAULT_MODEL: &str = "sqlcoder:15b";

/// A generative model that completes a prompt.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Returns a short name for log messages.
    fn name(&self) -> &str;

    /// Sends `prompt` and returns the raw response text.
    ///
    /// A failure is reported once; callers do not retry.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    #[serde(default)]
    name: String,
}

/// Client for the Ollama HTTP API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Creates a client for `model` served at `base_url`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// The model tag requests are sent for.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists the model tags the server has pulled.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AssistantError::ServiceUnavailable(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AssistantError::ServiceUnavailable(format!(
                "{url} returned {status}: {body}"
            )));
        }

        let tags: TagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Checks that the server is up and has the configured model.
    ///
    /// Problems are logged as warnings and never abort start-up.
    pub async fn check_model(&self) -> bool {
        match self.list_models().await {
            Ok(models) if models.iter().any(|m| model_matches(m, &self.model)) => {
                info!(model = %self.model, "Model is available");
                true
            }
            Ok(_) => {
                warn!(
                    model = %self.model,
                    "Model not found in Ollama. Please run: ollama pull {}",
                    self.model
                );
                warn!("Continuing anyway; generation will fail until the model is pulled.");
                false
            }
            Err(e) => {
                warn!(error = %e, "Could not connect to Ollama server. Make sure Ollama is running.");
                warn!("You can install Ollama from: https://ollama.ai/download");
                false
            }
        }
    }
}

#[async_trait]
impl ModelService for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(url = %url, model = %self.model, prompt_len = prompt.len(), "Calling model service");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| AssistantError::ServiceUnavailable(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AssistantError::ServiceUnavailable(format!(
                "{url} returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        debug!(response_len = parsed.response.len(), "Model responded");
        Ok(parsed.response)
    }
}

/// Reads a saved model response from `path`, or from standard input.
pub async fn read_saved_response(path: Option<&Path>) -> Result<String> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            raw
        }
    };
    debug!(len = raw.len(), "Read saved model response");
    Ok(raw)
}

/// Returns true if the pulled tag `available` satisfies the requested `wanted`.
///
/// A request without a tag matches the implicit `:latest` tag.
#[must_use]
pub fn model_matches(available: &str, wanted: &str) -> bool {
    if available.eq_ignore_ascii_case(wanted) {
        return true;
    }
    !wanted.contains(':')
        && available
            .strip_suffix(":latest")
            .is_some_and(|base| base.eq_ignore_ascii_case(wanted))
}
