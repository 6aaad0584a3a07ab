//! LLM agent module for pull request summarisation.
//!
//! Talks to a locally hosted Ollama server. The model is loaded once at startup
//! and the resulting handle is shared by every request.

use crate::config::ModelConfig;
use crate::github::PullRequest;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Ollama returned {status}: {message}")]
    Ollama { status: StatusCode, message: String },
}

/// A loaded model that turns a prompt into text.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Negative `keep_alive` keeps the model resident until the server stops
const KEEP_LOADED: i64 = -1;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    stream: bool,
    keep_alive: i64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Handle to a model resident in an Ollama server.
#[derive(Debug)]
pub struct OllamaModel {
    client: Client,
    name: String,
    host: String,
}

impl OllamaModel {
    /// Ask the server to load `config.name` into memory and return a handle to it.
    ///
    /// A generate request without a prompt only loads the model, so an unknown
    /// model name fails here rather than on the first summary.
    pub async fn load(config: &ModelConfig) -> Result<Self, AgentError> {
        let model = Self {
            client: Client::new(),
            name: config.name.clone(),
            host: config.host.clone(),
        };

        info!("Loading model {} from {}", model.name, model.host);
        model.post_generate(None).await?;
        info!("Model {} loaded", model.name);

        Ok(model)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.host)
    }

    async fn post_generate(&self, prompt: Option<&str>) -> Result<String, AgentError> {
        let request = GenerateRequest {
            model: &self.name,
            prompt,
            stream: false,
            // Sent on every call, otherwise Ollama resets the expiry to its default
            keep_alive: KEEP_LOADED,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(AgentError::Ollama { status, message });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}

#[async_trait]
impl TextModel for OllamaModel {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        self.post_generate(Some(prompt)).await
    }
}

/// The prompt is the title and body joined by a single newline, nothing more.
pub fn build_prompt(pr: &PullRequest) -> String {
    format!("{}\n{}", pr.title, pr.body)
}

/// Run the model once on a pull request and return its output unmodified
pub async fn run_inference(model: &dyn TextModel, pr: &PullRequest) -> Result<String, AgentError> {
    let prompt = build_prompt(pr);
    info!("Summarising PR #{} ({} bytes)", pr.number, prompt.len());
    model.generate(&prompt).await
}
