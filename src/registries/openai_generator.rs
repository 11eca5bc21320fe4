use crate::contexts::{GenerationError, TextGenerator};
use crate::data::Credential;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Configuration for the OpenAI generation client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL, without the `/v1/...` path
    pub api_base: String,
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text generation through the OpenAI chat completions API
///
/// The instructions go out as the system message and the content as the
/// single user message. Only the first choice of the response is used.
pub struct OpenAiGenerator {
    http_client: ReqwestClient,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    pub fn new(config: OpenAiConfig) -> anyhow::Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        instructions: &str,
        content: &str,
        credential: &Credential,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instructions,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Failed(format!("request failed: {}", e)))?;

        let status = response.status();
        debug!(%status, model = %self.config.model, "generation service responded");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(classify_failure(status, body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Failed(format!("malformed response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::Failed("response contained no completion".to_string()))
    }
}

/// Maps a non-success status to the orchestrator's error kinds:
/// 401 and 403 mean the credential was rejected, anything else is a plain
/// failure.
fn classify_failure(status: StatusCode, body: String) -> GenerationError {
    match status.as_u16() {
        401 | 403 => GenerationError::Unauthorized(format!("HTTP {}", status)),
        _ => GenerationError::Failed(format!("HTTP {}: {}", status, body)),
    }
}
