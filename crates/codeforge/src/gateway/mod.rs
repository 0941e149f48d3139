//! Groq model gateway
//!
//! One round trip per call to Groq's OpenAI-compatible chat completions
//! endpoint. No retries, no backoff, no streaming: the orchestrator decides
//! what each failure means, so this layer only reports transport errors,
//! non-success statuses (with the provider's body text), and completions
//! that arrive without content.

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Groq API configuration from environment variables
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GroqConfig {
    /// Default Groq OpenAI-compatible API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.groq.com/openai/v1";

    /// Default model for every completion call
    pub const DEFAULT_MODEL: &'static str = "llama-3.3-70b-versatile";

    /// Load configuration from environment variables
    /// Uses GROQ_API_KEY for auth, left empty when unset so a --api-key
    /// override can still supply it
    /// Uses GROQ_BASE_URL and CODEFORGE_MODEL with default fallbacks
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            model: std::env::var("CODEFORGE_MODEL")
                .unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string()),
        }
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(key) = api_key {
            self.api_key = key;
        }
        if let Some(model) = model {
            self.model = model;
        }
        self
    }
}

/// Create an HTTP client with Bearer auth headers for the Groq API
pub fn create_groq_client(config: &GroqConfig) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

    if config.api_key.is_empty() {
        return Err(eyre!(
            "GROQ_API_KEY environment variable not set and no --api-key override provided"
        ));
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| eyre!("Invalid header value: {}", e))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Sampling parameters for a single completion call
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_completion_tokens: u32,
}

/// Client for Groq's chat completions API
#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl Gateway {
    /// Build a gateway from configuration, baking auth into default headers
    pub fn new(config: &GroqConfig) -> Result<Self> {
        let client = create_groq_client(config)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// One request/response exchange with the chat completions endpoint.
    ///
    /// Returns the first choice's content. Fails on transport errors,
    /// non-success statuses (provider body included), and completions with
    /// no usable content.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: CompletionParams,
    ) -> Result<String, Error> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = GroqRequest {
            model: self.model.clone(),
            messages: vec![
                GroqMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                GroqMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: params.temperature,
            max_completion_tokens: params.max_completion_tokens,
            top_p: 1.0,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::GatewayTransport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GatewayStatus {
                status: status.as_u16(),
                body,
            });
        }

        let completion: GroqResponse = response
            .json()
            .await
            .map_err(|e| Error::GatewayTransport(e.to_string()))?;

        if let Some(usage) = &completion.usage {
            log::debug!(
                "Groq usage: {} prompt tokens, {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(Error::EmptyCompletion)?;
        log::debug!("Groq completion role: {}", choice.message.role);

        choice
            .message
            .content
            .filter(|content| !content.is_empty())
            .ok_or(Error::EmptyCompletion)
    }
}

/// OpenAI-compatible message for requests
#[derive(Debug, Clone, Serialize)]
struct GroqMessage {
    role: String,
    content: String,
}

/// OpenAI-compatible message for responses
#[derive(Debug, Clone, Deserialize)]
struct GroqResponseMessage {
    role: String,
    content: Option<String>,
}

/// Chat completions request body
#[derive(Debug, Clone, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    stream: bool,
}

/// Chat completions response body
#[derive(Debug, Clone, Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
    usage: Option<GroqUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Deserialize)]
struct GroqUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
