// ABOUTME: AI service for text generation calls to Anthropic Claude
// ABOUTME: Handles API requests, error mapping, and usage reporting

use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT_SECS: u64 = 600;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Calculate appropriate max_tokens for a given model
fn get_max_tokens_for_model(model: &str) -> u32 {
    if model.contains("claude-3-haiku") || model.contains("claude-haiku") {
        1024
    } else {
        // Sections can be long; default to the larger budget
        4096
    }
}

#[derive(Debug, Error)]
pub enum AIServiceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("No API key configured")]
    NoApiKey,

    #[error("Invalid response format")]
    InvalidResponse,
}

pub type AIServiceResult<T> = Result<T, AIServiceError>;

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug)]
pub struct AIResponse<T> {
    pub data: T,
    pub usage: Usage,
}

/// AI service for making text generation calls
pub struct AIService {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl AIService {
    /// Create HTTP client with timeout configuration
    fn create_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build configured HTTP client, using defaults: {}", e);
                Client::new()
            })
    }

    /// Creates a new AI service instance
    /// API key is fetched from ANTHROPIC_API_KEY environment variable
    /// Model can be overridden with ANTHROPIC_MODEL environment variable
    pub fn new() -> Self {
        let api_key = env::var("ANTHROPIC_API_KEY").ok();
        if api_key.is_none() {
            info!("ANTHROPIC_API_KEY not set - generation and refinement will fail until configured");
        }

        let model = env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        if model != DEFAULT_MODEL {
            info!("Using custom Anthropic model: {}", model);
        }

        Self {
            client: Self::create_client(),
            api_key,
            model,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Creates a new AI service instance with a specific API key and model
    pub fn with_api_key_and_model(api_key: String, model: String) -> Self {
        Self {
            client: Self::create_client(),
            api_key: Some(api_key),
            model,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Point the service at a different API host (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the model being used by this service
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes a text generation call to Claude
    pub async fn generate_text(
        &self,
        prompt: String,
        system_prompt: Option<String>,
    ) -> AIServiceResult<AIResponse<String>> {
        let api_key = self.api_key.as_ref().ok_or(AIServiceError::NoApiKey)?;

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: get_max_tokens_for_model(&self.model),
            temperature: DEFAULT_TEMPERATURE,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            system: system_prompt,
        };

        info!(
            "Making Anthropic API request: model={}, max_tokens={}, timeout={}s",
            request.model, request.max_tokens, REQUEST_TIMEOUT_SECS
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Anthropic API request timed out after {} seconds", REQUEST_TIMEOUT_SECS);
                    AIServiceError::ApiError(format!(
                        "Request timed out after {} seconds. The AI service may be overloaded or unavailable.",
                        REQUEST_TIMEOUT_SECS
                    ))
                } else if e.is_connect() {
                    error!("Failed to connect to Anthropic API: {}", e);
                    AIServiceError::ApiError(format!(
                        "Connection failed: {}. Please check your internet connection.",
                        e
                    ))
                } else {
                    error!("Anthropic API request failed: {}", e);
                    AIServiceError::RequestFailed(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Anthropic API error: {} - {}", status, error_text);
            return Err(AIServiceError::ApiError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AIServiceError::ParseError(e.to_string()))?;

        // Extract text from the first content block
        let text = anthropic_response
            .content
            .first()
            .ok_or(AIServiceError::InvalidResponse)?
            .text
            .clone();

        info!(
            "Anthropic API response received: {} tokens",
            anthropic_response.usage.total_tokens()
        );

        Ok(AIResponse {
            data: text,
            usage: anthropic_response.usage,
        })
    }
}

impl Default for AIService {
    fn default() -> Self {
        Self::new()
    }
}
