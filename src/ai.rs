//! Text generation through an external language-model API.

use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{Settings, ANTHROPIC_VERSION, ENV_API_KEY};

/// Errors that can occur while generating text. None of these are fatal to a run.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured (set {ENV_API_KEY})")]
    NotConfigured,

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    /// Network failure, timeout or undecodable body.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with an error status (bad key, rate limit, overload...).
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("API returned no text")]
    EmptyResponse,
}

pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Blocking client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: Client,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Build a client from settings. Fails with [`AiError::NotConfigured`]
    /// when no API key is set.
    pub fn new(settings: &Settings) -> Result<Self, AiError> {
        let api_key = settings.api_key.as_ref().ok_or(AiError::NotConfigured)?;

        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|_| AiError::InvalidApiKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }
}

impl TextGenerator for AnthropicClient {
    fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "requesting generated text");
        let response = self.client.post(&self.api_url).json(&request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        extract_text(response.json::<MessagesResponse>()?)
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "unknown API error".to_owned(),
        Err(_) => body.trim().to_owned(),
    }
}

fn extract_text(response: MessagesResponse) -> Result<String, AiError> {
    let text: Vec<String> = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    let joined = text.join("\n");
    if joined.trim().is_empty() {
        Err(AiError::EmptyResponse)
    } else {
        Ok(joined.trim().to_owned())
    }
}
