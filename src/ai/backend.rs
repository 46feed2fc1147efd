//! Generation backend seam
//!
//! The engine only needs "send messages, get text back". [`HttpBackend`]
//! speaks the JSON contract of the proxy endpoint; tests inject scripted
//! backends through the same trait.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_client::generation_client;
use crate::config::BackendConfig;
use crate::error::BackendError;

/// Message in a generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    /// Concatenated prompt text, used for token estimation
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content block in a backend response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

/// Successful backend response body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl GenerationResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock {
                text: Some(text.into()),
            }],
        }
    }

    /// Joined text of all blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Error body returned on non-2xx responses
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

/// The proxy sends a plain string; upstream APIs send `{message}`
#[derive(Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Message(String),
    Detail { message: String },
}

/// Capability to turn a prompt into generated text
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, BackendError>;
}

/// Backend speaking JSON over HTTP
pub struct HttpBackend {
    client: &'static Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: generation_client(),
            config,
        }
    }

    pub fn model(&self) -> Option<&str> {
        self.config.model.as_deref()
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, BackendError> {
        let mut body = request.clone();
        if body.model.is_none() {
            body.model = self.config.model.clone();
        }

        let mut builder = self
            .client
            .post(&self.config.endpoint)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("x-api-key", key).bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::timeout(format!("Request timed out: {}", e))
            } else {
                BackendError::network(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&error_text) {
                Ok(ApiError {
                    error: ApiErrorBody::Message(message),
                })
                | Ok(ApiError {
                    error: ApiErrorBody::Detail { message },
                }) => message,
                Err(_) if error_text.is_empty() => status.to_string(),
                Err(_) => error_text,
            };
            return Err(BackendError::http(status.as_u16(), format!("API error: {}", message)));
        }

        response
            .json::<GenerationResponse>()
            .await
            .map_err(|e| BackendError::invalid_response(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_to_contract() {
        let request = GenerationRequest {
            model: None,
            messages: vec![Message::user("Hello")],
            max_tokens: 4096,
            temperature: 0.3,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Hello");
        assert_eq!(value["max_tokens"], 4096);
        assert!(value.get("model").is_none());
    }

    #[test]
    fn test_response_text_joins_blocks() {
        let response: GenerationResponse =
            serde_json::from_str(r#"{"content":[{"text":"Hello "},{"type":"other"},{"text":"world"}]}"#)
                .unwrap();
        assert_eq!(response.text(), "Hello world");
    }

    #[test]
    fn test_error_body_shapes() {
        let plain: ApiError = serde_json::from_str(r#"{"error":"Invalid API key"}"#).unwrap();
        assert!(matches!(plain.error, ApiErrorBody::Message(ref m) if m == "Invalid API key"));
        let nested: ApiError =
            serde_json::from_str(r#"{"error":{"type":"x","message":"Overloaded"}}"#).unwrap();
        assert!(matches!(nested.error, ApiErrorBody::Detail { ref message } if message == "Overloaded"));
    }
}
