//! Generation client: rate limiting, retries with backoff, per-call timeout
//! and request statistics on top of a [`GenerationBackend`].

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::backend::{GenerationBackend, GenerationRequest, Message};
use super::prompts::JSON_ONLY_DIRECTIVE;
use super::rate_limiter::{estimate_tokens, RateLimitStatus, RateLimiter};
use super::response_parser::{parse_adaptation_response, parse_json_response, ParseMethod};
use crate::config::ClientConfig;
use crate::error::{AdaptError, BackendError, Result};

const HISTORY_LIMIT: usize = 50;
const RECENT_LIMIT: usize = 10;
const JSON_TEMPERATURE: f32 = 0.1;

/// `<prefix>_<unix millis>_<9 random chars>`
pub fn generate_id(prefix: &str) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &random[..9])
}

/// Per-call overrides of the client defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerationOptions {
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            temperature: None,
        }
    }
}

/// Raw text of one successful call
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub text: String,
    pub tokens_used: u64,
    pub attempts: u32,
    pub request_id: String,
}

/// Parsed adaptation returned by [`GenerationClient::generate_adaptation`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAdaptation {
    pub student_worksheet: String,
    pub teacher_guide: String,
    pub raw: String,
    pub parse_method: ParseMethod,
    pub tokens_used: u64,
    pub request_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub prompt_length: usize,
    pub max_tokens: u32,
    pub status: RequestStatus,
    pub attempts: u32,
    pub duration_ms: Option<u64>,
    pub tokens_used: Option<u64>,
    pub error: Option<String>,
    #[serde(skip)]
    started: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    pub total_requests: u64,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub success_rate: f64,
    pub total_tokens_used: u64,
    pub average_response_time_ms: f64,
    pub recent_requests: Vec<RequestRecord>,
}

#[derive(Debug, Default)]
struct RequestHistory {
    total_requests: u64,
    total_tokens_used: u64,
    /// Newest first
    records: VecDeque<RequestRecord>,
}

impl RequestHistory {
    fn start(&mut self, record: RequestRecord) {
        self.total_requests += 1;
        self.records.push_front(record);
        self.records.truncate(HISTORY_LIMIT);
    }

    fn finish(&mut self, id: &str, outcome: std::result::Result<(u64, u32), (&AdaptError, u32)>) {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return;
        };
        record.duration_ms = record.started.map(|s| s.elapsed().as_millis() as u64);
        match outcome {
            Ok((tokens, attempts)) => {
                record.status = RequestStatus::Success;
                record.tokens_used = Some(tokens);
                record.attempts = attempts;
                self.total_tokens_used += tokens;
            }
            Err((err, attempts)) => {
                record.status = RequestStatus::Error;
                record.attempts = attempts;
                record.error = Some(err.to_string());
            }
        }
    }
}

pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    config: ClientConfig,
    rate_limiter: RateLimiter,
    history: Mutex<RequestHistory>,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: ClientConfig) -> Self {
        Self {
            rate_limiter: RateLimiter::new(config.rate_limit.clone()),
            backend,
            config,
            history: Mutex::new(RequestHistory::default()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Generate an adaptation and split it into worksheet and guide
    pub async fn generate_adaptation(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedAdaptation> {
        let generated = self.generate_text(prompt, options).await?;
        let parsed = parse_adaptation_response(&generated.text);
        if parsed.parse_method == ParseMethod::Fallback {
            warn!(
                request_id = %generated.request_id,
                "[GenerationClient] Response missing section markers, using fallback guide"
            );
        }

        Ok(GeneratedAdaptation {
            student_worksheet: parsed.student_worksheet,
            teacher_guide: parsed.teacher_guide,
            raw: generated.text,
            parse_method: parsed.parse_method,
            tokens_used: generated.tokens_used,
            request_id: generated.request_id,
        })
    }

    /// Generate a JSON payload and deserialize it into `T`.
    ///
    /// Appends a JSON-only directive and samples at a low temperature.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<T> {
        let prompt = format!("{}{}", prompt, JSON_ONLY_DIRECTIVE);
        let options = GenerationOptions {
            temperature: Some(JSON_TEMPERATURE),
            ..*options
        };
        let generated = self.generate_text(&prompt, &options).await?;
        parse_json_response(&generated.text)
    }

    /// One logical request: admission, then up to `max_retries` attempts
    pub async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<GeneratedText> {
        let request = GenerationRequest {
            model: None,
            messages: vec![Message::user(prompt)],
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: options.temperature.unwrap_or(self.config.temperature),
        };
        let request_id = generate_id("req");

        self.rate_limiter.check_limit().await;
        self.rate_limiter.check_token_limit(estimate_tokens(prompt)).await;

        self.history.lock().await.start(RequestRecord {
            id: request_id.clone(),
            started_at: Utc::now(),
            prompt_length: prompt.chars().count(),
            max_tokens: request.max_tokens,
            status: RequestStatus::Pending,
            attempts: 0,
            duration_ms: None,
            tokens_used: None,
            error: None,
            started: Some(Instant::now()),
        });

        match self.send_with_retries(&request, &request_id).await {
            Ok((text, attempts)) => {
                let tokens_used = estimate_tokens(&text);
                self.history
                    .lock()
                    .await
                    .finish(&request_id, Ok((tokens_used, attempts)));
                debug!(
                    request_id = %request_id,
                    attempts,
                    tokens = tokens_used,
                    "[GenerationClient] Request succeeded"
                );
                Ok(GeneratedText {
                    text,
                    tokens_used,
                    attempts,
                    request_id,
                })
            }
            Err((err, attempts)) => {
                self.history.lock().await.finish(&request_id, Err((&err, attempts)));
                Err(err)
            }
        }
    }

    async fn send_with_retries(
        &self,
        request: &GenerationRequest,
        request_id: &str,
    ) -> std::result::Result<(String, u32), (AdaptError, u32)> {
        let max_attempts = self.config.max_retries.max(1);
        let mut last_error = BackendError::network("no attempt made");

        for attempt in 1..=max_attempts {
            let err = match self.send_once(request).await {
                Ok(text) => return Ok((text, attempt)),
                Err(err) => err,
            };

            let category = err.category();
            if !category.is_retryable() {
                error!(
                    request_id = %request_id,
                    category = %category,
                    status = ?err.status,
                    error = %err,
                    "[GenerationClient] Non-retryable failure"
                );
                return Err((
                    AdaptError::GenerationFatal {
                        category,
                        status: err.status,
                        message: err.message,
                        user_message: category.user_message().to_string(),
                        request_id: request_id.to_string(),
                    },
                    attempt,
                ));
            }

            warn!(
                request_id = %request_id,
                attempt,
                max_attempts,
                category = %category,
                error = %err,
                "[GenerationClient] Attempt failed"
            );
            last_error = err;

            if attempt < max_attempts {
                let delay = self.config.retry_delay_ms.saturating_mul(1 << (attempt - 1).min(16));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        let category = last_error.category();
        Err((
            AdaptError::GenerationTransient {
                category,
                attempts: max_attempts,
                message: last_error.message,
                user_message: category.user_message().to_string(),
                troubleshooting: category.troubleshooting(),
                request_id: request_id.to_string(),
            },
            max_attempts,
        ))
    }

    async fn send_once(&self, request: &GenerationRequest) -> std::result::Result<String, BackendError> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let response = tokio::time::timeout(timeout, self.backend.generate(request))
            .await
            .map_err(|_| {
                BackendError::timeout(format!("Request timed out after {}ms", self.config.timeout_ms))
            })??;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(BackendError::invalid_response(
                "Invalid response structure: no text content",
            ));
        }
        Ok(text)
    }

    pub async fn stats(&self) -> GenerationStats {
        let history = self.history.lock().await;
        let successful: Vec<&RequestRecord> = history
            .records
            .iter()
            .filter(|r| r.status == RequestStatus::Success)
            .collect();
        let failed = history
            .records
            .iter()
            .filter(|r| r.status == RequestStatus::Error)
            .count();

        let average_response_time_ms = if successful.is_empty() {
            0.0
        } else {
            successful
                .iter()
                .map(|r| r.duration_ms.unwrap_or(0) as f64)
                .sum::<f64>()
                / successful.len() as f64
        };

        GenerationStats {
            total_requests: history.total_requests,
            successful_requests: successful.len(),
            failed_requests: failed,
            success_rate: successful.len() as f64 / history.total_requests.max(1) as f64,
            total_tokens_used: history.total_tokens_used,
            average_response_time_ms,
            recent_requests: history.records.iter().take(RECENT_LIMIT).cloned().collect(),
        }
    }

    pub async fn reset_stats(&self) {
        *self.history.lock().await = RequestHistory::default();
    }

    pub async fn rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limiter.status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedBackend;
    use crate::error::ErrorCategory;
    use serde_json::Value;

    fn client(backend: Arc<ScriptedBackend>) -> GenerationClient {
        GenerationClient::new(backend, ClientConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_adaptation_success_records_stats() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(
            "STUDENT_WORKSHEET:\nHello\n\nTEACHER_GUIDE:\nWorld".to_string(),
        )]));
        let client = client(backend.clone());

        let result = client
            .generate_adaptation("Adapt this", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(result.student_worksheet, "Hello");
        assert_eq!(result.teacher_guide, "World");
        assert_eq!(result.parse_method, ParseMethod::Structured);
        assert!(result.request_id.starts_with("req_"));
        assert_eq!(result.tokens_used, estimate_tokens(&result.raw));

        let request = &backend.requests()[0];
        assert_eq!(request.max_tokens, 4096);
        assert_eq!(request.temperature, 0.3);

        let stats = client.stats().await;
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.success_rate, 1.0);
        assert_eq!(stats.total_tokens_used, result.tokens_used);
        assert_eq!(stats.recent_requests[0].status, RequestStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_retried_with_backoff() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::http(503, "Service unavailable")),
            Err(BackendError::network("connection reset")),
            Ok("STUDENT_WORKSHEET:\nA\nTEACHER_GUIDE:\nB".to_string()),
        ]));
        let client = client(backend.clone());
        let start = Instant::now();

        let result = client
            .generate_adaptation("prompt", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(result.student_worksheet, "A");
        assert_eq!(backend.calls(), 3);
        // 1000ms then 2000ms of backoff
        assert!(start.elapsed() >= Duration::from_millis(3000));
        // Every attempt resends the identical prompt
        let prompts = backend.prompts();
        assert!(prompts.iter().all(|p| p == "prompt"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_authentication_failure_not_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::http(401, "API error: Invalid API key")),
            Ok("never reached".to_string()),
        ]));
        let client = client(backend.clone());

        let err = client
            .generate_text("prompt", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(backend.calls(), 1);
        match err {
            AdaptError::GenerationFatal { category, status, .. } => {
                assert_eq!(category, ErrorCategory::Authentication);
                assert_eq!(status, Some(401));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(client.stats().await.failed_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_status_not_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(BackendError::http(429, "slow down"))]));
        let client = client(backend.clone());
        let err = client
            .generate_text("prompt", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(backend.calls(), 1);
        assert_eq!(err.category(), Some(ErrorCategory::RateLimit));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_troubleshooting() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendError::http(500, "Internal Server Error")),
            Err(BackendError::http(500, "Internal Server Error")),
            Err(BackendError::http(500, "Internal Server Error")),
            Ok("unused".to_string()),
        ]));
        let client = client(backend.clone());

        let err = client
            .generate_text("prompt", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(backend.calls(), 3);
        match err {
            AdaptError::GenerationTransient {
                category,
                attempts,
                troubleshooting,
                user_message,
                ..
            } => {
                assert_eq!(category, ErrorCategory::ServerError);
                assert_eq!(attempts, 3);
                assert!(!troubleshooting.is_empty());
                assert!(!user_message.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_response_is_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("   ".to_string()),
            Ok("STUDENT_WORKSHEET:\nA\nTEACHER_GUIDE:\nB".to_string()),
        ]));
        let client = client(backend.clone());
        let result = client.generate_text("prompt", &GenerationOptions::default()).await.unwrap();
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_attempt() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![Ok("late".to_string()), Ok("late".to_string())])
                .with_delay(Duration::from_secs(120)),
        );
        let config = ClientConfig {
            max_retries: 2,
            timeout_ms: 1_000,
            ..Default::default()
        };
        let client = GenerationClient::new(backend.clone(), config);

        let err = client
            .generate_text("prompt", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(backend.calls(), 2);
        assert_eq!(err.category(), Some(ErrorCategory::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_json_lowers_temperature() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(
            "```json\n{\"title\": \"Fractions\"}\n```".to_string(),
        )]));
        let client = client(backend.clone());

        let value: Value = client
            .generate_json("Describe", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(value["title"], "Fractions");

        let request = &backend.requests()[0];
        assert_eq!(request.temperature, JSON_TEMPERATURE);
        assert!(request.prompt_text().ends_with(JSON_ONLY_DIRECTIVE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_is_bounded() {
        let backend = Arc::new(ScriptedBackend::from_fn(|_| {
            Ok(crate::ai::GenerationResponse::from_text("ok"))
        }));
        let client = client(backend);
        for _ in 0..55 {
            client.generate_text("p", &GenerationOptions::default()).await.unwrap();
        }

        let stats = client.stats().await;
        assert_eq!(stats.total_requests, 55);
        assert_eq!(stats.successful_requests, HISTORY_LIMIT);
        assert_eq!(stats.recent_requests.len(), RECENT_LIMIT);

        client.reset_stats().await;
        assert_eq!(client.stats().await.total_requests, 0);
    }

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id("adapt");
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "adapt");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
    }
}
