//! Error taxonomy for the adaptation engine
//!
//! Generation failures are classified into an [`ErrorCategory`] which decides
//! retry behavior and carries the user-facing message and troubleshooting
//! hints surfaced once retries are exhausted.

use serde::Serialize;
use thiserror::Error;

use crate::models::AdaptationParams;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AdaptError>;

/// Failure category for generation backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    RateLimit,
    Authentication,
    Validation,
    Timeout,
    ServerError,
    Network,
    ClientError,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::RateLimit => "rate_limit",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::ServerError => "server_error",
            ErrorCategory::Network => "network",
            ErrorCategory::ClientError => "client_error",
            ErrorCategory::Unknown => "unknown",
        }
    }

    /// Classify a backend failure. Status codes win over message patterns.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        match status {
            Some(401) | Some(403) => return ErrorCategory::Authentication,
            Some(429) => return ErrorCategory::RateLimit,
            Some(408) => return ErrorCategory::Timeout,
            Some(422) => return ErrorCategory::Validation,
            _ => {}
        }

        let lower = message.to_lowercase();
        if lower.contains("rate limit") || lower.contains("too many requests") {
            ErrorCategory::RateLimit
        } else if lower.contains("unauthorized") || lower.contains("invalid api key") {
            ErrorCategory::Authentication
        } else if lower.contains("validation") || lower.contains("invalid input") {
            ErrorCategory::Validation
        } else if lower.contains("timeout") || lower.contains("timed out") {
            ErrorCategory::Timeout
        } else if lower.contains("internal server error") {
            ErrorCategory::ServerError
        } else if lower.contains("network") || lower.contains("connection") {
            ErrorCategory::Network
        } else {
            match status {
                Some(s) if (400..500).contains(&s) => ErrorCategory::ClientError,
                Some(s) if s >= 500 => ErrorCategory::ServerError,
                _ => ErrorCategory::Unknown,
            }
        }
    }

    /// Authentication, explicit rate limiting and validation failures fail fast.
    /// Rate limiting is handled up front by the limiter, not by resending.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ErrorCategory::Authentication | ErrorCategory::RateLimit | ErrorCategory::Validation
        )
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::RateLimit => {
                "We're processing too many requests right now. Please wait a moment and try again."
            }
            ErrorCategory::Authentication => {
                "There's an issue with our API connection. Please contact support if this persists."
            }
            ErrorCategory::Validation => {
                "There's an issue with your input. Please check your content and try again."
            }
            ErrorCategory::Timeout => {
                "The request is taking longer than expected. Please try again."
            }
            ErrorCategory::ServerError => {
                "Our servers are experiencing issues. Please try again in a few minutes."
            }
            ErrorCategory::Network => {
                "Unable to connect to our servers. Please check your internet connection."
            }
            ErrorCategory::ClientError | ErrorCategory::Unknown => {
                "An unexpected error occurred. Please try again or contact support if the issue persists."
            }
        }
    }

    pub fn troubleshooting(&self) -> Vec<String> {
        let hints: &[&str] = match self {
            ErrorCategory::RateLimit => &[
                "Wait 1-2 minutes before trying again",
                "Consider reducing the amount of content being processed",
                "Try again during off-peak hours",
            ],
            ErrorCategory::Authentication => &[
                "Check API key configuration",
                "Verify API permissions",
                "Contact administrator if using shared credentials",
            ],
            ErrorCategory::Validation => &[
                "Check that all required fields are filled",
                "Verify content format and length",
                "Try with simpler content first",
            ],
            ErrorCategory::Timeout => &[
                "Try with shorter content",
                "Check internet connection stability",
                "Retry the request",
            ],
            ErrorCategory::ServerError => &[
                "Wait a few minutes and try again",
                "Try with different content",
                "Contact support if problem persists",
            ],
            ErrorCategory::Network => &[
                "Check internet connection",
                "Check the configured endpoint",
                "Disable VPN if using one",
            ],
            ErrorCategory::ClientError | ErrorCategory::Unknown => &[
                "Retry the request",
                "Try with different content",
                "Contact support with error details",
            ],
        };
        hints.iter().map(|s| s.to_string()).collect()
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level failure kinds reported by a generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    Http,
    Timeout,
    Network,
    InvalidResponse,
}

/// Failure reported by a [`crate::ai::GenerationBackend`]
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub status: Option<u16>,
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            kind: BackendErrorKind::Http,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            status: None,
            kind: BackendErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            kind: BackendErrorKind::Network,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            status: None,
            kind: BackendErrorKind::InvalidResponse,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            BackendErrorKind::Timeout => ErrorCategory::Timeout,
            BackendErrorKind::Network => ErrorCategory::Network,
            // An empty or malformed body is worth another attempt
            BackendErrorKind::InvalidResponse => ErrorCategory::ServerError,
            BackendErrorKind::Http => ErrorCategory::classify(self.status, &self.message),
        }
    }
}

/// Errors raised by analysis, generation and pipeline execution
#[derive(Debug, Error)]
pub enum AdaptError {
    /// Missing or malformed request parameters. Raised before any generation call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Retryable backend failure that outlived every attempt.
    #[error("Generation failed after {attempts} attempt(s) ({category}): {message}")]
    GenerationTransient {
        category: ErrorCategory,
        attempts: u32,
        message: String,
        user_message: String,
        troubleshooting: Vec<String>,
        request_id: String,
    },

    /// Authentication, rate-limit or validation failure. Never retried.
    #[error("Generation rejected ({category}): {message}")]
    GenerationFatal {
        category: ErrorCategory,
        status: Option<u16>,
        message: String,
        user_message: String,
        request_id: String,
    },

    /// A named pipeline step failed; the run is aborted.
    #[error("Pipeline step '{step}' failed: {source}")]
    PipelineStep {
        step: String,
        #[source]
        source: Box<AdaptError>,
    },

    /// Structured JSON could not be recovered from generated text.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdaptError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AdaptError::InvalidInput(message.into())
    }

    pub fn step(step: &str, source: AdaptError) -> Self {
        AdaptError::PipelineStep {
            step: step.to_string(),
            source: Box::new(source),
        }
    }

    /// Category of the underlying generation failure, if any
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            AdaptError::GenerationTransient { category, .. }
            | AdaptError::GenerationFatal { category, .. } => Some(*category),
            AdaptError::PipelineStep { source, .. } => source.category(),
            _ => None,
        }
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            AdaptError::GenerationTransient { user_message, .. }
            | AdaptError::GenerationFatal { user_message, .. } => user_message.clone(),
            AdaptError::PipelineStep { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }
}

/// Top-level engine failure, enriched with correlation context
#[derive(Debug, Error)]
#[error("Adaptation failed: {source}")]
pub struct AdaptationFailure {
    pub job_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub engine_version: &'static str,
    pub params: Box<AdaptationParams>,
    #[source]
    pub source: AdaptError,
}
