pub mod backend;
pub mod client;
pub mod http_client;
pub mod prompts;
pub mod rate_limiter;
pub mod response_parser;
#[cfg(test)]
pub mod testing;

pub use backend::{GenerationBackend, GenerationRequest, GenerationResponse, HttpBackend, Message};
pub use client::{GeneratedAdaptation, GenerationClient, GenerationOptions, GenerationStats};
pub use rate_limiter::{RateLimitStatus, RateLimiter};
pub use response_parser::{ParseMethod, ParsedAdaptation};
