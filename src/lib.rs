//! Adapts instructional material for English language learners.
//!
//! The [`AdaptationEngine`] analyzes a piece of content, picks a processing
//! strategy, runs the adaptation pipeline against a generation backend and
//! validates what comes back against the requested WIDA proficiency level.

pub mod adapters;
pub mod ai;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod validation;

use tracing_subscriber::EnvFilter;

pub use config::{BackendConfig, ClientConfig, EngineConfig, RateLimitConfig};
pub use engine::{AdaptationEngine, AdaptationProgress, AdaptationResult, EngineEvent, EngineStatus, Phase};
pub use error::{AdaptError, AdaptationFailure, ErrorCategory, Result};
pub use models::{AdaptationParams, DynamicDescriptors};
pub use validation::{OutputValidator, ValidationOptions, ValidationReport};

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to warn for dependencies and info for this
/// crate. Logs go to stderr so stdout stays machine readable. Safe to
/// call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,ell_adapter=info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
