//! Shared HTTP Client Module
//!
//! Provides a global, lazy-initialized HTTP client with connection pooling so
//! every generation call reuses the same TLS sessions and TCP connections.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global HTTP client for generation backend calls
///
/// The per-call deadline is enforced by the generation client, so the
/// transport timeout here is only an upper bound for stuck connections.
pub static GENERATION_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(180))
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build tuned HTTP client, using defaults: {}", e);
            Client::new()
        })
});

/// Get the global generation HTTP client
#[inline]
pub fn generation_client() -> &'static Client {
    &GENERATION_CLIENT
}
