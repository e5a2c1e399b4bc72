//! Bearer credentials for the system's own backend.
//!
//! A [`TokenCache`] holds at most one token together with the clock reading
//! at which it was acquired. Callers share one cache per process; the async
//! mutex is held across acquisition so concurrent fetches wait for a single
//! refresh instead of each hitting the refresh endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::COOKIE;
use tagmap_common::clock::Clock;
use tagmap_common::config::ApiConfig;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Cookie carrying the refresh credential.
const REFRESH_COOKIE: &str = "refresh_token";

/// Source of fresh bearer tokens.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// A new token, or `None` when the exchange fails for any reason.
    async fn acquire_bearer_token(&self) -> Option<String>;
}

/// Exchanges the refresh credential at the backend's refresh endpoint.
#[derive(Debug, Clone)]
pub struct RefreshTokenProvider {
    client: reqwest::Client,
    endpoint: String,
    refresh_token: Option<String>,
}

impl RefreshTokenProvider {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            refresh_token,
        }
    }

    pub fn from_config(client: reqwest::Client, api: &ApiConfig) -> Self {
        Self::new(
            client,
            api.endpoint(&api.refresh_path),
            api.refresh_token.clone(),
        )
    }
}

#[async_trait::async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn acquire_bearer_token(&self) -> Option<String> {
        let mut request = self.client.post(&self.endpoint);
        if let Some(refresh) = &self.refresh_token {
            request = request.header(COOKIE, format!("{REFRESH_COOKIE}={refresh}"));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Token refresh request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), "Token refresh rejected");
            return None;
        }

        let body: serde_json::Value = response.json().await.ok()?;
        body.pointer("/data/accessToken")
            .and_then(|token| token.as_str())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    acquired_at_ms: u64,
}

/// A single bearer token reused while younger than its TTL.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Default reuse window.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

    pub fn new(provider: Arc<dyn TokenProvider>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            provider,
            clock,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The cached token if still fresh, otherwise a newly acquired one.
    pub async fn get_or_acquire(&self) -> Option<String> {
        let mut slot = self.slot.lock().await;
        let ttl_ms = self.ttl.as_millis() as u64;

        if let Some(cached) = slot.as_ref() {
            if self.clock.elapsed_since_ms(cached.acquired_at_ms) < ttl_ms {
                return Some(cached.token.clone());
            }
        }

        let acquired_at_ms = self.clock.now_ms();
        match self.provider.acquire_bearer_token().await {
            Some(token) => {
                debug!("Acquired bearer token");
                *slot = Some(CachedToken {
                    token: token.clone(),
                    acquired_at_ms,
                });
                Some(token)
            }
            None => {
                *slot = None;
                None
            }
        }
    }

    /// Drop the cached token so the next call re-acquires.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
