//! Ordered image acquisition over HTTP.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use tagmap_common::clock::Clock;
use tagmap_common::config::ApiConfig;
use tagmap_common::error::{TagmapError, TagmapResult};
use tracing::{debug, warn};

use crate::raster::EmbeddableImage;
use crate::strategy::{default_strategies, ImageStrategy};
use crate::token::{RefreshTokenProvider, TokenCache, TokenProvider};

/// A failed HTTP fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unauthorized: {url}")]
    Unauthorized { url: String },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

/// A successful response body.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Shared HTTP plumbing handed to every strategy.
#[derive(Clone)]
pub struct HttpContext {
    pub client: reqwest::Client,
    pub api: ApiConfig,
    pub tokens: Arc<TokenCache>,
}

impl HttpContext {
    pub fn new(client: reqwest::Client, api: ApiConfig, tokens: Arc<TokenCache>) -> Self {
        Self {
            client,
            api,
            tokens,
        }
    }

    /// Build a client and a refresh-backed token cache from configuration.
    pub fn from_config(api: &ApiConfig, clock: Arc<dyn Clock>) -> TagmapResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(api.request_timeout_secs))
            .build()
            .map_err(|e| TagmapError::resource(format!("Failed to build HTTP client: {e}")))?;

        let provider: Arc<dyn TokenProvider> =
            Arc::new(RefreshTokenProvider::from_config(client.clone(), api));
        let tokens = Arc::new(TokenCache::new(
            provider,
            clock,
            Duration::from_secs(api.token_ttl_secs),
        ));
        Ok(Self::new(client, api.clone(), tokens))
    }

    /// GET `url`, optionally with a bearer token.
    pub async fn get(&self, url: &str, bearer: Option<&str>) -> Result<Fetched, FetchError> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(Fetched {
            content_type,
            bytes,
        })
    }

    /// A bearer token when `url` is on the own backend.
    pub async fn bearer_for(&self, url: &str) -> Option<String> {
        if self.api.is_own_backend(url) {
            self.tokens.get_or_acquire().await
        } else {
            None
        }
    }
}

/// Anything that can turn a URL into an embeddable image.
#[async_trait::async_trait]
pub trait ImageSource: Send + Sync {
    /// `None` when every way of obtaining the image failed.
    async fn load(&self, url: &str) -> Option<EmbeddableImage>;

    /// The first candidate URL that loads.
    async fn load_first(&self, urls: &[String]) -> Option<EmbeddableImage> {
        for url in urls {
            if let Some(image) = self.load(url).await {
                return Some(image);
            }
        }
        None
    }
}

/// Runs the strategy chain; the first success wins.
pub struct ResourceLoader {
    ctx: HttpContext,
    strategies: Vec<Box<dyn ImageStrategy>>,
}

impl ResourceLoader {
    /// Loader with the standard chain.
    pub fn new(ctx: HttpContext) -> Self {
        Self::with_strategies(ctx, default_strategies())
    }

    pub fn with_strategies(ctx: HttpContext, strategies: Vec<Box<dyn ImageStrategy>>) -> Self {
        Self { ctx, strategies }
    }

    pub fn from_config(api: &ApiConfig, clock: Arc<dyn Clock>) -> TagmapResult<Self> {
        Ok(Self::new(HttpContext::from_config(api, clock)?))
    }

    pub fn context(&self) -> &HttpContext {
        &self.ctx
    }
}

#[async_trait::async_trait]
impl ImageSource for ResourceLoader {
    async fn load(&self, url: &str) -> Option<EmbeddableImage> {
        for strategy in &self.strategies {
            if let Some(image) = strategy.attempt(url, &self.ctx).await {
                debug!(url, strategy = strategy.name(), "Image acquired");
                return Some(image);
            }
        }
        warn!(url, "All image strategies failed");
        None
    }
}
