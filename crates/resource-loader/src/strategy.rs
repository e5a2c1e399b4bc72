//! Image acquisition strategies, tried in order by the loader.

use tracing::debug;

use crate::loader::{FetchError, HttpContext};
use crate::raster::{looks_like_svg, EmbeddableImage};

/// One way of obtaining an image. Failures are `None`, never errors.
#[async_trait::async_trait]
pub trait ImageStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, url: &str, ctx: &HttpContext) -> Option<EmbeddableImage>;
}

/// The standard chain.
pub fn default_strategies() -> Vec<Box<dyn ImageStrategy>> {
    vec![
        Box::new(AuthenticatedFetch),
        Box::new(CrossOriginDecode),
        Box::new(DirectFetch),
    ]
}

/// Bearer-authenticated fetch for URLs on the own backend. A 401 drops the
/// cached token and retries once with a fresh one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedFetch;

#[async_trait::async_trait]
impl ImageStrategy for AuthenticatedFetch {
    fn name(&self) -> &'static str {
        "authenticated"
    }

    async fn attempt(&self, url: &str, ctx: &HttpContext) -> Option<EmbeddableImage> {
        if !ctx.api.is_own_backend(url) {
            return None;
        }

        let token = ctx.tokens.get_or_acquire().await;
        let fetched = match ctx.get(url, token.as_deref()).await {
            Err(FetchError::Unauthorized { .. }) => {
                debug!(url, "Bearer rejected, refreshing");
                ctx.tokens.invalidate().await;
                let retry = ctx.tokens.get_or_acquire().await;
                ctx.get(url, retry.as_deref()).await
            }
            other => other,
        };

        let fetched = fetched
            .map_err(|e| debug!(url, error = %e, "Authenticated fetch failed"))
            .ok()?;
        decode_payload(url, fetched.content_type.as_deref(), &fetched.bytes)
    }
}

/// Plain fetch, decode as a raster, re-encode as PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossOriginDecode;

#[async_trait::async_trait]
impl ImageStrategy for CrossOriginDecode {
    fn name(&self) -> &'static str {
        "decode"
    }

    async fn attempt(&self, url: &str, ctx: &HttpContext) -> Option<EmbeddableImage> {
        let fetched = ctx
            .get(url, None)
            .await
            .map_err(|e| debug!(url, error = %e, "Plain fetch failed"))
            .ok()?;
        EmbeddableImage::reencode_png(&fetched.bytes)
            .map_err(|e| debug!(url, error = %e, "Raster decode failed"))
            .ok()
    }
}

/// Last resort: fetch (with a bearer for own-backend URLs), rasterize SVG,
/// pass rasters through.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFetch;

#[async_trait::async_trait]
impl ImageStrategy for DirectFetch {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn attempt(&self, url: &str, ctx: &HttpContext) -> Option<EmbeddableImage> {
        let bearer = ctx.bearer_for(url).await;
        let fetched = ctx
            .get(url, bearer.as_deref())
            .await
            .map_err(|e| debug!(url, error = %e, "Direct fetch failed"))
            .ok()?;
        decode_payload(url, fetched.content_type.as_deref(), &fetched.bytes)
    }
}

fn decode_payload(url: &str, content_type: Option<&str>, bytes: &[u8]) -> Option<EmbeddableImage> {
    let decoded = if looks_like_svg(url, content_type) {
        EmbeddableImage::from_svg(bytes)
    } else {
        EmbeddableImage::from_encoded(bytes)
    };
    decoded
        .map_err(|e| debug!(url, error = %e, "Payload is not an embeddable image"))
        .ok()
}
