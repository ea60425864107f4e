//! The external resolution boundary.
//!
//! Everything byte-level lives behind [`AssetSource`]: the loader hands it
//! one raw item plus a per-call [`ResolveContext`] and treats the rest as an
//! opaque, possibly slow, possibly cancelable async operation.

use crate::asset::{AssetItem, ResolvedFile};
use crate::error::ResolveResult;
use crate::input::AssetInput;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Per-item URL resolver hook: rewrites a string item into something the
/// source can fetch (a concrete URL, path, or an already materialized item).
pub type UrlResolver =
    Arc<dyn Fn(&str) -> BoxFuture<'static, ResolveResult<AssetItem>> + Send + Sync>;

/// Category-level shader hook: maps the unwrapped shader input to the actual
/// input to resolve (possibly deferred again). `None` short-circuits to
/// "no shaders" rather than an error.
pub type ShaderResolver =
    Arc<dyn Fn(AssetInput) -> BoxFuture<'static, ResolveResult<Option<AssetInput>>> + Send + Sync>;

/// Context threaded into every [`AssetSource::resolve`] call.
#[derive(Clone, Default)]
pub struct ResolveContext {
    /// Applied to string items before fetching, when present.
    pub url_resolver: Option<UrlResolver>,
    /// Advisory cancellation signal; the source decides how to react,
    /// typically by rejecting in-flight fetches.
    pub cancel: Option<CancellationToken>,
}

impl ResolveContext {
    /// Apply the URL resolver to string items; everything else passes through.
    pub async fn rewrite(&self, item: AssetItem) -> ResolveResult<AssetItem> {
        match (&self.url_resolver, item) {
            (Some(resolver), AssetItem::Url(url)) => resolver(&url).await,
            (_, item) => Ok(item),
        }
    }
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("url_resolver", &self.url_resolver.as_ref().map(|_| ".."))
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// The external resolution primitive: turns one raw item into a
/// [`ResolvedFile`] or fails.
///
/// Retries, decoding, and transport concerns all belong here, not in the
/// orchestration layer above.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Resolve one raw item.
    async fn resolve(&self, item: AssetItem, ctx: ResolveContext) -> ResolveResult<ResolvedFile>;
}
