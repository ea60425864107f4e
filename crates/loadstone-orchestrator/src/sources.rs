//! Built-in [`AssetSource`] implementations.
//!
//! Transport-heavy sources (HTTP and friends) belong to embedding
//! applications; these two cover the in-memory and local-filesystem cases
//! that the loader itself and its tests need.

use async_trait::async_trait;
use bytes::Bytes;
use loadstone_abstraction::{
    AssetItem, AssetSource, ResolveContext, ResolveError, ResolveResult, ResolvedFile,
};
use std::path::PathBuf;
use tracing::debug;

/// Resolves records and blobs in place. String items must be rewritten into
/// materialized items by the per-item URL resolver; otherwise they are
/// unsupported, since this source has nothing to fetch from.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySource;

#[async_trait]
impl AssetSource for MemorySource {
    async fn resolve(&self, item: AssetItem, ctx: ResolveContext) -> ResolveResult<ResolvedFile> {
        if let Some(cancel) = &ctx.cancel {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
        }
        match ctx.rewrite(item).await? {
            AssetItem::Record(record) => {
                Ok(ResolvedFile::named(record.name.clone(), record.data.clone()))
            }
            AssetItem::Blob(data) => Ok(ResolvedFile::unnamed(data)),
            AssetItem::Url(url) => Err(ResolveError::Unsupported(format!(
                "memory source cannot fetch '{url}'"
            ))),
        }
    }
}

/// Treats string items as filesystem paths, optionally under a base
/// directory. Reads honor the cancellation token.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    base: Option<PathBuf>,
}

impl FsSource {
    /// A source resolving paths as given.
    #[must_use]
    pub fn new() -> Self {
        Self { base: None }
    }

    /// A source resolving paths relative to `base`.
    pub fn rooted(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

#[async_trait]
impl AssetSource for FsSource {
    async fn resolve(&self, item: AssetItem, ctx: ResolveContext) -> ResolveResult<ResolvedFile> {
        match ctx.rewrite(item).await? {
            AssetItem::Record(record) => {
                Ok(ResolvedFile::named(record.name.clone(), record.data.clone()))
            }
            AssetItem::Blob(data) => Ok(ResolvedFile::unnamed(data)),
            AssetItem::Url(path) => {
                let path = match &self.base {
                    Some(base) => base.join(&path),
                    None => PathBuf::from(&path),
                };
                debug!(path = %path.display(), "reading file");

                let read = tokio::fs::read(&path);
                let data = match &ctx.cancel {
                    Some(cancel) => tokio::select! {
                        () = cancel.cancelled() => return Err(ResolveError::Cancelled),
                        result = read => result?,
                    },
                    None => read.await?,
                };

                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                Ok(ResolvedFile {
                    name,
                    data: Bytes::from(data),
                })
            }
        }
    }
}
