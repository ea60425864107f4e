//! The tagged raw-input shapes a category value can take.
//!
//! Every category field accepts a literal item, a list of items, or a
//! deferred producer (a zero-argument function yielding the actual input
//! asynchronously). Shape normalization happens in one explicit step per
//! category instead of being re-sniffed inline inside each resolver.

use crate::asset::{AssetItem, CoreSpec, FileRecord};
use bytes::Bytes;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A deferred input: invoked once, yields the actual raw input (or nothing).
pub type Producer = Box<dyn FnOnce() -> BoxFuture<'static, Option<AssetInput>> + Send>;

/// A deferred core input.
pub type CoreProducer = Box<dyn FnOnce() -> BoxFuture<'static, Option<CoreInput>> + Send>;

/// The raw configuration value for a file-list category.
pub enum AssetInput {
    /// A single literal item.
    Item(AssetItem),
    /// An ordered list of literal items.
    List(Vec<AssetItem>),
    /// A producer of either of the above.
    Deferred(Producer),
}

impl AssetInput {
    /// A single URL / path / identifier item.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Item(AssetItem::Url(url.into()))
    }

    /// A single unnamed binary item.
    pub fn blob(data: impl Into<Bytes>) -> Self {
        Self::Item(AssetItem::Blob(data.into()))
    }

    /// A single named-record item. The record is placed behind an `Arc`;
    /// clones of the returned input share one cache identity.
    pub fn record(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::Item(AssetItem::Record(Arc::new(FileRecord::new(name, data))))
    }

    /// An ordered list of items.
    #[must_use]
    pub fn list(items: Vec<AssetItem>) -> Self {
        Self::List(items)
    }

    /// A deferred producer of the actual input.
    pub fn deferred<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Option<AssetInput>> + Send + 'static,
    {
        Self::Deferred(Box::new(move || Box::pin(producer())))
    }

    /// One unwrap step: run a deferred producer, pass literals through.
    ///
    /// The pipeline unwraps exactly one producer level before inspecting
    /// shape; a producer that yields another producer is the caller's bug
    /// and surfaces as a missing input downstream.
    pub async fn unwrap_once(self) -> Option<Self> {
        match self {
            Self::Deferred(producer) => producer().await,
            other => Some(other),
        }
    }

    /// Promote to an ordered item list. A still-deferred input normalizes
    /// to empty, which downstream treats as missing.
    #[must_use]
    pub fn into_items(self) -> Vec<AssetItem> {
        match self {
            Self::Item(item) => vec![item],
            Self::List(items) => items,
            Self::Deferred(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for AssetInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(item) => f.debug_tuple("Item").field(item).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// The raw configuration value for the core category.
pub enum CoreInput {
    /// A core identifier or file source.
    Item(AssetItem),
    /// A fully specified `{name, code, binary}` triple. Held behind `Arc`
    /// so the allocation's identity doubles as its cache key.
    Spec(Arc<CoreSpec>),
    /// A producer of either of the above.
    Deferred(CoreProducer),
}

impl CoreInput {
    /// A known core name.
    pub fn id(name: impl Into<String>) -> Self {
        Self::Item(AssetItem::Url(name.into()))
    }

    /// A fully specified triple.
    #[must_use]
    pub fn spec(spec: CoreSpec) -> Self {
        Self::Spec(Arc::new(spec))
    }

    /// A deferred producer of the actual core input.
    pub fn deferred<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Option<CoreInput>> + Send + 'static,
    {
        Self::Deferred(Box::new(move || Box::pin(producer())))
    }

    /// One unwrap step, mirroring [`AssetInput::unwrap_once`].
    pub async fn unwrap_once(self) -> Option<Self> {
        match self {
            Self::Deferred(producer) => producer().await,
            other => Some(other),
        }
    }
}

impl fmt::Debug for CoreInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(item) => f.debug_tuple("Item").field(item).finish(),
            Self::Spec(spec) => f.debug_tuple("Spec").field(spec).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unwrap_once_runs_producer() {
        let input = AssetInput::deferred(|| async { Some(AssetInput::url("deferred.bin")) });
        let unwrapped = input.unwrap_once().await;
        match unwrapped {
            Some(AssetInput::Item(AssetItem::Url(url))) => assert_eq!(url, "deferred.bin"),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unwrap_once_passes_literals_through() {
        let input = AssetInput::url("a.bin");
        assert!(matches!(
            input.unwrap_once().await,
            Some(AssetInput::Item(AssetItem::Url(_)))
        ));
    }

    #[tokio::test]
    async fn test_producer_can_yield_nothing() {
        let input = AssetInput::deferred(|| async { None });
        assert!(input.unwrap_once().await.is_none());
    }

    #[test]
    fn test_into_items_promotes_single_item() {
        let items = AssetInput::url("a.bin").into_items();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_into_items_preserves_list_order() {
        let items = AssetInput::list(vec![
            AssetItem::Url("a".into()),
            AssetItem::Url("b".into()),
        ])
        .into_items();
        assert_eq!(items[0].name(), Some("a"));
        assert_eq!(items[1].name(), Some("b"));
    }
}
