//! Per-category resolution lanes.
//!
//! Every lane follows the same skeleton: unwrap one producer level,
//! normalize to items, fan out to the external source. The divergent
//! per-category rules (naming fallback, single/multi exclusivity, the shader
//! double-unwrap, core name derivation) are applied on top. The shared
//! skeleton lives in [`resolve_items`]; the lane functions stay thin so the
//! edge cases remain visible in isolation.

use futures::future::try_join_all;
use loadstone_abstraction::{
    AssetInput, AssetItem, AssetSource, CoreBundle, CoreInput, ResolveContext, ResolveResult,
    ResolvedFile, ShaderResolver, SramOutput, UrlResolver,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Generates placeholder names for unnamed ROM entries. Injectable so tests
/// can pin the output; defaults to a v4 UUID per call.
pub type NameGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// The default placeholder-name generator.
#[must_use]
pub fn uuid_name_generator() -> NameGenerator {
    Arc::new(|| format!("rom-{}", uuid::Uuid::new_v4()))
}

/// Wiring shared by the lanes of one session.
#[derive(Clone)]
pub(crate) struct LaneContext {
    pub source: Arc<dyn AssetSource>,
    pub url_resolver: Option<UrlResolver>,
    pub cancel: Option<CancellationToken>,
}

impl LaneContext {
    fn resolve_ctx(&self) -> ResolveContext {
        ResolveContext {
            url_resolver: self.url_resolver.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

/// Resolve every item at once through the external source. All per-item
/// futures are issued together; the output order mirrors the input order.
async fn resolve_items(
    items: Vec<AssetItem>,
    lane: &LaneContext,
) -> ResolveResult<Vec<ResolvedFile>> {
    debug!(count = items.len(), "resolving items");
    let futures = items.into_iter().map(|item| {
        let source = Arc::clone(&lane.source);
        let ctx = lane.resolve_ctx();
        async move { source.resolve(item, ctx).await }
    });
    try_join_all(futures).await
}

/// The plain file-list lane: bios, and the shared tail of rom and sram.
/// A missing input short-circuits to an empty list, not an error.
pub(crate) async fn resolve_file_list(
    input: Option<AssetInput>,
    lane: LaneContext,
) -> ResolveResult<Vec<Arc<ResolvedFile>>> {
    let Some(input) = input else {
        return Ok(Vec::new());
    };
    let Some(input) = input.unwrap_once().await else {
        return Ok(Vec::new());
    };
    let files = resolve_items(input.into_items(), &lane).await?;
    Ok(files.into_iter().map(Arc::new).collect())
}

/// The rom lane: file-list resolution plus the placeholder-name fallback.
/// A resolved entry is never left without a name.
pub(crate) async fn resolve_rom(
    input: Option<AssetInput>,
    lane: LaneContext,
    name_generator: NameGenerator,
) -> ResolveResult<Vec<Arc<ResolvedFile>>> {
    let Some(input) = input else {
        return Ok(Vec::new());
    };
    let Some(input) = input.unwrap_once().await else {
        return Ok(Vec::new());
    };
    let mut files = resolve_items(input.into_items(), &lane).await?;
    for file in &mut files {
        if file.name.as_deref().is_none_or(str::is_empty) {
            file.name = Some(name_generator());
        }
    }
    Ok(files.into_iter().map(Arc::new).collect())
}

/// The core lane. A pre-resolved `{name, code, binary}` triple resolves its
/// two file fields directly; otherwise the raw identifier is resolved twice
/// in parallel, once through the code resolver and once through the binary
/// resolver, and the name falls back to the resolved code module's.
pub(crate) async fn resolve_core(
    input: Option<CoreInput>,
    source: Arc<dyn AssetSource>,
    code_resolver: Option<UrlResolver>,
    binary_resolver: Option<UrlResolver>,
) -> ResolveResult<Option<CoreBundle>> {
    let Some(input) = input else {
        return Ok(None);
    };
    let Some(input) = input.unwrap_once().await else {
        return Ok(None);
    };

    match input {
        CoreInput::Spec(spec) => {
            let ctx = ResolveContext::default();
            let (code, binary) = tokio::try_join!(
                source.resolve(spec.code.clone(), ctx.clone()),
                source.resolve(spec.binary.clone(), ctx),
            )?;
            Ok(Some(CoreBundle {
                name: spec.name.clone(),
                code: Arc::new(code),
                binary: Arc::new(binary),
            }))
        }
        CoreInput::Item(item) => {
            let given_name = match &item {
                AssetItem::Url(name) => Some(name.clone()),
                AssetItem::Blob(_) | AssetItem::Record(_) => None,
            };
            let code_ctx = ResolveContext {
                url_resolver: code_resolver,
                cancel: None,
            };
            let binary_ctx = ResolveContext {
                url_resolver: binary_resolver,
                cancel: None,
            };
            let (code, binary) = tokio::try_join!(
                source.resolve(item.clone(), code_ctx),
                source.resolve(item, binary_ctx),
            )?;
            let name = given_name
                .or_else(|| code.name.clone())
                .unwrap_or_default();
            Ok(Some(CoreBundle {
                name,
                code: Arc::new(code),
                binary: Arc::new(binary),
            }))
        }
        // single unwrap only; a producer of a producer reads as missing
        CoreInput::Deferred(_) => Ok(None),
    }
}

/// The shader lane: unwrap, pass through the category-level hook, unwrap
/// again (the hook may defer), then resolve. An absent intermediate result
/// at any stage short-circuits to "no shaders".
pub(crate) async fn resolve_shader(
    input: Option<AssetInput>,
    hook: Option<ShaderResolver>,
    lane: LaneContext,
) -> ResolveResult<Vec<Arc<ResolvedFile>>> {
    let Some(input) = input else {
        return Ok(Vec::new());
    };
    let Some(input) = input.unwrap_once().await else {
        return Ok(Vec::new());
    };
    let input = match hook {
        Some(hook) => match hook(input).await? {
            Some(mapped) => mapped,
            None => return Ok(Vec::new()),
        },
        None => input,
    };
    let Some(input) = input.unwrap_once().await else {
        return Ok(Vec::new());
    };
    let files = resolve_items(input.into_items(), &lane).await?;
    Ok(files.into_iter().map(Arc::new).collect())
}

/// The sram lane: the multi-file field wins over the single one, and the
/// single/multi output shapes are mutually exclusive. A multi-file
/// configuration or more than one raw item forces the multi slot.
pub(crate) async fn resolve_sram(
    multi: Option<AssetInput>,
    single: Option<AssetInput>,
    lane: LaneContext,
) -> ResolveResult<SramOutput> {
    let multi_configured = multi.is_some();
    let Some(input) = multi.or(single) else {
        return Ok(SramOutput::None);
    };
    let Some(input) = input.unwrap_once().await else {
        return Ok(SramOutput::None);
    };
    let files = resolve_items(input.into_items(), &lane).await?;
    let mut files: Vec<Arc<ResolvedFile>> = files.into_iter().map(Arc::new).collect();

    if files.is_empty() {
        return Ok(SramOutput::None);
    }
    if !multi_configured && files.len() == 1 {
        if let Some(file) = files.pop() {
            return Ok(SramOutput::Single(file));
        }
    }
    Ok(SramOutput::Many(files))
}

/// The state lane: a single item, no array promotion, no fallback. Lists
/// are treated as missing; state is single by contract.
pub(crate) async fn resolve_state(
    input: Option<AssetInput>,
    lane: LaneContext,
) -> ResolveResult<Option<Arc<ResolvedFile>>> {
    let Some(input) = input else {
        return Ok(None);
    };
    let Some(input) = input.unwrap_once().await else {
        return Ok(None);
    };
    match input {
        AssetInput::Item(item) => {
            let file = lane.source.resolve(item, lane.resolve_ctx()).await?;
            Ok(Some(Arc::new(file)))
        }
        AssetInput::List(_) | AssetInput::Deferred(_) => Ok(None),
    }
}
