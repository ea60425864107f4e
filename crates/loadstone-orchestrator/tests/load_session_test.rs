//! End-to-end tests for cache-partitioned load sessions.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use loadstone_abstraction::{
    AssetInput, AssetItem, AssetSource, CacheControl, CacheFlags, CoreInput, CoreSpec, FileRecord,
    LoaderConfig, ResolveContext, ResolveError, ResolveResult, ResolvedFile, ResourceCategory,
    SramOutput, UrlResolver,
};
use loadstone_cache::AssetCache;
use loadstone_orchestrator::{LoadSession, SessionSettings};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resolves every item shape and counts how often it is invoked.
struct CountingSource {
    calls: AtomicUsize,
}

impl CountingSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetSource for CountingSource {
    async fn resolve(&self, item: AssetItem, ctx: ResolveContext) -> ResolveResult<ResolvedFile> {
        if let Some(cancel) = &ctx.cancel {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        match ctx.rewrite(item).await? {
            AssetItem::Url(url) => Ok(ResolvedFile::named(url, Bytes::from_static(b"fetched"))),
            AssetItem::Blob(data) => Ok(ResolvedFile::unnamed(data)),
            AssetItem::Record(record) => {
                Ok(ResolvedFile::named(record.name.clone(), record.data.clone()))
            }
        }
    }
}

/// Blocks until the cancellation token fires; succeeds only without a token.
struct SlowSource;

#[async_trait]
impl AssetSource for SlowSource {
    async fn resolve(&self, item: AssetItem, ctx: ResolveContext) -> ResolveResult<ResolvedFile> {
        if let Some(cancel) = &ctx.cancel {
            tokio::select! {
                () = cancel.cancelled() => return Err(ResolveError::Cancelled),
                () = tokio::time::sleep(Duration::from_secs(30)) => {}
            }
        }
        Ok(ResolvedFile {
            name: item.name().map(str::to_owned),
            data: Bytes::new(),
        })
    }
}

fn settings_with(source: Arc<dyn AssetSource>) -> SessionSettings {
    SessionSettings::new(source).with_cache(Arc::new(AssetCache::new()))
}

#[tokio::test]
async fn test_string_key_second_load_skips_resolution() {
    let source = CountingSource::new();
    let settings = settings_with(Arc::clone(&source) as Arc<dyn AssetSource>);

    let config = || {
        LoaderConfig::builder()
            .rom(AssetInput::url("game.bin"))
            .cache(CacheControl::PerCategory(CacheFlags {
                rom: true,
                ..CacheFlags::default()
            }))
            .build()
    };

    let first = LoadSession::create(config(), settings.clone()).await.unwrap();
    assert_eq!(source.calls(), 1);
    assert_eq!(first.roms[0].name.as_deref(), Some("game.bin"));

    let second = LoadSession::create(config(), settings).await.unwrap();
    assert_eq!(source.calls(), 1, "identical string key must hit the cache");
    assert!(
        Arc::ptr_eq(&first.roms[0], &second.roms[0]),
        "cache hit must return the same resolved object"
    );
}

#[tokio::test]
async fn test_record_key_hits_only_for_same_allocation() {
    let source = CountingSource::new();
    let settings = settings_with(Arc::clone(&source) as Arc<dyn AssetSource>);

    let shared = Arc::new(FileRecord::new("save.srm", &b"sram"[..]));
    let config_for = |record: &Arc<FileRecord>| {
        LoaderConfig::builder()
            .sram(AssetInput::Item(AssetItem::Record(Arc::clone(record))))
            .cache(CacheControl::All(true))
            .build()
    };

    let _ = LoadSession::create(config_for(&shared), settings.clone())
        .await
        .unwrap();
    assert_eq!(source.calls(), 1);

    // same allocation: served from cache
    let _ = LoadSession::create(config_for(&shared), settings.clone())
        .await
        .unwrap();
    assert_eq!(source.calls(), 1);

    // structurally identical but distinct allocation: cache miss
    let twin = Arc::new(FileRecord::new("save.srm", &b"sram"[..]));
    let _ = LoadSession::create(config_for(&twin), settings).await.unwrap();
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_invalid_keys_are_never_cached() {
    let source = CountingSource::new();
    let cache = Arc::new(AssetCache::new());
    let settings = SessionSettings::new(Arc::clone(&source) as Arc<dyn AssetSource>)
        .with_cache(Arc::clone(&cache));

    // a blob input is not a valid key
    let config = || {
        LoaderConfig::builder()
            .rom(AssetInput::blob(Bytes::from_static(b"raw")))
            .cache(CacheControl::All(true))
            .build()
    };

    let _ = LoadSession::create(config(), settings.clone()).await.unwrap();
    assert_eq!(cache.len(ResourceCategory::Rom), 0);

    // and every load resolves again
    let _ = LoadSession::create(config(), settings).await.unwrap();
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_reset_all_forces_re_resolution() {
    let source = CountingSource::new();
    let cache = Arc::new(AssetCache::new());
    let settings = SessionSettings::new(Arc::clone(&source) as Arc<dyn AssetSource>)
        .with_cache(Arc::clone(&cache));

    let config = || {
        LoaderConfig::builder()
            .rom(AssetInput::url("game.bin"))
            .bios(AssetInput::url("bios.bin"))
            .cache(CacheControl::All(true))
            .build()
    };

    let _ = LoadSession::create(config(), settings.clone()).await.unwrap();
    assert_eq!(source.calls(), 2);

    cache.reset_all();
    for category in ResourceCategory::ALL {
        assert!(cache.is_empty(category));
    }

    let _ = LoadSession::create(config(), settings).await.unwrap();
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn test_sram_single_and_multi_are_exclusive() {
    let source = CountingSource::new();

    let multi = LoadSession::create(
        LoaderConfig::builder()
            .sram(AssetInput::list(vec![
                AssetItem::Record(Arc::new(FileRecord::new("a.srm", &b"a"[..]))),
                AssetItem::Record(Arc::new(FileRecord::new("b.srm", &b"b"[..]))),
            ]))
            .build(),
        settings_with(Arc::clone(&source) as Arc<dyn AssetSource>),
    )
    .await
    .unwrap();
    assert!(matches!(&multi.sram, SramOutput::Many(files) if files.len() == 2));

    let single = LoadSession::create(
        LoaderConfig::builder()
            .sram(AssetInput::record("save.srm", &b"s"[..]))
            .build(),
        settings_with(Arc::clone(&source) as Arc<dyn AssetSource>),
    )
    .await
    .unwrap();
    assert!(matches!(&single.sram, SramOutput::Single(file) if file.name.as_deref() == Some("save.srm")));
}

#[tokio::test]
async fn test_pre_resolved_core_spec_end_to_end() {
    let source = CountingSource::new();
    let session = LoadSession::create(
        LoaderConfig::builder()
            .core(CoreInput::spec(CoreSpec {
                name: "fceumm".into(),
                code: AssetItem::Record(Arc::new(FileRecord::new("fceumm.js", &b"js"[..]))),
                binary: AssetItem::Record(Arc::new(FileRecord::new("fceumm.wasm", &b"wasm"[..]))),
            }))
            .build(),
        settings_with(Arc::clone(&source) as Arc<dyn AssetSource>),
    )
    .await
    .unwrap();

    let core = session.core.as_ref().unwrap();
    assert_eq!(core.name, "fceumm");
    assert_eq!(core.code.name.as_deref(), Some("fceumm.js"));
    assert_eq!(core.binary.name.as_deref(), Some("fceumm.wasm"));
    // the two file fields, nothing else
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_bios_and_rom_url_hooks_apply_per_lane() {
    // each hook materializes the string item under its own prefix, so a
    // hook leaking into the wrong lane would show up in the resolved names
    let prefixed = |prefix: &'static str| -> UrlResolver {
        Arc::new(
            move |url: &str| -> BoxFuture<'static, ResolveResult<AssetItem>> {
                let name = format!("{prefix}/{url}");
                Box::pin(async move {
                    Ok(AssetItem::Record(Arc::new(FileRecord::new(
                        name,
                        Bytes::from(prefix.as_bytes()),
                    ))))
                })
            },
        )
    };

    let source = CountingSource::new();
    let settings = settings_with(Arc::clone(&source) as Arc<dyn AssetSource>)
        .with_bios_resolver(prefixed("firmware"))
        .with_rom_resolver(prefixed("content"));

    let session = LoadSession::create(
        LoaderConfig::builder()
            .bios(AssetInput::url("bios.bin"))
            .rom(AssetInput::url("game.bin"))
            .build(),
        settings,
    )
    .await
    .unwrap();

    assert_eq!(session.bios[0].name.as_deref(), Some("firmware/bios.bin"));
    assert_eq!(session.bios[0].data.as_ref(), b"firmware");
    assert_eq!(session.roms[0].name.as_deref(), Some("content/game.bin"));
    assert_eq!(session.roms[0].data.as_ref(), b"content");
}

#[tokio::test]
async fn test_sram_kind_defaults_to_srm() {
    let session = LoadSession::create(
        LoaderConfig::default(),
        settings_with(CountingSource::new() as Arc<dyn AssetSource>),
    )
    .await
    .unwrap();
    assert_eq!(session.sram_kind, "srm");
}

#[tokio::test]
async fn test_empty_results_are_not_cached() {
    let source = CountingSource::new();
    let cache = Arc::new(AssetCache::new());
    let settings = SessionSettings::new(Arc::clone(&source) as Arc<dyn AssetSource>)
        .with_cache(Arc::clone(&cache));

    // a producer yielding nothing resolves to empty, with a key that would
    // otherwise be perfectly cacheable absent from the start
    let config = LoaderConfig::builder()
        .rom(AssetInput::url("game.bin"))
        .roms(AssetInput::deferred(|| async { None }))
        .cache(CacheControl::All(true))
        .build();

    let session = LoadSession::create(config, settings).await.unwrap();
    assert!(session.roms.is_empty());
    assert_eq!(cache.len(ResourceCategory::Rom), 0);
}

#[tokio::test]
async fn test_failure_in_one_category_fails_the_load() {
    struct FailingSource;

    #[async_trait]
    impl AssetSource for FailingSource {
        async fn resolve(
            &self,
            item: AssetItem,
            _ctx: ResolveContext,
        ) -> ResolveResult<ResolvedFile> {
            match item {
                AssetItem::Url(url) if url == "broken.bin" => {
                    Err(ResolveError::Failed("unreachable host".into()))
                }
                item => Ok(ResolvedFile {
                    name: item.name().map(str::to_owned),
                    data: Bytes::new(),
                }),
            }
        }
    }

    let result = LoadSession::create(
        LoaderConfig::builder()
            .bios(AssetInput::url("bios.bin"))
            .rom(AssetInput::url("broken.bin"))
            .build(),
        settings_with(Arc::new(FailingSource)),
    )
    .await;

    let error = result.err().expect("load must fail");
    assert!(!error.is_cancelled());
    assert!(error.to_string().contains("rom"));
}

#[tokio::test]
async fn test_cancellation_surfaces_as_distinct_failure() {
    let token = CancellationToken::new();
    let config = LoaderConfig::builder()
        .rom(AssetInput::url("game.bin"))
        .cancel(token.clone())
        .build();

    let load = tokio::spawn(LoadSession::create(
        config,
        settings_with(Arc::new(SlowSource)),
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let result = load.await.unwrap();
    let error = result.err().expect("cancelled load must fail");
    assert!(error.is_cancelled(), "got: {error}");
}
