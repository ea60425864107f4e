//! The load session: one invocation's resolution pipeline.
//!
//! A session partitions the six categories into "served from cache" and
//! "needs resolution", launches every resolver without awaiting, awaits the
//! joint result, then persists newly resolved values for the cache-enabled
//! categories.

use crate::error::{Result, SessionError};
use crate::lanes::{
    self, uuid_name_generator, LaneContext, NameGenerator,
};
use loadstone_abstraction::{
    AssetSource, CategoryOutput, CoreBundle, LoaderConfig, ResolveResult, ResolvedFile,
    ResourceCategory, ShaderResolver, SramOutput, UrlResolver,
};
use loadstone_cache::{derive_key, AssetCache, CacheKey};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default save-RAM format.
const DEFAULT_SRAM_KIND: &str = "srm";

/// Per-session wiring: the external source, the cache to use, and the
/// per-category resolver hooks.
#[derive(Clone)]
pub struct SessionSettings {
    /// The external resolution primitive.
    pub source: Arc<dyn AssetSource>,
    /// The cache this session reads from and writes to. Defaults to the
    /// shared process-wide instance.
    pub cache: Arc<AssetCache>,
    /// Per-item hook for bios string items.
    pub bios_resolver: Option<UrlResolver>,
    /// Per-item hook for rom string items.
    pub rom_resolver: Option<UrlResolver>,
    /// Hook turning a core identifier into its script module source.
    pub core_code_resolver: Option<UrlResolver>,
    /// Hook turning a core identifier into its binary module source.
    pub core_binary_resolver: Option<UrlResolver>,
    /// Category-level shader hook.
    pub shader_resolver: Option<ShaderResolver>,
    /// Placeholder-name generator for unnamed ROM entries.
    pub rom_name_generator: NameGenerator,
}

impl SessionSettings {
    /// Settings with the given source, the shared cache, and no hooks.
    #[must_use]
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            cache: loadstone_cache::shared(),
            bios_resolver: None,
            rom_resolver: None,
            core_code_resolver: None,
            core_binary_resolver: None,
            shader_resolver: None,
            rom_name_generator: uuid_name_generator(),
        }
    }

    /// Use a dedicated cache instead of the shared one.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<AssetCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Set the bios per-item hook.
    #[must_use]
    pub fn with_bios_resolver(mut self, resolver: UrlResolver) -> Self {
        self.bios_resolver = Some(resolver);
        self
    }

    /// Set the rom per-item hook.
    #[must_use]
    pub fn with_rom_resolver(mut self, resolver: UrlResolver) -> Self {
        self.rom_resolver = Some(resolver);
        self
    }

    /// Set the core script-module hook.
    #[must_use]
    pub fn with_core_code_resolver(mut self, resolver: UrlResolver) -> Self {
        self.core_code_resolver = Some(resolver);
        self
    }

    /// Set the core binary-module hook.
    #[must_use]
    pub fn with_core_binary_resolver(mut self, resolver: UrlResolver) -> Self {
        self.core_binary_resolver = Some(resolver);
        self
    }

    /// Set the shader category-level hook.
    #[must_use]
    pub fn with_shader_resolver(mut self, resolver: ShaderResolver) -> Self {
        self.shader_resolver = Some(resolver);
        self
    }

    /// Replace the ROM placeholder-name generator (deterministic in tests).
    #[must_use]
    pub fn with_rom_name_generator(mut self, generator: NameGenerator) -> Self {
        self.rom_name_generator = generator;
        self
    }
}

impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("bios_resolver", &self.bios_resolver.is_some())
            .field("rom_resolver", &self.rom_resolver.is_some())
            .field("core_code_resolver", &self.core_code_resolver.is_some())
            .field("core_binary_resolver", &self.core_binary_resolver.is_some())
            .field("shader_resolver", &self.shader_resolver.is_some())
            .finish_non_exhaustive()
    }
}

/// One load invocation, from raw configuration to resolved assets.
pub struct LoadSession {
    cache: Arc<AssetCache>,
    cache_enabled: [bool; ResourceCategory::COUNT],
    keys: [Option<CacheKey>; ResourceCategory::COUNT],
    pending: Vec<(ResourceCategory, JoinHandle<ResolveResult<CategoryOutput>>)>,

    /// Save-RAM format hint, normalized.
    pub sram_kind: String,
    /// Resolved bios images, in input order.
    pub bios: Vec<Arc<ResolvedFile>>,
    /// Resolved core triple.
    pub core: Option<CoreBundle>,
    /// Resolved ROM images, in input order; every entry has a name.
    pub roms: Vec<Arc<ResolvedFile>>,
    /// Resolved shader files, in input order.
    pub shaders: Vec<Arc<ResolvedFile>>,
    /// Resolved save-RAM slots.
    pub sram: SramOutput,
    /// Resolved save-state file.
    pub state: Option<Arc<ResolvedFile>>,
}

impl LoadSession {
    /// Async factory: builds the session, performs cache-partitioned
    /// resolution, and returns once every category has settled.
    ///
    /// # Errors
    /// The first category failure from the concurrent join; results from
    /// siblings that already settled are discarded.
    pub async fn create(config: LoaderConfig, settings: SessionSettings) -> Result<Self> {
        let mut config = config;

        let cache_enabled =
            ResourceCategory::ALL.map(|category| config.cache.enabled(category));
        let keys = ResourceCategory::ALL.map(|category| derive_key(category, &config));
        let sram_kind = config
            .sram_kind
            .take()
            .unwrap_or_else(|| DEFAULT_SRAM_KIND.to_string());

        let mut session = Self {
            cache: Arc::clone(&settings.cache),
            cache_enabled,
            keys,
            pending: Vec::new(),
            sram_kind,
            bios: Vec::new(),
            core: None,
            roms: Vec::new(),
            shaders: Vec::new(),
            sram: SramOutput::None,
            state: None,
        };

        session.load_from_cache(&mut config, &settings);
        session.load().await?;
        Ok(session)
    }

    /// Synchronous partition step: serve cache hits directly, launch a
    /// resolver task for everything else without awaiting it.
    fn load_from_cache(&mut self, config: &mut LoaderConfig, settings: &SessionSettings) {
        for category in ResourceCategory::ALL {
            if let Some(cached) = self.cache_lookup(category) {
                debug!(category = %category, "serving from cache");
                self.assign(category, cached);
                continue;
            }
            let handle = self.spawn_lane(category, config, settings);
            self.pending.push((category, handle));
        }
    }

    /// Await every launched resolver, assign outputs, persist cacheable
    /// results. Categories resolve concurrently; the first failure wins and
    /// discards the rest.
    async fn load(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let mut outputs = Vec::with_capacity(pending.len());
        let mut failure: Option<SessionError> = None;

        for (category, handle) in pending {
            match handle.await {
                Ok(Ok(output)) => outputs.push((category, output)),
                Ok(Err(source)) => {
                    if failure.is_none() {
                        failure = Some(SessionError::Category { category, source });
                    }
                }
                Err(join_error) => {
                    if failure.is_none() {
                        failure = Some(SessionError::Task(join_error));
                    }
                }
            }
        }

        if let Some(error) = failure {
            return Err(error);
        }

        for (category, output) in outputs {
            self.assign(category, output);
        }
        self.save_to_cache();
        Ok(())
    }

    /// Write every cache-enabled, non-empty, validly keyed result back into
    /// the store. Empty results are deliberately left uncached so a later
    /// call with the same input re-attempts resolution.
    fn save_to_cache(&self) {
        for category in ResourceCategory::ALL {
            if !self.cache_enabled[category.index()] {
                continue;
            }
            let Some(key) = &self.keys[category.index()] else {
                continue;
            };
            let output = self.output_of(category);
            if output.is_empty() {
                continue;
            }
            self.cache.insert(category, key.clone(), output);
        }
    }

    fn cache_lookup(&self, category: ResourceCategory) -> Option<CategoryOutput> {
        if !self.cache_enabled[category.index()] {
            return None;
        }
        let key = self.keys[category.index()].as_ref()?;
        self.cache.get(category, key)
    }

    /// Launch one category's resolver. The raw input is taken out of the
    /// configuration and moved into the task.
    fn spawn_lane(
        &self,
        category: ResourceCategory,
        config: &mut LoaderConfig,
        settings: &SessionSettings,
    ) -> JoinHandle<ResolveResult<CategoryOutput>> {
        let source = Arc::clone(&settings.source);
        let cancel = config.cancel.clone();

        match category {
            ResourceCategory::Bios => {
                let input = config.bios.take();
                let lane = LaneContext {
                    source,
                    url_resolver: settings.bios_resolver.clone(),
                    cancel,
                };
                tokio::spawn(async move {
                    lanes::resolve_file_list(input, lane)
                        .await
                        .map(CategoryOutput::Files)
                })
            }
            ResourceCategory::Core => {
                let input = config.core.take();
                let code_resolver = settings.core_code_resolver.clone();
                let binary_resolver = settings.core_binary_resolver.clone();
                tokio::spawn(async move {
                    lanes::resolve_core(input, source, code_resolver, binary_resolver)
                        .await
                        .map(CategoryOutput::Core)
                })
            }
            ResourceCategory::Rom => {
                let input = config.roms.take().or_else(|| config.rom.take());
                let lane = LaneContext {
                    source,
                    url_resolver: settings.rom_resolver.clone(),
                    cancel,
                };
                let name_generator = Arc::clone(&settings.rom_name_generator);
                tokio::spawn(async move {
                    lanes::resolve_rom(input, lane, name_generator)
                        .await
                        .map(CategoryOutput::Files)
                })
            }
            ResourceCategory::Shader => {
                let input = config.shader.take();
                let hook = settings.shader_resolver.clone();
                let lane = LaneContext {
                    source,
                    url_resolver: None,
                    cancel: None,
                };
                tokio::spawn(async move {
                    lanes::resolve_shader(input, hook, lane)
                        .await
                        .map(CategoryOutput::Files)
                })
            }
            ResourceCategory::Sram => {
                let multi = config.sram_files.take();
                let single = config.sram.take();
                let lane = LaneContext {
                    source,
                    url_resolver: None,
                    cancel,
                };
                tokio::spawn(async move {
                    lanes::resolve_sram(multi, single, lane)
                        .await
                        .map(CategoryOutput::Sram)
                })
            }
            ResourceCategory::State => {
                let input = config.state.take();
                let lane = LaneContext {
                    source,
                    url_resolver: None,
                    cancel: None,
                };
                tokio::spawn(async move {
                    lanes::resolve_state(input, lane)
                        .await
                        .map(CategoryOutput::State)
                })
            }
        }
    }

    /// Assign one settled output onto the session's typed fields.
    fn assign(&mut self, category: ResourceCategory, output: CategoryOutput) {
        match (category, output) {
            (ResourceCategory::Bios, CategoryOutput::Files(files)) => self.bios = files,
            (ResourceCategory::Core, CategoryOutput::Core(core)) => self.core = core,
            (ResourceCategory::Rom, CategoryOutput::Files(files)) => self.roms = files,
            (ResourceCategory::Shader, CategoryOutput::Files(files)) => self.shaders = files,
            (ResourceCategory::Sram, CategoryOutput::Sram(sram)) => self.sram = sram,
            (ResourceCategory::State, CategoryOutput::State(state)) => self.state = state,
            (category, output) => {
                // only reachable if a cache entry was stored under the wrong category
                warn!(category = %category, ?output, "mismatched resolved value shape");
            }
        }
    }

    /// Snapshot one category's resolved value in its cacheable form.
    fn output_of(&self, category: ResourceCategory) -> CategoryOutput {
        match category {
            ResourceCategory::Bios => CategoryOutput::Files(self.bios.clone()),
            ResourceCategory::Core => CategoryOutput::Core(self.core.clone()),
            ResourceCategory::Rom => CategoryOutput::Files(self.roms.clone()),
            ResourceCategory::Shader => CategoryOutput::Files(self.shaders.clone()),
            ResourceCategory::Sram => CategoryOutput::Sram(self.sram.clone()),
            ResourceCategory::State => CategoryOutput::State(self.state.clone()),
        }
    }
}

impl fmt::Debug for LoadSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadSession")
            .field("sram_kind", &self.sram_kind)
            .field("bios", &self.bios.len())
            .field("core", &self.core.as_ref().map(|core| core.name.as_str()))
            .field("roms", &self.roms.len())
            .field("shaders", &self.shaders.len())
            .field("sram", &self.sram)
            .field("state", &self.state.is_some())
            .finish_non_exhaustive()
    }
}
