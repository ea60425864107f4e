//! The declarative loader configuration.

use crate::category::ResourceCategory;
use crate::input::{AssetInput, CoreInput};
use tokio_util::sync::CancellationToken;

/// Per-category cache-enable flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheFlags {
    /// Cache resolved bios images.
    pub bios: bool,
    /// Cache the resolved core triple.
    pub core: bool,
    /// Cache resolved ROM images.
    pub rom: bool,
    /// Cache resolved shader files.
    pub shader: bool,
    /// Cache resolved save-RAM data.
    pub sram: bool,
    /// Cache resolved save-state data.
    pub state: bool,
}

impl CacheFlags {
    /// The flag for one category.
    #[must_use]
    pub const fn get(self, category: ResourceCategory) -> bool {
        match category {
            ResourceCategory::Bios => self.bios,
            ResourceCategory::Core => self.core,
            ResourceCategory::Rom => self.rom,
            ResourceCategory::Shader => self.shader,
            ResourceCategory::Sram => self.sram,
            ResourceCategory::State => self.state,
        }
    }
}

/// Cache-enable setting: one boolean for all six categories, or an explicit
/// per-category map. Defaults to disabled everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheControl {
    /// Apply one flag to every category.
    All(bool),
    /// Per-category flags.
    PerCategory(CacheFlags),
}

impl Default for CacheControl {
    fn default() -> Self {
        Self::All(false)
    }
}

impl CacheControl {
    /// Whether caching is enabled for the given category.
    #[must_use]
    pub const fn enabled(&self, category: ResourceCategory) -> bool {
        match self {
            Self::All(flag) => *flag,
            Self::PerCategory(flags) => flags.get(category),
        }
    }
}

/// The raw user configuration for one load invocation.
///
/// Category fields hold unresolved inputs; the orchestrator consumes them
/// during resolution. The multi-item fields (`roms`, `sram_files`) take
/// priority over their single-item counterparts for both resolution and
/// cache-key derivation.
#[derive(Debug, Default)]
pub struct LoaderConfig {
    /// Bios images.
    pub bios: Option<AssetInput>,
    /// Emulator core.
    pub core: Option<CoreInput>,
    /// Single ROM image.
    pub rom: Option<AssetInput>,
    /// Multiple ROM images; wins over `rom`.
    pub roms: Option<AssetInput>,
    /// Shader files.
    pub shader: Option<AssetInput>,
    /// Single save-RAM slot.
    pub sram: Option<AssetInput>,
    /// Multi-file save-RAM; wins over `sram`.
    pub sram_files: Option<AssetInput>,
    /// Save-state data.
    pub state: Option<AssetInput>,
    /// Save-RAM format hint; defaults to `"srm"`.
    pub sram_kind: Option<String>,
    /// Cache-enable setting.
    pub cache: CacheControl,
    /// Cancellation signal threaded into bios, rom, and sram resolution.
    pub cancel: Option<CancellationToken>,
}

impl LoaderConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::default()
    }
}

/// Fluent builder so callers state only the categories they use.
#[derive(Debug, Default)]
pub struct LoaderConfigBuilder {
    config: LoaderConfig,
}

impl LoaderConfigBuilder {
    /// Set the bios input.
    #[must_use]
    pub fn bios(mut self, input: AssetInput) -> Self {
        self.config.bios = Some(input);
        self
    }

    /// Set the core input.
    #[must_use]
    pub fn core(mut self, input: CoreInput) -> Self {
        self.config.core = Some(input);
        self
    }

    /// Set the single-ROM input.
    #[must_use]
    pub fn rom(mut self, input: AssetInput) -> Self {
        self.config.rom = Some(input);
        self
    }

    /// Set the multi-ROM input.
    #[must_use]
    pub fn roms(mut self, input: AssetInput) -> Self {
        self.config.roms = Some(input);
        self
    }

    /// Set the shader input.
    #[must_use]
    pub fn shader(mut self, input: AssetInput) -> Self {
        self.config.shader = Some(input);
        self
    }

    /// Set the single save-RAM input.
    #[must_use]
    pub fn sram(mut self, input: AssetInput) -> Self {
        self.config.sram = Some(input);
        self
    }

    /// Set the multi-file save-RAM input.
    #[must_use]
    pub fn sram_files(mut self, input: AssetInput) -> Self {
        self.config.sram_files = Some(input);
        self
    }

    /// Set the save-state input.
    #[must_use]
    pub fn state(mut self, input: AssetInput) -> Self {
        self.config.state = Some(input);
        self
    }

    /// Set the save-RAM format hint.
    #[must_use]
    pub fn sram_kind(mut self, kind: impl Into<String>) -> Self {
        self.config.sram_kind = Some(kind.into());
        self
    }

    /// Set the cache-enable setting.
    #[must_use]
    pub fn cache(mut self, cache: CacheControl) -> Self {
        self.config.cache = cache;
        self
    }

    /// Attach a cancellation signal.
    #[must_use]
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.config.cancel = Some(token);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> LoaderConfig {
        self.config
    }
}
