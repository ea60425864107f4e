//! Cache-key classification and derivation.
//!
//! A cache key is either a string (value equality) or an `Arc`-held plain
//! record (identity equality). Byte blobs, item lists, and deferred
//! producers never qualify; a category whose derived key fails
//! classification is simply not served from or written to the cache for
//! that invocation.

use loadstone_abstraction::{AssetInput, AssetItem, CoreInput, LoaderConfig, ResourceCategory};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity token for an `Arc`-held record.
///
/// Equality and hashing use the allocation address. The `Arc` itself is
/// retained inside the key, so the address cannot be reused while any key
/// derived from it is alive.
#[derive(Clone)]
pub struct RecordKey {
    addr: usize,
    _hold: Arc<dyn Any + Send + Sync>,
}

impl RecordKey {
    /// The identity key of one shared record.
    pub fn of<T: Send + Sync + 'static>(record: &Arc<T>) -> Self {
        let hold: Arc<dyn Any + Send + Sync> = record.clone();
        Self {
            addr: Arc::as_ptr(record) as usize,
            _hold: hold,
        }
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for RecordKey {}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordKey({:#x})", self.addr)
    }
}

/// A validated cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// String key; two equal strings always collide.
    Text(String),
    /// Record key; only the same shared allocation collides.
    Record(RecordKey),
}

impl CacheKey {
    /// Classify a raw file-list input as a cache key.
    ///
    /// Only single string items and single shared records qualify: blobs
    /// carry no usable identity semantics, and lists and producers are not
    /// plain records.
    #[must_use]
    pub fn from_input(input: &AssetInput) -> Option<Self> {
        match input {
            AssetInput::Item(AssetItem::Url(url)) => Some(Self::Text(url.clone())),
            AssetInput::Item(AssetItem::Record(record)) => {
                Some(Self::Record(RecordKey::of(record)))
            }
            AssetInput::Item(AssetItem::Blob(_))
            | AssetInput::List(_)
            | AssetInput::Deferred(_) => None,
        }
    }

    /// Classify a raw core input as a cache key. A shared `CoreSpec` triple
    /// keys by identity, a string identifier by value.
    #[must_use]
    pub fn from_core_input(input: &CoreInput) -> Option<Self> {
        match input {
            CoreInput::Item(AssetItem::Url(name)) => Some(Self::Text(name.clone())),
            CoreInput::Item(AssetItem::Record(record)) => {
                Some(Self::Record(RecordKey::of(record)))
            }
            CoreInput::Spec(spec) => Some(Self::Record(RecordKey::of(spec))),
            CoreInput::Item(AssetItem::Blob(_)) | CoreInput::Deferred(_) => None,
        }
    }
}

/// Derive the cache key for one category from the raw configuration.
///
/// The key is the category's unresolved input; for rom and sram the
/// multi-item field wins over the single-item one. Validity is decided by
/// classification, not here.
#[must_use]
pub fn derive_key(category: ResourceCategory, config: &LoaderConfig) -> Option<CacheKey> {
    match category {
        ResourceCategory::Bios => config.bios.as_ref().and_then(CacheKey::from_input),
        ResourceCategory::Core => config.core.as_ref().and_then(CacheKey::from_core_input),
        ResourceCategory::Rom => config
            .roms
            .as_ref()
            .or(config.rom.as_ref())
            .and_then(CacheKey::from_input),
        ResourceCategory::Shader => config.shader.as_ref().and_then(CacheKey::from_input),
        ResourceCategory::Sram => config
            .sram_files
            .as_ref()
            .or(config.sram.as_ref())
            .and_then(CacheKey::from_input),
        ResourceCategory::State => config.state.as_ref().and_then(CacheKey::from_input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use loadstone_abstraction::CoreSpec;

    #[test]
    fn test_string_keys_compare_by_value() {
        let a = CacheKey::from_input(&AssetInput::url("game.bin")).unwrap();
        let b = CacheKey::from_input(&AssetInput::url("game.bin")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_keys_compare_by_identity() {
        let first = AssetInput::record("save.srm", &b"x"[..]);
        let second = AssetInput::record("save.srm", &b"x"[..]);

        let key_a = CacheKey::from_input(&first).unwrap();
        let key_b = CacheKey::from_input(&first).unwrap();
        let key_c = CacheKey::from_input(&second).unwrap();

        // Same allocation: equal. Structurally identical but distinct: not.
        assert_eq!(key_a, key_b);
        assert_ne!(key_a, key_c);
    }

    #[test]
    fn test_blobs_lists_and_producers_are_rejected() {
        assert!(CacheKey::from_input(&AssetInput::blob(Bytes::from_static(b"x"))).is_none());
        assert!(CacheKey::from_input(&AssetInput::list(vec![AssetItem::Url("a".into())])).is_none());
        assert!(
            CacheKey::from_input(&AssetInput::deferred(|| async { None })).is_none()
        );
    }

    #[test]
    fn test_core_spec_keys_by_identity() {
        let spec = CoreInput::spec(CoreSpec {
            name: "fceumm".into(),
            code: AssetItem::Url("fceumm.js".into()),
            binary: AssetItem::Url("fceumm.wasm".into()),
        });
        let key_a = CacheKey::from_core_input(&spec).unwrap();
        let key_b = CacheKey::from_core_input(&spec).unwrap();
        assert_eq!(key_a, key_b);

        assert!(matches!(
            CacheKey::from_core_input(&CoreInput::id("fceumm")),
            Some(CacheKey::Text(_))
        ));
    }

    #[test]
    fn test_multi_fields_win_for_rom_and_sram() {
        let config = LoaderConfig {
            rom: Some(AssetInput::url("single.bin")),
            roms: Some(AssetInput::url("multi.bin")),
            sram: Some(AssetInput::url("single.srm")),
            sram_files: Some(AssetInput::url("multi.srm")),
            ..LoaderConfig::default()
        };
        assert_eq!(
            derive_key(ResourceCategory::Rom, &config),
            Some(CacheKey::Text("multi.bin".into()))
        );
        assert_eq!(
            derive_key(ResourceCategory::Sram, &config),
            Some(CacheKey::Text("multi.srm".into()))
        );
    }

    #[test]
    fn test_absent_field_yields_no_key() {
        let config = LoaderConfig::default();
        for category in ResourceCategory::ALL {
            assert!(derive_key(category, &config).is_none());
        }
    }
}
