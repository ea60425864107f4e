//! Raw and resolved asset representations.

use bytes::Bytes;
use std::sync::Arc;

/// A named byte payload supplied directly in the configuration.
///
/// This is the "plain structured record" input shape: callers hand it over
/// behind an `Arc`, and that `Arc`'s identity doubles as its cache key (two
/// structurally identical records in separate allocations are distinct keys).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File name to carry through resolution.
    pub name: String,
    /// Raw file content.
    pub data: Bytes,
}

impl FileRecord {
    /// Create a record from a name and its content.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// One raw, unresolved item of a category input.
#[derive(Debug, Clone)]
pub enum AssetItem {
    /// A URL, filesystem path, or bare identifier (e.g. a core name).
    Url(String),
    /// An unnamed binary payload.
    Blob(Bytes),
    /// A named payload behind `Arc` (see [`FileRecord`]).
    Record(Arc<FileRecord>),
}

impl AssetItem {
    /// The name this item carries on its own, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url.as_str()),
            Self::Blob(_) => None,
            Self::Record(record) => Some(record.name.as_str()),
        }
    }
}

/// A resolved, ready-to-use file.
///
/// The loader treats the payload as opaque; only the name is ever inspected
/// (for the ROM placeholder-name fallback and core name derivation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// File name, when the source could derive one.
    pub name: Option<String>,
    /// Decoded content.
    pub data: Bytes,
}

impl ResolvedFile {
    /// A resolved file with a known name.
    pub fn named(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: Some(name.into()),
            data: data.into(),
        }
    }

    /// A resolved file without a name.
    pub fn unnamed(data: impl Into<Bytes>) -> Self {
        Self {
            name: None,
            data: data.into(),
        }
    }
}

/// A fully specified core supplied by the caller: the two file fields are
/// resolved directly and no name synthesis is needed.
#[derive(Debug, Clone)]
pub struct CoreSpec {
    /// Core name.
    pub name: String,
    /// Script module source.
    pub code: AssetItem,
    /// Binary module source.
    pub binary: AssetItem,
}

/// The resolved emulator core triple.
#[derive(Debug, Clone)]
pub struct CoreBundle {
    /// Core name (the raw identifier when it was a string, otherwise derived
    /// from the resolved script module).
    pub name: String,
    /// Resolved script module.
    pub code: Arc<ResolvedFile>,
    /// Resolved binary module.
    pub binary: Arc<ResolvedFile>,
}

/// Save-RAM resolution outcome: the single-slot and multi-slot shapes are
/// mutually exclusive by construction.
#[derive(Debug, Clone, Default)]
pub enum SramOutput {
    /// No save-RAM configured or resolved.
    #[default]
    None,
    /// Exactly one raw item came from the single-slot field.
    Single(Arc<ResolvedFile>),
    /// A multi-file configuration, or more than one raw item.
    Many(Vec<Arc<ResolvedFile>>),
}

/// The fully resolved value for one category, as stored in the cache and
/// assigned onto a load session.
#[derive(Debug, Clone)]
pub enum CategoryOutput {
    /// Ordered file list (bios, rom, shader).
    Files(Vec<Arc<ResolvedFile>>),
    /// Core triple, absent when no core input was given.
    Core(Option<CoreBundle>),
    /// Save-RAM slots.
    Sram(SramOutput),
    /// At most one save-state file.
    State(Option<Arc<ResolvedFile>>),
}

impl CategoryOutput {
    /// Whether resolution produced nothing. Empty outputs are never cached:
    /// a later call with the same input re-attempts resolution instead of
    /// poisoning the cache with a transient empty result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Files(files) => files.is_empty(),
            Self::Core(core) => core.is_none(),
            Self::Sram(SramOutput::None) => true,
            Self::Sram(SramOutput::Single(_)) => false,
            Self::Sram(SramOutput::Many(files)) => files.is_empty(),
            Self::State(state) => state.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_outputs_detected() {
        assert!(CategoryOutput::Files(Vec::new()).is_empty());
        assert!(CategoryOutput::Core(None).is_empty());
        assert!(CategoryOutput::Sram(SramOutput::None).is_empty());
        assert!(CategoryOutput::State(None).is_empty());

        let file = Arc::new(ResolvedFile::named("a.bin", &b"x"[..]));
        assert!(!CategoryOutput::Files(vec![Arc::clone(&file)]).is_empty());
        assert!(!CategoryOutput::Sram(SramOutput::Single(file)).is_empty());
    }

    #[test]
    fn test_item_names() {
        assert_eq!(AssetItem::Url("rom/game.bin".into()).name(), Some("rom/game.bin"));
        assert_eq!(AssetItem::Blob(Bytes::from_static(b"x")).name(), None);
        let record = Arc::new(FileRecord::new("save.srm", &b"y"[..]));
        assert_eq!(AssetItem::Record(record).name(), Some("save.srm"));
    }
}
