//! The closed set of resource categories the loader knows about.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six recognized resource kinds.
///
/// The set is fixed: it drives both cache partitioning and resolver dispatch,
/// and the discriminants double as stable array indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    /// Console bios images.
    Bios = 0,
    /// Emulator core (script module + binary module + name).
    Core = 1,
    /// ROM images.
    Rom = 2,
    /// Shader files.
    Shader = 3,
    /// Save-RAM data.
    Sram = 4,
    /// Save-state data.
    State = 5,
}

impl ResourceCategory {
    /// Number of categories; sized for per-category arrays.
    pub const COUNT: usize = 6;

    /// Every category in its canonical order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Bios,
        Self::Core,
        Self::Rom,
        Self::Shader,
        Self::Sram,
        Self::State,
    ];

    /// Stable index into per-category arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, matching the configuration field it reads from.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bios => "bios",
            Self::Core => "core",
            Self::Rom => "rom",
            Self::Shader => "shader",
            Self::Sram => "sram",
            Self::State => "state",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexes_cover_all_slots() {
        let mut seen = [false; ResourceCategory::COUNT];
        for category in ResourceCategory::ALL {
            seen[category.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_display_matches_field_name() {
        assert_eq!(ResourceCategory::Bios.to_string(), "bios");
        assert_eq!(ResourceCategory::Sram.to_string(), "sram");
    }
}
