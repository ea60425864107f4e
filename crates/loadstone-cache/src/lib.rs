//! Resolved-asset caching for the Loadstone loader.
//!
//! Keys mix two equality regimes in one keyed collection: strings compare by
//! value, shared plain records by allocation identity. Each of the six
//! resource categories gets an independent shelf, and the whole store can be
//! reset in one call.

pub mod key;
pub mod store;

pub use key::{derive_key, CacheKey, RecordKey};
pub use store::{reset_shared, shared, AssetCache, CacheStats};
