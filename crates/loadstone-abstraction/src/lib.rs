//! Core contracts for the Loadstone asset loader.
//!
//! This crate defines the shared vocabulary between the cache and the
//! orchestrator: resource categories, raw input shapes, resolved
//! representations, the declarative configuration, and the external
//! [`AssetSource`] resolution boundary.

pub mod asset;
pub mod category;
pub mod config;
pub mod error;
pub mod input;
pub mod source;

pub use asset::{
    AssetItem, CategoryOutput, CoreBundle, CoreSpec, FileRecord, ResolvedFile, SramOutput,
};
pub use category::ResourceCategory;
pub use config::{CacheControl, CacheFlags, LoaderConfig, LoaderConfigBuilder};
pub use error::{ResolveError, ResolveResult};
pub use input::{AssetInput, CoreInput, CoreProducer, Producer};
pub use source::{AssetSource, ResolveContext, ShaderResolver, UrlResolver};
