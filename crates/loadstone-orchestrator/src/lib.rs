//! Resolution orchestration for the Loadstone asset loader.
//!
//! A [`LoadSession`] takes a declarative [`LoaderConfig`], resolves all six
//! resource categories concurrently through an [`AssetSource`], and serves
//! repeat requests from the process-wide cache when enabled.
//!
//! ```no_run
//! use loadstone_abstraction::{AssetInput, CacheControl, LoaderConfig};
//! use loadstone_orchestrator::{FsSource, LoadSession, SessionSettings};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), loadstone_orchestrator::SessionError> {
//! let config = LoaderConfig::builder()
//!     .rom(AssetInput::url("roms/game.bin"))
//!     .cache(CacheControl::All(true))
//!     .build();
//! let settings = SessionSettings::new(Arc::new(FsSource::new()));
//! let session = LoadSession::create(config, settings).await?;
//! assert_eq!(session.roms.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lanes;
pub mod session;
pub mod sources;

pub use error::{Result, SessionError};
pub use lanes::{uuid_name_generator, NameGenerator};
pub use loadstone_abstraction::AssetSource;
pub use loadstone_cache::{reset_shared as reset_shared_cache, shared as shared_cache};
pub use session::{LoadSession, SessionSettings};
pub use sources::{FsSource, MemorySource};
