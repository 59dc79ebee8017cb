//! Engine build pipeline.
//!
//! Fetches a catalog source into a shared content cache, verifies it,
//! repackages it inside a per-build workspace and delivers the resulting
//! archive to an output directory.

mod artifact;
pub mod builder;
mod cache;
pub mod error;
mod fetch;
pub mod settings;
pub mod utils;
mod workspace;

pub use artifact::{ArchivedEngine, engine_name};
pub use builder::{BuildHandle, BuildPipeline, BuildState};
pub use cache::{ContentCache, EntryLock};
pub use error::{Error, ErrorExt, ErrorKind, Result};
pub use fetch::Fetcher;
pub use settings::{BundleLayout, Settings, SettingsBuilder, ToolPaths};
pub use workspace::Workspace;
