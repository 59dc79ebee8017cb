//! Engine bundler library.
//!
//! Fetches prebuilt engine distributions listed in a JSON catalog, verifies
//! their SHA-256 checksums, restructures them into the bundle layout the
//! installer expects and repackages them as a single `.tar.7z` archive.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod manager;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
pub use manager::EngineManager;
