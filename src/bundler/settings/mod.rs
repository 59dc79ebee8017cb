//! Configuration for engine builds.
//!
//! Directories are always supplied explicitly; the core never looks up
//! platform directories on its own.

mod builder;
mod core;
mod layout;

pub use builder::SettingsBuilder;
pub use core::{Settings, ToolPaths};
pub use layout::BundleLayout;
