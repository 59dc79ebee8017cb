//! Core Settings struct and implementations.

use super::BundleLayout;
use crate::catalog::Arch;
use std::path::{Path, PathBuf};

/// Locations of the external tools used by the repackager.
///
/// A bare name (`tar`) is resolved through `PATH`; anything containing a
/// path separator is used as given.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolPaths {
    /// Archive extraction tool (tar compatible)
    pub extractor: PathBuf,
    /// Compression tool (7za compatible)
    pub compressor: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            extractor: PathBuf::from("tar"),
            compressor: PathBuf::from("7za"),
        }
    }
}

/// Settings for a build, constructed via [`SettingsBuilder`](super::SettingsBuilder).
///
/// # Examples
///
/// ```no_run
/// use engine_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> engine_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .cache_dir("/tmp/engine-cache")
///     .output_dir("/tmp/engines")
///     .compressor("/usr/local/bin/7za")
///     .build()?;
/// assert_eq!(settings.layout().compressed_ext, "7z");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Persistent download cache, shared between builds.
    cache_dir: PathBuf,

    /// Where finished artifacts are delivered.
    output_dir: PathBuf,

    /// External tools.
    tools: ToolPaths,

    /// Architecture set a source must match exactly.
    target_arch: Vec<Arch>,

    /// Naming conventions of the produced bundle.
    layout: BundleLayout,
}

impl Settings {
    pub(super) fn new(
        cache_dir: PathBuf,
        output_dir: PathBuf,
        tools: ToolPaths,
        target_arch: Vec<Arch>,
        layout: BundleLayout,
    ) -> Self {
        Self {
            cache_dir,
            output_dir,
            tools,
            target_arch,
            layout,
        }
    }

    /// Returns the cache root.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the configured tool locations.
    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Returns the architecture set used for source selection.
    pub fn target_arch(&self) -> &[Arch] {
        &self.target_arch
    }

    /// Returns the bundle naming conventions.
    pub fn layout(&self) -> &BundleLayout {
        &self.layout
    }
}
