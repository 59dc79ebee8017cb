//! Builder for constructing Settings.

use super::{BundleLayout, Settings, ToolPaths};
use crate::bundler::error::{Error, Result};
use crate::catalog::Arch;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// `cache_dir` and `output_dir` are required; everything else has a
/// conventional default.
#[derive(Default)]
pub struct SettingsBuilder {
    cache_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    tools: ToolPaths,
    target_arch: Option<Vec<Arch>>,
    layout: BundleLayout,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the download cache root.
    ///
    /// # Required
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory finished artifacts are delivered to.
    ///
    /// # Required
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the extraction tool.
    ///
    /// Default: `tar` from `PATH`
    pub fn extractor<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.tools.extractor = path.as_ref().to_path_buf();
        self
    }

    /// Sets the compression tool.
    ///
    /// Default: `7za` from `PATH`
    pub fn compressor<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.tools.compressor = path.as_ref().to_path_buf();
        self
    }

    /// Sets the architecture set a source must match.
    ///
    /// Default: [`Arch::DEFAULT_TARGET`]
    pub fn target_arch(mut self, arch: Vec<Arch>) -> Self {
        self.target_arch = Some(arch);
        self
    }

    /// Overrides the bundle naming conventions.
    pub fn layout(mut self, layout: BundleLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSetting`] naming the first missing required field.
    pub fn build(self) -> Result<Settings> {
        let cache_dir = self.cache_dir.ok_or(Error::MissingSetting("cache_dir"))?;
        let output_dir = self.output_dir.ok_or(Error::MissingSetting("output_dir"))?;
        let target_arch = self
            .target_arch
            .unwrap_or_else(|| Arch::DEFAULT_TARGET.to_vec());

        Ok(Settings::new(
            cache_dir,
            output_dir,
            self.tools,
            target_arch,
            self.layout,
        ))
    }
}
