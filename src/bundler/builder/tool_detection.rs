//! External tool detection and availability checking.
//!
//! Tools are located before a build starts so that a missing binary fails
//! the build up front instead of halfway through repackaging.

use crate::bundler::{
    error::{Error, Result},
    settings::ToolPaths,
};
use std::path::{Path, PathBuf};

/// Absolute locations of the tools a build invokes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedTools {
    /// Archive extraction tool
    pub extractor: PathBuf,
    /// Compression tool
    pub compressor: PathBuf,
}

impl ResolvedTools {
    /// Resolves every configured tool, failing on the first missing one.
    ///
    /// The compression tool is checked first; it is the one most often
    /// absent from a stock system.
    pub fn locate(tools: &ToolPaths) -> Result<Self> {
        let compressor = resolve("7za", &tools.compressor)?;
        let extractor = resolve("tar", &tools.extractor)?;
        Ok(Self {
            extractor,
            compressor,
        })
    }
}

/// Resolves one tool, searching `PATH` for bare names.
///
/// Explicit paths must point at an existing executable file.
pub fn resolve(tool: &'static str, configured: &Path) -> Result<PathBuf> {
    match which::which(configured) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool, path.display());
            Ok(path)
        }
        Err(e) => {
            log::debug!("{} not found at {}: {}", tool, configured.display(), e);
            Err(Error::ToolNotInstalled {
                tool,
                path: configured.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_path_is_not_installed() {
        let err = resolve("7za", Path::new("/nonexistent/bin/7za")).unwrap_err();
        assert!(matches!(
            err,
            Error::ToolNotInstalled { tool: "7za", ref path } if path == Path::new("/nonexistent/bin/7za")
        ));
    }

    #[test]
    fn missing_name_is_not_installed() {
        let err = resolve("7za", Path::new("engine-bundler-no-such-tool")).unwrap_err();
        assert_eq!(err.kind(), crate::bundler::ErrorKind::ToolNotInstalled);
    }

    #[cfg(unix)]
    #[test]
    fn resolves_tools_on_path() {
        assert!(resolve("sh", Path::new("sh")).unwrap().is_absolute());
    }
}
