//! Scoped temporary workspace for one build.
//!
//! The directory is created when the [`Workspace`] is and removed when it is
//! dropped, on success, failure and cancellation alike. A process killed
//! outright leaves its workspace behind under the system temp directory with
//! the `engine-bundler-` prefix.

use crate::bundler::error::{ErrorExt, Result};
use std::path::{Path, PathBuf};

const PREFIX: &str = "engine-bundler-";

/// Uniquely named temporary directory owned by a single build.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Creates a workspace under the system temp directory.
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Creates a workspace under `base`.
    pub fn create_in(base: &Path) -> Result<Self> {
        let path = base.join(format!("{}{}", PREFIX, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).fs_context("creating build workspace", &path)?;
        log::debug!("Created workspace {}", path.display());
        Ok(Self { path })
    }

    /// Root of the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed workspace {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to clean up workspace {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
