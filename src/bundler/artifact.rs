//! Produced engine artifacts.

use crate::bundler::{
    builder::checksum::calculate_sha256,
    error::{ErrorExt, Result},
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// A packaged engine on disk.
///
/// Constructed only from a file that is already in its final place; the
/// checksum is computed from that file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArchivedEngine {
    name: String,
    path: PathBuf,
    sha256: String,
}

impl ArchivedEngine {
    /// Describes the artifact at `path`, hashing its contents.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let path = path
            .absolutize()
            .fs_context("resolving artifact path", path)?
            .into_owned();
        let sha256 = calculate_sha256(&path).await?;
        Ok(Self {
            name: engine_name(&path),
            path,
            sha256,
        })
    }

    /// Engine name: the file name without its two outermost extensions.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex-encoded SHA-256 of the artifact.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

/// Strips `.tar.<ext>` (any two extensions) from an artifact file name.
pub fn engine_name(path: &Path) -> String {
    let stem = path.file_stem().map(Path::new).unwrap_or(path);
    stem.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_two_extensions() {
        assert_eq!(engine_name(Path::new("/out/X.tar.7z")), "X");
        assert_eq!(
            engine_name(Path::new("WS9Wine3.0.1.tar.7z")),
            "WS9Wine3.0.1"
        );
    }

    #[tokio::test]
    async fn from_path_is_absolute_and_hashed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("X.tar.7z");
        std::fs::write(&path, b"abc").unwrap();

        let engine = ArchivedEngine::from_path(&path).await.unwrap();
        assert_eq!(engine.name(), "X");
        assert!(engine.path().is_absolute());
        assert_eq!(
            engine.sha256(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
