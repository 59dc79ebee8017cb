//! File system utilities for atomic placement.
//!
//! Files are written under a unique hidden name next to their destination
//! and renamed into place, so a partial file is never visible under the
//! final name.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// A uniquely named file that is removed on drop unless persisted.
///
/// The file is created synchronously in [`PartialFile::create`], so it
/// exists on disk for the whole lifetime of the guard and dropping a
/// writer mid-flight can never leave it behind.
#[derive(Debug)]
pub struct PartialFile {
    path: PathBuf,
    file: Option<std::fs::File>,
    persisted: bool,
}

impl PartialFile {
    /// Creates an empty partial file for `file_name` inside `dir`.
    pub fn create(dir: &Path, file_name: &str) -> Result<Self> {
        let path = dir.join(format!(".{}.{}.part", file_name, uuid::Uuid::new_v4()));
        let file = std::fs::File::create(&path).fs_context("creating partial file", &path)?;
        Ok(Self {
            path,
            file: Some(file),
            persisted: false,
        })
    }

    /// Path the partial content is written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Async handle onto the already open partial file.
    pub fn writer(&self) -> Result<tokio::fs::File> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| Error::Fs {
                context: "writing persisted file",
                path: self.path.clone(),
                error: std::io::ErrorKind::NotFound.into(),
            })?
            .try_clone()
            .fs_context("opening partial file", &self.path)?;
        Ok(tokio::fs::File::from_std(file))
    }

    /// Renames the partial file to `dest`.
    ///
    /// Writers obtained from [`PartialFile::writer`] must be flushed first.
    /// On failure the partial file is still removed on drop.
    pub async fn persist(mut self, dest: &Path) -> Result<()> {
        self.file.take();
        tokio::fs::rename(&self.path, dest)
            .await
            .fs_context("moving file into place", dest)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        self.file.take();
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed partial file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove partial file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Creates all of the directories of the specified path.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Copies a regular file into `dest_dir` under its own file name.
///
/// The copy lands under a temporary name first and is renamed into place.
/// Fails if the source path is not a file.
pub async fn copy_into_atomic(from: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = from
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Fs {
            context: "copying file without a name",
            path: from.to_path_buf(),
            error: std::io::ErrorKind::InvalidInput.into(),
        })?;

    let metadata = tokio::fs::metadata(from)
        .await
        .fs_context("reading file metadata", from)?;
    if !metadata.is_file() {
        return Err(Error::Fs {
            context: "copying non-regular file",
            path: from.to_path_buf(),
            error: std::io::ErrorKind::InvalidInput.into(),
        });
    }

    let dest = dest_dir.join(file_name);
    let partial = PartialFile::create(dest_dir, file_name)?;
    let mut source = tokio::fs::File::open(from)
        .await
        .fs_context("opening file to copy", from)?;
    let mut writer = partial.writer()?;
    tokio::io::copy(&mut source, &mut writer)
        .await
        .fs_context("copying file", partial.path())?;
    writer.flush().await.fs_context("flushing copy", partial.path())?;
    drop(writer);
    partial.persist(&dest).await?;
    Ok(dest)
}
