//! Extraction, restructuring and re-archiving of a verified source.
//!
//! All intermediates live inside the build workspace:
//!
//! ```text
//! <workspace>/
//!   extract/usr/            <- extracted payload
//!   extract/wswine.bundle/  <- payload renamed, with marker file
//!   <engine>.tar            <- uncompressed container
//!   <engine>.tar.7z         <- final artifact
//! ```
//!
//! Each step can be repeated against the same workspace.

use super::tool_detection::ResolvedTools;
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::BundleLayout,
};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Turns a verified source archive into the installable artifact.
#[derive(Clone, Debug)]
pub struct Repackager {
    tools: ResolvedTools,
    layout: BundleLayout,
    workspace: PathBuf,
}

impl Repackager {
    /// Creates a repackager writing into `workspace`.
    pub fn new(tools: ResolvedTools, layout: BundleLayout, workspace: &Path) -> Self {
        Self {
            tools,
            layout,
            workspace: workspace.to_path_buf(),
        }
    }

    fn extract_dir(&self) -> PathBuf {
        self.workspace.join("extract")
    }

    /// Unpacks `archive` and returns the payload directory.
    ///
    /// Fails with [`Error::Extract`] if the tool exits non-zero or the
    /// payload directory is missing afterwards.
    pub async fn extract(&self, archive: &Path) -> Result<PathBuf> {
        let dest = self.extract_dir();
        reset_dir(&dest).await?;

        log::info!("Extracting {}", archive.display());
        let mut command = Command::new(&self.tools.extractor);
        command.arg("-xf").arg(archive).arg("-C").arg(&dest);
        let output = run(&mut command).await.map_err(|e| Error::Extract {
            archive: archive.to_path_buf(),
            reason: format!("failed to execute {}: {}", self.tools.extractor.display(), e),
        })?;

        let payload = dest.join(&self.layout.payload_dir);
        if !output.status.success() || !is_dir(&payload).await {
            return Err(Error::Extract {
                archive: archive.to_path_buf(),
                reason: format!(
                    "expected directory {} (exit code {:?}): {}",
                    self.layout.payload_dir,
                    output.status.code(),
                    diagnostics(&output)
                ),
            });
        }

        Ok(payload)
    }

    /// Writes the engine marker and renames the payload to the bundle root.
    pub async fn restructure(&self, engine_name: &str) -> Result<PathBuf> {
        let dest = self.extract_dir();
        let payload = dest.join(&self.layout.payload_dir);
        let bundle_root = dest.join(&self.layout.bundle_root);

        if !is_dir(&payload).await && is_dir(&bundle_root).await {
            log::debug!("Bundle root {} already in place", bundle_root.display());
            return Ok(bundle_root);
        }

        let marker = payload.join(&self.layout.marker_file);
        tokio::fs::write(&marker, engine_name)
            .await
            .fs_context("writing engine marker", &marker)?;

        remove_dir_if_exists(&bundle_root).await?;
        tokio::fs::rename(&payload, &bundle_root)
            .await
            .fs_context("renaming payload to bundle root", &bundle_root)?;

        log::debug!("Restructured bundle at {}", bundle_root.display());
        Ok(bundle_root)
    }

    /// Packs the bundle root into `<engine>.tar`, then compresses that into
    /// `<engine>.tar.<ext>`. Returns the compressed artifact.
    pub async fn archive(&self, engine_name: &str) -> Result<PathBuf> {
        let container = self.workspace.join(self.layout.container_name(engine_name));
        let artifact = self.workspace.join(self.layout.artifact_name(engine_name));
        for stale in [&container, &artifact] {
            remove_file_if_exists(stale).await?;
        }

        log::info!("Creating {}", container.display());
        let mut command = Command::new(&self.tools.compressor);
        command
            .arg("a")
            .arg("-ttar")
            .arg(&container)
            .arg(&self.layout.bundle_root)
            .current_dir(self.extract_dir());
        let output = run(&mut command).await.map_err(|e| Error::TarArchive {
            status: None,
            stderr: e.to_string(),
        })?;
        if !output.status.success() || !is_file(&container).await {
            return Err(Error::TarArchive {
                status: output.status.code(),
                stderr: diagnostics(&output),
            });
        }

        log::info!("Compressing {}", artifact.display());
        let mut command = Command::new(&self.tools.compressor);
        command
            .arg("a")
            .arg(format!("-t{}", self.layout.compressed_ext))
            .arg("-mx9")
            .arg(&artifact)
            .arg(&container)
            .current_dir(&self.workspace);
        let output = run(&mut command).await.map_err(|e| Error::Compression {
            status: None,
            stderr: e.to_string(),
        })?;
        if !output.status.success() || !is_file(&artifact).await {
            return Err(Error::Compression {
                status: output.status.code(),
                stderr: diagnostics(&output),
            });
        }

        Ok(artifact)
    }
}

/// Runs a tool to completion, capturing its output.
///
/// The child is killed if the returned future is dropped.
async fn run(command: &mut Command) -> std::io::Result<Output> {
    log::debug!("Running {:?}", command.as_std());
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
}

/// Captured stderr, falling back to stdout for tools that report there.
fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr.trim().to_string()
    }
}

async fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("clearing directory", path),
    }
}

async fn reset_dir(path: &Path) -> Result<()> {
    remove_dir_if_exists(path).await?;
    tokio::fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing stale file", path),
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
