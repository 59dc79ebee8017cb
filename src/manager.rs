//! Catalog-level operations: build, info and listing.

use crate::bundler::{
    ArchivedEngine, BuildPipeline, Error, ErrorExt, Result, Settings,
    utils::http::{HttpClient, Transport},
};
use crate::catalog::{Engine, EngineList};
use std::path::Path;

/// Extension of delivered engine artifacts recognised when scanning.
const ARCHIVE_EXTENSION: &str = "7z";

/// Entry point over a loaded catalog.
#[derive(Clone, Debug)]
pub struct EngineManager {
    catalog: EngineList,
}

/// Result of [`EngineManager::list`].
#[derive(Debug)]
pub struct Listing<'a> {
    /// Every engine in the catalog
    pub available: &'a [Engine],
    /// Artifacts found in the installed-engines directory, if requested
    pub installed: Option<Vec<ArchivedEngine>>,
}

impl EngineManager {
    /// Wraps an already decoded catalog.
    pub fn new(catalog: EngineList) -> Self {
        Self { catalog }
    }

    /// Loads the catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        EngineList::from_path(path).map(Self::new)
    }

    /// The loaded catalog.
    pub fn catalog(&self) -> &EngineList {
        &self.catalog
    }

    /// Every engine in the catalog.
    pub fn engines(&self) -> &[Engine] {
        &self.catalog.engines
    }

    /// Descriptor of one engine.
    pub fn info(&self, name: &str) -> Result<&Engine> {
        self.catalog.engine(name)
    }

    /// Available engines, plus installed ones when `installed_dir` is given.
    pub async fn list(&self, installed_dir: Option<&Path>) -> Result<Listing<'_>> {
        let installed = match installed_dir {
            Some(dir) => Some(installed_engines(dir).await?),
            None => None,
        };
        Ok(Listing {
            available: self.engines(),
            installed,
        })
    }

    /// Builds `name` over HTTP.
    pub async fn build(&self, name: &str, settings: Settings) -> Result<ArchivedEngine> {
        self.build_with_transport(name, settings, HttpClient::new()?)
            .await
    }

    /// Builds `name`, downloading through `transport`.
    ///
    /// The pipeline and its workspace are gone by the time this returns.
    pub async fn build_with_transport<T: Transport>(
        &self,
        name: &str,
        settings: Settings,
        transport: T,
    ) -> Result<ArchivedEngine> {
        log::info!("Building engine {}...", name);
        let engine = self.catalog.engine(name)?.clone();
        let mut pipeline = BuildPipeline::with_transport(engine, settings, transport)?;
        pipeline.run().await
    }
}

/// Scans `dir` for delivered engine archives.
///
/// Every regular `*.7z` file is described with a freshly computed checksum.
/// Entries that cannot be read are logged and skipped.
pub async fn installed_engines(dir: &Path) -> Result<Vec<ArchivedEngine>> {
    if !tokio::fs::try_exists(dir)
        .await
        .fs_context("checking installed engines", dir)?
    {
        return Err(Error::InstalledEnginesMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .fs_context("reading installed engines", dir)?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading installed engines", dir)?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ARCHIVE_EXTENSION) {
            continue;
        }
        match entry.file_type().await {
            Ok(file_type) if file_type.is_file() => paths.push(path),
            Ok(_) => log::debug!("Skipping non-file {}", path.display()),
            Err(e) => log::warn!("Bad engine: {}: {}", path.display(), e),
        }
    }
    paths.sort();

    let mut engines = Vec::with_capacity(paths.len());
    for path in paths {
        match ArchivedEngine::from_path(&path).await {
            Ok(engine) => engines.push(engine),
            Err(e) => log::warn!("Bad engine: {}: {}", path.display(), e),
        }
    }
    Ok(engines)
}
