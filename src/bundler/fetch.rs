//! Retrieves engine sources into the content cache.

use crate::bundler::{cache::ContentCache, error::Result, utils::http::Transport};
use crate::catalog::Source;
use std::path::PathBuf;

/// Cache-or-download retrieval of catalog sources.
///
/// A single attempt is made per call; failures are reported, not retried.
#[derive(Debug)]
pub struct Fetcher<T> {
    cache: ContentCache,
    transport: T,
}

impl<T: Transport> Fetcher<T> {
    /// Creates a fetcher over `cache` using `transport` for misses.
    pub fn new(cache: ContentCache, transport: T) -> Self {
        Self { cache, transport }
    }

    /// Returns a local path holding the bytes of `source`.
    ///
    /// Reuses the cache entry when present. Otherwise streams the download
    /// into a partial file and renames it into the cache. The returned file
    /// has NOT been verified.
    pub async fn fetch(&self, source: &Source) -> Result<PathBuf> {
        let file_name = source.file_name()?;
        self.cache.ensure_root().await?;

        let _lock = self.cache.lock(file_name).await?;

        if let Some(entry) = self.cache.lookup(file_name).await? {
            log::debug!("Using cached {}", entry.display());
            return Ok(entry);
        }

        let partial = self.cache.partial(file_name)?;
        let bytes = self.transport.download(&source.url, &partial).await?;
        let entry = self.cache.commit(partial, file_name).await?;

        log::info!("Cached {} ({} bytes)", entry.display(), bytes);
        Ok(entry)
    }
}
