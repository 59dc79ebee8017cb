//! Content cache of downloaded engine sources.
//!
//! A flat directory keyed by the source URL's file name. An entry's presence
//! means a download once completed; it says nothing about whether the bytes
//! match the checksum currently requested, so callers always re-verify.
//!
//! Several builds may share one cache. Populating an entry happens under an
//! exclusive advisory lock on `.<name>.lock`, and downloads land under a
//! unique partial name before being renamed into place.

use crate::bundler::{
    error::{ErrorExt, Result},
    utils::fs::{PartialFile, create_dir_all},
};
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::time::Duration;

#[cfg(unix)]
const LOCK_POLL_MIN: Duration = Duration::from_millis(10);
#[cfg(unix)]
const LOCK_POLL_MAX: Duration = Duration::from_millis(250);

/// Handle to the cache root directory.
#[derive(Clone, Debug)]
pub struct ContentCache {
    root: PathBuf,
}

/// Exclusive hold on one cache entry; released on drop.
pub struct EntryLock {
    #[cfg(unix)]
    _flock: nix::fcntl::Flock<std::fs::File>,
}

impl ContentCache {
    /// Creates a handle; the directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the cache root if missing.
    pub async fn ensure_root(&self) -> Result<()> {
        create_dir_all(&self.root).await
    }

    /// Path of the entry for `file_name`, whether or not it exists.
    pub fn entry_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Returns the entry path if the entry is present.
    pub async fn lookup(&self, file_name: &str) -> Result<Option<PathBuf>> {
        let path = self.entry_path(file_name);
        let exists = tokio::fs::try_exists(&path)
            .await
            .fs_context("checking cache entry", &path)?;
        Ok(exists.then_some(path))
    }

    /// Creates a partial file for a new entry.
    pub fn partial(&self, file_name: &str) -> Result<PartialFile> {
        PartialFile::create(&self.root, file_name)
    }

    /// Moves a completed download into place as the entry for `file_name`.
    ///
    /// If the rename fails but another build already placed the entry, that
    /// entry is used and the partial file is discarded.
    pub async fn commit(&self, partial: PartialFile, file_name: &str) -> Result<PathBuf> {
        let entry = self.entry_path(file_name);
        match partial.persist(&entry).await {
            Ok(()) => Ok(entry),
            Err(e) => match self.lookup(file_name).await? {
                Some(existing) => {
                    log::debug!(
                        "Cache entry {} placed concurrently, discarding own download",
                        existing.display()
                    );
                    Ok(existing)
                }
                None => Err(e),
            },
        }
    }

    /// Takes the exclusive lock for `file_name`, waiting for other holders.
    ///
    /// The lock is polled without blocking, so dropping the returned future
    /// while it waits closes the lock file right away.
    #[cfg(unix)]
    pub async fn lock(&self, file_name: &str) -> Result<EntryLock> {
        use nix::errno::Errno;
        use nix::fcntl::{Flock, FlockArg};

        let lock_path = self.root.join(format!(".{file_name}.lock"));
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .fs_context("opening cache lock", &lock_path)?;

        let mut backoff = LOCK_POLL_MIN;
        loop {
            match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(flock) => return Ok(EntryLock { _flock: flock }),
                Err((unlocked, errno)) if errno == Errno::EWOULDBLOCK || errno == Errno::EINTR => {
                    file = unlocked;
                    if backoff == LOCK_POLL_MIN {
                        log::debug!("Waiting for cache lock {}", lock_path.display());
                    }
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(LOCK_POLL_MAX);
                }
                Err((_, errno)) => {
                    return Err(std::io::Error::from(errno))
                        .fs_context("locking cache entry", &lock_path);
                }
            }
        }
    }

    /// Takes the exclusive lock for `file_name`.
    ///
    /// Advisory locking is only available on Unix; elsewhere concurrent
    /// builds rely on the atomic rename in [`ContentCache::commit`].
    #[cfg(not(unix))]
    pub async fn lock(&self, _file_name: &str) -> Result<EntryLock> {
        Ok(EntryLock {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(dir.path().join("cache"));
        cache.ensure_root().await.unwrap();

        assert!(cache.lookup("a.tar.gz").await.unwrap().is_none());
        std::fs::write(cache.entry_path("a.tar.gz"), b"a").unwrap();
        assert_eq!(
            cache.lookup("a.tar.gz").await.unwrap(),
            Some(cache.entry_path("a.tar.gz"))
        );
    }

    #[tokio::test]
    async fn commit_places_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(dir.path());

        let partial = cache.partial("a.tar.gz").unwrap();
        std::fs::write(partial.path(), b"payload").unwrap();
        let entry = cache.commit(partial, "a.tar.gz").await.unwrap();

        assert_eq!(std::fs::read(&entry).unwrap(), b"payload");
        assert_eq!(cache.root(), dir.path());
        assert_eq!(std::fs::read_dir(cache.root()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn lock_is_exclusive_until_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(dir.path());

        let first = cache.lock("a.tar.gz").await.unwrap();
        let second = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            cache.lock("a.tar.gz"),
        )
        .await;
        assert!(second.is_err(), "second lock should wait for the first");

        drop(first);
        let third = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            cache.lock("a.tar.gz"),
        )
        .await;
        assert!(third.is_ok());
    }

    /// Open descriptors of this process pointing at `path`.
    #[cfg(target_os = "linux")]
    fn open_handles(path: &Path) -> usize {
        std::fs::read_dir("/proc/self/fd")
            .unwrap()
            .filter_map(|e| std::fs::read_link(e.ok()?.path()).ok())
            .filter(|target| target == path)
            .count()
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn abandoned_lock_wait_closes_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(dir.path());
        let lock_path = dir.path().canonicalize().unwrap().join(".a.tar.gz.lock");

        let held = cache.lock("a.tar.gz").await.unwrap();
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            cache.lock("a.tar.gz"),
        )
        .await;
        assert!(waited.is_err());
        assert_eq!(open_handles(&lock_path), 1);

        drop(held);
        assert_eq!(open_handles(&lock_path), 0);
    }
}
