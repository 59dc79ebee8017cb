//! Error types for the engine build pipeline.
//!
//! Every sub-step of a build returns [`Result`]; the orchestrator never
//! reinterprets these errors, it only records their [`ErrorKind`].

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while fetching, verifying and repackaging an engine.
#[derive(Error, Debug)]
pub enum Error {
    /// No engine with this name exists in the catalog
    #[error("engine not found: {0}")]
    EngineNotFound(String),

    /// The engine has no source usable for the requested architectures
    #[error("engine {engine} has no source matching architectures [{arch}]")]
    NoMatchingSource {
        /// Engine name
        engine: String,
        /// Requested architecture tags, comma separated
        arch: String,
    },

    /// Source URL has no file name to cache it under
    #[error("source URL has no file name: {url}")]
    InvalidSourceUrl {
        /// Offending URL
        url: String,
    },

    /// Transport failure while downloading a source
    #[error("network error fetching {url}: {reason}")]
    Network {
        /// URL being fetched
        url: String,
        /// Transport diagnostic
        reason: String,
    },

    /// Local filesystem failure
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        error: std::io::Error,
    },

    /// Computed digest differs from the catalog's
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        /// File that was hashed
        path: PathBuf,
        /// Digest from the catalog
        expected: String,
        /// Digest computed from the file
        actual: String,
    },

    /// Extraction failed or did not produce the payload directory
    #[error("failed to extract {}: {reason}", archive.display())]
    Extract {
        /// Archive being extracted
        archive: PathBuf,
        /// Tool diagnostic output
        reason: String,
    },

    /// Creating the uncompressed container failed
    #[error("tar archive step failed (exit code {status:?}): {stderr}")]
    TarArchive {
        /// Exit code of the tool, if any
        status: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Compressing the container failed
    #[error("compression step failed (exit code {status:?}): {stderr}")]
    Compression {
        /// Exit code of the tool, if any
        status: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// A required external tool is missing
    #[error("{tool} is not installed (looked for {})", path.display())]
    ToolNotInstalled {
        /// Tool role, e.g. "7za"
        tool: &'static str,
        /// Configured location
        path: PathBuf,
    },

    /// The caller cancelled the build
    #[error("build cancelled")]
    Cancelled,

    /// Catalog document could not be decoded
    #[error("invalid engine catalog: {reason}")]
    Catalog {
        /// Decoder diagnostic
        reason: String,
    },

    /// A required setting was not supplied
    #[error("{0} is required")]
    MissingSetting(&'static str),

    /// Directory of installed engines does not exist
    #[error("cannot find installed engines at {}", path.display())]
    InstalledEnginesMissing {
        /// Directory that was scanned
        path: PathBuf,
    },
}

/// Coarse classification of [`Error`], used for build state reporting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Engine or source selection failure
    NotFound,
    /// Transport failure
    Network,
    /// Local filesystem failure
    File,
    /// Integrity check failure
    ChecksumMismatch,
    /// Extraction failure
    Extract,
    /// Container creation failure
    TarArchive,
    /// Compression failure
    Compression,
    /// Missing external tool
    ToolNotInstalled,
    /// Caller cancellation
    Cancelled,
    /// Invalid catalog
    Catalog,
    /// Incomplete configuration
    Config,
}

impl Error {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EngineNotFound(_)
            | Error::NoMatchingSource { .. }
            | Error::InvalidSourceUrl { .. }
            | Error::InstalledEnginesMissing { .. } => ErrorKind::NotFound,
            Error::Network { .. } => ErrorKind::Network,
            Error::Fs { .. } => ErrorKind::File,
            Error::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            Error::Extract { .. } => ErrorKind::Extract,
            Error::TarArchive { .. } => ErrorKind::TarArchive,
            Error::Compression { .. } => ErrorKind::Compression,
            Error::ToolNotInstalled { .. } => ErrorKind::ToolNotInstalled,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Catalog { .. } => ErrorKind::Catalog,
            Error::MissingSetting(_) => ErrorKind::Config,
        }
    }
}

/// Attaches filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Converts an I/O error into [`Error::Fs`] naming the operation and path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}
