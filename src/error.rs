//! Error types for the command line surface.
//!
//! The pipeline's own taxonomy lives in [`crate::bundler::error`]; this
//! module wraps it together with argument errors for the binary.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for the binary
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Pipeline errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// A default directory could not be determined for this platform
    #[error("Cannot determine {what}; pass it explicitly")]
    NoDefaultDirectory {
        /// Which directory was needed
        what: &'static str,
    },
}
