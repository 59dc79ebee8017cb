//! Source and artifact checksum calculation.
//!
//! Files are hashed with SHA-256 in fixed-size chunks, so multi-hundred-MB
//! archives never have to fit in memory.

use crate::bundler::error::{Error, ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Calculates the SHA256 checksum of a file.
///
/// # Returns
///
/// * `Ok(String)` - Lowercase hex-encoded SHA-256 hash (64 characters)
/// * `Err` - If the file cannot be read
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verifies that `path` hashes to `expected`, ignoring hex case.
///
/// A mismatch is [`Error::ChecksumMismatch`]; the file is left untouched.
pub async fn verify(path: &Path, expected: &str) -> Result<()> {
    let actual = calculate_sha256(path).await?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        log::debug!("Checksum OK for {}", path.display());
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}
