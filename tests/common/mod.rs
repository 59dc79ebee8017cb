//! Shared fixtures for integration tests.
#![allow(dead_code)]

use engine_bundler::bundler::{
    Error, Result, Settings, SettingsBuilder,
    utils::{fs::PartialFile, http::Transport},
};
use engine_bundler::catalog::EngineList;
use flate2::{Compression, write::GzEncoder};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

pub const ENGINE: &str = "X";
pub const SOURCE_URL: &str = "https://example.com/pool/portable-winehq-X-osx64.tar.gz";
pub const SOURCE_FILE: &str = "portable-winehq-X-osx64.tar.gz";

/// A gzipped tarball shaped like a portable WineHQ build: `usr/bin/wine`.
pub fn engine_archive() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let files: [(&str, &[u8]); 2] = [
        ("usr/bin/wine", b"#!/bin/sh\necho wine\n"),
        ("usr/lib/libwine.1.dylib", b"not really a library"),
    ];
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A gzipped tarball missing the `usr/` payload directory.
pub fn archive_without_payload() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let data = b"readme";
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "README", &data[..])
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Catalog with one engine `X` offering a 32+64-bit and a 32-bit source.
pub fn catalog(sha256: &str) -> EngineList {
    let json = format!(
        r#"{{
            "metadata": {{ "version": "0.0.1" }},
            "engines": [{{
                "name": "{ENGINE}",
                "description": "Test engine",
                "author": "Tests",
                "homepage": "https://example.com/",
                "sources": [
                    {{
                        "url": "https://example.com/pool/portable-winehq-X-osx.tar.gz",
                        "sha256": "0000",
                        "arch": ["32"],
                        "type": "portable-winehq"
                    }},
                    {{
                        "url": "{SOURCE_URL}",
                        "sha256": "{sha256}",
                        "arch": ["32", "64"],
                        "type": "portable-winehq"
                    }}
                ]
            }}]
        }}"#
    );
    EngineList::from_slice(json.as_bytes()).unwrap()
}

/// In-memory transport counting every download.
#[derive(Clone, Default)]
pub struct FakeTransport {
    files: Arc<HashMap<String, Vec<u8>>>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
    stall: bool,
}

impl FakeTransport {
    pub fn serving(url: &str, data: Vec<u8>) -> Self {
        let mut files = HashMap::new();
        files.insert(url.to_string(), data);
        Self {
            files: Arc::new(files),
            ..Default::default()
        }
    }

    /// Waits `delay` before writing, widening race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Writes half the body, then never completes.
    pub fn stalling(mut self) -> Self {
        self.stall = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    async fn download(&self, url: &Url, dest: &PartialFile) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let data = self.files.get(url.as_str()).ok_or_else(|| Error::Network {
            url: url.to_string(),
            reason: "404 Not Found".to_string(),
        })?;
        let mut writer = dest.writer()?;
        if self.stall {
            writer.write_all(&data[..data.len() / 2]).await.unwrap();
            writer.flush().await.unwrap();
            std::future::pending::<()>().await;
        }
        writer.write_all(data).await.unwrap();
        writer.flush().await.unwrap();
        Ok(data.len() as u64)
    }
}

/// Shell stand-in for `7za`: `-ttar` builds a real tar, anything else copies.
#[cfg(unix)]
pub fn fake_7za(dir: &Path) -> PathBuf {
    script(
        dir,
        "7za",
        r#"set -e
shift
kind=""
out=""
src=""
for arg in "$@"; do
  case "$arg" in
    -t*) kind="$arg" ;;
    -*) ;;
    *) if [ -z "$out" ]; then out="$arg"; else src="$arg"; fi ;;
  esac
done
case "$kind" in
  -ttar) tar -cf "$out" "$src" ;;
  *) cp "$src" "$out" ;;
esac"#,
    )
}

/// Stand-in `7za` that builds the tar, then records its pid in `pid_file`
/// and hangs while compressing.
#[cfg(unix)]
pub fn hanging_7za(dir: &Path, pid_file: &Path) -> PathBuf {
    script(
        dir,
        "7za",
        &format!(
            "case \"$2\" in -ttar) tar -cf \"$3\" \"$4\" ;; *) echo $$ > '{}'; exec sleep 30 ;; esac",
            pid_file.display()
        ),
    )
}

/// Whether `pid` is a live process; zombies count as gone.
#[cfg(unix)]
pub fn process_alive(pid: u32) -> bool {
    let output = std::process::Command::new("ps")
        .args(["-o", "stat=", "-p", &pid.to_string()])
        .output()
        .unwrap();
    let stat = String::from_utf8_lossy(&output.stdout);
    let stat = stat.trim();
    !stat.is_empty() && !stat.starts_with('Z')
}

#[cfg(unix)]
pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Scratch directories for one test.
pub struct Sandbox {
    pub root: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.path().join("cache")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.root.path().join("tools")
    }

    pub fn settings(&self, compressor: &Path) -> Settings {
        SettingsBuilder::new()
            .cache_dir(self.cache_dir())
            .output_dir(self.output_dir())
            .compressor(compressor)
            .build()
            .unwrap()
    }

    /// Files in the cache directory, hidden lock files excluded.
    pub fn cache_listing(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.cache_dir())
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .filter(|name| !name.ends_with(".lock"))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}
