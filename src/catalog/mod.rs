//! Engine catalog document.
//!
//! The catalog is a JSON document listing every engine that can be built,
//! each with one or more downloadable sources:
//!
//! ```json
//! {
//!   "metadata": { "version": "0.0.1" },
//!   "engines": [
//!     {
//!       "name": "WS9Wine3.0.1",
//!       "description": "Wine Stable 3.0.1",
//!       "author": "WineHQ Official",
//!       "homepage": "https://dl.winehq.org/wine-builds/macosx/download.html",
//!       "sources": [
//!         {
//!           "url": "https://dl.winehq.org/.../portable-winehq-stable-3.0.1-osx64.tar.gz",
//!           "sha256": "07429ae2...",
//!           "arch": ["32", "64"],
//!           "type": "portable-winehq"
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! It is loaded once per invocation and never mutated.

mod arch;

pub use arch::{Arch, describe as describe_arch};

use crate::bundler::error::{Error, ErrorExt, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// The full catalog: engines plus format metadata.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EngineList {
    /// Available engines, in document order
    pub engines: Vec<Engine>,
    /// Document metadata
    pub metadata: Metadata,
}

/// Catalog format metadata.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Metadata {
    /// Format version of the document
    pub version: semver::Version,
}

/// A named engine and the sources backing it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Engine {
    /// Unique engine name, e.g. `WS9Wine3.0.1`
    pub name: String,
    /// Human readable description
    pub description: String,
    /// Who publishes the distribution
    pub author: String,
    /// Project page
    pub homepage: Url,
    /// Downloadable artifacts, in preference order
    pub sources: Vec<Source>,
}

/// One downloadable artifact of an engine.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Source {
    /// Download location
    pub url: Url,
    /// Expected SHA-256 digest, hex encoded
    pub sha256: String,
    /// Architectures contained in the artifact, absent for source code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<Vec<Arch>>,
    /// What kind of artifact this is
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

/// Kind of a catalog source.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum SourceKind {
    /// Source code tarball
    #[serde(rename = "source")]
    Source,
    /// Prebuilt portable WineHQ distribution
    #[serde(rename = "portable-winehq")]
    BinaryWineHq,
}

impl EngineList {
    /// Reads and decodes a catalog file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).fs_context("reading engine catalog", path)?;
        Self::from_slice(&data)
    }

    /// Decodes a catalog from JSON bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| Error::Catalog {
            reason: e.to_string(),
        })
    }

    /// Looks up an engine by name.
    ///
    /// When several engines share a name the first one wins.
    pub fn engine(&self, name: &str) -> Result<&Engine> {
        let mut matches = self.engines.iter().filter(|e| e.name == name);
        let first = matches
            .next()
            .ok_or_else(|| Error::EngineNotFound(name.to_string()))?;
        if matches.next().is_some() {
            log::warn!("More than one engine named {}, using the first", name);
        }
        Ok(first)
    }
}

impl Engine {
    /// Returns the first source whose architecture list equals `arch` exactly.
    ///
    /// Sources without an architecture list never match.
    pub fn binary(&self, arch: &[Arch]) -> Option<&Source> {
        self.sources
            .iter()
            .find(|s| s.arch.as_deref() == Some(arch))
    }

    /// Like [`Engine::binary`], but reports a selection failure as an error.
    pub fn select_source(&self, arch: &[Arch]) -> Result<&Source> {
        self.binary(arch).ok_or_else(|| Error::NoMatchingSource {
            engine: self.name.clone(),
            arch: describe_arch(arch),
        })
    }
}

impl Source {
    /// File name of the artifact: the last path segment of its URL.
    pub fn file_name(&self) -> Result<&str> {
        self.url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::InvalidSourceUrl {
                url: self.url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "metadata": { "version": "0.0.1" },
        "engines": [
            {
                "name": "WS9Wine3.0.1",
                "description": "Wine Stable 3.0.1",
                "author": "WineHQ Official",
                "homepage": "https://dl.winehq.org/wine-builds/macosx/download.html",
                "sources": [
                    {
                        "url": "https://dl.winehq.org/wine-builds/macosx/pool/portable-winehq-stable-3.0.1-osx64.tar.gz",
                        "sha256": "07429ae28be5ad811027ed15a9b58a6bbc5fb55a3cd2c4c803ed72d5c67a59aa",
                        "arch": ["32", "64"],
                        "type": "portable-winehq"
                    },
                    {
                        "url": "https://dl.winehq.org/wine-builds/macosx/pool/portable-winehq-stable-3.0.1-osx.tar.gz",
                        "sha256": "cc74c62868db89305a7bae02d72d053ff02f839e205657a62d8fc1a661198a20",
                        "arch": ["32"],
                        "type": "portable-winehq"
                    },
                    {
                        "url": "https://dl.winehq.org/wine/source/3.0/wine-3.0.1.tar.xz",
                        "sha256": "bad00d7ddac6652795a2ed52ce02a544ff4e891499b29ac71d28d20b8e1d26f3",
                        "type": "source"
                    }
                ]
            }
        ]
    }"#;

    fn catalog() -> EngineList {
        EngineList::from_slice(CATALOG.as_bytes()).unwrap()
    }

    #[test]
    fn parses_catalog() {
        let list = catalog();
        assert_eq!(list.metadata.version, semver::Version::new(0, 0, 1));
        assert_eq!(list.engines.len(), 1);
        let engine = &list.engines[0];
        assert_eq!(engine.sources.len(), 3);
        assert_eq!(engine.sources[2].kind, SourceKind::Source);
        assert!(engine.sources[2].arch.is_none());
    }

    #[test]
    fn selects_exact_arch_match() {
        let list = catalog();
        let engine = list.engine("WS9Wine3.0.1").unwrap();

        let both = engine.select_source(&Arch::DEFAULT_TARGET).unwrap();
        assert_eq!(
            both.file_name().unwrap(),
            "portable-winehq-stable-3.0.1-osx64.tar.gz"
        );

        let only_32 = engine.select_source(&[Arch::I386]).unwrap();
        assert_eq!(only_32.file_name().unwrap(), "portable-winehq-stable-3.0.1-osx.tar.gz");

        let err = engine.select_source(&[Arch::X86_64]).unwrap_err();
        assert!(matches!(err, Error::NoMatchingSource { .. }));
    }

    #[test]
    fn does_not_fall_back_to_mismatched_source() {
        let mut list = catalog();
        list.engines[0].sources.remove(0);
        let err = list.engines[0]
            .select_source(&Arch::DEFAULT_TARGET)
            .unwrap_err();
        assert_eq!(err.kind(), crate::bundler::ErrorKind::NotFound);
    }

    #[test]
    fn unknown_engine_is_not_found() {
        let err = catalog().engine("nope").unwrap_err();
        assert!(matches!(err, Error::EngineNotFound(name) if name == "nope"));
    }

    #[test]
    fn rejects_bad_documents() {
        let err = EngineList::from_slice(b"{\"engines\": []}").unwrap_err();
        assert_eq!(err.kind(), crate::bundler::ErrorKind::Catalog);
    }
}
