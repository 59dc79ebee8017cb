//! HTTP transport for downloading engine sources.
//!
//! [`Transport`] is the seam between the fetcher and the network so that
//! builds can be driven against an in-memory source in tests.

use crate::bundler::error::{Error, ErrorExt, Result};
use crate::bundler::utils::fs::PartialFile;
use futures_lite::StreamExt;
use std::future::Future;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Something that can stream a URL's body into a local file.
pub trait Transport: Send + Sync {
    /// Downloads `url` in full into `dest`, which is already open and empty.
    ///
    /// Returns the number of bytes written. Transport failures are
    /// [`Error::Network`], local write failures [`Error::Fs`].
    fn download(
        &self,
        url: &Url,
        dest: &PartialFile,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Creates a client identifying itself as this crate.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network {
                url: String::new(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpClient {
    async fn download(&self, url: &Url, dest: &PartialFile) -> Result<u64> {
        let network = |e: reqwest::Error| Error::Network {
            url: url.to_string(),
            reason: e.to_string(),
        };

        log::info!("Downloading {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?;

        let path = dest.path();
        let mut writer = tokio::io::BufWriter::new(dest.writer()?);

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(network)?;
            writer
                .write_all(&chunk)
                .await
                .fs_context("writing download", path)?;
            written += chunk.len() as u64;
        }

        writer.flush().await.fs_context("flushing download", path)?;
        log::debug!("Downloaded {} bytes from {}", written, url);
        Ok(written)
    }
}
