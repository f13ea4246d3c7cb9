//! HTTP and local-file retrieval of raw payloads
//!
//! Transport failures surface as [`UniprotError::Fetch`] or
//! [`UniprotError::HttpStatus`], never as parse errors. No request is retried:
//! a failed fetch is terminal and the caller decides whether to run it again.

use crate::config::AppConfig;
use crate::error::{Result, UniprotError};
use futures::{Stream, StreamExt};
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Thin wrapper over a configured `reqwest` client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| UniprotError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET a URL, rejecting any non-success status
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UniprotError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UniprotError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// Read a whole payload from a URL or a local file
    pub async fn fetch_text(&self, location: &str) -> Result<String> {
        if let Some(path) = local_path(location) {
            info!("Loading {} from local file", path.display());
            return Ok(tokio::fs::read_to_string(&path).await?);
        }

        let text = self
            .get(location)
            .await?
            .text()
            .await
            .map_err(|e| UniprotError::fetch(location, e))?;
        info!("Downloaded {} ({} KB)", location, text.len() / 1024);
        Ok(text)
    }

    /// Stream a response body to a file, returning the bytes written
    ///
    /// The body goes to a `.part` sibling first and is renamed once
    /// complete, so an interrupted download never leaves a target behind.
    pub async fn download_to(&self, url: &str, target: &Path) -> Result<u64> {
        let response = self.get(url).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| UniprotError::fetch(url, e)));
        let written = write_stream(stream, target).await?;
        debug!("Saved {} bytes to {}", written, target.display());
        Ok(written)
    }
}

/// Write every chunk to `<target>.part`, then rename it onto `target`
///
/// The partial file is removed on any failure, whether the stream or the
/// local filesystem raised it.
async fn write_stream<S, B>(stream: S, target: &Path) -> Result<u64>
where
    S: Stream<Item = Result<B>>,
    B: AsRef<[u8]>,
{
    let partial = partial_path(target);
    let mut file = tokio::fs::File::create(&partial).await?;

    let outcome = async {
        let mut stream = std::pin::pin!(stream);
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(chunk.as_ref()).await?;
            written += chunk.as_ref().len() as u64;
        }
        file.flush().await?;
        Ok::<_, UniprotError>(written)
    }
    .await;
    drop(file);

    let outcome = match outcome {
        Ok(written) => tokio::fs::rename(&partial, target)
            .await
            .map(|()| written)
            .map_err(UniprotError::from),
        Err(e) => Err(e),
    };
    if outcome.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    outcome
}

/// Anything that is not an http(s) URL is read from disk
pub fn local_path(location: &str) -> Option<PathBuf> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return None;
    }
    Some(PathBuf::from(
        location.strip_prefix("file://").unwrap_or(location),
    ))
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_local_path_detection() {
        assert_eq!(local_path("https://ftp.uniprot.org/x.txt"), None);
        assert_eq!(local_path("http://example.org/x.txt"), None);
        assert_eq!(
            local_path("file:///data/pathlist.txt"),
            Some(PathBuf::from("/data/pathlist.txt"))
        );
        assert_eq!(
            local_path("fixtures/pathlist.txt"),
            Some(PathBuf::from("fixtures/pathlist.txt"))
        );
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("export/P12345.fasta")),
            PathBuf::from("export/P12345.fasta.part")
        );
    }

    #[tokio::test]
    async fn test_fetch_text_reads_local_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tisslist.txt");
        std::fs::write(&path, "____\nID   Acinus.\nAC   TS-0001\n//\n").unwrap();

        let fetcher = Fetcher::new(&AppConfig::default()).unwrap();
        let text = fetcher.fetch_text(path.to_str().unwrap()).await.unwrap();
        assert!(text.contains("TS-0001"));
    }

    #[tokio::test]
    async fn test_missing_local_file_is_io_error() {
        let fetcher = Fetcher::new(&AppConfig::default()).unwrap();
        let result = fetcher.fetch_text("/nonexistent/uniprot/dbxref.txt").await;
        assert!(matches!(result, Err(UniprotError::Io(_))));
    }

    #[tokio::test]
    async fn test_write_stream_renames_complete_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("P01308.fasta");
        let chunks = vec![Ok(b">sp|P01308|".to_vec()), Ok(b"INS_HUMAN\n".to_vec())];

        let written = write_stream(futures::stream::iter(chunks), &target)
            .await
            .unwrap();

        assert_eq!(written, 21);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), ">sp|P01308|INS_HUMAN\n");
        assert!(!partial_path(&target).exists());
    }

    #[tokio::test]
    async fn test_write_stream_removes_partial_file_on_io_error() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("P01308.fasta");
        let chunks = vec![
            Ok(b">sp|P01308|".to_vec()),
            Err(UniprotError::Io(std::io::Error::other("disk full"))),
        ];

        let result = write_stream(futures::stream::iter(chunks), &target).await;

        assert!(matches!(result, Err(UniprotError::Io(_))));
        assert!(!partial_path(&target).exists());
        assert!(!target.exists());
    }
}
