//! Streaming downloads with bounded retry.
//!
//! Bytes go straight to disk through a SHA-256 hasher, so verification
//! never needs a second pass over the file. Transient failures (connect
//! errors, timeouts, 5xx, 429) are retried up to three attempts with a
//! short backoff; anything else fails immediately.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::reporter::Reporter;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("download failed with HTTP {status} for {url}")]
    Http { status: StatusCode, url: String },

    #[error("download failed after {attempts} attempts: {source}")]
    Transient {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn is_transient_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || (err.is_request() && err.status().is_none())
}

/// Download `url` to `dest`, returning the SHA-256 hex digest of the bytes
/// written.
///
/// Each retry restarts from byte zero and truncates `dest`, so a partial
/// file from a failed attempt can never survive into verification.
pub async fn fetch_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    reporter: &dyn Reporter,
    display_name: &str,
) -> Result<String, DownloadError> {
    let mut last_err: Option<reqwest::Error> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        if attempt > 1 {
            let backoff = BACKOFF_BASE * 2u32.pow(attempt - 2);
            debug!(attempt, ?backoff, url, "retrying download");
            tokio::time::sleep(backoff).await;
        }

        match try_fetch(client, url, dest, reporter, display_name).await {
            Ok(digest) => return Ok(digest),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Transient(e)) => {
                warn!(attempt, error = %e, "transient download failure");
                last_err = Some(e);
            }
        }
    }

    Err(DownloadError::Transient {
        attempts: MAX_ATTEMPTS,
        source: last_err.expect("at least one attempt ran"),
    })
}

enum AttemptError {
    Transient(reqwest::Error),
    Fatal(DownloadError),
}

impl From<std::io::Error> for AttemptError {
    fn from(e: std::io::Error) -> Self {
        Self::Fatal(DownloadError::Io(e))
    }
}

async fn try_fetch(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    reporter: &dyn Reporter,
    display_name: &str,
) -> Result<String, AttemptError> {
    let resp = client.get(url).send().await.map_err(|e| {
        if is_transient_error(&e) {
            AttemptError::Transient(e)
        } else {
            AttemptError::Fatal(DownloadError::Request(e))
        }
    })?;

    let status = resp.status();
    if !status.is_success() {
        if is_transient_status(status) {
            if let Err(e) = resp.error_for_status() {
                return Err(AttemptError::Transient(e));
            }
        }
        return Err(AttemptError::Fatal(DownloadError::Http {
            status,
            url: url.to_string(),
        }));
    }

    reporter.downloading(display_name, resp.content_length());

    let mut file = tokio::fs::File::create(dest).await?;
    let mut hasher = Sha256::new();
    let mut stream = resp.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(AttemptError::Transient)?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        reporter.download_progress(chunk.len() as u64);
    }
    file.flush().await?;

    Ok(hex::encode(hasher.finalize()))
}

/// Fetch a small text body (a checksum file) without retry ceremony.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, DownloadError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(DownloadError::Http {
            status,
            url: url.to_string(),
        });
    }
    Ok(resp.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_returns_digest() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.tar.gz")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tool.tar.gz");
        let client = reqwest::Client::new();
        let digest = fetch_to_file(
            &client,
            &format!("{}/tool.tar.gz", server.url()),
            &dest,
            &NullReporter,
            "tool.tar.gz",
        )
        .await
        .unwrap();

        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_404_fails_without_retry() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let err = fetch_to_file(
            &client,
            &format!("{}/missing", server.url()),
            &dir.path().join("x"),
            &NullReporter,
            "x",
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            DownloadError::Http {
                status: StatusCode::NOT_FOUND,
                ..
            }
        ));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_retried_then_fails() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/flaky")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let err = fetch_to_file(
            &client,
            &format!("{}/flaky", server.url()),
            &dir.path().join("x"),
            &NullReporter,
            "x",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DownloadError::Transient { attempts: 3, .. }));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_text() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/checksums.txt")
            .with_status(200)
            .with_body("abc  tool.tar.gz\n")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let text = fetch_text(&client, &format!("{}/checksums.txt", server.url()))
            .await
            .unwrap();
        assert_eq!(text, "abc  tool.tar.gz\n");
    }
}
