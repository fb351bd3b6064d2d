//! Digest discovery and verification for downloaded assets.
//!
//! Two sources of truth, tried in order: the digest GitHub attaches to the
//! asset record itself, then a sibling checksum asset in the same release
//! (`checksums.txt`, `<asset>.sha256`, and friends). A release that
//! publishes neither installs unverified; a digest that is present but
//! wrong is fatal.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use crate::release::{Asset, Release};

#[derive(Error, Debug)]
pub enum ChecksumError {
    #[error("checksum mismatch for {asset}: expected {expected}, got {actual}")]
    Mismatch {
        asset: String,
        expected: String,
        actual: String,
    },

    #[error("unsupported checksum algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Digest algorithms understood by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

/// A digest a publisher claims for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDigest {
    pub algorithm: DigestAlgorithm,
    /// Lowercase hex.
    pub value: String,
}

impl PublishedDigest {
    /// Parse an `algorithm:hex` string, as found in the asset `digest` field.
    pub fn parse(raw: &str) -> Result<Self, ChecksumError> {
        let (algo, hex) = raw
            .split_once(':')
            .ok_or_else(|| ChecksumError::UnsupportedAlgorithm(raw.to_string()))?;
        let algorithm = match algo {
            "sha256" => DigestAlgorithm::Sha256,
            "sha512" => DigestAlgorithm::Sha512,
            other => return Err(ChecksumError::UnsupportedAlgorithm(other.to_string())),
        };
        Ok(Self {
            algorithm,
            value: hex.to_lowercase(),
        })
    }

    /// Verify `path` against this digest.
    pub fn verify(&self, path: &Path, asset_name: &str) -> Result<(), ChecksumError> {
        let actual = digest_file(path, self.algorithm)?;
        if actual == self.value {
            Ok(())
        } else {
            Err(ChecksumError::Mismatch {
                asset: asset_name.to_string(),
                expected: self.value.clone(),
                actual,
            })
        }
    }
}

/// Filenames that commonly hold a release-wide checksum list.
const CHECKSUM_LIST_NAMES: &[&str] = &[
    "checksums.txt",
    "checksums.sha256",
    "sha256sums.txt",
    "sha256sum.txt",
    "sha256sums",
    "shasums.txt",
    "shasum.txt",
];

/// Find the release asset that should contain a checksum for `asset_name`.
///
/// Per-asset files (`<name>.sha256`) win over release-wide lists.
pub fn find_checksum_asset<'a>(release: &'a Release, asset_name: &str) -> Option<&'a Asset> {
    let per_asset = [
        format!("{asset_name}.sha256"),
        format!("{asset_name}.sha256sum"),
        format!("{asset_name}.sha512"),
    ];
    for candidate in &per_asset {
        if let Some(a) = release
            .assets
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(candidate))
        {
            return Some(a);
        }
    }
    release.assets.iter().find(|a| {
        CHECKSUM_LIST_NAMES
            .iter()
            .any(|n| a.name.eq_ignore_ascii_case(n))
    })
}

/// Pull the digest for `asset_name` out of a checksum file's text.
///
/// Understands the two common layouts: `<hex>  <file>` (sha256sum output,
/// optionally with a `*` binary marker) and `<file>: <hex>`. The hex length
/// decides the algorithm. A per-asset file with a single bare hex token is
/// accepted too.
pub fn parse_checksum_file(content: &str, asset_name: &str) -> Option<PublishedDigest> {
    let digest_from_hex = |hex: &str| {
        let algorithm = match hex.len() {
            64 => DigestAlgorithm::Sha256,
            128 => DigestAlgorithm::Sha512,
            _ => return None,
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(PublishedDigest {
            algorithm,
            value: hex.to_lowercase(),
        })
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // "<file>: <hex>"
        if let Some((file, hex)) = line.split_once(':') {
            if file.trim().ends_with(asset_name) {
                if let Some(d) = digest_from_hex(hex.trim()) {
                    return Some(d);
                }
            }
        }

        // "<hex>  <file>" / "<hex> *<file>"
        let mut parts = line.split_whitespace();
        if let (Some(first), Some(second)) = (parts.next(), parts.next()) {
            let file = second.strip_prefix('*').unwrap_or(second);
            let file = file.rsplit('/').next().unwrap_or(file);
            if file == asset_name {
                if let Some(d) = digest_from_hex(first) {
                    return Some(d);
                }
            }
        } else if let Some(only) = line.split_whitespace().next() {
            // Single-token per-asset file
            if let Some(d) = digest_from_hex(only) {
                return Some(d);
            }
        }
    }
    None
}

/// Hex digest of a file, streamed in 64 KiB chunks.
pub fn digest_file(path: &Path, algorithm: DigestAlgorithm) -> Result<String, ChecksumError> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = vec![0u8; 64 * 1024];

    match algorithm {
        DigestAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
        DigestAlgorithm::Sha512 => {
            let mut hasher = Sha512::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str =
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_parse_embedded_digest() {
        let d = PublishedDigest::parse(&format!("sha256:{HELLO_SHA256}")).unwrap();
        assert_eq!(d.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(d.value, HELLO_SHA256);
    }

    #[test]
    fn test_parse_unsupported_scheme() {
        assert!(matches!(
            PublishedDigest::parse("md5:abcdef"),
            Err(ChecksumError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            PublishedDigest::parse("deadbeef"),
            Err(ChecksumError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_verify_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.bin");
        std::fs::write(&path, b"hello").unwrap();

        let good = PublishedDigest::parse(&format!("sha256:{HELLO_SHA256}")).unwrap();
        good.verify(&path, "hello.bin").unwrap();

        let bad = PublishedDigest {
            algorithm: DigestAlgorithm::Sha256,
            value: "00".repeat(32),
        };
        assert!(matches!(
            bad.verify(&path, "hello.bin"),
            Err(ChecksumError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_parse_sha256sum_layout() {
        let content = format!("{HELLO_SHA256}  tool-linux-amd64.tar.gz\n");
        let d = parse_checksum_file(&content, "tool-linux-amd64.tar.gz").unwrap();
        assert_eq!(d.value, HELLO_SHA256);
    }

    #[test]
    fn test_parse_binary_marker_and_path() {
        let content = format!("{HELLO_SHA256} *dist/tool-linux-amd64.tar.gz\n");
        let d = parse_checksum_file(&content, "tool-linux-amd64.tar.gz").unwrap();
        assert_eq!(d.algorithm, DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_parse_colon_layout() {
        let content = format!("tool-linux-amd64.tar.gz: {HELLO_SHA256}\n");
        let d = parse_checksum_file(&content, "tool-linux-amd64.tar.gz").unwrap();
        assert_eq!(d.value, HELLO_SHA256);
    }

    #[test]
    fn test_parse_bare_hex() {
        let d = parse_checksum_file(HELLO_SHA256, "whatever.tar.gz").unwrap();
        assert_eq!(d.value, HELLO_SHA256);
    }

    #[test]
    fn test_parse_no_matching_line() {
        let content = format!("{HELLO_SHA256}  other-file.zip\n");
        assert!(parse_checksum_file(&content, "tool.tar.gz").is_none());
    }

    #[test]
    fn test_sha512_length_detection() {
        let hex512 = "ab".repeat(64);
        let content = format!("{hex512}  tool.tar.gz\n");
        let d = parse_checksum_file(&content, "tool.tar.gz").unwrap();
        assert_eq!(d.algorithm, DigestAlgorithm::Sha512);
    }

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_string(),
            download_url: String::new(),
            size: None,
            content_type: None,
            digest: None,
        }
    }

    #[test]
    fn test_find_checksum_asset_prefers_per_asset_file() {
        let release = Release {
            tag_name: "v1".to_string(),
            name: None,
            prerelease: false,
            draft: false,
            published_at: None,
            assets: vec![
                asset("checksums.txt"),
                asset("tool.tar.gz"),
                asset("tool.tar.gz.sha256"),
            ],
        };
        let found = find_checksum_asset(&release, "tool.tar.gz").unwrap();
        assert_eq!(found.name, "tool.tar.gz.sha256");
    }

    #[test]
    fn test_find_checksum_asset_falls_back_to_list() {
        let release = Release {
            tag_name: "v1".to_string(),
            name: None,
            prerelease: false,
            draft: false,
            published_at: None,
            assets: vec![asset("SHA256SUMS.txt"), asset("tool.tar.gz")],
        };
        let found = find_checksum_asset(&release, "tool.tar.gz").unwrap();
        assert_eq!(found.name, "SHA256SUMS.txt");
    }
}
