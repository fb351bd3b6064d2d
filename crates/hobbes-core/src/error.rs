//! The install pipeline's error type.

use thiserror::Error;

use crate::checksum::ChecksumError;
use crate::download::DownloadError;
use crate::extract::ExtractError;
use crate::github::GitHubError;
use crate::manifest::ManifestError;
use crate::platform::{Arch, Os, Platform};
use crate::repo::RepoParseError;

/// Everything that can stop an install, uninstall or update.
///
/// Variants carry enough context for the CLI to print an actionable
/// message without re-deriving state.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error(transparent)]
    Repo(#[from] RepoParseError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("no asset in {repo} {tag} is compatible with {platform}")]
    NoCompatibleAsset {
        repo: String,
        tag: String,
        platform: Platform,
        /// Platforms the release does ship, for the error message.
        available: Vec<(Os, Option<Arch>)>,
    },

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Integrity(#[from] ChecksumError),

    #[error("failed to extract {asset}: {source}")]
    Extraction {
        asset: String,
        #[source]
        source: ExtractError,
    },

    #[error("{asset} contains no executable files")]
    NoExecutables {
        asset: String,
        /// Filenames that were in the archive, for the error message.
        entries: Vec<String>,
    },

    #[error("no executable named '{name}' in the archive")]
    BinaryNotFound {
        name: String,
        /// Executables that were found instead.
        entries: Vec<String>,
    },

    #[error("package '{0}' is not installed")]
    NotInstalled(String),

    #[error(transparent)]
    Registry(#[from] ManifestError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InstallError {
    /// True for failures worth retrying later (network and service
    /// conditions), false for states a retry cannot fix.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::GitHub(GitHubError::RateLimited) | Self::Download(_) => true,
            Self::GitHub(GitHubError::Http(e)) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
