//! The install pipeline.
//!
//! An install moves through three typed stages, each consuming the last:
//!
//! ```text
//! InstallRequest --resolve--> ResolvedInstall --prepare--> PreparedInstall
//!                                                               |
//!                                              commit --> InstallReceipt
//! ```
//!
//! `resolve` talks to the release API, `prepare` does all the network and
//! scratch-space work (download, verify, extract), and `commit` is the only
//! stage that touches `bin/` or the manifest. Everything before `commit`
//! happens in a per-install staging directory that is dropped on any
//! failure, so a broken download or bad checksum leaves the system exactly
//! as it was.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::checksum::{self, DigestAlgorithm, PublishedDigest};
use crate::download;
use crate::error::InstallError;
use crate::extract::{self, ExtractedEntry};
use crate::github::GitHubClient;
use crate::manifest::{Manifest, Package};
use crate::matcher::{self, MatchOutcome};
use crate::paths::{stem_lower, Config};
use crate::platform::Platform;
use crate::release::{Asset, Release};
use crate::repo::RepoRef;
use crate::reporter::Reporter;

/// What the caller wants installed.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub repo: RepoRef,
    /// Exact release tag; `None` means the latest release.
    pub tag: Option<String>,
    /// Explicit binary to install when the archive ships several.
    pub binary: Option<String>,
    /// Reinstall even when the same version is already present.
    pub force: bool,
}

impl InstallRequest {
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            tag: None,
            binary: None,
            force: false,
        }
    }

    /// The name the package is registered under: the repository name,
    /// lowercased.
    pub fn install_name(&self) -> String {
        self.repo.name.to_lowercase()
    }

    /// Resolve the request to a concrete release and asset.
    pub async fn resolve(
        self,
        gh: &GitHubClient,
        platform: Platform,
    ) -> Result<ResolvedInstall, InstallError> {
        let release = match &self.tag {
            Some(tag) => gh.release_by_tag(&self.repo, tag).await?,
            None => gh.latest_release(&self.repo).await?,
        };
        debug!(repo = %self.repo, tag = %release.tag_name, "resolved release");

        let asset = match matcher::select(platform, &release.assets) {
            MatchOutcome::Match(asset) => asset.clone(),
            MatchOutcome::NoMatch { available } => {
                return Err(InstallError::NoCompatibleAsset {
                    repo: self.repo.to_string(),
                    tag: release.tag_name,
                    platform,
                    available,
                });
            }
        };

        Ok(ResolvedInstall {
            request: self,
            release,
            asset,
        })
    }
}

/// A request pinned to one release and one asset.
#[derive(Debug)]
pub struct ResolvedInstall {
    pub request: InstallRequest,
    pub release: Release,
    pub asset: Asset,
}

impl ResolvedInstall {
    pub fn version(&self) -> &str {
        self.release.version()
    }

    /// Download, verify and extract the asset into a staging directory.
    pub async fn prepare(
        self,
        gh: &GitHubClient,
        config: &Config,
        reporter: &dyn Reporter,
    ) -> Result<PreparedInstall, InstallError> {
        config.ensure_dirs()?;
        let staging = tempfile::tempdir_in(&config.tmp_dir)?;
        let archive_path = staging.path().join(&self.asset.name);

        let sha256 = download::fetch_to_file(
            gh.http(),
            &self.asset.download_url,
            &archive_path,
            reporter,
            &self.asset.name,
        )
        .await?;

        let verified = self
            .verify(gh, &archive_path, &sha256, reporter)
            .await?;

        reporter.extracting(&self.asset.name);
        let extract_dir = staging.path().join("unpacked");
        let format = extract::detect_format(&archive_path).map_err(|source| {
            InstallError::Extraction {
                asset: self.asset.name.clone(),
                source,
            }
        })?;
        let entries =
            extract::extract(&archive_path, format, &extract_dir).map_err(|source| {
                InstallError::Extraction {
                    asset: self.asset.name.clone(),
                    source,
                }
            })?;

        let binaries = self.pick_binaries(entries)?;
        debug!(
            count = binaries.len(),
            verified, "prepared install staging"
        );

        Ok(PreparedInstall {
            resolved: self,
            staging,
            binaries,
            verified,
            sha256,
        })
    }

    /// Check the download against whatever digest the release publishes.
    ///
    /// Returns true when a digest was found and matched. A release with no
    /// digest anywhere installs unverified, with a warning; a digest that
    /// exists and disagrees is fatal.
    async fn verify(
        &self,
        gh: &GitHubClient,
        archive_path: &std::path::Path,
        sha256: &str,
        reporter: &dyn Reporter,
    ) -> Result<bool, InstallError> {
        reporter.verifying(&self.asset.name);

        let published = match &self.asset.digest {
            Some(raw) => Some(PublishedDigest::parse(raw)?),
            None => self.fetch_sibling_digest(gh, reporter).await?,
        };

        let Some(digest) = published else {
            warn!(asset = %self.asset.name, "no published checksum; installing unverified");
            reporter.warning("no checksum published for this release; skipping verification");
            return Ok(false);
        };

        // The download already streamed through SHA-256, so that case needs
        // no second read of the file.
        if digest.algorithm == DigestAlgorithm::Sha256 {
            if digest.value != sha256 {
                return Err(checksum::ChecksumError::Mismatch {
                    asset: self.asset.name.clone(),
                    expected: digest.value,
                    actual: sha256.to_string(),
                }
                .into());
            }
        } else {
            digest.verify(archive_path, &self.asset.name)?;
        }
        Ok(true)
    }

    async fn fetch_sibling_digest(
        &self,
        gh: &GitHubClient,
        reporter: &dyn Reporter,
    ) -> Result<Option<PublishedDigest>, InstallError> {
        let Some(checksum_asset) = checksum::find_checksum_asset(&self.release, &self.asset.name)
        else {
            return Ok(None);
        };

        // A checksum file that cannot be fetched degrades to an unverified
        // install; only a digest that exists and disagrees is fatal.
        let body = match download::fetch_text(gh.http(), &checksum_asset.download_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(asset = %checksum_asset.name, error = %e, "checksum fetch failed");
                reporter.warning(&format!(
                    "could not fetch {}; skipping verification",
                    checksum_asset.name
                ));
                return Ok(None);
            }
        };
        let parsed = checksum::parse_checksum_file(&body, &self.asset.name);
        if parsed.is_none() {
            reporter.warning(&format!(
                "{} does not mention {}; skipping verification",
                checksum_asset.name, self.asset.name
            ));
        }
        Ok(parsed)
    }

    /// Decide which extracted files become installed binaries.
    ///
    /// An explicit `--binary` must name one of the executables. Otherwise a
    /// single executable wins outright, an executable named after the
    /// repository wins over the rest, and failing both, every executable is
    /// installed.
    fn pick_binaries(
        &self,
        entries: Vec<ExtractedEntry>,
    ) -> Result<Vec<ExtractedEntry>, InstallError> {
        let names = |list: &[ExtractedEntry]| {
            list.iter()
                .map(|e| e.file_name().to_string())
                .collect::<Vec<_>>()
        };

        let executables: Vec<ExtractedEntry> = entries
            .iter()
            .filter(|e| e.is_executable)
            .cloned()
            .collect();
        if executables.is_empty() {
            return Err(InstallError::NoExecutables {
                asset: self.asset.name.clone(),
                entries: names(&entries),
            });
        }

        if let Some(wanted) = &self.request.binary {
            let wanted_lower = wanted.to_lowercase();
            return executables
                .iter()
                .find(|e| {
                    e.file_name().eq_ignore_ascii_case(wanted)
                        || stem_lower(e.file_name()) == wanted_lower
                })
                .cloned()
                .map(|e| vec![e])
                .ok_or_else(|| InstallError::BinaryNotFound {
                    name: wanted.clone(),
                    entries: names(&executables),
                });
        }

        if executables.len() == 1 {
            return Ok(executables);
        }

        let repo_name = self.request.install_name();
        if let Some(named) = executables
            .iter()
            .find(|e| stem_lower(e.file_name()) == repo_name)
        {
            return Ok(vec![named.clone()]);
        }

        Ok(executables)
    }
}

/// Fully staged install, ready to be committed.
#[derive(Debug)]
pub struct PreparedInstall {
    resolved: ResolvedInstall,
    /// Holds the downloaded and extracted files alive until commit.
    staging: tempfile::TempDir,
    binaries: Vec<ExtractedEntry>,
    verified: bool,
    sha256: String,
}

impl PreparedInstall {
    pub fn binaries(&self) -> &[ExtractedEntry] {
        &self.binaries
    }

    /// Move the staged binaries into `bin/` and record the package.
    ///
    /// Placement is all-or-nothing: any failure puts back every binary it
    /// replaced and removes every binary it added, including when the
    /// manifest write itself fails.
    pub fn commit(
        self,
        manifest: &mut Manifest,
        config: &Config,
    ) -> Result<InstallReceipt, InstallError> {
        let name = self.resolved.request.install_name();
        let previous = manifest.get(&name).cloned();
        let pinned = previous.as_ref().is_some_and(|p| p.pinned);

        let placement = place_binaries(&self.binaries, config)?;

        let binaries: Vec<String> = {
            let mut b: Vec<String> = self
                .binaries
                .iter()
                .map(|e| e.file_name().to_string())
                .collect();
            b.sort();
            b
        };

        let package = Package {
            repo: self.resolved.request.repo.to_string(),
            version: self.resolved.version().to_string(),
            tag: self.resolved.release.tag_name.clone(),
            asset: self.resolved.asset.name.clone(),
            binaries: binaries.clone(),
            pinned,
            installed_at: chrono::Utc::now().to_rfc3339(),
            digest: self.verified.then(|| self.sha256.clone()),
        };
        manifest.insert(name.clone(), package);

        if let Err(e) = manifest.save() {
            // The in-memory registry must match what rollback leaves on
            // disk; a later save through the same handle would otherwise
            // persist an entry for files that no longer exist.
            match previous {
                Some(prev) => manifest.insert(name, prev),
                None => {
                    manifest.remove(&name);
                }
            }
            placement.rollback();
            return Err(e.into());
        }
        placement.keep();

        info!(package = %name, version = %self.resolved.version(), "installed");
        Ok(InstallReceipt {
            name,
            repo: self.resolved.request.repo.clone(),
            version: self.resolved.version().to_string(),
            tag: self.resolved.release.tag_name.clone(),
            asset: self.resolved.asset.name.clone(),
            binaries,
            verified: self.verified,
        })
    }
}

/// Binaries placed in `bin/`, with enough state to undo the placement.
struct Placement {
    /// New paths that did not exist before.
    added: Vec<PathBuf>,
    /// `(live, backup)` pairs for binaries that were overwritten.
    replaced: Vec<(PathBuf, PathBuf)>,
}

impl Placement {
    fn rollback(self) {
        for path in &self.added {
            let _ = std::fs::remove_file(path);
        }
        for (live, backup) in &self.replaced {
            let _ = std::fs::rename(backup, live);
        }
    }

    fn keep(self) {
        for (_, backup) in &self.replaced {
            let _ = std::fs::remove_file(backup);
        }
    }
}

/// Rename staged binaries into `bin/` as a group.
///
/// Staging lives under the same base directory as `bin/`, so these are
/// same-filesystem renames. Existing binaries are parked under a `.bak`
/// name first and only deleted once the whole group is in place.
fn place_binaries(
    binaries: &[ExtractedEntry],
    config: &Config,
) -> Result<Placement, InstallError> {
    let mut placement = Placement {
        added: Vec::new(),
        replaced: Vec::new(),
    };

    for entry in binaries {
        let dest = config.bin_dir.join(entry.file_name());

        if dest.exists() {
            // Append rather than swap the extension: `tool` and `tool.exe`
            // must park under distinct backup names.
            let backup = dest.with_file_name(format!("{}.bak", entry.file_name()));
            if let Err(e) = std::fs::rename(&dest, &backup) {
                placement.rollback();
                return Err(e.into());
            }
            placement.replaced.push((dest.clone(), backup));
        }

        if let Err(e) = std::fs::rename(&entry.absolute_path, &dest) {
            placement.rollback();
            return Err(e.into());
        }
        if let Err(e) = make_executable(&dest) {
            placement.added.push(dest);
            placement.rollback();
            return Err(e.into());
        }
        if placement.replaced.last().is_none_or(|(live, _)| *live != dest) {
            placement.added.push(dest);
        }
    }

    Ok(placement)
}

#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &std::path::Path) -> std::io::Result<()> {
    Ok(())
}

/// Result of one completed install.
#[derive(Debug, Clone)]
pub struct InstallReceipt {
    pub name: String,
    pub repo: RepoRef,
    pub version: String,
    pub tag: String,
    pub asset: String,
    pub binaries: Vec<String>,
    /// False when no checksum was published for the asset.
    pub verified: bool,
}

/// How an install request ended.
#[derive(Debug)]
pub enum InstallOutcome {
    Installed(InstallReceipt),
    /// The requested version is already present and `force` was not given.
    AlreadyInstalled { name: String, version: String },
    /// The package is pinned; an explicit `--force` overrides.
    SkippedPinned { name: String, version: String },
}

/// Run the whole pipeline for one request.
pub async fn install(
    gh: &GitHubClient,
    config: &Config,
    manifest: &mut Manifest,
    platform: Platform,
    request: InstallRequest,
    reporter: &dyn Reporter,
) -> Result<InstallOutcome, InstallError> {
    let name = request.install_name();

    if let Some(existing) = manifest.get(&name) {
        if existing.pinned && !request.force {
            return Ok(InstallOutcome::SkippedPinned {
                name,
                version: existing.version.clone(),
            });
        }
    }

    let resolved = request.resolve(gh, platform).await?;

    if let Some(existing) = manifest.get(&name) {
        if existing.version == resolved.version() && !resolved.request.force {
            return Ok(InstallOutcome::AlreadyInstalled {
                name,
                version: existing.version.clone(),
            });
        }
    }

    let prepared = resolved.prepare(gh, config, reporter).await?;
    let receipt = prepared.commit(manifest, config)?;
    Ok(InstallOutcome::Installed(receipt))
}

/// Remove a package's binaries and its manifest entry.
///
/// The manifest is saved before the binaries are deleted; a crash after
/// the save leaves orphan files in `bin/` rather than a manifest entry
/// pointing at nothing.
pub fn uninstall(
    config: &Config,
    manifest: &mut Manifest,
    name: &str,
) -> Result<Package, InstallError> {
    let package = manifest
        .remove(name)
        .ok_or_else(|| InstallError::NotInstalled(name.to_string()))?;

    if let Err(e) = manifest.save() {
        // Put the entry back; nothing was deleted yet
        manifest.insert(name.to_string(), package);
        return Err(e.into());
    }

    for binary in &package.binaries {
        let path = config.bin_dir.join(binary);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(binary = %binary, "binary already missing during uninstall");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(package = %name, "uninstalled");
    Ok(package)
}
