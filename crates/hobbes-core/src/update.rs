//! Update checks and upgrades over installed packages.

use tracing::{info, warn};

use crate::error::InstallError;
use crate::github::GitHubClient;
use crate::manifest::Manifest;
use crate::paths::Config;
use crate::pipeline::{InstallOutcome, InstallRequest};
use crate::platform::Platform;
use crate::repo::RepoRef;
use crate::reporter::Reporter;
use crate::version::is_newer;

/// How an update attempt for one package ended.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Installed version is already the newest published.
    UpToDate { version: String },
    Updated {
        from: String,
        to: String,
        binaries: Vec<String>,
    },
    /// Held back by the pinned flag.
    Pinned { version: String },
    /// Resolution or install failed; the installed version is untouched.
    Failed { error: InstallError },
}

/// A newer release available for an installed package.
#[derive(Debug, Clone)]
pub struct AvailableUpdate {
    pub name: String,
    pub installed: String,
    pub latest: String,
    pub pinned: bool,
}

/// Check one installed package against the latest release, without
/// installing anything.
pub async fn check_one(
    gh: &GitHubClient,
    manifest: &Manifest,
    name: &str,
) -> Result<Option<AvailableUpdate>, InstallError> {
    let package = manifest
        .get(name)
        .ok_or_else(|| InstallError::NotInstalled(name.to_string()))?;

    let repo = RepoRef::parse(&package.repo)?;
    let latest = gh.latest_release(&repo).await?;
    let latest_version = latest.version();

    if is_newer(latest_version, &package.version) {
        Ok(Some(AvailableUpdate {
            name: name.to_string(),
            installed: package.version.clone(),
            latest: latest_version.to_string(),
            pinned: package.pinned,
        }))
    } else {
        Ok(None)
    }
}

/// Update one installed package to its latest release.
///
/// `force` overrides both the pinned flag and the newer-version gate,
/// reinstalling the latest release unconditionally. After the new version
/// is committed, binaries the old version installed that the new one no
/// longer ships are removed from `bin/`.
pub async fn update_one(
    gh: &GitHubClient,
    config: &Config,
    manifest: &mut Manifest,
    platform: Platform,
    name: &str,
    force: bool,
    reporter: &dyn Reporter,
) -> Result<UpdateOutcome, InstallError> {
    let package = manifest
        .get(name)
        .ok_or_else(|| InstallError::NotInstalled(name.to_string()))?;

    if package.pinned && !force {
        return Ok(UpdateOutcome::Pinned {
            version: package.version.clone(),
        });
    }

    let installed_version = package.version.clone();
    let old_binaries = package.binaries.clone();

    let repo = RepoRef::parse(&package.repo)?;
    let latest = gh.latest_release(&repo).await?;
    if !force && !is_newer(latest.version(), &installed_version) {
        return Ok(UpdateOutcome::UpToDate {
            version: installed_version,
        });
    }

    let request = InstallRequest {
        repo,
        tag: Some(latest.tag_name.clone()),
        binary: None,
        force: true,
    };

    let receipt = match crate::pipeline::install(gh, config, manifest, platform, request, reporter)
        .await?
    {
        InstallOutcome::Installed(receipt) => receipt,
        // force is set and the pinned gate ran above, so the pipeline
        // cannot report these for an update
        InstallOutcome::AlreadyInstalled { name, version }
        | InstallOutcome::SkippedPinned { name, version } => {
            warn!(package = %name, "update resolved to the installed version");
            return Ok(UpdateOutcome::UpToDate { version });
        }
    };

    remove_stale_binaries(config, &old_binaries, &receipt.binaries);

    info!(
        package = %name,
        from = %installed_version,
        to = %receipt.version,
        "updated"
    );
    Ok(UpdateOutcome::Updated {
        from: installed_version,
        to: receipt.version,
        binaries: receipt.binaries,
    })
}

/// Update every installed package, sequentially, in manifest order.
///
/// One package's failure is recorded in its outcome and does not stop the
/// rest. Pinned packages are always skipped here, even under `force`;
/// overriding a pin takes a targeted `update_one`.
pub async fn upgrade_all(
    gh: &GitHubClient,
    config: &Config,
    manifest: &mut Manifest,
    platform: Platform,
    force: bool,
    reporter: &dyn Reporter,
) -> Vec<(String, UpdateOutcome)> {
    let snapshot: Vec<(String, bool, String)> = manifest
        .packages()
        .map(|(n, p)| (n.to_string(), p.pinned, p.version.clone()))
        .collect();
    let mut results = Vec::with_capacity(snapshot.len());

    for (name, pinned, version) in snapshot {
        if pinned {
            results.push((name, UpdateOutcome::Pinned { version }));
            continue;
        }
        let outcome =
            match update_one(gh, config, manifest, platform, &name, force, reporter).await {
                Ok(outcome) => outcome,
                Err(error) => UpdateOutcome::Failed { error },
            };
        results.push((name, outcome));
    }
    results
}

/// Delete binaries the previous version installed that the new one does
/// not. Deletion failures are logged, not fatal; the update itself has
/// already succeeded.
fn remove_stale_binaries(config: &Config, old: &[String], new: &[String]) {
    for binary in old {
        if !new.contains(binary) {
            let path = config.bin_dir.join(binary);
            match std::fs::remove_file(&path) {
                Ok(()) => info!(binary = %binary, "removed stale binary"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(binary = %binary, error = %e, "could not remove stale binary"),
            }
        }
    }
}
