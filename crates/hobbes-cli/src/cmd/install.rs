//! `hobbes install`

use anyhow::{bail, Result};
use crossterm::style::Stylize;
use hobbes_core::pipeline::{self, InstallOutcome, InstallRequest};
use hobbes_core::{InstallError, Platform, RepoRef};

use crate::ui::{self, ConsoleReporter};

/// Install one or more repositories.
///
/// Failures are reported per repository; the remaining requests still run
/// and the command exits nonzero if any of them failed.
pub async fn install(
    repos: &[String],
    tag: Option<&str>,
    binary: Option<&str>,
    force: bool,
    quiet: bool,
) -> Result<()> {
    let (config, mut manifest) = super::open_registry()?;
    let gh = super::client()?;
    let platform = Platform::current();
    let reporter = ConsoleReporter::new(quiet);

    let mut failures = 0usize;
    for spec in repos {
        let request = match RepoRef::parse(spec) {
            Ok(repo) => InstallRequest {
                repo,
                tag: tag.map(String::from),
                binary: binary.map(String::from),
                force,
            },
            Err(e) => {
                ui::error(&e.to_string());
                failures += 1;
                continue;
            }
        };

        if !quiet {
            println!("{} {}", "installing".bold(), request.repo);
        }

        match pipeline::install(&gh, &config, &mut manifest, platform, request, &reporter).await {
            Ok(outcome) => report_outcome(&config, &outcome, quiet),
            Err(e) => {
                report_error(&e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} installs failed", repos.len());
    }
    Ok(())
}

fn report_outcome(config: &hobbes_core::Config, outcome: &InstallOutcome, quiet: bool) {
    match outcome {
        InstallOutcome::Installed(receipt) => {
            ui::success(&format!(
                "{} {} ({})",
                receipt.name,
                receipt.version,
                receipt.binaries.join(", ")
            ));
            if !receipt.verified {
                ui::warning(&format!(
                    "{} was installed without checksum verification",
                    receipt.name
                ));
            }
            if !quiet {
                for binary in &receipt.binaries {
                    warn_if_shadowed(config, binary);
                }
            }
        }
        InstallOutcome::AlreadyInstalled { name, version } => {
            ui::success(&format!(
                "{name} {version} is already installed (use --force to reinstall)"
            ));
        }
        InstallOutcome::SkippedPinned { name, version } => {
            ui::warning(&format!(
                "{name} is pinned at {version}; use --force to override"
            ));
        }
    }
}

/// Point at the offending asset list when nothing matched; otherwise the
/// error Display text already says what went wrong.
fn report_error(err: &InstallError) {
    ui::error(&err.to_string());
    if err.is_transient() {
        eprintln!("  this looks like a temporary network condition; retrying may succeed");
    }
    if let InstallError::NoCompatibleAsset { available, .. } = err {
        if available.is_empty() {
            eprintln!("  the release has no recognizable platform assets");
        } else {
            eprintln!("  the release ships:");
            for (os, arch) in available {
                match arch {
                    Some(arch) => eprintln!("    {os}/{arch}"),
                    None => eprintln!("    {os}"),
                }
            }
        }
    }
}

/// Warn when `binary` resolves to a different executable on PATH than the
/// one just installed, or to nothing at all.
fn warn_if_shadowed(config: &hobbes_core::Config, binary: &str) {
    let installed = config.bin_dir.join(binary);
    match which::which(binary) {
        Ok(found) if found != installed => {
            ui::warning(&format!(
                "'{binary}' on PATH resolves to {} (hobbes installed {})",
                found.display(),
                installed.display()
            ));
        }
        Ok(_) => {}
        Err(_) => {
            ui::warning(&format!(
                "{} is not on PATH; add it to use '{binary}'",
                config.bin_dir.display()
            ));
        }
    }
}
