//! `hobbes update`

use anyhow::{bail, Result};
use hobbes_core::update::{update_one, UpdateOutcome};
use hobbes_core::Platform;

use crate::ui::{self, ConsoleReporter};

pub async fn update(packages: &[String], force: bool, quiet: bool) -> Result<()> {
    let (config, mut manifest) = super::open_registry()?;
    let gh = super::client()?;
    let platform = Platform::current();
    let reporter = ConsoleReporter::new(quiet);

    let mut failures = 0usize;
    for name in packages {
        match update_one(&gh, &config, &mut manifest, platform, name, force, &reporter).await {
            Ok(outcome) => report(name, &outcome),
            Err(e) => {
                ui::error(&format!("{name}: {e}"));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} updates failed", packages.len());
    }
    Ok(())
}

pub(crate) fn report(name: &str, outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::UpToDate { version } => {
            println!("{name} {version} is up to date");
        }
        UpdateOutcome::Updated { from, to, .. } => {
            ui::success(&format!("{name} {from} -> {to}"));
        }
        UpdateOutcome::Pinned { version } => {
            ui::warning(&format!("{name} is pinned at {version}; skipping"));
        }
        UpdateOutcome::Failed { error } => {
            ui::error(&format!("{name}: {error}"));
        }
    }
}
