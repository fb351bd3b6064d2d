//! `hobbes upgrade`

use anyhow::{bail, Result};
use hobbes_core::update::{self, UpdateOutcome};
use hobbes_core::Platform;

use crate::ui::ConsoleReporter;

/// Update every installed package, continuing past individual failures.
pub async fn upgrade_all(force: bool, quiet: bool) -> Result<()> {
    let (config, mut manifest) = super::open_registry()?;

    if manifest.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    let gh = super::client()?;
    let platform = Platform::current();
    let reporter = ConsoleReporter::new(quiet);

    let results =
        update::upgrade_all(&gh, &config, &mut manifest, platform, force, &reporter).await;

    let mut updated = 0usize;
    let mut failed = 0usize;
    for (name, outcome) in &results {
        super::update::report(name, outcome);
        match outcome {
            UpdateOutcome::Updated { .. } => updated += 1,
            UpdateOutcome::Failed { .. } => failed += 1,
            UpdateOutcome::UpToDate { .. } | UpdateOutcome::Pinned { .. } => {}
        }
    }

    println!();
    println!("{updated} updated, {} checked", results.len());
    if failed > 0 {
        bail!("{failed} package{} failed to update", if failed == 1 { "" } else { "s" });
    }
    Ok(())
}
