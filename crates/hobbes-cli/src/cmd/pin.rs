//! `hobbes pin` / `hobbes unpin`

use anyhow::{bail, Context, Result};

use crate::ui;

pub fn pin(package: &str, pinned: bool, quiet: bool) -> Result<()> {
    let (_, mut manifest) = super::open_registry()?;

    if !manifest.set_pinned(package, pinned) {
        bail!("package '{package}' is not installed");
    }
    manifest.save().context("Failed to save the manifest")?;

    if !quiet {
        let verb = if pinned { "pinned" } else { "unpinned" };
        ui::success(&format!("{verb} {package}"));
    }
    Ok(())
}
