//! `hobbes uninstall`

use anyhow::{bail, Result};
use hobbes_core::pipeline;

use crate::ui;

pub fn uninstall(packages: &[String], quiet: bool) -> Result<()> {
    let (config, mut manifest) = super::open_registry()?;

    let mut failures = 0usize;
    for name in packages {
        match pipeline::uninstall(&config, &mut manifest, name) {
            Ok(package) => {
                if !quiet {
                    ui::success(&format!(
                        "removed {name} {} ({})",
                        package.version,
                        package.binaries.join(", ")
                    ));
                }
            }
            Err(e) => {
                ui::error(&e.to_string());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} removals failed", packages.len());
    }
    Ok(())
}
