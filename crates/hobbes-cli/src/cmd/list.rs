//! `hobbes list`

use anyhow::Result;
use comfy_table::Cell;

use crate::ui;

pub fn list() -> Result<()> {
    let (_, manifest) = super::open_registry()?;

    if manifest.is_empty() {
        println!("No packages installed.");
        println!("Run 'hobbes install <owner>/<repo>' to get started.");
        return Ok(());
    }

    let mut table = ui::table(&["name", "version", "repo", "binaries", "installed"]);
    for (name, pkg) in manifest.packages() {
        let date = pkg
            .installed_at
            .split('T')
            .next()
            .unwrap_or(&pkg.installed_at);
        let name_cell = if pkg.pinned {
            format!("{name} (pinned)")
        } else {
            name.to_string()
        };
        table.add_row(vec![
            Cell::new(name_cell),
            Cell::new(&pkg.version),
            Cell::new(&pkg.repo),
            Cell::new(pkg.binaries.join(", ")),
            Cell::new(date),
        ]);
    }
    println!("{table}");
    println!();
    println!(
        "{} package{}",
        manifest.len(),
        if manifest.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
