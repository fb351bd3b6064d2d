//! `hobbes outdated`

use anyhow::Result;
use comfy_table::Cell;
use hobbes_core::update::check_one;

use crate::ui;

/// Show packages with a newer release available, without changing anything.
pub async fn outdated() -> Result<()> {
    let (_, manifest) = super::open_registry()?;

    if manifest.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    let gh = super::client()?;
    let names: Vec<String> = manifest.packages().map(|(n, _)| n.to_string()).collect();

    let mut rows = Vec::new();
    for name in &names {
        match check_one(&gh, &manifest, name).await {
            Ok(Some(update)) => rows.push(update),
            Ok(None) => {}
            Err(e) => ui::warning(&format!("{name}: {e}")),
        }
    }

    if rows.is_empty() {
        println!("Everything is up to date.");
        return Ok(());
    }

    let mut table = ui::table(&["name", "installed", "latest", ""]);
    for update in &rows {
        table.add_row(vec![
            Cell::new(&update.name),
            Cell::new(&update.installed),
            Cell::new(&update.latest),
            Cell::new(if update.pinned { "pinned" } else { "" }),
        ]);
    }
    println!("{table}");
    println!();
    println!("Run 'hobbes upgrade-all' to update.");
    Ok(())
}
