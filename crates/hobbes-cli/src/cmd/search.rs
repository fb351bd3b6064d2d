//! `hobbes search`

use anyhow::Result;
use comfy_table::Cell;

use crate::ui;

pub async fn search(query: &str, limit: usize) -> Result<()> {
    let gh = super::client()?;
    let results = gh.search_repos(query, limit).await?;

    if results.is_empty() {
        println!("No repositories match '{query}'.");
        return Ok(());
    }

    let mut table = ui::table(&["repo", "stars", "description"]);
    for repo in &results {
        let description = repo.description.as_deref().unwrap_or("");
        // Keep rows on one line
        let short = if description.chars().count() > 72 {
            let head: String = description.chars().take(69).collect();
            format!("{head}...")
        } else {
            description.to_string()
        };
        table.add_row(vec![
            Cell::new(&repo.full_name),
            Cell::new(repo.stars),
            Cell::new(short),
        ]);
    }
    println!("{table}");
    Ok(())
}
