//! `hobbes info`

use anyhow::{bail, Result};
use crossterm::style::Stylize;
use hobbes_core::RepoRef;

pub fn info(package: &str) -> Result<()> {
    let (config, manifest) = super::open_registry()?;

    // Accept either the registered name or an owner/repo spec.
    let name = match manifest.get(package) {
        Some(_) => package.to_string(),
        None => match RepoRef::parse(package) {
            Ok(repo) => repo.name.to_lowercase(),
            Err(_) => package.to_string(),
        },
    };
    let Some(pkg) = manifest.get(&name) else {
        bail!("package '{package}' is not installed");
    };

    println!("{}", name.bold());
    println!("  repo:       https://github.com/{}", pkg.repo);
    println!("  version:    {}", pkg.version);
    println!("  tag:        {}", pkg.tag);
    println!("  asset:      {}", pkg.asset);
    println!("  installed:  {}", pkg.installed_at);
    println!("  pinned:     {}", if pkg.pinned { "yes" } else { "no" });
    match &pkg.digest {
        Some(digest) => println!("  sha256:     {digest}"),
        None => println!("  sha256:     (not verified)"),
    }
    println!("  binaries:");
    for binary in &pkg.binaries {
        let path = config.bin_dir.join(binary);
        let marker = if path.exists() { "" } else { "  [missing]" };
        println!("    {}{marker}", path.display());
    }
    Ok(())
}
