//! Command implementations.

pub mod info;
pub mod install;
pub mod list;
pub mod outdated;
pub mod pin;
pub mod search;
pub mod uninstall;
pub mod update;
pub mod upgrade;

use anyhow::{Context, Result};
use hobbes_core::github::GitHubClient;
use hobbes_core::{Config, Manifest};

/// Resolve the hobbes home and load its manifest.
pub(crate) fn open_registry() -> Result<(Config, Manifest)> {
    let config = Config::resolve();
    let manifest = Manifest::load(&config.manifest_path)
        .context("Failed to load the package manifest")?;
    Ok((config, manifest))
}

pub(crate) fn client() -> Result<GitHubClient> {
    GitHubClient::new().context("Failed to build the GitHub client")
}
