//! hobbes - prebuilt binaries from GitHub releases
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! The CLI surface over [`hobbes_core`]: argument parsing lives here, the
//! install and update machinery lives in the core crate, and the `cmd`
//! modules glue the two together.

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "hobbes")]
#[command(author, version, about = "Install prebuilt binaries from GitHub releases")]
pub struct Cli {
    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install packages from GitHub repositories
    Install {
        /// Repositories: owner/repo or a GitHub URL
        #[arg(required = true)]
        repos: Vec<String>,
        /// Install a specific release tag instead of the latest
        #[arg(long)]
        tag: Option<String>,
        /// Install only this binary when the release ships several
        #[arg(long = "bin")]
        binary: Option<String>,
        /// Reinstall even if the same version is already installed
        #[arg(short, long)]
        force: bool,
    },
    /// Remove installed packages
    Uninstall {
        /// Package name(s)
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Update specific packages to their latest release
    Update {
        /// Package name(s)
        #[arg(required = true)]
        packages: Vec<String>,
        /// Reinstall the latest release even if not newer or pinned
        #[arg(short, long)]
        force: bool,
    },
    /// Update every installed package (pinned packages are skipped)
    UpgradeAll {
        /// Reinstall latest releases even when already current
        #[arg(short, long)]
        force: bool,
    },
    /// List installed packages
    List,
    /// Show details for an installed package
    Info {
        /// Package name or owner/repo spec
        package: String,
    },
    /// Show installed packages with a newer release available
    Outdated,
    /// Search GitHub for repositories
    Search {
        /// Search query
        query: String,
        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Pin a package so update and upgrade skip it
    Pin {
        /// Package name
        package: String,
    },
    /// Remove a package's pin
    Unpin {
        /// Package name
        package: String,
    },
}
