//! hobbes-core - install and update pipeline for GitHub release binaries
//!
//! # Overview
//!
//! hobbes installs prebuilt executables published as GitHub release assets,
//! places them under a user-local directory and records their provenance in
//! a manifest so later operations (list, update, uninstall, pin) act
//! deterministically on previously installed software.
//!
//! # Architecture
//!
//! - **Typestate pipeline**: an install flows through [`pipeline::InstallRequest`]
//!   → [`pipeline::ResolvedInstall`] → [`pipeline::PreparedInstall`] →
//!   [`pipeline::InstallReceipt`], enforcing at compile time that nothing is
//!   placed on disk before it has been downloaded, verified and extracted.
//! - **Transactional commits**: binaries are placed as a group and the
//!   manifest is rewritten atomically; a failure at any stage before the
//!   manifest write rolls back every file placed by that install.
//! - **Data-driven matching**: release assets are scored against the local
//!   platform with explicit alias tables and a total order over score
//!   tuples, so selection is reproducible.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.hobbes/
//! ├── bin/            # Installed executables
//! ├── tmp/            # Per-install staging (same volume as bin/)
//! └── manifest.toml   # Durable record of installed packages
//! ```

pub mod checksum;
pub mod download;
pub mod error;
pub mod extract;
pub mod github;
pub mod manifest;
pub mod matcher;
pub mod paths;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod repo;
pub mod reporter;
pub mod update;
pub mod version;

pub use error::InstallError;
pub use manifest::{Manifest, Package};
pub use paths::Config;
pub use pipeline::{InstallOutcome, InstallReceipt, InstallRequest};
pub use platform::{Arch, Libc, Os, Platform};
pub use release::{Asset, Release};
pub use repo::RepoRef;
pub use reporter::{NullReporter, Reporter};
pub use update::UpdateOutcome;

/// User agent sent on every GitHub API and download request.
pub const USER_AGENT: &str = concat!("hobbes/", env!("CARGO_PKG_VERSION"));
