//! Directory layout for the hobbes home.
//!
//! All paths derive from a single base directory: `$HOBBES_HOME` if set,
//! otherwise `~/.hobbes`. The layout is fixed; nothing in the core computes
//! paths on its own, everything receives a [`Config`].

use std::path::{Path, PathBuf};

/// Resolved directory layout for one hobbes home.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory (`~/.hobbes` by default).
    pub base_dir: PathBuf,
    /// Where installed executables are placed.
    pub bin_dir: PathBuf,
    /// Per-install staging area; kept on the same volume as `bin_dir` so
    /// renames stay atomic.
    pub tmp_dir: PathBuf,
    /// The package manifest document.
    pub manifest_path: PathBuf,
}

impl Config {
    /// Layout rooted at an explicit base directory.
    pub fn rooted(base: impl Into<PathBuf>) -> Self {
        let base_dir = base.into();
        Self {
            bin_dir: base_dir.join("bin"),
            tmp_dir: base_dir.join("tmp"),
            manifest_path: base_dir.join("manifest.toml"),
            base_dir,
        }
    }

    /// Resolve the layout from the environment, or None if the user's home
    /// cannot be determined.
    pub fn try_resolve() -> Option<Self> {
        if let Ok(val) = std::env::var("HOBBES_HOME") {
            return Some(Self::rooted(val));
        }
        dirs::home_dir().map(|h| Self::rooted(h.join(".hobbes")))
    }

    /// Resolve the layout from the environment.
    ///
    /// # Panics
    ///
    /// Panics if neither `HOBBES_HOME` is set nor the user's home directory
    /// can be resolved.
    pub fn resolve() -> Self {
        Self::try_resolve()
            .expect("Could not determine home directory. Set HOBBES_HOME to override.")
    }

    /// Create every directory of the layout.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(&self.bin_dir)?;
        std::fs::create_dir_all(&self.tmp_dir)?;
        Ok(())
    }
}

/// Filename with a trailing extension stripped, lowercased, for comparing
/// binary names against repository names (`fzf.exe` -> `fzf`).
pub fn stem_lower(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map_or_else(|| name.to_lowercase(), |s| s.to_string_lossy().to_lowercase())
}
