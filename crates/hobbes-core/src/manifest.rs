//! The installed-package manifest.
//!
//! One TOML document under the hobbes home records every installed package.
//! It is read whole, mutated in memory, and written back through a temp
//! file and an atomic rename; a crash mid-save leaves the previous document
//! intact. A missing manifest means an empty registry, a malformed one is
//! an error the caller must surface rather than silently overwrite.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const MANIFEST_FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("manifest at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Record of one installed package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Package {
    /// `owner/name` of the source repository.
    pub repo: String,
    /// Version string, tag prefix stripped.
    pub version: String,
    /// The release tag the version came from, verbatim.
    pub tag: String,
    /// Asset filename the binaries were unpacked from.
    pub asset: String,
    /// Binary names placed in `bin/`, sorted.
    pub binaries: Vec<String>,
    /// Pinned packages are held back by update and upgrade-all.
    #[serde(default)]
    pub pinned: bool,
    /// RFC 3339 timestamp of the install.
    pub installed_at: String,
    /// SHA-256 of the downloaded asset, when it was verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestDoc {
    version: u32,
    #[serde(default)]
    packages: BTreeMap<String, Package>,
}

impl Default for ManifestDoc {
    fn default() -> Self {
        Self {
            version: MANIFEST_FORMAT_VERSION,
            packages: BTreeMap::new(),
        }
    }
}

/// In-memory view of the manifest file.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    doc: ManifestDoc,
}

impl Manifest {
    /// Load the manifest at `path`. A missing file yields an empty registry.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ManifestError> {
        let path = path.into();
        let doc = match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|source| ManifestError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ManifestDoc::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, doc })
    }

    /// Write the document back atomically.
    ///
    /// The temp file is created in the manifest's own directory so the
    /// final rename never crosses a filesystem boundary.
    pub fn save(&self) -> Result<(), ManifestError> {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent)?;

        let text = toml::to_string_pretty(&self.doc)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(text.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), "manifest saved");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.doc.packages.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, package: Package) {
        self.doc.packages.insert(name.into(), package);
    }

    pub fn remove(&mut self, name: &str) -> Option<Package> {
        self.doc.packages.remove(name)
    }

    /// All packages, keyed by install name, in name order.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &Package)> {
        self.doc.packages.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.doc.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.doc.packages.len()
    }

    /// Flip the pinned flag. Returns false when the package is unknown.
    pub fn set_pinned(&mut self, name: &str, pinned: bool) -> bool {
        match self.doc.packages.get_mut(name) {
            Some(p) => {
                p.pinned = pinned;
                true
            }
            None => false,
        }
    }
}
