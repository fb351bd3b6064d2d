//! Platform detection and the alias tables used for asset matching.
//!
//! Release asset names spell the same platform a dozen ways
//! (`x86_64` / `amd64` / `x64`, `darwin` / `macos` / `osx`). The tables here
//! are the single source of truth for those synonyms; the matcher consumes
//! them rather than hard-coding comparisons.

use serde::{Deserialize, Serialize};

/// Operating system of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    /// Operating system of the running process.
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::Darwin
        }
        #[cfg(target_os = "windows")]
        {
            Self::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Self::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CPU architecture of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
    #[serde(rename = "386")]
    X86,
}

impl Arch {
    /// Architecture of the running process.
    pub fn current() -> Self {
        #[cfg(target_arch = "aarch64")]
        {
            Self::Arm64
        }
        #[cfg(target_arch = "x86")]
        {
            Self::X86
        }
        #[cfg(not(any(target_arch = "aarch64", target_arch = "x86")))]
        {
            Self::Amd64
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::X86 => "386",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// C library flavor, used as a matching hint on Linux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Libc {
    Gnu,
    Musl,
}

/// The local platform an asset is matched against.
///
/// Computed once per invocation; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
    pub libc: Option<Libc>,
}

impl Platform {
    /// Detect the platform of the running process.
    pub fn current() -> Self {
        #[cfg(target_env = "musl")]
        let libc = Some(Libc::Musl);
        #[cfg(all(target_os = "linux", not(target_env = "musl")))]
        let libc = Some(Libc::Gnu);
        #[cfg(not(target_os = "linux"))]
        let libc = None;

        Self {
            os: Os::current(),
            arch: Arch::current(),
            libc,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Name variants under which each OS appears in asset filenames.
pub const OS_ALIASES: &[(Os, &[&str])] = &[
    (Os::Linux, &["linux"]),
    (Os::Darwin, &["darwin", "macos", "mac", "osx", "apple"]),
    (Os::Windows, &["windows", "win64", "win32", "win"]),
];

/// Name variants under which each architecture appears in asset filenames.
///
/// Order within a slice matters only for readability; matching is
/// boundary-aware so `x86` never fires inside `x86_64`.
pub const ARCH_ALIASES: &[(Arch, &[&str])] = &[
    (Arch::Amd64, &["amd64", "x86_64", "x64", "64bit"]),
    (Arch::Arm64, &["arm64", "aarch64"]),
    (Arch::X86, &["i386", "i686", "386", "32bit", "x86"]),
];

/// True if `token` occurs in `name` as a whole token.
///
/// A match is rejected when the preceding character is alphanumeric or the
/// following character is alphanumeric or an underscore, which is what keeps
/// `x86` from matching `x86_64-linux` while `x86_64` still does.
pub fn contains_token(name: &str, token: &str) -> bool {
    let name = name.as_bytes();
    let token = token.as_bytes();
    if token.is_empty() || token.len() > name.len() {
        return false;
    }

    let boundary_before = |i: usize| i == 0 || !name[i - 1].is_ascii_alphanumeric();
    let boundary_after = |i: usize| {
        i >= name.len() || (!name[i].is_ascii_alphanumeric() && name[i] != b'_')
    };

    let mut start = 0;
    while start + token.len() <= name.len() {
        if name[start..start + token.len()].eq_ignore_ascii_case(token)
            && boundary_before(start)
            && boundary_after(start + token.len())
        {
            return true;
        }
        start += 1;
    }
    false
}

/// The OS named by any alias token in `name`, if one is present.
pub fn os_in_name(name: &str) -> Option<Os> {
    for (os, aliases) in OS_ALIASES {
        if aliases.iter().any(|a| contains_token(name, a)) {
            return Some(*os);
        }
    }
    None
}

/// The architecture named by any alias token in `name`, if one is present.
pub fn arch_in_name(name: &str) -> Option<Arch> {
    for (arch, aliases) in ARCH_ALIASES {
        if aliases.iter().any(|a| contains_token(name, a)) {
            return Some(*arch);
        }
    }
    None
}
