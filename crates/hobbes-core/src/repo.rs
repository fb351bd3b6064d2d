//! Repository references.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A reference spec that could not be parsed.
#[derive(Error, Debug)]
#[error("invalid repository spec '{0}': use 'owner/repo' or a GitHub URL")]
pub struct RepoParseError(pub String);

/// Identifies a source of releases as an `(owner, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:https?://)?github\.com/([^/]+)/([^/]+?)(?:\.git)?/?$")
            .expect("valid regex")
    })
}

impl RepoRef {
    /// Parse a repository spec.
    ///
    /// Accepts `owner/repo`, `github.com/owner/repo` and full `https://`
    /// GitHub URLs, with an optional `.git` suffix.
    pub fn parse(spec: &str) -> Result<Self, RepoParseError> {
        if let Some(caps) = url_pattern().captures(spec) {
            return Ok(Self {
                owner: caps[1].to_string(),
                name: caps[2].to_string(),
            });
        }

        let mut parts = spec.split('/');
        if let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) {
            if !owner.is_empty() && !name.is_empty() && !spec.contains(':') {
                return Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                });
            }
        }

        Err(RepoParseError(spec.to_string()))
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_form() {
        let r = RepoRef::parse("junegunn/fzf").unwrap();
        assert_eq!(r.owner, "junegunn");
        assert_eq!(r.name, "fzf");
    }

    #[test]
    fn test_parse_full_url() {
        let r = RepoRef::parse("https://github.com/BurntSushi/ripgrep").unwrap();
        assert_eq!(r.owner, "BurntSushi");
        assert_eq!(r.name, "ripgrep");
    }

    #[test]
    fn test_parse_url_without_scheme() {
        let r = RepoRef::parse("github.com/sharkdp/bat/").unwrap();
        assert_eq!(r.to_string(), "sharkdp/bat");
    }

    #[test]
    fn test_parse_git_suffix() {
        let r = RepoRef::parse("https://github.com/sharkdp/fd.git").unwrap();
        assert_eq!(r.name, "fd");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(RepoRef::parse("fzf").is_err());
        assert!(RepoRef::parse("a/b/c").is_err());
        assert!(RepoRef::parse("").is_err());
        assert!(RepoRef::parse("https://gitlab.com/a/b").is_err());
    }
}
