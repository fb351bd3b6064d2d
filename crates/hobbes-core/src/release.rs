//! GitHub release data models.

use serde::Deserialize;

/// One downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Publisher digest in `algorithm:hex` form, when the API provides one.
    #[serde(default)]
    pub digest: Option<String>,
}

/// One published version of a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Version string: the tag with a leading `v` stripped.
    pub fn version(&self) -> &str {
        self.tag_name
            .strip_prefix('v')
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(&self.tag_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str) -> Release {
        Release {
            tag_name: tag.to_string(),
            name: None,
            prerelease: false,
            draft: false,
            published_at: None,
            assets: vec![],
        }
    }

    #[test]
    fn test_version_strips_v_prefix() {
        assert_eq!(release("v1.2.3").version(), "1.2.3");
        assert_eq!(release("1.2.3").version(), "1.2.3");
    }

    #[test]
    fn test_version_keeps_non_numeric_v_tags() {
        // "vault-1.0" style tags keep their prefix
        assert_eq!(release("vault-1.0").version(), "vault-1.0");
    }

    #[test]
    fn test_deserialize_asset() {
        let json = r#"{
            "name": "tool-linux-amd64.tar.gz",
            "browser_download_url": "https://example.com/dl/tool-linux-amd64.tar.gz",
            "size": 1024,
            "content_type": "application/gzip",
            "digest": "sha256:abc"
        }"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.name, "tool-linux-amd64.tar.gz");
        assert_eq!(asset.size, Some(1024));
        assert_eq!(asset.digest.as_deref(), Some("sha256:abc"));
    }

    #[test]
    fn test_deserialize_release_defaults() {
        let json = r#"{"tag_name": "v2.0.0"}"#;
        let rel: Release = serde_json::from_str(json).unwrap();
        assert!(!rel.prerelease);
        assert!(rel.assets.is_empty());
        assert_eq!(rel.version(), "2.0.0");
    }
}
