//! GitHub API client for fetching releases.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::release::Release;
use crate::repo::RepoRef;

const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("repository {0} not found")]
    RepoNotFound(String),

    #[error("release {tag} not found for {repo}")]
    ReleaseNotFound { repo: String, tag: String },

    #[error("no releases found for {0}")]
    NoReleases(String),

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("GitHub API error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A repository found via search.
#[derive(Debug, Clone)]
pub struct RepoSummary {
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    stargazers_count: u64,
    html_url: String,
}

/// Client for the GitHub REST API.
///
/// Releases are always re-fetched; nothing is cached across resolution
/// calls, so a release published a second ago is visible to the next
/// command.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    /// Client against the public GitHub API.
    pub fn new() -> Result<Self, GitHubError> {
        Self::with_base_url(GITHUB_API_BASE)
    }

    /// Client against an alternate base URL. Used by tests to point at a
    /// local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, GitHubError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// The underlying HTTP client, reused for asset downloads.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Published releases for a repository, newest first, drafts filtered.
    pub async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/releases?per_page=30",
            self.base_url, repo.owner, repo.name
        );
        let resp = self.http.get(&url).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(GitHubError::RepoNotFound(repo.to_string())),
            StatusCode::FORBIDDEN => return Err(GitHubError::RateLimited),
            _ => {}
        }

        let releases: Vec<Release> = resp.error_for_status()?.json().await?;
        Ok(releases.into_iter().filter(|r| !r.draft).collect())
    }

    /// The latest non-prerelease release.
    ///
    /// Falls back to the full release list when `releases/latest` 404s,
    /// which happens for repositories that only publish prereleases.
    pub async fn latest_release(&self, repo: &RepoRef) -> Result<Release, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url, repo.owner, repo.name
        );
        let resp = self.http.get(&url).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            let releases = self.list_releases(repo).await?;
            if let Some(stable) = releases.iter().find(|r| !r.prerelease) {
                return Ok(stable.clone());
            }
            return releases
                .into_iter()
                .next()
                .ok_or_else(|| GitHubError::NoReleases(repo.to_string()));
        }
        if resp.status() == StatusCode::FORBIDDEN {
            return Err(GitHubError::RateLimited);
        }

        Ok(resp.error_for_status()?.json().await?)
    }

    /// A specific release by tag name.
    pub async fn release_by_tag(&self, repo: &RepoRef, tag: &str) -> Result<Release, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.base_url, repo.owner, repo.name, tag
        );
        let resp = self.http.get(&url).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(GitHubError::ReleaseNotFound {
                repo: repo.to_string(),
                tag: tag.to_string(),
            }),
            StatusCode::FORBIDDEN => Err(GitHubError::RateLimited),
            _ => Ok(resp.error_for_status()?.json().await?),
        }
    }

    /// Search repositories by stars, descending.
    pub async fn search_repos(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RepoSummary>, GitHubError> {
        let url = format!("{}/search/repositories", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", &limit.to_string()),
            ])
            .send()
            .await?;

        if resp.status() == StatusCode::FORBIDDEN {
            return Err(GitHubError::RateLimited);
        }

        let body: SearchResponse = resp.error_for_status()?.json().await?;
        Ok(body
            .items
            .into_iter()
            .map(|i| RepoSummary {
                full_name: i.full_name,
                description: i.description,
                stars: i.stargazers_count,
                url: i.html_url,
            })
            .collect())
    }
}
