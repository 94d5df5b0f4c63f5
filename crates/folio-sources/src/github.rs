//! GitHub REST source
//!
//! One pull issues, in order: the authenticated user, their repositories,
//! per-repository language breakdowns, per-repository authored commit
//! counts (first `commit_scan_limit` repositories only) and the user's
//! public events. Only the first two are required; later sub-requests that
//! fail are logged and skipped unless GitHub rejects the token.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use folio_core::{Repository, StatsSnapshot};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use time::OffsetDateTime;

use crate::handler::StatsSource;

lazy_static! {
    static ref LAST_PAGE: Regex =
        Regex::new(r#"<[^>]*[?&]page=(\d+)[^>]*>;\s*rel="last""#).unwrap();
}

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("GitHub authentication failed. Please re-authenticate.")]
    Unauthorized,

    #[error("GitHub request {path} failed with status {status}")]
    Status { path: String, status: u16 },
}

impl GitHubError {
    fn is_unauthorized(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<GitHubError>(), Some(GitHubError::Unauthorized))
    }

    fn is_empty_repository(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<GitHubError>(),
            Some(GitHubError::Status { status: 409, .. })
        )
    }
}

#[derive(Debug, Clone)]
pub struct GitHubOptions {
    pub api_url: String,
    pub token: String,
    pub per_page: u32,
    pub commit_scan_limit: usize,
    pub timeout: Duration,
}

pub struct GitHubSource {
    client: reqwest::Client,
    api_url: String,
    per_page: u32,
    commit_scan_limit: usize,
}

impl GitHubSource {
    pub fn new(options: GitHubOptions) -> anyhow::Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", options.token))
            .context("GitHub token contains invalid characters")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let client = reqwest::Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: options.api_url.trim_end_matches('/').to_string(),
            per_page: options.per_page,
            commit_scan_limit: options.commit_scan_limit,
        })
    }

    async fn get(&self, path: &str) -> anyhow::Result<Response> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GitHub request {} failed", path))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(GitHubError::Unauthorized.into()),
            status if !status.is_success() => Err(GitHubError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            }
            .into()),
            _ => Ok(response),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        self.get(path)
            .await?
            .json()
            .await
            .with_context(|| format!("Unexpected response from {}", path))
    }

    async fn commit_count(&self, full_name: &str, login: &str) -> anyhow::Result<u64> {
        let path = format!("/repos/{}/commits?author={}&per_page=1", full_name, login);
        let response = self.get(&path).await?;
        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let commits: Vec<serde_json::Value> = response.json().await?;

        Ok(match link.as_deref().and_then(last_page) {
            Some(pages) => pages,
            None if !commits.is_empty() => 1,
            None => 0,
        })
    }
}

#[async_trait]
impl StatsSource for GitHubSource {
    async fn pull(&self) -> anyhow::Result<StatsSnapshot> {
        let user: GhUser = self.get_json("/user").await?;
        let all: Vec<GhRepo> = self
            .get_json(&format!(
                "/user/repos?per_page={}&sort=updated&type=all",
                self.per_page
            ))
            .await?;
        let repos: Vec<GhRepo> = all.into_iter().filter(|r| !r.fork).collect();
        tracing::info!("Pulling stats for {} repositories", repos.len());

        let mut language_bytes: BTreeMap<String, u64> = BTreeMap::new();
        for repo in &repos {
            let path = format!("/repos/{}/languages", repo.full_name);
            match self.get_json::<BTreeMap<String, u64>>(&path).await {
                Ok(languages) => {
                    for (language, bytes) in languages {
                        *language_bytes.entry(language).or_default() += bytes;
                    }
                }
                Err(e) if GitHubError::is_unauthorized(&e) => return Err(e),
                Err(e) => tracing::warn!("Skipping languages for {}: {:#}", repo.full_name, e),
            }
        }

        let mut total_commits = 0;
        for repo in repos.iter().take(self.commit_scan_limit) {
            match self.commit_count(&repo.full_name, &user.login).await {
                Ok(count) => total_commits += count,
                Err(e) if GitHubError::is_unauthorized(&e) => return Err(e),
                Err(e) if GitHubError::is_empty_repository(&e) => {}
                Err(e) => tracing::warn!("Skipping commits for {}: {:#}", repo.full_name, e),
            }
        }

        let events_path = format!("/users/{}/events/public?per_page=100", user.login);
        let mut recent_commits = match self.get_json::<Vec<GhEvent>>(&events_path).await {
            Ok(events) => push_commit_count(&events),
            Err(e) if GitHubError::is_unauthorized(&e) => return Err(e),
            Err(e) => {
                tracing::warn!("Skipping recent activity: {:#}", e);
                0
            }
        };
        if recent_commits == 0 {
            recent_commits = total_commits;
        }

        Ok(StatsSnapshot {
            repository_count: repos.len() as u64,
            total_stars: repos.iter().map(|r| r.stargazers_count).sum(),
            total_forks: repos.iter().map(|r| r.forks_count).sum(),
            total_commits,
            recent_commits,
            languages: language_percentages(&language_bytes),
            repositories: repos.into_iter().map(GhRepo::into_repository).collect(),
            synced_at: None,
        })
    }

    fn name(&self) -> &str {
        "github"
    }
}

/// Page number of the `rel="last"` entry of a Link header
pub fn last_page(link: &str) -> Option<u64> {
    LAST_PAGE
        .captures(link)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Byte counts to percentages of the total, one decimal
pub fn language_percentages(bytes: &BTreeMap<String, u64>) -> BTreeMap<String, f64> {
    let total: u64 = bytes.values().sum();
    bytes
        .iter()
        .map(|(language, count)| {
            let share = if total > 0 {
                (*count as f64 / total as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            };
            (language.clone(), share)
        })
        .collect()
}

fn push_commit_count(events: &[GhEvent]) -> u64 {
    events
        .iter()
        .filter(|e| e.kind == "PushEvent")
        .map(|e| e.payload.commits.len() as u64)
        .sum()
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhRepo {
    id: u64,
    name: String,
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    fork: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pushed_at: Option<OffsetDateTime>,
}

impl GhRepo {
    fn into_repository(self) -> Repository {
        Repository {
            github_id: self.id,
            name: self.name,
            full_name: self.full_name,
            description: self.description.unwrap_or_default(),
            html_url: self.html_url,
            stars: self.stargazers_count,
            forks: self.forks_count,
            watchers: self.watchers_count,
            language: self.language,
            topics: self.topics,
            is_private: self.private,
            is_fork: self.fork,
            created_at: self.created_at,
            updated_at: self.updated_at,
            pushed_at: self.pushed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: GhEventPayload,
}

#[derive(Debug, Default, Deserialize)]
struct GhEventPayload {
    #[serde(default)]
    commits: Vec<serde_json::Value>,
}
