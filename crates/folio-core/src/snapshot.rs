//! GitHub statistics snapshot domain model

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::portfolio::StatId;

/// Normalized statistics for one GitHub account. Read-only to the layout core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(default)]
    pub repository_count: u64,
    #[serde(default)]
    pub total_stars: u64,
    #[serde(default)]
    pub total_forks: u64,
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub recent_commits: u64,
    /// Language name -> share of bytes in percent, one decimal
    #[serde(default)]
    pub languages: BTreeMap<String, f64>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub synced_at: Option<OffsetDateTime>,
}

impl StatsSnapshot {
    pub fn stat_value(&self, id: StatId) -> u64 {
        match id {
            StatId::Repos => self.repository_count,
            StatId::Stars => self.total_stars,
            StatId::Commits => self.total_commits,
        }
    }

    pub fn repository(&self, github_id: u64) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.github_id == github_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub github_id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub html_url: String,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
    #[serde(default)]
    pub watchers: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub pushed_at: Option<OffsetDateTime>,
}

impl Repository {
    pub fn new(github_id: u64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            github_id,
            full_name: name.clone(),
            name,
            description: String::new(),
            html_url: String::new(),
            stars: 0,
            forks: 0,
            watchers: 0,
            language: None,
            topics: Vec::new(),
            is_private: false,
            is_fork: false,
            created_at: None,
            updated_at: None,
            pushed_at: None,
        }
    }

    /// Case-insensitive match on name or description
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

// GitHub writes `null` for an empty description
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
