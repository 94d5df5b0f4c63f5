use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use folio_core::StatsSnapshot;

use crate::handler::StatsSource;

/// Reads a JSON snapshot from disk, for offline imports
pub struct FileSource {
    path: PathBuf,
    label: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("file:{}", path.display());
        Self { path, label }
    }
}

#[async_trait]
impl StatsSource for FileSource {
    async fn pull(&self) -> anyhow::Result<StatsSnapshot> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read stats file {}", self.path.display()))?;

        let mut snapshot: StatsSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("Invalid stats file {}", self.path.display()))?;

        if snapshot.repository_count == 0 {
            snapshot.repository_count = snapshot.repositories.len() as u64;
        }
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_pull_reads_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(
            &path,
            r#"{
                "totalStars": 9,
                "repositories": [
                    {"githubId": 1, "name": "folio"},
                    {"githubId": 2, "name": "notes", "stars": 9}
                ]
            }"#,
        )
        .unwrap();

        let source = FileSource::new(&path);
        let snapshot = source.pull().await.unwrap();
        assert_eq!(snapshot.repository_count, 2);
        assert_eq!(snapshot.total_stars, 9);
        assert_eq!(snapshot.repository(2).unwrap().stars, 9);
        assert!(source.name().starts_with("file:"));
    }

    #[tokio::test]
    async fn test_pull_reports_missing_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        let missing = FileSource::new(dir.path().join("nope.json"));
        let err = missing.pull().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read stats file"));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = FileSource::new(&path).pull().await.unwrap_err();
        assert!(err.to_string().contains("Invalid stats file"));
    }
}
