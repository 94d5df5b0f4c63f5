//! Database operations

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use folio_core::{
    ConfigPatch, ExportPayload, ExportRecord, ExportSummary, PortfolioConfig, StatsSnapshot,
    validate_config, validate_tag,
};
use sqlx::Row;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use time::OffsetDateTime;

use crate::models::{export_from_row, from_nanos, summary_from_row, to_nanos};
use crate::{Result, StorageError};

/// Main storage interface
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (or create) the database. `None` uses the platform data directory.
    pub async fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let storage = Self { pool };
        storage.migrate().await?;
        tracing::debug!("Opened database at {}", db_path.display());
        Ok(storage)
    }

    pub fn default_path() -> Result<PathBuf> {
        directories::ProjectDirs::from("com", "folio", "folio")
            .map(|dirs| dirs.data_dir().join("folio.db"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory").into())
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS portfolio_config (
                owner TEXT PRIMARY KEY,
                config TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stats_cache (
                owner TEXT PRIMARY KEY,
                snapshot TEXT NOT NULL,
                synced_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS exports (
                id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                tag TEXT NOT NULL,
                format TEXT NOT NULL,
                payload TEXT NOT NULL,
                render_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exports_owner_created ON exports(owner, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ==================== PORTFOLIO CONFIG ====================

    /// Stored configuration for `owner`, if one was ever saved
    pub async fn load_config(&self, owner: &str) -> Result<Option<PortfolioConfig>> {
        let row = sqlx::query("SELECT config FROM portfolio_config WHERE owner = ?")
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let json: String = row.get("config");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    /// Merge `patch` onto the stored configuration and write it back.
    ///
    /// Validation runs on the merged result; nothing is written when it fails.
    pub async fn save_config(&self, owner: &str, patch: ConfigPatch) -> Result<PortfolioConfig> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT config FROM portfolio_config WHERE owner = ?")
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        let base = match row {
            Some(row) => {
                let json: String = row.get("config");
                serde_json::from_str(&json)?
            }
            None => PortfolioConfig::default(),
        };

        let merged = patch.apply(&base);
        validate_config(&merged)?;

        sqlx::query(
            r#"
            INSERT INTO portfolio_config (owner, config, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(owner) DO UPDATE
            SET config = excluded.config, updated_at = excluded.updated_at
            "#,
        )
        .bind(owner)
        .bind(serde_json::to_string(&merged)?)
        .bind(to_nanos(OffsetDateTime::now_utc()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("Saved portfolio configuration for {}", owner);
        Ok(merged)
    }

    // ==================== STATS CACHE ====================

    pub async fn load_stats(&self, owner: &str) -> Result<Option<StatsSnapshot>> {
        let row = sqlx::query("SELECT snapshot, synced_at FROM stats_cache WHERE owner = ?")
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let json: String = row.get("snapshot");
                let mut snapshot: StatsSnapshot = serde_json::from_str(&json)?;
                snapshot.synced_at = Some(from_nanos(row.get("synced_at"))?);
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Replace the cached snapshot, stamping the sync time
    pub async fn save_stats(&self, owner: &str, snapshot: &StatsSnapshot) -> Result<StatsSnapshot> {
        let synced_at = OffsetDateTime::now_utc();
        let mut stored = snapshot.clone();
        stored.synced_at = Some(synced_at);

        sqlx::query(
            r#"
            INSERT INTO stats_cache (owner, snapshot, synced_at) VALUES (?, ?, ?)
            ON CONFLICT(owner) DO UPDATE
            SET snapshot = excluded.snapshot, synced_at = excluded.synced_at
            "#,
        )
        .bind(owner)
        .bind(serde_json::to_string(&stored)?)
        .bind(to_nanos(synced_at))
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Cached stats for {}: {} repositories",
            owner,
            stored.repository_count
        );
        Ok(stored)
    }

    // ==================== EXPORTS ====================

    pub async fn save_export(
        &self,
        owner: &str,
        tag: &str,
        payload: ExportPayload,
        render_hash: &str,
    ) -> Result<ExportRecord> {
        let tag = validate_tag(tag)?;
        validate_config(&payload.config)?;

        let record = ExportRecord {
            id: uuid::Uuid::new_v4().to_string(),
            tag,
            payload,
            render_hash: render_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };

        sqlx::query(
            r#"
            INSERT INTO exports (id, owner, tag, format, payload, render_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(owner)
        .bind(&record.tag)
        .bind(record.payload.format.as_str())
        .bind(serde_json::to_string(&record.payload)?)
        .bind(&record.render_hash)
        .bind(to_nanos(record.created_at))
        .execute(&self.pool)
        .await?;

        tracing::info!("Saved export {} ({})", record.id, record.tag);
        Ok(record)
    }

    /// Export summaries for `owner`, newest first
    pub async fn list_exports(&self, owner: &str) -> Result<Vec<ExportSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, tag, format, created_at FROM exports
            WHERE owner = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(summary_from_row).collect()
    }

    pub async fn get_export(&self, owner: &str, id: &str) -> Result<ExportRecord> {
        let row = sqlx::query(
            r#"
            SELECT id, tag, payload, render_hash, created_at FROM exports
            WHERE owner = ? AND id = ?
            "#,
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => export_from_row(&row),
            None => Err(StorageError::ExportNotFound(id.to_string())),
        }
    }

    pub async fn delete_export(&self, owner: &str, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM exports WHERE owner = ? AND id = ?")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::ExportNotFound(id.to_string()));
        }
        tracing::info!("Deleted export {}", id);
        Ok(())
    }
}
