//! Studio - one owner's editing context
//!
//! Holds the edit session, the stats state and the store they persist to.
//! Calls that touch a collaborator return [`Outcome`], with the failure
//! message carried as data instead of an error.

use anyhow::{Context, Result};
use folio_core::{
    EditSession, ExportFormat, ExportPayload, ExportRecord, ExportSummary, Outcome,
    PortfolioConfig, PortfolioView, StatsSnapshot,
};
use folio_sources::StatsSource;
use folio_storage::Storage;

use crate::stats::StatsHandle;

pub struct Studio {
    storage: Storage,
    owner: String,
    session: EditSession,
    stats: StatsHandle,
}

impl Studio {
    /// Load the owner's configuration and cached stats.
    ///
    /// `defaults` is used when the owner never saved a configuration.
    pub async fn open(storage: Storage, owner: &str, defaults: PortfolioConfig) -> Result<Self> {
        let config = storage
            .load_config(owner)
            .await
            .with_context(|| format!("Failed to load configuration for {}", owner))?
            .unwrap_or(defaults);

        let studio = Self {
            storage,
            owner: owner.to_string(),
            session: EditSession::new(config),
            stats: StatsHandle::new(),
        };
        studio.fetch_stats().await;
        Ok(studio)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn stats(&self) -> StatsHandle {
        self.stats.clone()
    }

    /// Live preview of the current edits
    pub fn view(&self) -> PortfolioView {
        self.session.view(self.stats.snapshot().as_ref())
    }

    /// Persist the session. A failure leaves the edits in memory and dirty.
    pub async fn save(&mut self) -> Outcome<PortfolioConfig> {
        let result = self
            .storage
            .save_config(&self.owner, self.session.to_patch())
            .await;
        match &result {
            Ok(_) => self.session.mark_saved(),
            Err(e) => tracing::warn!("Save failed, keeping unsaved edits: {}", e),
        }
        Outcome::from_result(result)
    }

    /// Read the cached snapshot
    pub async fn fetch_stats(&self) -> Outcome<Option<StatsSnapshot>> {
        match self.storage.load_stats(&self.owner).await {
            Ok(snapshot) => {
                self.stats.set_snapshot(snapshot.clone());
                Outcome::ok(snapshot)
            }
            Err(e) => {
                let message = e.to_string();
                self.stats.set_error(message.clone());
                Outcome::err(message)
            }
        }
    }

    /// Pull a fresh snapshot from `source` and cache it.
    ///
    /// The stats handle reports *syncing* until the pull finishes. On failure
    /// the previous snapshot stays in place and the message is recorded.
    pub async fn sync_stats(&self, source: &dyn StatsSource) -> Outcome<StatsSnapshot> {
        let Some(guard) = self.stats.begin_sync() else {
            return Outcome::err("A stats sync is already running");
        };
        tracing::info!("Syncing stats from {}", source.name());

        let result = self.pull_and_cache(source).await;
        match result {
            Ok(snapshot) => {
                guard.finish(Ok(snapshot.clone()));
                Outcome::ok(snapshot)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::warn!("Stats sync failed: {}", message);
                guard.finish(Err(message.clone()));
                Outcome::err(message)
            }
        }
    }

    async fn pull_and_cache(&self, source: &dyn StatsSource) -> Result<StatsSnapshot> {
        let snapshot = source.pull().await?;
        let stored = self.storage.save_stats(&self.owner, &snapshot).await?;
        Ok(stored)
    }

    /// Store the current configuration as a tagged export
    pub async fn save_export(&self, tag: &str, format: ExportFormat) -> Outcome<ExportRecord> {
        Outcome::from_result(self.try_save_export(tag, format).await)
    }

    async fn try_save_export(&self, tag: &str, format: ExportFormat) -> Result<ExportRecord> {
        let render_hash = self.view().render_hash()?;
        let payload = ExportPayload::new(format, self.session.config().clone());
        let record = self
            .storage
            .save_export(&self.owner, tag, payload, &render_hash)
            .await?;
        Ok(record)
    }

    pub async fn list_exports(&self) -> Outcome<Vec<ExportSummary>> {
        Outcome::from_result(self.storage.list_exports(&self.owner).await)
    }

    pub async fn get_export(&self, id: &str) -> Outcome<ExportRecord> {
        Outcome::from_result(self.storage.get_export(&self.owner, id).await)
    }

    pub async fn delete_export(&self, id: &str) -> Outcome<()> {
        Outcome::from_result(self.storage.delete_export(&self.owner, id).await)
    }

    /// Re-project a saved export against the current snapshot
    pub fn export_view(&self, record: &ExportRecord) -> PortfolioView {
        record.view(self.stats.snapshot().as_ref())
    }
}
