use async_trait::async_trait;
use folio_core::{
    ExportFormat, ItemRef, PortfolioConfig, Repository, StatsSnapshot, TextField, Theme,
};
use folio_engine::{StatsHandle, Studio, TextRenderer};
use folio_sources::StatsSource;
use folio_storage::Storage;
use tempfile::TempDir;

struct StubSource {
    snapshot: Option<StatsSnapshot>,
    watch: Option<StatsHandle>,
}

#[async_trait]
impl StatsSource for StubSource {
    async fn pull(&self) -> anyhow::Result<StatsSnapshot> {
        if let Some(handle) = &self.watch {
            assert!(handle.is_syncing());
        }
        match &self.snapshot {
            Some(snapshot) => Ok(snapshot.clone()),
            None => anyhow::bail!("GitHub authentication failed"),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Never finishes its pull
struct StalledSource;

#[async_trait]
impl StatsSource for StalledSource {
    async fn pull(&self) -> anyhow::Result<StatsSnapshot> {
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "stalled"
    }
}

fn snapshot() -> StatsSnapshot {
    let mut folio = Repository::new(1, "folio");
    folio.stars = 7;
    StatsSnapshot {
        repository_count: 2,
        total_stars: 7,
        total_commits: 120,
        repositories: vec![folio, Repository::new(2, "dotfiles")],
        ..StatsSnapshot::default()
    }
}

async fn open(dir: &TempDir) -> Studio {
    let storage = Storage::new(Some(dir.path().join("folio.db"))).await.unwrap();
    Studio::open(storage, "octocat", PortfolioConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_edits_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let mut studio = open(&dir).await;

    let session = studio.session_mut();
    session.add_pin(1);
    let text_id = session.add_text_section().unwrap();
    session.update_text_section(text_id, TextField::Title, "About");
    session.set_theme(Theme::Blue);
    assert!(studio.session().is_dirty());

    let outcome = studio.save().await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert!(!studio.session().is_dirty());

    let reopened = open(&dir).await;
    let config = reopened.session().config();
    assert_eq!(config.theme, Theme::Blue);
    assert_eq!(config.pinned_repos, vec![1]);
    assert_eq!(
        config.item_order,
        vec![ItemRef::Repo(1), ItemRef::Text(text_id)]
    );
    assert_eq!(config.text_section(text_id).unwrap().title, "About");
}

#[tokio::test]
async fn test_failed_save_keeps_edits() {
    let dir = TempDir::new().unwrap();
    let mut studio = open(&dir).await;

    let id = studio.session_mut().add_text_section().unwrap();
    studio
        .session_mut()
        .update_text_section(id, TextField::Title, "   ");

    let outcome = studio.save().await;
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("empty title"));
    assert!(studio.session().is_dirty());
    assert_eq!(studio.session().config().custom_text_sections.len(), 1);
}

#[tokio::test]
async fn test_sync_and_fetch_stats() {
    let dir = TempDir::new().unwrap();
    let studio = open(&dir).await;
    assert!(studio.stats().snapshot().is_none());

    let source = StubSource {
        snapshot: Some(snapshot()),
        watch: Some(studio.stats()),
    };
    let outcome = studio.sync_stats(&source).await;
    assert!(outcome.success);
    assert!(outcome.data.unwrap().synced_at.is_some());
    assert!(!studio.stats().is_syncing());

    let reopened = open(&dir).await;
    let state = reopened.stats().state();
    assert_eq!(state.snapshot.unwrap().total_commits, 120);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_abandoned_sync_does_not_block_the_next() {
    let dir = TempDir::new().unwrap();
    let studio = open(&dir).await;

    let timed_out = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        studio.sync_stats(&StalledSource),
    )
    .await;
    assert!(timed_out.is_err());
    assert!(!studio.stats().is_syncing());

    let outcome = studio
        .sync_stats(&StubSource {
            snapshot: Some(snapshot()),
            watch: None,
        })
        .await;
    assert!(outcome.success);
    assert_eq!(studio.stats().snapshot().unwrap().total_stars, 7);
}

#[tokio::test]
async fn test_failed_sync_keeps_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let studio = open(&dir).await;
    studio
        .sync_stats(&StubSource {
            snapshot: Some(snapshot()),
            watch: None,
        })
        .await;

    let outcome = studio
        .sync_stats(&StubSource {
            snapshot: None,
            watch: None,
        })
        .await;
    assert!(!outcome.success);

    let state = studio.stats().state();
    assert!(!state.syncing);
    assert!(state.error.unwrap().contains("authentication"));
    assert_eq!(state.snapshot.unwrap().total_stars, 7);
}

#[tokio::test]
async fn test_view_uses_cached_snapshot() {
    let dir = TempDir::new().unwrap();
    let mut studio = open(&dir).await;
    studio
        .sync_stats(&StubSource {
            snapshot: Some(snapshot()),
            watch: None,
        })
        .await;

    studio.session_mut().add_pin(1);
    studio.session_mut().add_pin(99);
    let view = studio.view();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.stats[1].widget.value, 7);
}

#[tokio::test]
async fn test_export_lifecycle() {
    let dir = TempDir::new().unwrap();
    let mut studio = open(&dir).await;
    studio
        .sync_stats(&StubSource {
            snapshot: Some(snapshot()),
            watch: None,
        })
        .await;
    studio.session_mut().add_pin(1);

    let record = studio
        .save_export("Spring update", ExportFormat::Pdf)
        .await
        .data
        .unwrap();
    assert_eq!(record.payload.format, ExportFormat::Pdf);
    assert_eq!(record.render_hash, studio.view().render_hash().unwrap());

    // Later edits do not leak into the export
    studio.session_mut().set_theme(Theme::Pink);
    let fetched = studio.get_export(&record.id).await.data.unwrap();
    let replay = studio.export_view(&fetched);
    assert_eq!(replay.theme, Theme::Light);
    assert_eq!(replay.render_hash().unwrap(), record.render_hash);

    let text = TextRenderer::new().render(&replay).unwrap();
    assert!(text.contains("folio ★7"));

    let list = studio.list_exports().await.data.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].tag, "Spring update");

    assert!(studio.delete_export(&record.id).await.success);
    let missing = studio.delete_export(&record.id).await;
    assert!(!missing.success);
    assert!(missing.error.unwrap().contains("not found"));
}

#[tokio::test]
async fn test_export_rejects_invalid_tag() {
    let dir = TempDir::new().unwrap();
    let studio = open(&dir).await;
    let outcome = studio.save_export("", ExportFormat::Png).await;
    assert!(!outcome.success);
    assert!(studio.list_exports().await.data.unwrap().is_empty());
}
