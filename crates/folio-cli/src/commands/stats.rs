use std::time::Duration;

use anyhow::Result;
use folio_config::Settings;
use folio_core::StatsSnapshot;
use folio_engine::Studio;
use folio_sources::{FileSource, GitHubOptions, GitHubSource, StatsSource};

use crate::cli::StatsCommands;
use crate::commands::expect_success;

pub async fn handle(cmd: StatsCommands, studio: &Studio, settings: &Settings) -> Result<()> {
    match cmd {
        StatsCommands::Show => show(studio),
        StatsCommands::Sync { from } => {
            let source: Box<dyn StatsSource> = match from {
                Some(path) => Box::new(FileSource::new(path)),
                None => Box::new(GitHubSource::new(GitHubOptions {
                    api_url: settings.github.api_url.clone(),
                    token: settings.github.token()?,
                    per_page: settings.github.per_page,
                    commit_scan_limit: settings.github.commit_scan_limit,
                    timeout: Duration::from_secs(settings.github.timeout_secs),
                })?),
            };
            sync(studio, source.as_ref()).await
        }
    }
}

fn show(studio: &Studio) -> Result<()> {
    let state = studio.stats().state();
    if let Some(error) = &state.error {
        println!("Last error: {}", error);
    }
    match &state.snapshot {
        Some(snapshot) => print_snapshot(snapshot),
        None => println!("No stats cached. Run `folio stats sync` first."),
    }
    Ok(())
}

async fn sync(studio: &Studio, source: &dyn StatsSource) -> Result<()> {
    println!("Syncing stats from {}...", source.name());
    let snapshot = expect_success(studio.sync_stats(source).await, "Stats sync")?;
    println!("✓ Stats synced");
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &StatsSnapshot) {
    println!("Repositories:   {}", snapshot.repository_count);
    println!("Stars:          {}", snapshot.total_stars);
    println!("Forks:          {}", snapshot.total_forks);
    println!("Commits:        {}", snapshot.total_commits);
    println!("Recent commits: {}", snapshot.recent_commits);
    if let Some(synced_at) = snapshot.synced_at {
        println!("Synced at:      {}", synced_at);
    }

    if !snapshot.languages.is_empty() {
        let mut languages: Vec<(&String, &f64)> = snapshot.languages.iter().collect();
        languages.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        println!("\nLanguages:");
        for (language, share) in languages {
            println!("  {:<16} {:>5.1}%", language, share);
        }
    }
}
