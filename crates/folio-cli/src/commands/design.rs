use anyhow::Result;
use folio_core::{EditSession, ItemRef, TextField, portfolio::MAX_PINNED_REPOS};
use folio_engine::{Studio, TextRenderer};

use crate::cli::{DesignCommands, TextCommands};
use crate::commands::expect_success;

pub async fn handle(cmd: DesignCommands, studio: &mut Studio) -> Result<()> {
    match cmd {
        DesignCommands::Show => show(studio),
        DesignCommands::Repos { query } => repos(studio, query.as_deref().unwrap_or("")),
        DesignCommands::Layout { layout } => {
            let changed = studio.session_mut().set_layout(layout);
            commit(studio, changed, &format!("Layout set to {}", layout)).await
        }
        DesignCommands::Theme { theme } => {
            let changed = studio.session_mut().set_theme(theme);
            commit(studio, changed, &format!("Theme set to {}", theme)).await
        }
        DesignCommands::Pin { id } => pin(studio, id).await,
        DesignCommands::Unpin { id } => {
            let changed = studio.session_mut().remove_pin(id);
            commit(studio, changed, &format!("Unpinned repository {}", id)).await
        }
        DesignCommands::Text(cmd) => text(studio, cmd).await,
        DesignCommands::Move { from, to } => {
            let changed = studio.session_mut().move_item(from, to);
            commit(studio, changed, &format!("Moved item {} to {}", from, to)).await
        }
        DesignCommands::StatMove { from, to } => {
            let changed = studio.session_mut().move_stat(from, to);
            commit(studio, changed, &format!("Moved stat {} to {}", from, to)).await
        }
        DesignCommands::StatToggle { id } => {
            let changed = studio.session_mut().toggle_stat_visibility(id);
            commit(studio, changed, &format!("Toggled stat {}", id)).await
        }
        DesignCommands::StatHide { id } => {
            let changed = studio.session_mut().hide_stat(id);
            commit(studio, changed, &format!("Hid stat {}", id)).await
        }
        DesignCommands::Resize {
            item,
            width,
            height,
        } => {
            let changed = studio.session_mut().resize(item, width, height);
            commit(studio, changed, &format!("Resized {}", item)).await
        }
    }
}

/// Save after a mutation. A failed save exits non-zero.
async fn commit(studio: &mut Studio, changed: bool, done: &str) -> Result<()> {
    if !changed {
        println!("No change.");
        return Ok(());
    }
    expect_success(studio.save().await, "Save")?;
    println!("✓ {}", done);
    Ok(())
}

fn show(studio: &Studio) -> Result<()> {
    let view = studio.view();
    print!("{}", TextRenderer::new().render(&view)?);

    let config = studio.session().config();
    println!("\nStats (for stat-move):");
    for (index, stat) in config.visible_stats.iter().enumerate() {
        let state = if stat.visible { "shown" } else { "hidden" };
        println!("  [{}] {} ({}) {}", index, stat.label, stat.id, state);
    }

    println!("\nItem order (for move):");
    if config.item_order.is_empty() {
        println!("  (empty)");
    }
    let resolved: Vec<ItemRef> = view.items.iter().map(|i| i.item.item_ref()).collect();
    for (index, item) in config.item_order.iter().enumerate() {
        let note = if resolved.contains(item) {
            ""
        } else {
            " (not in current stats)"
        };
        println!("  [{}] {}{}", index, item, note);
    }
    Ok(())
}

fn repos(studio: &Studio, query: &str) -> Result<()> {
    let Some(snapshot) = studio.stats().snapshot() else {
        println!("No stats cached. Run `folio stats sync` first.");
        return Ok(());
    };

    let available = studio.session().available_repos(&snapshot, query);
    if available.is_empty() {
        println!("No repositories available.");
        return Ok(());
    }
    for repo in available {
        println!("  {:>12}  {} ★{}", repo.github_id, repo.full_name, repo.stars);
        if !repo.description.is_empty() {
            println!("                {}", repo.description);
        }
    }
    Ok(())
}

async fn pin(studio: &mut Studio, id: u64) -> Result<()> {
    let session = studio.session();
    if session.config().is_pinned(id) {
        println!("Repository {} is already pinned.", id);
        return Ok(());
    }
    if session.config().pinned_repos.len() >= MAX_PINNED_REPOS {
        anyhow::bail!("At most {} repositories can be pinned", MAX_PINNED_REPOS);
    }
    let known = studio
        .stats()
        .snapshot()
        .is_some_and(|s| s.repository(id).is_some());
    if !known {
        tracing::warn!(
            "Repository {} is not in the cached stats; it stays hidden until a sync finds it",
            id
        );
    }

    let changed = studio.session_mut().add_pin(id);
    commit(studio, changed, &format!("Pinned repository {}", id)).await
}

async fn text(studio: &mut Studio, cmd: TextCommands) -> Result<()> {
    match cmd {
        TextCommands::Add { title, content } => {
            let session = studio.session_mut();
            let Some(id) = session.add_text_section() else {
                anyhow::bail!("Text section limit reached");
            };
            apply_text(session, id, title.as_deref(), content.as_deref());
            session.finish_editing();
            commit(studio, true, &format!("Added text section {}", id)).await
        }
        TextCommands::Edit { id, title, content } => {
            let session = studio.session_mut();
            if !session.start_editing(id) {
                anyhow::bail!("Text section {} not found", id);
            }
            let changed = apply_text(session, id, title.as_deref(), content.as_deref());
            session.finish_editing();
            commit(studio, changed, &format!("Updated text section {}", id)).await
        }
        TextCommands::Delete { id } => {
            let changed = studio.session_mut().delete_text_section(id);
            if !changed {
                anyhow::bail!("Text section {} not found", id);
            }
            commit(studio, changed, &format!("Deleted text section {}", id)).await
        }
    }
}

fn apply_text(
    session: &mut EditSession,
    id: u64,
    title: Option<&str>,
    content: Option<&str>,
) -> bool {
    let mut changed = false;
    if let Some(title) = title {
        changed |= session.update_text_section(id, TextField::Title, title);
    }
    if let Some(content) = content {
        // Shells pass "\n" literally
        let content = content.replace("\\n", "\n");
        changed |= session.update_text_section(id, TextField::Content, &content);
    }
    changed
}
