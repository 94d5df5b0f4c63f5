//! Edit session - the only writer of a portfolio configuration
//!
//! Every operation is total: input that cannot apply (a seventh pin, an
//! out-of-range drag index, an unknown section id) is absorbed as a no-op.
//! Operations return `true` when they changed something. The session never
//! persists anything itself; callers take [`EditSession::to_patch`] to a
//! store and call [`EditSession::mark_saved`] once the store accepted it.

use std::collections::HashSet;

use time::OffsetDateTime;

use crate::interaction::{DragList, Interaction, Pointer};
use crate::item_ref::ItemRef;
use crate::order::{move_item, reconcile_order};
use crate::portfolio::{
    ConfigPatch, ItemSize, Layout, MAX_CONTENT_CHARS, MAX_PINNED_REPOS, MAX_TEXT_SECTIONS,
    MAX_TITLE_CHARS, PortfolioConfig, StatDescriptor, StatId, TextSection, Theme,
};
use crate::project::{PortfolioView, clamp_size, view};
use crate::snapshot::{Repository, StatsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Content,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    config: PortfolioConfig,
    interaction: Interaction,
    editing_text: Option<u64>,
    dirty: bool,
    last_text_id: u64,
}

impl EditSession {
    /// Start a session on a loaded configuration.
    ///
    /// Stat descriptors are completed to all three ids and the item order
    /// is reconciled with the pinned repos and text sections.
    pub fn new(mut config: PortfolioConfig) -> Self {
        config.visible_stats = normalize_stats(&config.visible_stats);
        config.item_order = reconcile_order(
            &config.pinned_repos,
            &config.custom_text_sections,
            &config.item_order,
        );
        let last_text_id = config
            .custom_text_sections
            .iter()
            .map(|s| s.id)
            .max()
            .unwrap_or(0);

        Self {
            config,
            interaction: Interaction::Idle,
            editing_text: None,
            dirty: false,
            last_text_id,
        }
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    pub fn into_config(self) -> PortfolioConfig {
        self.config
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Text section currently open for editing
    pub fn editing_text(&self) -> Option<u64> {
        self.editing_text
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Resolved and projected view of the current configuration
    pub fn view(&self, snapshot: Option<&StatsSnapshot>) -> PortfolioView {
        view(&self.config, snapshot)
    }

    /// Full configuration as a store patch
    pub fn to_patch(&self) -> ConfigPatch {
        ConfigPatch::full(&self.config)
    }

    /// Record a successful save. A failed save leaves the session dirty.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Repositories that can still be pinned, filtered by `query`
    pub fn available_repos<'a>(
        &self,
        snapshot: &'a StatsSnapshot,
        query: &str,
    ) -> Vec<&'a Repository> {
        snapshot
            .repositories
            .iter()
            .filter(|repo| !self.config.is_pinned(repo.github_id) && repo.matches(query))
            .collect()
    }

    pub fn set_layout(&mut self, layout: Layout) -> bool {
        if self.config.layout == layout {
            return false;
        }
        self.config.layout = layout;
        self.touch()
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        if self.config.theme == theme {
            return false;
        }
        self.config.theme = theme;
        self.touch()
    }

    pub fn add_pin(&mut self, repo_id: u64) -> bool {
        if self.config.pinned_repos.len() >= MAX_PINNED_REPOS {
            tracing::debug!("Pin limit reached, ignoring repo {}", repo_id);
            return false;
        }
        if self.config.is_pinned(repo_id) {
            return false;
        }
        self.config.pinned_repos.push(repo_id);
        self.config.item_order.push(ItemRef::Repo(repo_id));
        self.touch()
    }

    pub fn remove_pin(&mut self, repo_id: u64) -> bool {
        let before = self.config.pinned_repos.len();
        self.config.pinned_repos.retain(|id| *id != repo_id);
        self.config.item_order.retain(|r| *r != ItemRef::Repo(repo_id));
        if self.config.pinned_repos.len() == before {
            return false;
        }
        self.touch()
    }

    /// Append a placeholder section with a fresh id and open it for editing
    pub fn add_text_section(&mut self) -> Option<u64> {
        let id = self.next_text_id()?;
        self.add_text_section_with_id(id).then_some(id)
    }

    /// Append a placeholder section with a caller-chosen id
    pub fn add_text_section_with_id(&mut self, id: u64) -> bool {
        if self.config.custom_text_sections.len() >= MAX_TEXT_SECTIONS {
            tracing::debug!("Text section limit reached");
            return false;
        }
        if self.config.text_section(id).is_some() {
            return false;
        }
        self.config
            .custom_text_sections
            .push(TextSection::placeholder(id));
        self.config.item_order.push(ItemRef::Text(id));
        self.last_text_id = self.last_text_id.max(id);
        self.editing_text = Some(id);
        self.touch()
    }

    /// Replace one field of a section. Values are cut to the storage limits.
    pub fn update_text_section(&mut self, id: u64, field: TextField, value: &str) -> bool {
        let Some(section) = self
            .config
            .custom_text_sections
            .iter_mut()
            .find(|s| s.id == id)
        else {
            return false;
        };

        let (slot, limit) = match field {
            TextField::Title => (&mut section.title, MAX_TITLE_CHARS),
            TextField::Content => (&mut section.content, MAX_CONTENT_CHARS),
        };
        let value = truncate_chars(value, limit);
        if *slot == value {
            return false;
        }
        *slot = value;
        self.touch()
    }

    pub fn start_editing(&mut self, id: u64) -> bool {
        if self.config.text_section(id).is_none() {
            return false;
        }
        self.editing_text = Some(id);
        true
    }

    pub fn finish_editing(&mut self) {
        self.editing_text = None;
    }

    pub fn delete_text_section(&mut self, id: u64) -> bool {
        let before = self.config.custom_text_sections.len();
        self.config.custom_text_sections.retain(|s| s.id != id);
        if self.config.custom_text_sections.len() == before {
            return false;
        }
        let item = ItemRef::Text(id);
        self.config.item_order.retain(|r| *r != item);
        self.config.item_sizes.remove(&item);
        if self.editing_text == Some(id) {
            self.editing_text = None;
        }
        self.touch()
    }

    /// Re-derive the item order after pins or sections changed out of band
    pub fn reconcile(&mut self) -> bool {
        let order = reconcile_order(
            &self.config.pinned_repos,
            &self.config.custom_text_sections,
            &self.config.item_order,
        );
        if order == self.config.item_order {
            return false;
        }
        self.config.item_order = order;
        self.touch()
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.config.item_order, from, to) && self.touch()
    }

    pub fn move_stat(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.config.visible_stats, from, to) && self.touch()
    }

    pub fn toggle_stat_visibility(&mut self, id: StatId) -> bool {
        match self.stat_mut(id) {
            Some(stat) => {
                stat.visible = !stat.visible;
                self.touch()
            }
            None => false,
        }
    }

    pub fn hide_stat(&mut self, id: StatId) -> bool {
        match self.stat_mut(id) {
            Some(stat) if stat.visible => {
                stat.visible = false;
                self.touch()
            }
            _ => false,
        }
    }

    /// Store a size override, raised to the floor for the item kind
    pub fn resize(&mut self, item: ItemRef, width: f64, height: f64) -> bool {
        let size = clamp_size(item, ItemSize::new(width, height));
        if self.config.item_sizes.get(&item) == Some(&size) {
            return false;
        }
        self.config.item_sizes.insert(item, size);
        self.touch()
    }

    pub fn begin_drag(&mut self, list: DragList, source: usize) -> bool {
        if !self.interaction.is_idle() || source >= self.list_len(list) {
            return false;
        }
        self.interaction = Interaction::Dragging {
            list,
            source,
            over: None,
        };
        true
    }

    pub fn drag_over(&mut self, index: usize) {
        if let Interaction::Dragging { over, .. } = &mut self.interaction {
            *over = Some(index);
        }
    }

    /// Finish a drag by moving the dragged element to `target`
    pub fn drop_at(&mut self, target: usize) -> bool {
        let Interaction::Dragging { list, source, .. } = self.interaction else {
            return false;
        };
        self.interaction = Interaction::Idle;
        match list {
            DragList::Items => self.move_item(source, target),
            DragList::Stats => self.move_stat(source, target),
        }
    }

    /// Drag ended without a drop; nothing moves
    pub fn cancel_drag(&mut self) {
        if matches!(self.interaction, Interaction::Dragging { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    pub fn begin_resize(
        &mut self,
        item: ItemRef,
        pointer: Pointer,
        width: f64,
        height: f64,
    ) -> bool {
        if !self.interaction.is_idle() {
            return false;
        }
        self.interaction = Interaction::Resizing {
            item,
            start: pointer,
            start_width: width,
            start_height: height,
        };
        true
    }

    pub fn pointer_move(&mut self, pointer: Pointer) -> bool {
        match self.interaction.resize_target(pointer) {
            Some((item, size)) => match (size.width, size.height) {
                (Some(width), Some(height)) => self.resize(item, width, height),
                _ => false,
            },
            None => false,
        }
    }

    pub fn end_resize(&mut self) {
        if matches!(self.interaction, Interaction::Resizing { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    fn list_len(&self, list: DragList) -> usize {
        match list {
            DragList::Items => self.config.item_order.len(),
            DragList::Stats => self.config.visible_stats.len(),
        }
    }

    fn stat_mut(&mut self, id: StatId) -> Option<&mut StatDescriptor> {
        self.config.visible_stats.iter_mut().find(|s| s.id == id)
    }

    // Millisecond timestamp, bumped past every id handed out so far.
    // `None` once the id space is exhausted.
    fn next_text_id(&self) -> Option<u64> {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let now = u64::try_from(now).unwrap_or(0);
        self.last_text_id.checked_add(1).map(|next| now.max(next))
    }

    fn touch(&mut self) -> bool {
        self.dirty = true;
        true
    }
}

/// Keep stored descriptors in stored order, drop repeats, append missing ids
pub fn normalize_stats(stats: &[StatDescriptor]) -> Vec<StatDescriptor> {
    let mut seen = HashSet::new();
    let mut normalized: Vec<StatDescriptor> = stats
        .iter()
        .filter(|s| seen.insert(s.id))
        .cloned()
        .collect();
    normalized.extend(
        StatId::ALL
            .into_iter()
            .filter(|id| !seen.contains(id))
            .map(StatDescriptor::new),
    );
    normalized
}

fn truncate_chars(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}
