//! Item resolution: joins a configuration with a stats snapshot.
//!
//! Resolution is pure and cheap. It runs after every mutation, including
//! each keystroke while a text section is being edited.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::item_ref::ItemRef;
use crate::portfolio::{PortfolioConfig, StatId, TextSection};
use crate::snapshot::{Repository, StatsSnapshot};

/// A renderable preview card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedItem {
    Repo { item_ref: ItemRef, data: Repository },
    Text { item_ref: ItemRef, data: TextSection },
}

impl ResolvedItem {
    pub fn item_ref(&self) -> ItemRef {
        match self {
            ResolvedItem::Repo { item_ref, .. } | ResolvedItem::Text { item_ref, .. } => *item_ref,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ResolvedItem::Text { .. })
    }
}

/// A visible stat with its live value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatWidget {
    pub id: StatId,
    pub label: String,
    pub value: u64,
}

impl StatWidget {
    pub fn item_ref(&self) -> ItemRef {
        ItemRef::Stat(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub stats: Vec<StatWidget>,
    pub items: Vec<ResolvedItem>,
}

/// Resolve `config` against `snapshot` into stat widgets and ordered items.
///
/// Pinned repositories missing from the snapshot and references that point
/// at nothing are skipped. `config` itself is never modified: a repository
/// that disappears during a partial sync comes back on the next one.
pub fn resolve(config: &PortfolioConfig, snapshot: Option<&StatsSnapshot>) -> Resolution {
    let repositories = snapshot.map(|s| s.repositories.as_slice()).unwrap_or(&[]);

    let pinned: HashMap<u64, &Repository> = config
        .pinned_repos
        .iter()
        .filter_map(|id| {
            repositories
                .iter()
                .find(|r| r.github_id == *id)
                .map(|repo| (*id, repo))
        })
        .collect();

    let sections: HashMap<ItemRef, &TextSection> = config
        .custom_text_sections
        .iter()
        .map(|section| (section.item_ref(), section))
        .collect();

    let items = config
        .item_order
        .iter()
        .filter_map(|item_ref| match item_ref {
            ItemRef::Repo(id) => pinned.get(id).map(|repo| ResolvedItem::Repo {
                item_ref: *item_ref,
                data: (*repo).clone(),
            }),
            ItemRef::Text(_) => sections.get(item_ref).map(|section| ResolvedItem::Text {
                item_ref: *item_ref,
                data: (*section).clone(),
            }),
            ItemRef::Stat(_) => None,
        })
        .collect();

    let stats = config
        .visible_stats
        .iter()
        .filter(|stat| stat.visible)
        .map(|stat| StatWidget {
            id: stat.id,
            label: stat.label.clone(),
            value: snapshot.map(|s| s.stat_value(stat.id)).unwrap_or(0),
        })
        .collect();

    Resolution { stats, items }
}
