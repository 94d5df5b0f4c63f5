//! Layout projection - deterministic visual geometry for resolved items
//!
//! This is the single definition of what a portfolio looks like. The live
//! editor preview and the playback of a saved export both go through
//! [`project`], so the two can never drift apart.
//!
//! Same inputs → same [`PortfolioView`] → same render hash.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::item_ref::{ItemKind, ItemRef};
use crate::portfolio::{ItemSize, Layout, PortfolioConfig, Theme};
use crate::resolve::{Resolution, ResolvedItem, StatWidget, resolve};
use crate::snapshot::StatsSnapshot;
use crate::Result;

pub const PREVIEW_MIN_WIDTH: f64 = 150.0;
pub const PREVIEW_MIN_HEIGHT: f64 = 100.0;
pub const STAT_MIN_WIDTH: f64 = 100.0;
pub const STAT_MIN_HEIGHT: f64 = 80.0;

/// Stored widths above this promote a repo card to a full grid row
pub const FULL_WIDTH_THRESHOLD: f64 = 400.0;

pub const MAX_STAT_COLUMNS: usize = 3;

/// Color tokens for a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub card: &'static str,
    pub border: &'static str,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light | Theme::System => Palette {
            background: "#ffffff",
            text: "#111827",
            card: "#f9fafb",
            border: "#e5e7eb",
        },
        Theme::Dark => Palette {
            background: "#111827",
            text: "#ffffff",
            card: "#1f2937",
            border: "#374151",
        },
        Theme::Blue => Palette {
            background: "#eff6ff",
            text: "#1e3a8a",
            card: "#ffffff",
            border: "#bfdbfe",
        },
        Theme::Pink => Palette {
            background: "#fdf2f8",
            text: "#831843",
            card: "#ffffff",
            border: "#fbcfe8",
        },
    }
}

/// Grid and density tokens for a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutTokens {
    pub layout: Layout,
    pub grid_columns: u8,
    /// Card padding in pixels
    pub card_padding: u16,
    /// Gap between cards in pixels
    pub gap: u16,
    /// Lines of repository description shown before truncation
    pub description_lines: u8,
}

pub fn layout_tokens(layout: Layout) -> LayoutTokens {
    match layout {
        Layout::Default => LayoutTokens {
            layout,
            grid_columns: 2,
            card_padding: 16,
            gap: 16,
            description_lines: 2,
        },
        Layout::Classic => LayoutTokens {
            layout,
            grid_columns: 1,
            card_padding: 20,
            gap: 16,
            description_lines: 3,
        },
        Layout::Compact => LayoutTokens {
            layout,
            grid_columns: 1,
            card_padding: 12,
            gap: 8,
            description_lines: 1,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", content = "px", rename_all = "snake_case")]
pub enum Width {
    /// Size of one grid cell
    Auto,
    /// Whole row
    Full,
    Px(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    /// Grid columns occupied
    pub span: u8,
    pub width: Width,
    /// `None` lets the content decide
    pub height: Option<f64>,
    pub min_width: f64,
    pub min_height: f64,
}

impl Geometry {
    pub fn is_full_width(&self) -> bool {
        self.span > 1 || matches!(self.width, Width::Full)
    }
}

/// Smallest size an item may be drawn or resized to
pub fn min_size(item_ref: ItemRef) -> (f64, f64) {
    match item_ref.kind() {
        ItemKind::Stat => (STAT_MIN_WIDTH, STAT_MIN_HEIGHT),
        ItemKind::Repo | ItemKind::Text => (PREVIEW_MIN_WIDTH, PREVIEW_MIN_HEIGHT),
    }
}

/// Raise each present dimension to the floor for `item_ref`
pub fn clamp_size(item_ref: ItemRef, size: ItemSize) -> ItemSize {
    let (min_width, min_height) = min_size(item_ref);
    ItemSize {
        width: size.width.map(|w| w.max(min_width)),
        height: size.height.map(|h| h.max(min_height)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedItem {
    pub item: ResolvedItem,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedStat {
    pub widget: StatWidget,
    pub geometry: Geometry,
}

/// Everything a renderer needs to draw the portfolio
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioView {
    pub theme: Theme,
    pub palette: Palette,
    pub layout: LayoutTokens,
    pub stats_columns: usize,
    pub stats: Vec<ProjectedStat>,
    pub items: Vec<ProjectedItem>,
}

impl PortfolioView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stable digest of the view, used to fingerprint exports
    pub fn render_hash(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

/// Assign geometry and style tokens to resolved items and stat widgets.
pub fn project(
    resolution: Resolution,
    layout: Layout,
    theme: Theme,
    item_sizes: &BTreeMap<ItemRef, ItemSize>,
) -> PortfolioView {
    let tokens = layout_tokens(layout);

    let stats: Vec<ProjectedStat> = resolution
        .stats
        .into_iter()
        .map(|widget| {
            let geometry = stat_geometry(item_sizes.get(&widget.item_ref()).copied());
            ProjectedStat { widget, geometry }
        })
        .collect();

    let items = resolution
        .items
        .into_iter()
        .map(|item| {
            let size = item_sizes.get(&item.item_ref()).copied();
            let geometry = item_geometry(&item, size, tokens);
            ProjectedItem { item, geometry }
        })
        .collect();

    PortfolioView {
        theme,
        palette: palette(theme),
        layout: tokens,
        stats_columns: stats.len().min(MAX_STAT_COLUMNS),
        stats,
        items,
    }
}

/// Resolve and project in one step
pub fn view(config: &PortfolioConfig, snapshot: Option<&StatsSnapshot>) -> PortfolioView {
    project(
        resolve(config, snapshot),
        config.layout,
        config.theme,
        &config.item_sizes,
    )
}

fn item_geometry(item: &ResolvedItem, size: Option<ItemSize>, tokens: LayoutTokens) -> Geometry {
    let stored = size.unwrap_or_default();
    let clamped = clamp_size(item.item_ref(), stored);

    let (span, width) = if tokens.grid_columns > 1 {
        let promoted = stored.width.is_some_and(|w| w > FULL_WIDTH_THRESHOLD);
        let full = item.is_text() || promoted;
        let width = match clamped.width {
            Some(px) => Width::Px(px),
            None if full => Width::Full,
            None => Width::Auto,
        };
        (if full { tokens.grid_columns } else { 1 }, width)
    } else {
        (1, clamped.width.map(Width::Px).unwrap_or(Width::Full))
    };

    Geometry {
        span,
        width,
        height: clamped.height,
        min_width: PREVIEW_MIN_WIDTH,
        min_height: PREVIEW_MIN_HEIGHT,
    }
}

fn stat_geometry(size: Option<ItemSize>) -> Geometry {
    let (min_width, min_height) = (STAT_MIN_WIDTH, STAT_MIN_HEIGHT);
    let size = size.unwrap_or_default();
    Geometry {
        span: 1,
        width: size
            .width
            .map(|w| Width::Px(w.max(min_width)))
            .unwrap_or(Width::Auto),
        height: size.height.map(|h| h.max(min_height)),
        min_width,
        min_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{StatId, TextSection};
    use crate::snapshot::Repository;

    fn repo_item(id: u64) -> ResolvedItem {
        ResolvedItem::Repo {
            item_ref: ItemRef::Repo(id),
            data: Repository::new(id, "demo"),
        }
    }

    fn text_item(id: u64) -> ResolvedItem {
        ResolvedItem::Text {
            item_ref: ItemRef::Text(id),
            data: TextSection::placeholder(id),
        }
    }

    fn project_items(
        items: Vec<ResolvedItem>,
        layout: Layout,
        sizes: &[(ItemRef, ItemSize)],
    ) -> PortfolioView {
        let resolution = Resolution {
            stats: Vec::new(),
            items,
        };
        let sizes: BTreeMap<ItemRef, ItemSize> = sizes.iter().copied().collect();
        project(resolution, layout, Theme::Light, &sizes)
    }

    #[test]
    fn test_text_is_full_width_in_default_layout() {
        let view = project_items(vec![text_item(1)], Layout::Default, &[]);
        let geometry = view.items[0].geometry;
        assert_eq!(geometry.span, 2);
        assert_eq!(geometry.width, Width::Full);
        assert!(geometry.is_full_width());
    }

    #[test]
    fn test_text_keeps_span_with_narrow_override() {
        let view = project_items(
            vec![text_item(1)],
            Layout::Default,
            &[(ItemRef::Text(1), ItemSize::new(200.0, 150.0))],
        );
        let geometry = view.items[0].geometry;
        assert_eq!(geometry.span, 2);
        assert_eq!(geometry.width, Width::Px(200.0));
    }

    #[test]
    fn test_repo_occupies_one_cell_by_default() {
        let view = project_items(vec![repo_item(1)], Layout::Default, &[]);
        let geometry = view.items[0].geometry;
        assert_eq!(geometry.span, 1);
        assert_eq!(geometry.width, Width::Auto);
        assert_eq!(geometry.height, None);
    }

    #[test]
    fn test_wide_repo_is_promoted() {
        let view = project_items(
            vec![repo_item(1), repo_item(2)],
            Layout::Default,
            &[
                (ItemRef::Repo(1), ItemSize::new(401.0, 120.0)),
                (ItemRef::Repo(2), ItemSize::new(400.0, 120.0)),
            ],
        );
        assert_eq!(view.items[0].geometry.span, 2);
        assert_eq!(view.items[0].geometry.width, Width::Px(401.0));
        assert_eq!(view.items[1].geometry.span, 1);
        assert_eq!(view.items[1].geometry.width, Width::Px(400.0));
    }

    #[test]
    fn test_single_column_layouts() {
        for layout in [Layout::Classic, Layout::Compact] {
            let view = project_items(
                vec![repo_item(1), text_item(2)],
                layout,
                &[(ItemRef::Repo(1), ItemSize::new(640.0, 300.0))],
            );
            assert_eq!(view.items[0].geometry.span, 1);
            assert_eq!(view.items[0].geometry.width, Width::Px(640.0));
            assert_eq!(view.items[1].geometry.width, Width::Full);
        }
    }

    #[test]
    fn test_floors_apply_to_overrides() {
        let view = project_items(
            vec![repo_item(1)],
            Layout::Classic,
            &[(ItemRef::Repo(1), ItemSize::new(10.0, -40.0))],
        );
        let geometry = view.items[0].geometry;
        assert_eq!(geometry.width, Width::Px(PREVIEW_MIN_WIDTH));
        assert_eq!(geometry.height, Some(PREVIEW_MIN_HEIGHT));
    }

    #[test]
    fn test_stat_floors_and_columns() {
        let resolution = Resolution {
            stats: vec![
                StatWidget {
                    id: StatId::Repos,
                    label: "Repos".to_string(),
                    value: 3,
                },
                StatWidget {
                    id: StatId::Stars,
                    label: "Stars".to_string(),
                    value: 9,
                },
            ],
            items: Vec::new(),
        };
        let mut sizes = BTreeMap::new();
        sizes.insert(ItemRef::Stat(StatId::Stars), ItemSize::new(50.0, 50.0));

        let view = project(resolution, Layout::Default, Theme::Dark, &sizes);

        assert_eq!(view.stats_columns, 2);
        assert_eq!(view.stats[0].geometry.width, Width::Auto);
        assert_eq!(view.stats[1].geometry.width, Width::Px(STAT_MIN_WIDTH));
        assert_eq!(view.stats[1].geometry.height, Some(STAT_MIN_HEIGHT));
        assert_eq!(view.palette.background, "#111827");
    }

    #[test]
    fn test_system_theme_matches_light() {
        assert_eq!(palette(Theme::System), palette(Theme::Light));
        assert_eq!(layout_tokens(Layout::Default).grid_columns, 2);
        assert_eq!(layout_tokens(Layout::Compact).description_lines, 1);
    }

    #[test]
    fn test_render_hash_is_stable() {
        let a = project_items(vec![repo_item(1), text_item(2)], Layout::Default, &[]);
        let b = project_items(vec![repo_item(1), text_item(2)], Layout::Default, &[]);
        let c = project_items(vec![text_item(2), repo_item(1)], Layout::Default, &[]);

        assert_eq!(a.render_hash().unwrap(), b.render_hash().unwrap());
        assert_ne!(a.render_hash().unwrap(), c.render_hash().unwrap());
    }
}
