//! Portfolio configuration domain model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::item_ref::{ItemRef, lenient};
use crate::{CoreError, Result};

pub const MAX_PINNED_REPOS: usize = 6;
pub const MAX_TEXT_SECTIONS: usize = 10;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 5000;
pub const STAT_COUNT: usize = 3;

pub const DEFAULT_SECTION_TITLE: &str = "New Section";
pub const DEFAULT_SECTION_CONTENT: &str = "Add your content here...";

/// Grid shape and card density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    #[default]
    Default,
    Classic,
    Compact,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Default, Layout::Classic, Layout::Compact];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Default => "default",
            Layout::Classic => "classic",
            Layout::Compact => "compact",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }
}

/// Color scheme of the rendered portfolio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
    Blue,
    Pink,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Light,
        Theme::Dark,
        Theme::System,
        Theme::Blue,
        Theme::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
            Theme::Blue => "blue",
            Theme::Pink => "pink",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

// Layout and theme are written as plain names. Unknown names read back as the
// default variant so a hand-edited config still renders.
macro_rules! named_enum_serde {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self> {
                $ty::from_name(s)
                    .ok_or_else(|| CoreError::Validation(format!("Unknown {}: {}", $what, s)))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok($ty::from_name(&raw).unwrap_or_else(|| {
                    tracing::warn!("Unknown {} {:?}, using {}", $what, raw, $ty::default());
                    $ty::default()
                }))
            }
        }
    };
}

named_enum_serde!(Layout, "layout");
named_enum_serde!(Theme, "theme");

/// Stat widget identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatId {
    Repos,
    Stars,
    Commits,
}

impl StatId {
    pub const ALL: [StatId; STAT_COUNT] = [StatId::Repos, StatId::Stars, StatId::Commits];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatId::Repos => "repos",
            StatId::Stars => "stars",
            StatId::Commits => "commits",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            StatId::Repos => "Repos",
            StatId::Stars => "Stars",
            StatId::Commits => "Commits",
        }
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        StatId::from_name(s).ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid stat id: {}. Must be 'repos', 'stars', or 'commits'",
                s
            ))
        })
    }
}

/// A stat widget slot. Hidden stats keep their slot and label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDescriptor {
    pub id: StatId,
    pub label: String,
    pub visible: bool,
}

impl StatDescriptor {
    pub fn new(id: StatId) -> Self {
        Self {
            id,
            label: id.default_label().to_string(),
            visible: true,
        }
    }
}

pub fn default_visible_stats() -> Vec<StatDescriptor> {
    StatId::ALL.into_iter().map(StatDescriptor::new).collect()
}

/// User-authored free text card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSection {
    pub id: u64,
    pub title: String,
    pub content: String,
}

impl TextSection {
    pub fn placeholder(id: u64) -> Self {
        Self {
            id,
            title: DEFAULT_SECTION_TITLE.to_string(),
            content: DEFAULT_SECTION_CONTENT.to_string(),
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::Text(self.id)
    }
}

/// Pixel size override. Missing dimensions fall back to layout sizing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl ItemSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }
}

/// Persisted layout preferences for one portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioConfig {
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub pinned_repos: Vec<u64>,
    #[serde(default)]
    pub custom_text_sections: Vec<TextSection>,
    #[serde(default, deserialize_with = "lenient::item_order")]
    pub item_order: Vec<ItemRef>,
    #[serde(default, deserialize_with = "lenient::item_sizes")]
    pub item_sizes: BTreeMap<ItemRef, ItemSize>,
    #[serde(
        default = "default_visible_stats",
        deserialize_with = "lenient::visible_stats"
    )]
    pub visible_stats: Vec<StatDescriptor>,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            theme: Theme::default(),
            pinned_repos: Vec::new(),
            custom_text_sections: Vec::new(),
            item_order: Vec::new(),
            item_sizes: BTreeMap::new(),
            visible_stats: default_visible_stats(),
        }
    }
}

impl PortfolioConfig {
    pub fn with_style(layout: Layout, theme: Theme) -> Self {
        Self {
            layout,
            theme,
            ..Self::default()
        }
    }

    pub fn text_section(&self, id: u64) -> Option<&TextSection> {
        self.custom_text_sections.iter().find(|s| s.id == id)
    }

    pub fn is_pinned(&self, repo_id: u64) -> bool {
        self.pinned_repos.contains(&repo_id)
    }
}

/// Partial configuration update. `None` fields leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_repos: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text_sections: Option<Vec<TextSection>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_item_order"
    )]
    pub item_order: Option<Vec<ItemRef>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_item_sizes"
    )]
    pub item_sizes: Option<BTreeMap<ItemRef, ItemSize>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_visible_stats"
    )]
    pub visible_stats: Option<Vec<StatDescriptor>>,
}

impl ConfigPatch {
    /// Patch that replaces every field
    pub fn full(config: &PortfolioConfig) -> Self {
        Self {
            layout: Some(config.layout),
            theme: Some(config.theme),
            pinned_repos: Some(config.pinned_repos.clone()),
            custom_text_sections: Some(config.custom_text_sections.clone()),
            item_order: Some(config.item_order.clone()),
            item_sizes: Some(config.item_sizes.clone()),
            visible_stats: Some(config.visible_stats.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the provided fields on top of `base`
    pub fn apply(self, base: &PortfolioConfig) -> PortfolioConfig {
        let mut merged = base.clone();
        if let Some(layout) = self.layout {
            merged.layout = layout;
        }
        if let Some(theme) = self.theme {
            merged.theme = theme;
        }
        if let Some(pinned) = self.pinned_repos {
            merged.pinned_repos = pinned;
        }
        if let Some(sections) = self.custom_text_sections {
            merged.custom_text_sections = sections;
        }
        if let Some(order) = self.item_order {
            merged.item_order = order;
        }
        if let Some(sizes) = self.item_sizes {
            merged.item_sizes = sizes;
        }
        if let Some(stats) = self.visible_stats {
            merged.visible_stats = stats;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PortfolioConfig::default();
        assert_eq!(config.layout, Layout::Default);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.visible_stats.len(), STAT_COUNT);
        assert!(config.visible_stats.iter().all(|s| s.visible));
        assert_eq!(config.visible_stats[1].label, "Stars");
    }

    #[test]
    fn test_decode_stored_document() {
        let json = r#"{
            "layout": "compact",
            "theme": "pink",
            "pinnedRepos": [11, 12],
            "customTextSections": [{"id": 99, "title": "About", "content": "Hi"}],
            "itemOrder": ["text-99", "repo-12", "bogus", "repo-11"],
            "itemSizes": {"repo-12": {"width": 420, "height": 180}, "nope": {"width": 1}},
            "visibleStats": [
                {"id": "commits", "label": "Commits", "visible": false},
                {"id": "repos", "label": "Repositories", "visible": true}
            ]
        }"#;
        let config: PortfolioConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.layout, Layout::Compact);
        assert_eq!(config.theme, Theme::Pink);
        assert_eq!(
            config.item_order,
            vec![ItemRef::Text(99), ItemRef::Repo(12), ItemRef::Repo(11)]
        );
        assert_eq!(config.item_sizes.len(), 1);
        assert_eq!(
            config.item_sizes[&ItemRef::Repo(12)],
            ItemSize::new(420.0, 180.0)
        );
        assert_eq!(config.visible_stats.len(), 2);
    }

    #[test]
    fn test_unknown_theme_and_layout_fall_back() {
        let config: PortfolioConfig =
            serde_json::from_str(r#"{"layout": "masonry", "theme": "neon"}"#).unwrap();
        assert_eq!(config.layout, Layout::Default);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.visible_stats, default_visible_stats());
    }

    #[test]
    fn test_unknown_stat_widget_is_dropped() {
        let config: PortfolioConfig = serde_json::from_str(
            r#"{
                "pinnedRepos": [1],
                "visibleStats": [
                    {"id": "forks", "label": "Forks", "visible": true},
                    {"id": "stars", "label": "Favourites", "visible": false}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.pinned_repos, vec![1]);
        assert_eq!(config.visible_stats.len(), 1);
        assert_eq!(config.visible_stats[0].id, StatId::Stars);
        assert_eq!(config.visible_stats[0].label, "Favourites");
        assert!(!config.visible_stats[0].visible);
    }

    #[test]
    fn test_strict_parse_for_user_input() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("neon".parse::<Theme>().is_err());
        assert!("forks".parse::<StatId>().is_err());
    }

    #[test]
    fn test_patch_applies_only_provided_fields() {
        let base = PortfolioConfig {
            pinned_repos: vec![1, 2],
            ..PortfolioConfig::default()
        };
        let patch = ConfigPatch {
            theme: Some(Theme::Dark),
            ..ConfigPatch::default()
        };
        let merged = patch.apply(&base);
        assert_eq!(merged.theme, Theme::Dark);
        assert_eq!(merged.pinned_repos, vec![1, 2]);
        assert_eq!(merged.layout, Layout::Default);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = ConfigPatch {
            layout: Some(Layout::Classic),
            ..ConfigPatch::default()
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"layout":"classic"}"#
        );
        assert!(ConfigPatch::default().is_empty());
    }
}
