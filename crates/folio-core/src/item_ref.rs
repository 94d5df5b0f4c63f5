//! Typed references to placeable portfolio items.
//!
//! Stored configurations key ordering and sizing maps by strings such as
//! `repo-123`, `text-1700000000000` or `stat-stars`. Those strings are parsed
//! into [`ItemRef`] when a configuration is decoded and formatted back only
//! when it is encoded; nothing inside the core looks at the prefixes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::portfolio::{ItemSize, StatDescriptor, StatId};
use crate::{CoreError, Result};

/// Identifies a pinned repository, a text section or a stat widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemRef {
    Repo(u64),
    Text(u64),
    Stat(StatId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Repo,
    Text,
    Stat,
}

impl ItemRef {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Repo(_) => ItemKind::Repo,
            ItemRef::Text(_) => ItemKind::Text,
            ItemRef::Stat(_) => ItemKind::Stat,
        }
    }

    /// Preview items are the ones that live in `item_order`.
    pub fn is_preview_item(&self) -> bool {
        !matches!(self, ItemRef::Stat(_))
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Repo(id) => write!(f, "repo-{}", id),
            ItemRef::Text(id) => write!(f, "text-{}", id),
            ItemRef::Stat(id) => write!(f, "stat-{}", id.as_str()),
        }
    }
}

impl FromStr for ItemRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidItemRef(s.to_string());

        if let Some(id) = s.strip_prefix("repo-") {
            id.parse().map(ItemRef::Repo).map_err(|_| invalid())
        } else if let Some(id) = s.strip_prefix("text-") {
            id.parse().map(ItemRef::Text).map_err(|_| invalid())
        } else if let Some(id) = s.strip_prefix("stat-") {
            StatId::from_name(id).map(ItemRef::Stat).ok_or_else(invalid)
        } else {
            Err(invalid())
        }
    }
}

impl Serialize for ItemRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Decoders that drop references they cannot parse instead of rejecting the
/// whole configuration. Stored configs may have been edited out of band.
pub(crate) mod lenient {
    use super::*;

    pub fn item_order<'de, D>(deserializer: D) -> std::result::Result<Vec<ItemRef>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|s| match s.parse::<ItemRef>() {
                Ok(item) => Some(item),
                Err(_) => {
                    tracing::warn!("Dropping unparseable item reference {:?}", s);
                    None
                }
            })
            .collect())
    }

    pub fn item_sizes<'de, D>(
        deserializer: D,
    ) -> std::result::Result<BTreeMap<ItemRef, ItemSize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, ItemSize>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, size)| match key.parse::<ItemRef>() {
                Ok(item) => Some((item, size)),
                Err(_) => {
                    tracing::warn!("Dropping size entry for unparseable reference {:?}", key);
                    None
                }
            })
            .collect())
    }

    #[derive(Deserialize)]
    struct RawStat {
        id: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        visible: Option<bool>,
    }

    pub fn visible_stats<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Vec<StatDescriptor>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<RawStat>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|stat| {
                let Some(id) = StatId::from_name(&stat.id) else {
                    tracing::warn!("Dropping unknown stat widget {:?}", stat.id);
                    return None;
                };
                let mut descriptor = StatDescriptor::new(id);
                if let Some(label) = stat.label {
                    descriptor.label = label;
                }
                descriptor.visible = stat.visible.unwrap_or(true);
                Some(descriptor)
            })
            .collect())
    }

    pub fn opt_visible_stats<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<Vec<StatDescriptor>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        visible_stats(deserializer).map(Some)
    }

    pub fn opt_item_order<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<Vec<ItemRef>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        item_order(deserializer).map(Some)
    }

    pub fn opt_item_sizes<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<BTreeMap<ItemRef, ItemSize>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        item_sizes(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        assert_eq!("repo-42".parse::<ItemRef>().unwrap(), ItemRef::Repo(42));
        assert_eq!(
            "text-1700000000000".parse::<ItemRef>().unwrap(),
            ItemRef::Text(1_700_000_000_000)
        );
        assert_eq!(
            "stat-commits".parse::<ItemRef>().unwrap(),
            ItemRef::Stat(StatId::Commits)
        );
        assert_eq!(ItemRef::Repo(7).to_string(), "repo-7");
        assert_eq!(ItemRef::Stat(StatId::Stars).to_string(), "stat-stars");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("repo-".parse::<ItemRef>().is_err());
        assert!("repo-abc".parse::<ItemRef>().is_err());
        assert!("stat-forks".parse::<ItemRef>().is_err());
        assert!("widget-1".parse::<ItemRef>().is_err());
    }

    #[test]
    fn test_serializes_as_string_key() {
        let mut sizes = BTreeMap::new();
        sizes.insert(
            ItemRef::Text(5),
            ItemSize {
                width: Some(320.0),
                height: None,
            },
        );
        let json = serde_json::to_string(&sizes).unwrap();
        assert_eq!(json, r#"{"text-5":{"width":320.0}}"#);
    }
}
