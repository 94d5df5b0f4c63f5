//! Limits enforced where configurations and exports are persisted
//!
//! The edit session never calls into this module. A rejected save reaches
//! the caller as [`CoreError::Validation`] and the in-memory edits survive.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{CoreError, Result};
use crate::portfolio::{
    MAX_CONTENT_CHARS, MAX_PINNED_REPOS, MAX_TEXT_SECTIONS, MAX_TITLE_CHARS, PortfolioConfig,
    STAT_COUNT,
};

pub const MAX_TAG_CHARS: usize = 100;

lazy_static! {
    static ref TAG_CHARS: Regex = Regex::new(r"^[a-zA-Z0-9\s\-_.,!?()]+$").unwrap();
}

/// Check a configuration against the storage limits
pub fn validate_config(config: &PortfolioConfig) -> Result<()> {
    if config.pinned_repos.len() > MAX_PINNED_REPOS {
        return Err(invalid(format!(
            "at most {} repositories can be pinned",
            MAX_PINNED_REPOS
        )));
    }
    if let Some(id) = first_duplicate(config.pinned_repos.iter()) {
        return Err(invalid(format!("repository {} is pinned twice", id)));
    }

    if config.custom_text_sections.len() > MAX_TEXT_SECTIONS {
        return Err(invalid(format!(
            "at most {} text sections are allowed",
            MAX_TEXT_SECTIONS
        )));
    }
    if let Some(id) = first_duplicate(config.custom_text_sections.iter().map(|s| s.id)) {
        return Err(invalid(format!("text section id {} is used twice", id)));
    }
    for section in &config.custom_text_sections {
        if section.title.trim().is_empty() {
            return Err(invalid(format!("text section {} has an empty title", section.id)));
        }
        if section.title.chars().count() > MAX_TITLE_CHARS {
            return Err(invalid(format!(
                "text section {} title exceeds {} characters",
                section.id, MAX_TITLE_CHARS
            )));
        }
        if section.content.chars().count() > MAX_CONTENT_CHARS {
            return Err(invalid(format!(
                "text section {} content exceeds {} characters",
                section.id, MAX_CONTENT_CHARS
            )));
        }
    }

    if config.visible_stats.len() > STAT_COUNT {
        return Err(invalid(format!("at most {} stats are allowed", STAT_COUNT)));
    }
    if let Some(id) = first_duplicate(config.visible_stats.iter().map(|s| s.id)) {
        return Err(invalid(format!("stat {} is listed twice", id)));
    }

    Ok(())
}

/// Trim and check an export tag, returning the trimmed form
pub fn validate_tag(tag: &str) -> Result<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(invalid("export tag cannot be empty".to_string()));
    }
    if tag.chars().count() > MAX_TAG_CHARS {
        return Err(invalid(format!(
            "export tag exceeds {} characters",
            MAX_TAG_CHARS
        )));
    }
    if !TAG_CHARS.is_match(tag) {
        return Err(invalid(
            "export tag may only contain letters, digits, spaces and - _ . , ! ? ( )".to_string(),
        ));
    }
    Ok(tag.to_string())
}

fn first_duplicate<T, I>(values: I) -> Option<T>
where
    T: std::hash::Hash + Eq + Copy,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    values.into_iter().find(|v| !seen.insert(*v))
}

fn invalid(message: String) -> CoreError {
    CoreError::Validation(message)
}
