//! Rasterizer seam and a plain-text implementation

use std::fmt::Write;

use anyhow::Result;
use folio_core::{Geometry, PortfolioView, ResolvedItem, Width};

/// Turns a projected view into an image or document
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, view: &PortfolioView) -> Result<Vec<u8>>;
}

/// Draws a view as UTF-8 text, one block per card
pub struct TextRenderer {
    line_width: usize,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self { line_width: 72 }
    }

    pub fn with_line_width(line_width: usize) -> Self {
        Self {
            line_width: line_width.max(16),
        }
    }

    pub fn render(&self, view: &PortfolioView) -> Result<String> {
        let mut out = String::new();
        let tokens = view.layout;

        writeln!(
            out,
            "{} layout · {} theme · {} column(s) · padding {}px · gap {}px",
            tokens.layout, view.theme, tokens.grid_columns, tokens.card_padding, tokens.gap
        )?;
        writeln!(
            out,
            "palette: background {} · text {} · card {} · border {}",
            view.palette.background, view.palette.text, view.palette.card, view.palette.border
        )?;

        if !view.stats.is_empty() {
            let stats: Vec<String> = view
                .stats
                .iter()
                .map(|s| format!("{}: {}", s.widget.label, s.widget.value))
                .collect();
            writeln!(out)?;
            for row in stats.chunks(view.stats_columns.max(1)) {
                writeln!(out, "  {}", row.join("  |  "))?;
            }
        }

        if view.is_empty() {
            writeln!(out)?;
            writeln!(out, "  (no items)")?;
            return Ok(out);
        }

        for (index, projected) in view.items.iter().enumerate() {
            writeln!(out)?;
            writeln!(
                out,
                "[{}] {} · {}",
                index,
                projected.item.item_ref(),
                describe_geometry(&projected.geometry)
            )?;
            match &projected.item {
                ResolvedItem::Repo { data, .. } => {
                    let mut header = format!("  {} ★{}", data.name, data.stars);
                    if let Some(language) = &data.language {
                        write!(header, " · {}", language)?;
                    }
                    writeln!(out, "{}", header)?;
                    let budget = usize::from(tokens.description_lines);
                    for line in self.clip(&data.description, budget) {
                        writeln!(out, "    {}", line)?;
                    }
                }
                ResolvedItem::Text { data, .. } => {
                    writeln!(out, "  {}", data.title)?;
                    for line in data.content.lines() {
                        writeln!(out, "    {}", line)?;
                    }
                }
            }
        }

        Ok(out)
    }

    // Word-wrap to the line width and keep at most `max_lines`, marking a cut with "..."
    fn clip(&self, text: &str, max_lines: usize) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let needed = current.chars().count() + 1 + word.chars().count();
            if !current.is_empty() && needed > self.line_width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }

        if lines.len() > max_lines {
            lines.truncate(max_lines);
            if let Some(last) = lines.last_mut() {
                last.push_str("...");
            }
        }
        lines
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for TextRenderer {
    fn rasterize(&self, view: &PortfolioView) -> Result<Vec<u8>> {
        Ok(self.render(view)?.into_bytes())
    }
}

fn describe_geometry(geometry: &Geometry) -> String {
    let width = match geometry.width {
        Width::Auto => "auto".to_string(),
        Width::Full => "full".to_string(),
        Width::Px(px) => format!("{}px", px),
    };
    let height = match geometry.height {
        Some(px) => format!("{}px", px),
        None => "auto".to_string(),
    };
    format!("span {} · width {} · height {}", geometry.span, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{
        ItemRef, ItemSize, Layout, PortfolioConfig, Repository, StatsSnapshot, TextSection, Theme,
        view,
    };

    fn snapshot() -> StatsSnapshot {
        let mut repo = Repository::new(1, "folio");
        repo.stars = 5;
        repo.language = Some("Rust".to_string());
        repo.description = "word ".repeat(100);
        StatsSnapshot {
            repository_count: 1,
            total_stars: 5,
            repositories: vec![repo],
            ..StatsSnapshot::default()
        }
    }

    fn config(layout: Layout) -> PortfolioConfig {
        let mut config = PortfolioConfig::with_style(layout, Theme::Dark);
        config.pinned_repos = vec![1];
        config.custom_text_sections = vec![TextSection::placeholder(2)];
        config.item_order = vec![ItemRef::Text(2), ItemRef::Repo(1)];
        config
            .item_sizes
            .insert(ItemRef::Repo(1), ItemSize::new(320.0, 240.0));
        config
    }

    #[test]
    fn test_render_lists_items_in_order() {
        let snapshot = snapshot();
        let text = TextRenderer::new()
            .render(&view(&config(Layout::Default), Some(&snapshot)))
            .unwrap();

        assert!(text.starts_with("default layout · dark theme · 2 column(s)"));
        assert!(text.contains("Repos: 1  |  Stars: 5  |  Commits: 0"));
        let text_pos = text.find("[0] text-2").unwrap();
        let repo_pos = text.find("[1] repo-1").unwrap();
        assert!(text_pos < repo_pos);
        assert!(text.contains("folio ★5 · Rust"));
        assert!(text.contains("span 1 · width 320px · height 240px"));
    }

    #[test]
    fn test_description_follows_line_budget() {
        let snapshot = snapshot();
        let renderer = TextRenderer::new();
        let compact = renderer
            .render(&view(&config(Layout::Compact), Some(&snapshot)))
            .unwrap();
        let classic = renderer
            .render(&view(&config(Layout::Classic), Some(&snapshot)))
            .unwrap();

        let description_lines = |s: &str| s.lines().filter(|l| l.starts_with("    word")).count();
        assert_eq!(description_lines(&compact), 1);
        assert_eq!(description_lines(&classic), 3);
        assert!(compact.contains("..."));
    }

    #[test]
    fn test_empty_view() {
        let view = view(&PortfolioConfig::default(), None);
        let bytes = TextRenderer::new().rasterize(&view).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("(no items)"));
    }
}
