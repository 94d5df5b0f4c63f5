use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use folio_core::{ExportFormat, ItemRef, Layout, StatId, Theme};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Design and export a GitHub portfolio", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or sync GitHub statistics
    #[command(subcommand)]
    Stats(StatsCommands),

    /// Edit the portfolio design
    #[command(subcommand)]
    Design(DesignCommands),

    /// Manage saved exports
    #[command(subcommand)]
    Export(ExportCommands),

    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Show cached statistics
    Show,

    /// Pull fresh statistics from GitHub
    Sync {
        /// Import a JSON snapshot instead of calling GitHub
        #[arg(long)]
        from: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DesignCommands {
    /// Preview the portfolio
    Show,

    /// Set the layout (default, classic, compact)
    Layout { layout: Layout },

    /// Set the theme (light, dark, system, blue, pink)
    Theme { theme: Theme },

    /// Pin a repository by GitHub id
    Pin { id: u64 },

    /// Unpin a repository
    Unpin { id: u64 },

    /// List repositories that can be pinned
    Repos {
        /// Filter by name or description
        #[arg(long)]
        query: Option<String>,
    },

    /// Manage custom text sections
    #[command(subcommand)]
    Text(TextCommands),

    /// Move an item in the display order
    Move { from: usize, to: usize },

    /// Move a stat widget
    StatMove { from: usize, to: usize },

    /// Show or hide a stat widget
    StatToggle { id: StatId },

    /// Hide a stat widget
    StatHide { id: StatId },

    /// Resize an item (e.g. repo-123, text-456, stat-stars)
    Resize {
        item: ItemRef,
        width: f64,
        height: f64,
    },
}

#[derive(Subcommand)]
pub enum TextCommands {
    /// Add a text section
    Add {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Edit a text section
    Edit {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a text section
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Save the current design as a tagged export
    Save {
        tag: String,

        #[arg(long, default_value = "png")]
        format: ExportFormat,
    },

    /// List exports, newest first
    List,

    /// Render a saved export
    Show { id: String },

    /// Delete an export
    Delete {
        id: String,

        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_typed_arguments() {
        let cli =
            Cli::try_parse_from(["folio", "design", "resize", "repo-42", "320", "200"]).unwrap();
        match cli.command {
            Commands::Design(DesignCommands::Resize { item, width, height }) => {
                assert_eq!(item, ItemRef::Repo(42));
                assert_eq!((width, height), (320.0, 200.0));
            }
            _ => panic!("expected resize"),
        }

        let cli =
            Cli::try_parse_from(["folio", "export", "save", "v1", "--format", "pdf"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export(ExportCommands::Save {
                format: ExportFormat::Pdf,
                ..
            })
        ));

        assert!(Cli::try_parse_from(["folio", "design", "theme", "neon"]).is_err());
        assert!(Cli::try_parse_from(["folio", "design", "stat-hide", "forks"]).is_err());
    }
}
