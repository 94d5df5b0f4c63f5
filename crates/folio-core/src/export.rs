//! Saved exports of a portfolio

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::portfolio::PortfolioConfig;
use crate::project::{PortfolioView, view};
use crate::snapshot::StatsSnapshot;
use crate::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(CoreError::Validation(format!(
                "unknown export format '{}'",
                other
            ))),
        }
    }
}

/// What gets stored with an export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub config: PortfolioConfig,
    #[serde(with = "time::serde::rfc3339")]
    pub exported_at: OffsetDateTime,
}

impl ExportPayload {
    pub fn new(format: ExportFormat, config: PortfolioConfig) -> Self {
        Self {
            format,
            config,
            exported_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub id: String,
    pub tag: String,
    pub payload: ExportPayload,
    /// Digest of the projected view at export time
    pub render_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ExportRecord {
    /// Project the saved configuration against `snapshot`.
    ///
    /// Uses the same resolve and project path as the live preview, so an
    /// export taken from an unchanged snapshot renders identically.
    pub fn view(&self, snapshot: Option<&StatsSnapshot>) -> PortfolioView {
        view(&self.payload.config, snapshot)
    }

    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            id: self.id.clone(),
            tag: self.tag.clone(),
            format: self.payload.format,
            created_at: self.created_at,
        }
    }
}

/// Listing entry for an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub id: String,
    pub tag: String,
    pub format: ExportFormat,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
