//! Row mapping between SQLite and core types

use folio_core::{ExportFormat, ExportPayload, ExportRecord, ExportSummary};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use time::OffsetDateTime;

use crate::Result;

/// Timestamps are stored as unix nanoseconds so they sort numerically
pub(crate) fn to_nanos(at: OffsetDateTime) -> i64 {
    i64::try_from(at.unix_timestamp_nanos()).unwrap_or(i64::MAX)
}

pub(crate) fn from_nanos(nanos: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
        .map_err(|e| anyhow::anyhow!("Invalid stored timestamp {}: {}", nanos, e).into())
}

pub(crate) fn export_from_row(row: &SqliteRow) -> Result<ExportRecord> {
    let payload: String = row.get("payload");
    let payload: ExportPayload = serde_json::from_str(&payload)?;
    Ok(ExportRecord {
        id: row.get("id"),
        tag: row.get("tag"),
        payload,
        render_hash: row.get("render_hash"),
        created_at: from_nanos(row.get("created_at"))?,
    })
}

pub(crate) fn summary_from_row(row: &SqliteRow) -> Result<ExportSummary> {
    let format: String = row.get("format");
    Ok(ExportSummary {
        id: row.get("id"),
        tag: row.get("tag"),
        format: format.parse::<ExportFormat>()?,
        created_at: from_nanos(row.get("created_at"))?,
    })
}
