pub mod design;
pub mod export;
pub mod stats;

use anyhow::Result;
use folio_core::Outcome;

/// Unwrap an outcome, turning a failure into an error for the process exit code
pub fn expect_success<T>(outcome: Outcome<T>, action: &str) -> Result<T> {
    match (outcome.success, outcome.data) {
        (true, Some(data)) => Ok(data),
        (true, None) => anyhow::bail!("{} returned no data", action),
        (false, _) => anyhow::bail!(
            "{} failed: {}",
            action,
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }
}
