//! Statistics sources for folio
//!
//! A source produces a complete [`folio_core::StatsSnapshot`]; caching and
//! sync bookkeeping live in the engine.

pub mod file;
pub mod github;
pub mod handler;

pub use file::FileSource;
pub use github::{GitHubError, GitHubOptions, GitHubSource};
pub use handler::StatsSource;
