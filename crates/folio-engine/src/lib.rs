//! Orchestration for folio
//!
//! Ties the edit session to storage, stats sources and renderers.

pub mod render;
pub mod stats;
pub mod studio;

pub use render::{Rasterizer, TextRenderer};
pub use stats::{StatsHandle, StatsState};
pub use studio::Studio;
