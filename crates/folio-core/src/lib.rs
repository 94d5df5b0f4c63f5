//! Core domain models and logic for folio
//!
//! This crate contains:
//! - Domain models (PortfolioConfig, StatsSnapshot, ItemRef)
//! - Resolution and layout projection (deterministic view generation)
//! - The edit session and its interaction state machine
//! - Persistence-boundary validation

pub mod error;
pub mod export;
pub mod interaction;
pub mod item_ref;
pub mod order;
pub mod outcome;
pub mod portfolio;
pub mod project;
pub mod resolve;
pub mod session;
pub mod snapshot;
pub mod validate;

pub use error::{CoreError, Result};
pub use export::{ExportFormat, ExportPayload, ExportRecord, ExportSummary};
pub use interaction::{DragList, Interaction, Pointer};
pub use item_ref::{ItemKind, ItemRef};
pub use order::{move_item, reconcile_order};
pub use outcome::Outcome;
pub use portfolio::{
    ConfigPatch, ItemSize, Layout, PortfolioConfig, StatDescriptor, StatId, TextSection, Theme,
};
pub use project::{Geometry, PortfolioView, ProjectedItem, ProjectedStat, Width, project, view};
pub use resolve::{Resolution, ResolvedItem, StatWidget, resolve};
pub use session::{EditSession, TextField};
pub use snapshot::{Repository, StatsSnapshot};
pub use validate::{validate_config, validate_tag};
