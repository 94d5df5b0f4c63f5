//! Storage layer for folio
//!
//! This crate provides:
//! - SQLite database operations
//! - Per-owner portfolio configuration, cached stats and exports
//! - Migrations

pub mod db;
pub mod error;
pub mod models;

pub use db::Storage;
pub use error::{Result, StorageError};
