//! trellis-core library.
//!
//! A three-level task tree (category, task, subtask) with 0-100 completion,
//! an append-only work-log ledger, and a SQLite-backed consistency engine
//! that keeps sibling order and aggregate completion correct under
//! concurrent callers.
//!
//! # Conventions
//!
//! - **Errors**: engine operations return [`error::StoreError`]; setup and
//!   plumbing paths use `anyhow::Result`.
//! - **Logging**: `tracing` macros (`warn!`, `debug!`) with structured
//!   fields.

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod store;
pub mod visibility;

pub use error::{Result, StoreError};
pub use store::Store;
