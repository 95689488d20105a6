//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration (`RunConfig`, `DataConfig`, `SolverSection`, `PermImportanceConfig`)
//! - generator options (`DataKind`, `FeatureFill`)
//! - fixtures and outputs (`Dataset`, `SelectionSummary`)

pub mod types;

pub use types::*;
