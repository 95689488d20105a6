//! Input/output helpers.
//!
//! - TOML run configuration (`config`)
//! - JSON result exports (`export`)

pub mod config;
pub mod export;

pub use config::*;
pub use export::*;
