//! `fes-iht` library crate.
//!
//! The binary (`fes`) is a thin wrapper around this library so that:
//!
//! - the solver is testable without spawning processes
//! - the IHT solver can be used on its own (`fit::IhtSolver`)
//! - data generation, evaluation, and presentation stay in separate modules

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
