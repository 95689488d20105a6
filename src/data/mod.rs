//! Test fixtures: synthetic regression data with known sparse ground truth.

pub mod synthetic;

pub use synthetic::*;
