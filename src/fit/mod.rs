//! Model fitting.
//!
//! - Normalized IHT solver and its single-iteration step (`iht`, `step`)
//! - support-size sweeps over a range of `k` (`sweep`)
//! - dense OLS baseline with permutation importance (`baseline`)

pub mod baseline;
pub mod iht;
pub mod step;
pub mod sweep;

pub use baseline::*;
pub use iht::*;
pub use sweep::*;
