//! Numerical building blocks: top-k selection, dense helpers, least squares,
//! and regression metrics.

pub mod linalg;
pub mod metrics;
pub mod ols;
pub mod topk;

pub use linalg::*;
pub use metrics::*;
pub use ols::*;
pub use topk::*;
