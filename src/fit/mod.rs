//! Trend fitting.
//!
//! Responsibilities:
//!
//! - fit one logistic growth model per term (`glm`)
//! - drive the fitter across every distinct term, isolating per-term
//!   failures (`batch`)

pub mod batch;
pub mod glm;

pub use batch::*;
pub use glm::*;
