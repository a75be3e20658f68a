//! Domain types used throughout the run engine.
//!
//! This module defines:
//!
//! - the run window and its natural-key semantics (`Window`)
//! - fitting input rows as delivered by the warehouse feed (`LogitInputRow`)
//! - fit outputs at term and run granularity (`TrendFit`, `TermFit`,
//!   `TermTrendResult`)
//! - run configuration resolved from CLI flags and environment (`RunConfig`)

pub mod types;

pub use types::*;
