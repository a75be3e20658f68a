//! Input/output helpers.
//!
//! - staged result artifacts for the bulk-load path (`stage`)
//! - fitting-input CSV ingest for offline runs (`ingest`)

pub mod ingest;
pub mod stage;

pub use ingest::*;
pub use stage::*;
