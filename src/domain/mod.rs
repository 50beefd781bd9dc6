//! Domain layer types and invariants.

pub mod edits;
pub mod error;
pub mod page;
pub mod snapshots;
