//! Application services layer.

pub mod blob;
pub mod error;
pub mod preview;
pub mod snapshots;
