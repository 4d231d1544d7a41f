//! Core data models for the ladder tracker.

mod ids;
mod matches;
mod rank;
mod roster;
mod stats;

pub use ids::*;
pub use matches::*;
pub use rank::*;
pub use roster::*;
pub use stats::*;
