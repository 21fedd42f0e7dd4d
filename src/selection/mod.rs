//! Selection strategies
//!
//! A strategy turns the current candidate state (and, for most variants, a
//! fitted [`Hypothesis`](crate::hypothesis::Hypothesis)) into the next batch
//! of unrated candidates to show the analyst.

pub mod baseline;
pub mod diversity;
pub mod strategy;

pub use baseline::baseline_predictions;
pub use diversity::{diversity_quota, greedy_diverse_select};
pub use strategy::{SelectionStrategy, StrategyKind, DEFAULT_BETA};

/// Prelude for selection types
pub mod prelude {
    pub use super::diversity::{diversity_quota, greedy_diverse_select};
    pub use super::strategy::{SelectionStrategy, StrategyKind, DEFAULT_BETA};
}
