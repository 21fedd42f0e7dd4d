//! Rating sources for offline evaluation
//!
//! An [`Oracle`] stands in for the analyst: it rates every candidate of a
//! batch independently. Two oracles are provided:
//!
//! - [`FunctionalOracle`]: rates by applying a function to the meta-path
//!   itself, memoizing the first answer per candidate
//! - [`GroundTruthOracle`]: replays a previously recorded rating session

pub mod functional;
pub mod ground_truth;
pub mod rating;

pub use functional::FunctionalOracle;
pub use ground_truth::{GroundTruthOptions, GroundTruthOracle};
pub use rating::RatingFunction;

use crate::candidate::{CandidateId, Feedback, Rating};
use crate::engine::BatchEntry;

/// A source of ratings driving the selection loop
pub trait Oracle<M> {
    /// Rate a single candidate
    fn rate(&mut self, id: CandidateId, meta_path: &M) -> f64;

    /// Rate every entry of a batch independently
    fn rate_batch(&mut self, batch: &[BatchEntry<M>]) -> Feedback {
        batch
            .iter()
            .map(|entry| Rating::new(entry.id, self.rate(entry.id, &entry.meta_path)))
            .collect()
    }

    /// Whether the oracle is willing to rate another batch
    ///
    /// Checked by the driving loop; the engine never consults it.
    fn wants_to_continue(&self) -> bool {
        true
    }
}

/// Prelude for oracle types
pub mod prelude {
    pub use super::{FunctionalOracle, GroundTruthOptions, GroundTruthOracle, Oracle, RatingFunction};
}
