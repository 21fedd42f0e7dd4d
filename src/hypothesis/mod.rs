//! The predictive-model boundary
//!
//! Selection strategies consume a [`Hypothesis`]: any model that can be refit
//! on the rated candidates and then predict a rating and an uncertainty for
//! every candidate, rated or not. The model itself lives outside this crate;
//! callers register constructors for their models in a [`HypothesisRegistry`]
//! and the engine resolves one by name at configuration time.

mod registry;
mod similarity;

pub use registry::{HypothesisFactory, HypothesisRegistry};
pub use similarity::SimilarityMatrix;

use crate::candidate::CandidateId;
use crate::error::MetaExpResult;

/// Contract an external predictive model must satisfy
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct MeanModel { mean: f64, sim: SimilarityMatrix }
///
/// impl Hypothesis for MeanModel {
///     fn update(&mut self, _ids: &[CandidateId], ratings: &[f64]) -> MetaExpResult<()> {
///         self.mean = ratings.iter().sum::<f64>() / ratings.len().max(1) as f64;
///         Ok(())
///     }
///     fn predict_rating(&self, ids: &[CandidateId]) -> Vec<f64> { vec![self.mean; ids.len()] }
///     fn uncertainty(&self, ids: &[CandidateId]) -> Vec<f64> { vec![1.0; ids.len()] }
///     fn similarity(&self) -> &SimilarityMatrix { &self.sim }
/// }
/// ```
pub trait Hypothesis {
    /// Refit from scratch on exactly the given rated pairs
    ///
    /// Called once per round with the full visited set; implementations must
    /// not accumulate state across calls.
    fn update(&mut self, visited: &[CandidateId], ratings: &[f64]) -> MetaExpResult<()>;

    /// Point estimate of the rating for each id, including never-rated ones
    fn predict_rating(&self, ids: &[CandidateId]) -> Vec<f64>;

    /// Non-negative predictive uncertainty for each id
    fn uncertainty(&self, ids: &[CandidateId]) -> Vec<f64>;

    /// Pairwise similarity between all candidates, indexed by id
    fn similarity(&self) -> &SimilarityMatrix;
}

impl<H: Hypothesis + ?Sized> Hypothesis for Box<H> {
    fn update(&mut self, visited: &[CandidateId], ratings: &[f64]) -> MetaExpResult<()> {
        (**self).update(visited, ratings)
    }

    fn predict_rating(&self, ids: &[CandidateId]) -> Vec<f64> {
        (**self).predict_rating(ids)
    }

    fn uncertainty(&self, ids: &[CandidateId]) -> Vec<f64> {
        (**self).uncertainty(ids)
    }

    fn similarity(&self) -> &SimilarityMatrix {
        (**self).similarity()
    }
}

/// Prelude for hypothesis types
pub mod prelude {
    pub use super::{Hypothesis, HypothesisFactory, HypothesisRegistry, SimilarityMatrix};
}
