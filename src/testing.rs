//! Hypothesis doubles shared by the unit tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::candidate::CandidateId;
use crate::error::{MetaExpError, MetaExpResult};
use crate::hypothesis::{Hypothesis, SimilarityMatrix};

/// Returns fixed predictions and uncertainties; records every refit
#[derive(Clone, Debug)]
pub struct ScriptedHypothesis {
    pub predictions: Vec<f64>,
    pub uncertainties: Vec<f64>,
    pub similarity: SimilarityMatrix,
    pub fits: Rc<RefCell<Vec<(Vec<CandidateId>, Vec<f64>)>>>,
    /// While set, every refit returns an error
    pub fail_fit: Rc<Cell<bool>>,
}

impl ScriptedHypothesis {
    pub fn new(predictions: Vec<f64>, uncertainties: Vec<f64>) -> Self {
        let n = predictions.len();
        Self {
            predictions,
            uncertainties,
            similarity: SimilarityMatrix::identity(n),
            fits: Rc::new(RefCell::new(Vec::new())),
            fail_fit: Rc::new(Cell::new(false)),
        }
    }
}

impl Hypothesis for ScriptedHypothesis {
    fn update(&mut self, visited: &[CandidateId], ratings: &[f64]) -> MetaExpResult<()> {
        if self.fail_fit.get() {
            return Err(MetaExpError::Hypothesis("fit failed".into()));
        }
        self.fits
            .borrow_mut()
            .push((visited.to_vec(), ratings.to_vec()));
        Ok(())
    }

    fn predict_rating(&self, ids: &[CandidateId]) -> Vec<f64> {
        ids.iter().map(|id| self.predictions[id.0]).collect()
    }

    fn uncertainty(&self, ids: &[CandidateId]) -> Vec<f64> {
        ids.iter().map(|id| self.uncertainties[id.0]).collect()
    }

    fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}

/// Candidates placed on a line; similarity decays with distance
///
/// Predictions are similarity-weighted means of the rated neighbours and
/// uncertainty is one minus the similarity to the closest rated candidate.
#[derive(Clone, Debug)]
pub struct LineHypothesis {
    similarity: SimilarityMatrix,
    rated: Vec<(CandidateId, f64)>,
    prior: f64,
}

impl LineHypothesis {
    pub fn new(positions: &[f64]) -> Self {
        let similarity = SimilarityMatrix::from_fn(positions.len(), |i, j| {
            (-(positions[i] - positions[j]).abs()).exp()
        });
        Self {
            similarity,
            rated: Vec::new(),
            prior: 0.5,
        }
    }
}

impl Hypothesis for LineHypothesis {
    fn update(&mut self, visited: &[CandidateId], ratings: &[f64]) -> MetaExpResult<()> {
        self.rated = visited.iter().copied().zip(ratings.iter().copied()).collect();
        Ok(())
    }

    fn predict_rating(&self, ids: &[CandidateId]) -> Vec<f64> {
        ids.iter()
            .map(|id| {
                if self.rated.is_empty() {
                    return self.prior;
                }
                let (num, den) = self.rated.iter().fold((0.0, 0.0), |(num, den), (k, r)| {
                    let w = self.similarity.get(id.0, k.0);
                    (num + w * r, den + w)
                });
                num / den
            })
            .collect()
    }

    fn uncertainty(&self, ids: &[CandidateId]) -> Vec<f64> {
        ids.iter()
            .map(|id| {
                let closest = self
                    .rated
                    .iter()
                    .map(|(k, _)| self.similarity.get(id.0, k.0))
                    .fold(0.0, f64::max);
                1.0 - closest
            })
            .collect()
    }

    fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}
