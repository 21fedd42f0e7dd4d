//! Greedy diversity-aware batch selection
//!
//! All hypothesis-driven strategies funnel through [`greedy_diverse_select`]:
//! repeatedly take the eligible candidate with the highest criterion, then
//! hide the candidates most similar to it for the rest of the round.

use rand::Rng;

use crate::candidate::CandidateId;
use crate::error::{MetaExpError, MetaExpResult};
use crate::hypothesis::SimilarityMatrix;

/// Number of near-duplicates suppressed after each pick
///
/// Fixed per round from the total candidate count, not from the shrinking
/// eligible pool: `floor(total / batch_size) - 1`, saturating at zero.
pub fn diversity_quota(total: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    (total / batch_size).saturating_sub(1)
}

/// Pick up to `batch_size` distinct ids from `eligible`
///
/// `criterion` and `similarity` cover every candidate (`criterion.len()` is
/// the total count). Ties on the criterion are broken uniformly at random;
/// NaN scores rank below everything. Suppressed candidates are only hidden
/// inside this call. When the pool runs dry the result is simply shorter.
pub fn greedy_diverse_select<R>(
    criterion: &[f64],
    eligible: &[CandidateId],
    similarity: &SimilarityMatrix,
    batch_size: usize,
    rng: &mut R,
) -> MetaExpResult<Vec<CandidateId>>
where
    R: Rng + ?Sized,
{
    let total = criterion.len();
    if similarity.len() != total {
        return Err(MetaExpError::DimensionMismatch {
            expected: total,
            actual: similarity.len(),
        });
    }
    if let Some(bad) = eligible.iter().find(|id| id.0 >= total) {
        return Err(MetaExpError::DimensionMismatch {
            expected: total,
            actual: bad.0 + 1,
        });
    }

    let score = |id: CandidateId| {
        let c = criterion[id.0];
        if c.is_nan() {
            f64::NEG_INFINITY
        } else {
            c
        }
    };

    let quota = diversity_quota(total, batch_size);
    let mut pool: Vec<CandidateId> = eligible.to_vec();
    let mut picked = Vec::with_capacity(batch_size.min(pool.len()));

    while picked.len() < batch_size && !pool.is_empty() {
        let best = pool
            .iter()
            .map(|&id| score(id))
            .fold(f64::NEG_INFINITY, f64::max);
        let maximizers: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, &id)| score(id) == best)
            .map(|(pos, _)| pos)
            .collect();

        let chosen = pool.remove(maximizers[rng.gen_range(0..maximizers.len())]);
        picked.push(chosen);

        if quota > 0 && pool.len() > quota {
            let row = similarity.row(chosen.0);
            pool.sort_by(|a, b| row[b.0].total_cmp(&row[a.0]).then(a.cmp(b)));
            pool.drain(..quota);
            pool.sort();
        }
    }

    Ok(picked)
}
