//! Oracle that rates a meta-path by a scoring function

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::rating::RatingFunction;
use super::Oracle;
use crate::candidate::CandidateId;

/// Rates candidates with a function of their representation
///
/// The first rating computed for an id is memoized and returned on every
/// later request for that id, so ratings stay stable across rounds even if
/// the function itself is not deterministic.
pub struct FunctionalOracle<M> {
    rating_fn: Box<dyn FnMut(&M) -> f64>,
    memo: HashMap<CandidateId, f64>,
}

impl<M> FunctionalOracle<M> {
    /// Wrap an arbitrary scoring function
    pub fn new<F>(rating_fn: F) -> Self
    where
        F: FnMut(&M) -> f64 + 'static,
    {
        Self {
            rating_fn: Box::new(rating_fn),
            memo: HashMap::new(),
        }
    }

    /// Use a built-in rating function over the path's labels
    ///
    /// `seed` only matters for [`RatingFunction::Randomly`].
    pub fn from_rating_function<T>(function: RatingFunction, seed: u64) -> Self
    where
        M: AsRef<[T]> + 'static,
        T: Hash + Eq + 'static,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new(move |mp: &M| function.apply(mp.as_ref(), &mut rng))
    }

    /// The memoized rating for `id`, if it has been rated
    pub fn memoized(&self, id: CandidateId) -> Option<f64> {
        self.memo.get(&id).copied()
    }

    /// Number of distinct candidates rated so far
    pub fn rated_count(&self) -> usize {
        self.memo.len()
    }
}

impl<M> Oracle<M> for FunctionalOracle<M> {
    fn rate(&mut self, id: CandidateId, meta_path: &M) -> f64 {
        if let Some(&rating) = self.memo.get(&id) {
            return rating;
        }
        let rating = (self.rating_fn)(meta_path);
        self.memo.insert(id, rating);
        rating
    }
}

impl<M> fmt::Debug for FunctionalOracle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalOracle")
            .field("rated", &self.memo.len())
            .finish()
    }
}
