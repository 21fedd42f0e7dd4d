//! Dense pairwise similarity matrix

use serde::{Deserialize, Serialize};

use crate::error::{MetaExpError, MetaExpResult};

/// Row-major `n x n` similarity matrix aligned to candidate ids
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Wrap row-major values; fails unless there are exactly `n * n` of them
    pub fn new(n: usize, values: Vec<f64>) -> MetaExpResult<Self> {
        if values.len() != n * n {
            return Err(MetaExpError::DimensionMismatch {
                expected: n * n,
                actual: values.len(),
            });
        }
        Ok(Self { n, values })
    }

    /// Build a matrix by evaluating `f(i, j)` for every pair
    pub fn from_fn<F>(n: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut values = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                values.push(f(i, j));
            }
        }
        Self { n, values }
    }

    /// Identity similarity: every candidate is only similar to itself
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    /// Number of candidates covered
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tolerance))
    }
}
