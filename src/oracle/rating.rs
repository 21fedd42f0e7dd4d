//! Synthetic rating functions over a meta-path's labels

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::ConfigError;

/// Rating assigned by [`RatingFunction::Constant`]
pub const CONSTANT_RATING: f64 = 0.5;

/// Built-in scoring functions for the functional oracle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingFunction {
    /// Every path rates 0.5
    #[default]
    Constant,
    /// Shorter paths rate higher: `1 / length`
    LengthBased,
    /// Normalized Shannon entropy of the path's labels
    Entropy,
    /// Uniform draw from `[0, 1)`
    Randomly,
}

impl RatingFunction {
    pub const ALL: [RatingFunction; 4] = [
        Self::Constant,
        Self::LengthBased,
        Self::Entropy,
        Self::Randomly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::LengthBased => "length_based",
            Self::Entropy => "entropy",
            Self::Randomly => "randomly",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownRatingFunction {
                name: name.to_string(),
                available: Self::ALL.iter().map(|f| f.name().to_string()).collect(),
            })
    }

    /// Score a path given as its sequence of type labels
    pub fn apply<T, R>(&self, labels: &[T], rng: &mut R) -> f64
    where
        T: Hash + Eq,
        R: Rng + ?Sized,
    {
        match self {
            Self::Constant => CONSTANT_RATING,
            Self::LengthBased => {
                if labels.is_empty() {
                    0.0
                } else {
                    1.0 / labels.len() as f64
                }
            }
            Self::Entropy => normalized_entropy(labels),
            Self::Randomly => rng.gen::<f64>(),
        }
    }
}

/// Shannon entropy of the label distribution divided by its maximum
fn normalized_entropy<T: Hash + Eq>(labels: &[T]) -> f64 {
    if labels.len() < 2 {
        return 0.0;
    }
    let mut counts: HashMap<&T, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let n = labels.len() as f64;
    let entropy: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum();
    entropy / n.log2()
}
