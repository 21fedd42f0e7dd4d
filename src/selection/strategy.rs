//! Active learning strategies for choosing the next candidates to rate
//!
//! # Available Strategies
//!
//! - **Random**: uniform sampling over unrated candidates, no hypothesis
//! - **RandomCriterion**: fresh random scores fed through the diversity step
//! - **UncertaintySampling**: highest predictive uncertainty first
//! - **GpSelect**: `sqrt(beta) * uncertainty + predicted rating`
//!
//! Every strategy except `Random` hands its criterion to
//! [`greedy_diverse_select`].
//!
//! # Example
//!
//! ```rust,ignore
//! use metaexp::selection::{SelectionStrategy, StrategyKind};
//!
//! let kind: StrategyKind = "gp_select".parse()?;
//! let strategy = SelectionStrategy::from_kind(kind, 0.5)?;
//! let batch = strategy.select(&store, Some(&*hypothesis), 5, &mut rng)?;
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::diversity::greedy_diverse_select;
use crate::candidate::{CandidateId, CandidateStore};
use crate::error::{ConfigError, MetaExpError, MetaExpResult};
use crate::hypothesis::Hypothesis;

/// Default exploration weight for [`SelectionStrategy::GpSelect`]
pub const DEFAULT_BETA: f64 = 0.5;

/// Registry of selectable strategy names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    RandomCriterion,
    UncertaintySampling,
    GpSelect,
}

impl StrategyKind {
    /// Every registered strategy
    pub const ALL: [StrategyKind; 4] = [
        Self::Random,
        Self::RandomCriterion,
        Self::UncertaintySampling,
        Self::GpSelect,
    ];

    /// Canonical registry name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::RandomCriterion => "random_criterion",
            Self::UncertaintySampling => "uncertainty_sampling",
            Self::GpSelect => "gp_select",
        }
    }

    /// Human-readable name, also accepted by [`from_name`](Self::from_name)
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Random => "Random",
            Self::RandomCriterion => "Random Criterion",
            Self::UncertaintySampling => "Uncertainty Sampling",
            Self::GpSelect => "GP-Select",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Random => "Sample unrated candidates uniformly at random",
            Self::RandomCriterion => "Random scores with diversity suppression (ablation)",
            Self::UncertaintySampling => "Rate the candidates the model is least sure about",
            Self::GpSelect => "Trade off predicted rating against model uncertainty",
        }
    }

    /// Whether the strategy needs a hypothesis and a refit after each round
    pub fn is_hypothesis_driven(&self) -> bool {
        !matches!(self, Self::Random)
    }

    /// Canonical names of all registered strategies
    pub fn available() -> Vec<String> {
        Self::ALL.iter().map(|k| k.name().to_string()).collect()
    }

    /// Resolve a strategy by canonical or display name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| {
                k.name().eq_ignore_ascii_case(wanted) || k.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ConfigError::UnknownStrategy {
                name: name.to_string(),
                available: Self::available(),
            })
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        Self::Random
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A configured selection strategy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Uniform sampling over unrated candidates; no diversity step
    Random,

    /// Independent uniform score per candidate per round
    ///
    /// Exercises the diversity machinery without an exploitation signal.
    RandomCriterion,

    /// Hypothesis uncertainty alone (pure exploration)
    UncertaintySampling,

    /// Exploration/exploitation trade-off
    GpSelect {
        /// Non-negative exploration weight; `0.0` is pure exploitation
        beta: f64,
    },
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::Random
    }
}

impl SelectionStrategy {
    /// Create an exploration/exploitation strategy
    pub fn gp_select(beta: f64) -> Self {
        Self::GpSelect { beta }
    }

    /// Instantiate a registered strategy; `beta` only affects `GpSelect`
    pub fn from_kind(kind: StrategyKind, beta: f64) -> Result<Self, ConfigError> {
        Ok(match kind {
            StrategyKind::Random => Self::Random,
            StrategyKind::RandomCriterion => Self::RandomCriterion,
            StrategyKind::UncertaintySampling => Self::UncertaintySampling,
            StrategyKind::GpSelect => {
                if !beta.is_finite() || beta < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "beta must be a non-negative number, got {}",
                        beta
                    )));
                }
                Self::GpSelect { beta }
            }
        })
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Random => StrategyKind::Random,
            Self::RandomCriterion => StrategyKind::RandomCriterion,
            Self::UncertaintySampling => StrategyKind::UncertaintySampling,
            Self::GpSelect { .. } => StrategyKind::GpSelect,
        }
    }

    pub fn is_hypothesis_driven(&self) -> bool {
        self.kind().is_hypothesis_driven()
    }

    /// Per-candidate criterion over all `total` candidates
    ///
    /// For `Random` this is the sampling mass: `1 / |eligible|` on eligible
    /// ids and zero elsewhere.
    pub fn criterion<R>(
        &self,
        total: usize,
        eligible: &[CandidateId],
        hypothesis: Option<&dyn Hypothesis>,
        rng: &mut R,
    ) -> MetaExpResult<Vec<f64>>
    where
        R: Rng + ?Sized,
    {
        let all: Vec<CandidateId> = (0..total).map(CandidateId).collect();
        let scores = match self {
            Self::Random => {
                let mut mass = vec![0.0; total];
                if !eligible.is_empty() {
                    let p = 1.0 / eligible.len() as f64;
                    for id in eligible {
                        if let Some(m) = mass.get_mut(id.0) {
                            *m = p;
                        }
                    }
                }
                mass
            }
            Self::RandomCriterion => (0..total).map(|_| rng.gen::<f64>()).collect(),
            Self::UncertaintySampling => {
                let h = self.require(hypothesis)?;
                checked(h.uncertainty(&all), total)?
            }
            Self::GpSelect { beta } => {
                let h = self.require(hypothesis)?;
                let uncertainty = checked(h.uncertainty(&all), total)?;
                let predicted = checked(h.predict_rating(&all), total)?;
                let weight = beta.sqrt();
                uncertainty
                    .iter()
                    .zip(predicted.iter())
                    .map(|(u, p)| weight * u + p)
                    .collect()
            }
        };
        Ok(scores)
    }

    /// Choose up to `batch_size` distinct unrated candidates
    pub fn select<M, R>(
        &self,
        store: &CandidateStore<M>,
        hypothesis: Option<&dyn Hypothesis>,
        batch_size: usize,
        rng: &mut R,
    ) -> MetaExpResult<Vec<CandidateId>>
    where
        R: Rng + ?Sized,
    {
        let eligible = store.not_visited_ids();
        if eligible.is_empty() || batch_size == 0 {
            return Ok(Vec::new());
        }

        match self {
            Self::Random => Ok(eligible
                .choose_multiple(rng, batch_size.min(eligible.len()))
                .copied()
                .collect()),
            _ => {
                let h = self.require(hypothesis)?;
                let criterion = self.criterion(store.len(), &eligible, Some(h), rng)?;
                greedy_diverse_select(&criterion, &eligible, h.similarity(), batch_size, rng)
            }
        }
    }

    fn require<'a>(&self, hypothesis: Option<&'a dyn Hypothesis>) -> MetaExpResult<&'a dyn Hypothesis> {
        hypothesis.ok_or_else(|| ConfigError::MissingHypothesis(self.kind().name().to_string()).into())
    }
}

fn checked(values: Vec<f64>, total: usize) -> MetaExpResult<Vec<f64>> {
    if values.len() != total {
        return Err(MetaExpError::DimensionMismatch {
            expected: total,
            actual: values.len(),
        });
    }
    Ok(values)
}
