//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MetaExpResult};
use crate::selection::{SelectionStrategy, StrategyKind, DEFAULT_BETA};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// Provisional rating shown for candidates that have not been rated yet
pub const STANDARD_RATING: f64 = 0.5;

/// What to do with feedback naming an already-rated candidate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackPolicy {
    /// Reject the whole submission
    #[default]
    Reject,
    /// Replace the stored rating; duplicate ids in one submission keep the last
    Overwrite,
}

/// Configuration for an [`Engine`](super::Engine)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Selection strategy
    pub strategy: StrategyKind,
    /// Registry name of the hypothesis; required by hypothesis-driven strategies
    #[serde(default)]
    pub hypothesis: Option<String>,
    /// Exploration weight for `gp_select`
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Seed for tie-breaking and random strategies
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Provisional rating attached to every batch entry
    #[serde(default = "default_standard_rating")]
    pub standard_rating: f64,
    /// Handling of re-rated candidates
    #[serde(default)]
    pub feedback_policy: FeedbackPolicy,
}

fn default_beta() -> f64 {
    DEFAULT_BETA
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_standard_rating() -> f64 {
    STANDARD_RATING
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Random,
            hypothesis: None,
            beta: DEFAULT_BETA,
            seed: DEFAULT_SEED,
            standard_rating: STANDARD_RATING,
            feedback_policy: FeedbackPolicy::Reject,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Check numeric settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.standard_rating.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "standard_rating must be finite, got {}",
                self.standard_rating
            )));
        }
        self.selection_strategy().map(|_| ())
    }

    /// The configured strategy with its parameters
    pub fn selection_strategy(&self) -> Result<SelectionStrategy, ConfigError> {
        SelectionStrategy::from_kind(self.strategy, self.beta)
    }
}

/// Builder for [`EngineConfig`]
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
    strategy_name: Option<String>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, kind: StrategyKind) -> Self {
        self.config.strategy = kind;
        self.strategy_name = None;
        self
    }

    /// Select a strategy by registry name; resolved in [`build`](Self::build)
    pub fn strategy_name(mut self, name: impl Into<String>) -> Self {
        self.strategy_name = Some(name.into());
        self
    }

    pub fn hypothesis(mut self, name: impl Into<String>) -> Self {
        self.config.hypothesis = Some(name.into());
        self
    }

    pub fn beta(mut self, beta: f64) -> Self {
        self.config.beta = beta;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn standard_rating(mut self, rating: f64) -> Self {
        self.config.standard_rating = rating;
        self
    }

    pub fn feedback_policy(mut self, policy: FeedbackPolicy) -> Self {
        self.config.feedback_policy = policy;
        self
    }

    pub fn build(mut self) -> MetaExpResult<EngineConfig> {
        if let Some(name) = self.strategy_name.take() {
            self.config.strategy = StrategyKind::from_name(&name)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }
}
