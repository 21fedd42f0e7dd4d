//! The round-based active learning engine
//!
//! The engine alternates two calls: [`Engine::get_next`] proposes a batch of
//! unrated meta-paths, [`Engine::update`] records the ratings for it. Once
//! every candidate is rated, [`Engine::create_output`] returns the result.
//!
//! # Example
//!
//! ```rust,ignore
//! use metaexp::prelude::*;
//!
//! let mut engine = Engine::random(meta_paths, 42);
//! while !engine.is_complete() {
//!     let round = engine.get_next(5)?;
//!     let feedback = ask_analyst(&round);
//!     engine.update(&feedback)?;
//! }
//! let rated = engine.create_output();
//! ```
//!
//! One engine serves one caller; concurrent use must be serialized outside.

pub mod config;
pub mod round;

pub use config::{EngineConfig, EngineConfigBuilder, FeedbackPolicy};
pub use round::{BatchEntry, ReferenceExtremes, RoundResult};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use crate::candidate::{CandidateId, CandidateStore, Feedback, RatedCandidate};
use crate::error::{ConfigError, FeedbackError, MetaExpError, MetaExpResult};
use crate::hypothesis::{Hypothesis, HypothesisRegistry};
use crate::selection::{baseline_predictions, SelectionStrategy};
use round::{REFERENCE_MAX_RATING, REFERENCE_MIN_RATING};

/// Active learning engine over a fixed list of candidate meta-paths
pub struct Engine<M> {
    pub(crate) config: EngineConfig,
    pub(crate) strategy: SelectionStrategy,
    pub(crate) store: CandidateStore<M>,
    /// Transient: rebuilt from the registry when a snapshot is restored
    pub(crate) hypothesis: Option<Box<dyn Hypothesis>>,
    /// Number of batches handed out so far
    pub(crate) round: usize,
}

impl<M> Engine<M> {
    /// Create an engine, resolving the configured hypothesis by name
    ///
    /// Fails if the strategy needs a hypothesis and none is named, or if a
    /// named hypothesis is not registered (even when the strategy would not
    /// use it).
    pub fn new(
        meta_paths: Vec<M>,
        config: EngineConfig,
        registry: &HypothesisRegistry<M>,
    ) -> MetaExpResult<Self> {
        config.validate()?;
        let hypothesis = resolve_hypothesis(&config, registry, &meta_paths)?;
        Self::assemble(CandidateStore::new(meta_paths), config, hypothesis, 0)
    }

    /// Create an engine around an already constructed hypothesis
    pub fn with_hypothesis(
        meta_paths: Vec<M>,
        config: EngineConfig,
        hypothesis: Box<dyn Hypothesis>,
    ) -> MetaExpResult<Self> {
        config.validate()?;
        let hypothesis = config.strategy.is_hypothesis_driven().then_some(hypothesis);
        Self::assemble(CandidateStore::new(meta_paths), config, hypothesis, 0)
    }

    /// Random-selection engine with default settings
    pub fn random(meta_paths: Vec<M>, seed: u64) -> Self {
        let config = EngineConfig {
            seed,
            ..EngineConfig::default()
        };
        info!(candidates = meta_paths.len(), seed, "Creating random-selection engine");
        Self {
            config,
            strategy: SelectionStrategy::Random,
            store: CandidateStore::new(meta_paths),
            hypothesis: None,
            round: 0,
        }
    }

    pub(crate) fn assemble(
        store: CandidateStore<M>,
        config: EngineConfig,
        hypothesis: Option<Box<dyn Hypothesis>>,
        round: usize,
    ) -> MetaExpResult<Self> {
        let strategy = config.selection_strategy()?;
        if let Some(h) = &hypothesis {
            if h.similarity().len() != store.len() {
                return Err(MetaExpError::DimensionMismatch {
                    expected: store.len(),
                    actual: h.similarity().len(),
                });
            }
        }
        info!(
            candidates = store.len(),
            strategy = %config.strategy,
            seed = config.seed,
            "Creating active learning engine"
        );
        Ok(Self {
            config,
            strategy,
            store,
            hypothesis,
            round,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategy(&self) -> &SelectionStrategy {
        &self.strategy
    }

    pub fn store(&self) -> &CandidateStore<M> {
        &self.store
    }

    pub fn hypothesis(&self) -> Option<&dyn Hypothesis> {
        self.hypothesis.as_deref()
    }

    /// Number of batches handed out so far
    pub fn round(&self) -> usize {
        self.round
    }

    /// Total number of candidates
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn count_not_visited(&self) -> usize {
        self.store.count_not_visited()
    }

    /// True once every candidate has been rated
    pub fn is_complete(&self) -> bool {
        self.store.count_not_visited() == 0
    }

    /// Generator for the current round, derived from the seed and round number
    fn round_rng(&self) -> StdRng {
        let salt = (self.round as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        StdRng::seed_from_u64(self.config.seed ^ salt)
    }

    /// Record a round of ratings
    ///
    /// The submission is validated as a whole before anything changes. With
    /// [`FeedbackPolicy::Reject`], already-rated or repeated ids are refused.
    /// Hypothesis-driven strategies refit on every rating including the new
    /// ones; the ratings are only recorded once that fit succeeds.
    pub fn update(&mut self, feedback: &Feedback) -> MetaExpResult<()> {
        self.validate_feedback(feedback)?;
        let visited_before = self.store.count_visited();

        if self.strategy.is_hypothesis_driven() {
            if let Some(h) = self.hypothesis.as_mut() {
                let (ids, ratings) = self.store.visited_with(feedback);
                h.update(&ids, &ratings)?;
                debug!(fitted_on = ids.len(), "Refit hypothesis");
            }
        }
        self.store.mark(feedback)?;

        info!(
            round = self.round,
            rated = feedback.len(),
            visited_before,
            not_visited = self.store.count_not_visited(),
            "Applied feedback"
        );
        Ok(())
    }

    /// Refit the hypothesis on every rating recorded so far
    pub(crate) fn refit(&mut self) -> MetaExpResult<()> {
        if let Some(h) = self.hypothesis.as_mut() {
            let (ids, ratings) = self.store.visited();
            h.update(&ids, &ratings)?;
            debug!(fitted_on = ids.len(), "Refit hypothesis");
        }
        Ok(())
    }

    fn validate_feedback(&self, feedback: &Feedback) -> Result<(), FeedbackError> {
        let len = self.store.len();
        let reject = self.config.feedback_policy == FeedbackPolicy::Reject;
        let mut seen = HashSet::with_capacity(feedback.len());

        for r in feedback.iter() {
            if !r.rating.is_finite() {
                return Err(FeedbackError::InvalidRating {
                    id: r.id,
                    rating: r.rating,
                });
            }
            if r.id.0 >= len {
                return Err(FeedbackError::OutOfRange { id: r.id, len });
            }
            if reject {
                if !seen.insert(r.id) {
                    return Err(FeedbackError::Duplicate(r.id));
                }
                if self.store.is_visited(r.id) {
                    return Err(FeedbackError::AlreadyVisited(r.id));
                }
            }
        }
        Ok(())
    }

    /// Predicted rating for every candidate, in id order
    ///
    /// Uses the hypothesis when the strategy has one; otherwise a rated
    /// candidate predicts its own rating and the rest the mean rating.
    pub fn predict_all(&self) -> MetaExpResult<Vec<f64>> {
        match self.hypothesis.as_deref() {
            Some(h) => {
                let ids: Vec<CandidateId> = (0..self.store.len()).map(CandidateId).collect();
                let predicted = h.predict_rating(&ids);
                if predicted.len() != ids.len() {
                    return Err(MetaExpError::DimensionMismatch {
                        expected: ids.len(),
                        actual: predicted.len(),
                    });
                }
                Ok(predicted)
            }
            None => Ok(baseline_predictions(&self.store, self.config.standard_rating)),
        }
    }
}

impl<M: Clone> Engine<M> {
    /// Propose the next batch of unrated candidates
    ///
    /// If fewer than `batch_size` candidates remain, the batch is clamped to
    /// what is left and `is_last_batch` is set. Diversity suppression can
    /// make a batch shorter still. A zero batch size is a configuration error.
    pub fn get_next(&mut self, batch_size: usize) -> MetaExpResult<RoundResult<M>> {
        if batch_size == 0 {
            return Err(ConfigError::Invalid("batch size must be at least 1".into()).into());
        }

        let remaining = self.store.count_not_visited();
        let is_last_batch = remaining <= batch_size;
        let size = batch_size.min(remaining);
        if size < batch_size {
            debug!(requested = batch_size, remaining, "Clamping batch size");
        }

        let mut rng = self.round_rng();
        let ids = self
            .strategy
            .select(&self.store, self.hypothesis.as_deref(), size, &mut rng)?;
        self.round += 1;

        let standard_rating = self.config.standard_rating;
        let batch: Vec<BatchEntry<M>> = ids
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|record| BatchEntry::from_record(record, standard_rating))
            .collect();

        info!(
            round = self.round,
            strategy = %self.strategy.kind(),
            selected = batch.len(),
            remaining,
            is_last_batch,
            "Selected batch"
        );

        Ok(RoundResult {
            batch,
            is_last_batch,
            reference_extremes: self.reference_extremes(),
        })
    }

    /// Best and worst rated paths so far, or `None` before any rating
    pub fn reference_extremes(&self) -> Option<ReferenceExtremes<M>> {
        if self.store.is_first_round() {
            return None;
        }
        let max = self.store.max_ref()?;
        let min = self.store.min_ref()?;
        Some(ReferenceExtremes {
            max_path: BatchEntry::from_record(max, REFERENCE_MAX_RATING),
            min_path: BatchEntry::from_record(min, REFERENCE_MIN_RATING),
        })
    }

    /// Every rated candidate with its rating, in id order
    pub fn create_output(&self) -> Vec<RatedCandidate<M>> {
        self.store.snapshot()
    }

    /// Rated candidates from best to worst; equal ratings by ascending id
    pub fn ranked_output(&self) -> Vec<RatedCandidate<M>> {
        let mut rated = self.store.snapshot();
        rated.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(a.id.cmp(&b.id)));
        rated
    }
}

/// Build the configured hypothesis, if the strategy uses one
///
/// A named hypothesis must be registered even when the strategy ignores it.
pub(crate) fn resolve_hypothesis<M>(
    config: &EngineConfig,
    registry: &HypothesisRegistry<M>,
    meta_paths: &[M],
) -> MetaExpResult<Option<Box<dyn Hypothesis>>> {
    match (&config.hypothesis, config.strategy.is_hypothesis_driven()) {
        (Some(name), true) => Ok(Some(registry.build(name, meta_paths)?)),
        (None, true) => Err(ConfigError::MissingHypothesis(config.strategy.name().to_string()).into()),
        (Some(name), false) => {
            if !registry.contains(name) {
                return Err(ConfigError::UnknownHypothesis {
                    name: name.clone(),
                    available: registry.names(),
                }
                .into());
            }
            debug!(hypothesis = %name, "Strategy ignores the configured hypothesis");
            Ok(None)
        }
        (None, false) => Ok(None),
    }
}

impl<M> fmt::Debug for Engine<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("strategy", &self.strategy)
            .field("candidates", &self.store.len())
            .field("not_visited", &self.store.count_not_visited())
            .field("round", &self.round)
            .field("has_hypothesis", &self.hypothesis.is_some())
            .finish()
    }
}

/// Prelude for engine types
pub mod prelude {
    pub use super::config::{EngineConfig, EngineConfigBuilder, FeedbackPolicy};
    pub use super::round::{BatchEntry, ReferenceExtremes, RoundResult};
    pub use super::Engine;
}
