//! Name-keyed registry of hypothesis constructors

use std::collections::BTreeMap;
use std::fmt;

use super::Hypothesis;
use crate::error::{ConfigError, MetaExpResult};

/// Builds a fresh hypothesis for a candidate list
pub type HypothesisFactory<M> = Box<dyn Fn(&[M]) -> MetaExpResult<Box<dyn Hypothesis>>>;

/// Explicit registry of the hypotheses an engine may be configured with
///
/// Resolution happens once, when the engine is built. Asking for a name that
/// was never registered is a [`ConfigError::UnknownHypothesis`]; there is no
/// fallback model.
pub struct HypothesisRegistry<M> {
    factories: BTreeMap<String, HypothesisFactory<M>>,
}

impl<M> HypothesisRegistry<M> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a constructor under `name`, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[M]) -> MetaExpResult<Box<dyn Hypothesis>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&[M]) -> MetaExpResult<Box<dyn Hypothesis>> + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Construct the hypothesis registered under `name`
    pub fn build(&self, name: &str, meta_paths: &[M]) -> MetaExpResult<Box<dyn Hypothesis>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnknownHypothesis {
                name: name.to_string(),
                available: self.names(),
            })?;
        factory(meta_paths)
    }
}

impl<M> Default for HypothesisRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for HypothesisRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HypothesisRegistry")
            .field("names", &self.names())
            .finish()
    }
}
