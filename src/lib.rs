//! # metaexp
//!
//! Active learning for ranking meta-paths by analyst preference.
//!
//! A knowledge graph yields many candidate meta-paths and only a few of them
//! are interesting to a given analyst. Rather than asking for a rating of
//! every path, the engine picks small batches in rounds: each batch trades off
//! exploring paths the model knows little about against exploiting paths it
//! predicts to be good, while keeping the paths within a batch dissimilar.
//!
//! ## Core Concepts
//!
//! - **Candidate store**: a fixed arena of meta-paths with their visit state
//!   and ratings, indexed by [`CandidateId`](candidate::CandidateId)
//! - **Hypothesis**: an external predictive model behind the
//!   [`Hypothesis`](hypothesis::Hypothesis) trait, resolved by name
//! - **Selection strategies**: `random`, `random_criterion`,
//!   `uncertainty_sampling` and `gp_select`
//! - **Oracles**: synthetic or recorded rating sources for offline runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use metaexp::prelude::*;
//!
//! let registry = HypothesisRegistry::new().with("my-model", build_model);
//! let config = EngineConfig::builder()
//!     .strategy_name("GP-Select")
//!     .hypothesis("my-model")
//!     .beta(1.0)
//!     .build()?;
//!
//! let mut engine = Engine::new(meta_paths, config, &registry)?;
//! let round = engine.get_next(5)?;
//! engine.update(&feedback)?;
//! ```

pub mod candidate;
pub mod engine;
pub mod error;
pub mod hypothesis;
pub mod oracle;
pub mod selection;
pub mod session;
pub mod simulation;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::candidate::prelude::*;
    pub use crate::engine::prelude::*;
    pub use crate::error::*;
    pub use crate::hypothesis::prelude::*;
    pub use crate::oracle::prelude::*;
    pub use crate::selection::prelude::*;
    pub use crate::session::{EngineSnapshot, SNAPSHOT_VERSION};
    pub use crate::simulation::{RoundRecord, Simulation, SimulationReport, StopReason};
}
