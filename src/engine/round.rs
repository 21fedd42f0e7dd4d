//! Values exchanged with the caller each round

use serde::{Deserialize, Serialize};

use crate::candidate::{CandidateId, CandidateRecord};

/// Rating shown for the best reference path
pub const REFERENCE_MAX_RATING: f64 = 1.0;

/// Rating shown for the worst reference path
pub const REFERENCE_MIN_RATING: f64 = 0.0;

/// One candidate offered for rating
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry<M> {
    pub id: CandidateId,
    #[serde(rename = "metapath")]
    pub meta_path: M,
    /// Provisional display rating until real feedback arrives
    pub rating: f64,
}

impl<M: Clone> BatchEntry<M> {
    pub(crate) fn from_record(record: &CandidateRecord<M>, rating: f64) -> Self {
        Self {
            id: record.id,
            meta_path: record.meta_path.clone(),
            rating,
        }
    }
}

/// Highest and lowest rated paths so far, pinned to the ends of the scale
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceExtremes<M> {
    pub max_path: BatchEntry<M>,
    pub min_path: BatchEntry<M>,
}

/// Outcome of [`Engine::get_next`](super::Engine::get_next)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult<M> {
    pub batch: Vec<BatchEntry<M>>,
    /// No more unrated candidates remained than were requested
    ///
    /// Diversity suppression can return fewer ids than that, so the next
    /// round may be flagged last as well. Loop on
    /// [`Engine::is_complete`](super::Engine::is_complete) to rate everything.
    pub is_last_batch: bool,
    /// `None` until something has been rated
    pub reference_extremes: Option<ReferenceExtremes<M>>,
}

impl<M> RoundResult<M> {
    pub fn ids(&self) -> Vec<CandidateId> {
        self.batch.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}
