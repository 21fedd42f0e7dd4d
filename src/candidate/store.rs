//! Indexed arena of candidate records

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{CandidateId, CandidateRecord, Feedback, RatedCandidate, VisitState};
use crate::error::FeedbackError;

/// Fixed-size arena of candidates with their visit state and ratings
///
/// The arena is sized once from the candidate list and never grows or
/// shrinks; `records[i].id == CandidateId(i)` always holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateStore<M> {
    records: Vec<CandidateRecord<M>>,
}

impl<M> CandidateStore<M> {
    /// Create a store with every candidate unrated
    pub fn new(meta_paths: Vec<M>) -> Self {
        let records = meta_paths
            .into_iter()
            .enumerate()
            .map(|(i, mp)| CandidateRecord::new(CandidateId(i), mp))
            .collect();
        Self { records }
    }

    /// Rebuild a store from previously snapshotted records
    ///
    /// Returns `None` if any record sits at a position other than its id.
    pub fn from_records(records: Vec<CandidateRecord<M>>) -> Option<Self> {
        if records.iter().enumerate().any(|(i, r)| r.id.0 != i) {
            return None;
        }
        Some(Self { records })
    }

    /// Total number of candidates
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: CandidateId) -> Option<&CandidateRecord<M>> {
        self.records.get(id.0)
    }

    pub fn records(&self) -> &[CandidateRecord<M>] {
        &self.records
    }

    pub fn meta_paths(&self) -> impl Iterator<Item = &M> {
        self.records.iter().map(|r| &r.meta_path)
    }

    pub fn is_visited(&self, id: CandidateId) -> bool {
        self.get(id).map(|r| r.is_visited()).unwrap_or(false)
    }

    pub fn count_not_visited(&self) -> usize {
        self.records.iter().filter(|r| !r.is_visited()).count()
    }

    pub fn count_visited(&self) -> usize {
        self.len() - self.count_not_visited()
    }

    /// True iff nothing has been rated yet
    pub fn is_first_round(&self) -> bool {
        self.records.iter().all(|r| !r.is_visited())
    }

    /// Ids still waiting for a rating, in ascending order
    pub fn not_visited_ids(&self) -> Vec<CandidateId> {
        self.records
            .iter()
            .filter(|r| !r.is_visited())
            .map(|r| r.id)
            .collect()
    }

    /// Rated ids with their ratings, in ascending id order
    pub fn visited(&self) -> (Vec<CandidateId>, Vec<f64>) {
        self.records
            .iter()
            .filter(|r| r.is_visited())
            .map(|r| (r.id, r.rating))
            .unzip()
    }

    /// Apply a feedback submission
    ///
    /// Every named id becomes `Visited` with the submitted rating. Range is
    /// checked for the whole submission before anything is written. No
    /// feedback policy is applied here: re-rated ids are overwritten and
    /// ratings are stored as given. [`Engine::update`](crate::engine::Engine::update)
    /// validates before calling this.
    pub(crate) fn mark(&mut self, feedback: &Feedback) -> Result<(), FeedbackError> {
        let len = self.len();
        if let Some(bad) = feedback.iter().find(|r| r.id.0 >= len) {
            return Err(FeedbackError::OutOfRange { id: bad.id, len });
        }

        for rating in feedback.iter() {
            let record = &mut self.records[rating.id.0];
            record.state = VisitState::Visited;
            record.rating = rating.rating;
        }
        Ok(())
    }

    /// Rated ids with their ratings as they would be after `feedback`
    ///
    /// Later entries for the same id win. Nothing is written.
    pub fn visited_with(&self, feedback: &Feedback) -> (Vec<CandidateId>, Vec<f64>) {
        let pending: HashMap<CandidateId, f64> =
            feedback.iter().map(|r| (r.id, r.rating)).collect();
        self.records
            .iter()
            .filter_map(|r| match pending.get(&r.id) {
                Some(&rating) => Some((r.id, rating)),
                None if r.is_visited() => Some((r.id, r.rating)),
                None => None,
            })
            .unzip()
    }

    /// Highest-rated visited candidate; ties go to the largest id
    pub fn max_ref(&self) -> Option<&CandidateRecord<M>> {
        self.records
            .iter()
            .filter(|r| r.is_visited())
            .fold(None, |best: Option<&CandidateRecord<M>>, r| match best {
                Some(b) if r.rating < b.rating => Some(b),
                _ => Some(r),
            })
    }

    /// Lowest-rated visited candidate; ties go to the smallest id
    pub fn min_ref(&self) -> Option<&CandidateRecord<M>> {
        self.records
            .iter()
            .filter(|r| r.is_visited())
            .fold(None, |best: Option<&CandidateRecord<M>>, r| match best {
                Some(b) if r.rating >= b.rating => Some(b),
                _ => Some(r),
            })
    }

    /// Mean rating of visited candidates, if any
    pub fn mean_visited_rating(&self) -> Option<f64> {
        let (ids, ratings) = self.visited();
        if ids.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        }
    }
}

impl<M: Clone> CandidateStore<M> {
    /// All visited candidates with their final ratings, in id order
    pub fn snapshot(&self) -> Vec<RatedCandidate<M>> {
        self.records
            .iter()
            .filter(|r| r.is_visited())
            .map(|r| RatedCandidate {
                id: r.id,
                meta_path: r.meta_path.clone(),
                rating: r.rating,
            })
            .collect()
    }
}
