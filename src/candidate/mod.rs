//! Candidate meta-paths and their rating state
//!
//! Every candidate is addressed by a [`CandidateId`] equal to its position in
//! the fixed candidate sequence handed to the engine. The id is the only
//! handle; records live in an indexed arena ([`CandidateStore`]).

mod store;

pub use store::CandidateStore;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a candidate, equal to its position in the candidate list
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub usize);

impl CandidateId {
    /// Position of this candidate in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Candidate({})", self.0)
    }
}

impl From<usize> for CandidateId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl From<CandidateId> for usize {
    fn from(id: CandidateId) -> Self {
        id.0
    }
}

/// Whether a candidate has been rated
///
/// The only transition is `NotVisited -> Visited`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitState {
    #[default]
    NotVisited,
    Visited,
}

/// One slot of the candidate arena
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord<M> {
    /// Position in the arena
    pub id: CandidateId,
    /// Opaque meta-path representation
    pub meta_path: M,
    /// Rating status
    pub state: VisitState,
    /// Rating; only meaningful once `state` is `Visited`
    pub rating: f64,
}

impl<M> CandidateRecord<M> {
    /// Create an unrated record
    pub fn new(id: CandidateId, meta_path: M) -> Self {
        Self {
            id,
            meta_path,
            state: VisitState::NotVisited,
            rating: 0.0,
        }
    }

    /// Check if this candidate has been rated
    pub fn is_visited(&self) -> bool {
        self.state == VisitState::Visited
    }
}

/// A rated candidate as it appears in the final output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatedCandidate<M> {
    pub id: CandidateId,
    #[serde(rename = "metapath")]
    pub meta_path: M,
    pub rating: f64,
}

/// A single `(id, rating)` pair submitted by the analyst or an oracle
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: CandidateId,
    pub rating: f64,
}

impl Rating {
    pub fn new(id: impl Into<CandidateId>, rating: f64) -> Self {
        Self {
            id: id.into(),
            rating,
        }
    }
}

/// A set of ratings submitted together for one round
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feedback(pub Vec<Rating>);

impl Feedback {
    pub fn new(ratings: Vec<Rating>) -> Self {
        Self(ratings)
    }

    /// Build feedback from `(id, rating)` pairs
    pub fn from_pairs<I, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, f64)>,
        T: Into<CandidateId>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(id, rating)| Rating::new(id, rating))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rating> {
        self.0.iter()
    }

    /// Ids named by this feedback, in submission order
    pub fn ids(&self) -> Vec<CandidateId> {
        self.0.iter().map(|r| r.id).collect()
    }
}

impl FromIterator<Rating> for Feedback {
    fn from_iter<T: IntoIterator<Item = Rating>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Prelude for candidate types
pub mod prelude {
    pub use super::{
        CandidateId, CandidateRecord, CandidateStore, Feedback, RatedCandidate, Rating,
        VisitState,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_id() {
        let id1 = CandidateId(0);
        let id2 = CandidateId(1);

        assert_ne!(id1, id2);
        assert_eq!(id1, CandidateId::from(0));
        assert_eq!(format!("{}", id2), "Candidate(1)");
        assert_eq!(usize::from(id2), 1);
    }

    #[test]
    fn test_record_defaults() {
        let record = CandidateRecord::new(CandidateId(4), vec!["Movie", "Actor"]);
        assert!(!record.is_visited());
        assert_eq!(record.rating, 0.0);
    }

    #[test]
    fn test_feedback_serializes_as_list() {
        let feedback = Feedback::from_pairs([(0usize, 0.25), (3usize, 1.0)]);
        let json = serde_json::to_string(&feedback).unwrap();
        assert_eq!(json, r#"[{"id":0,"rating":0.25},{"id":3,"rating":1.0}]"#);

        let parsed: Feedback = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ids(), vec![CandidateId(0), CandidateId(3)]);
    }
}
