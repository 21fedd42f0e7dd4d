//! Oracle that replays a recorded rating session
//!
//! A recorded session is a JSON document with a `meta_paths` list:
//!
//! ```json
//! { "meta_paths": [
//!     { "time_to_rate": 0.0 },
//!     { "id": 1, "rating": 0.8 },
//!     ...
//! ] }
//! ```
//!
//! The first entry is a placeholder. After it, every sixth entry is a
//! `time_to_rate` bookkeeping marker written once per rated batch. Entries
//! carrying a `time_to_rate` key are skipped wherever they appear.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use super::Oracle;
use crate::candidate::CandidateId;
use crate::error::OracleError;

/// Key marking a bookkeeping entry in a recorded session
pub const TIME_TO_RATE_KEY: &str = "time_to_rate";

/// Period of the bookkeeping marker among the retained entries
const MARKER_PERIOD: usize = 6;

/// How recorded ids map onto candidate ids
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthOptions {
    /// Recorded ids equal candidate ids; otherwise they are one larger
    pub is_zero_indexed: bool,
    /// Rating returned for ids missing from the recording
    pub default_rating: f64,
}

impl Default for GroundTruthOptions {
    fn default() -> Self {
        Self {
            is_zero_indexed: false,
            default_rating: 0.5,
        }
    }
}

impl GroundTruthOptions {
    pub fn zero_indexed(mut self, zero_indexed: bool) -> Self {
        self.is_zero_indexed = zero_indexed;
        self
    }

    pub fn with_default_rating(mut self, rating: f64) -> Self {
        self.default_rating = rating;
        self
    }
}

/// Rates candidates from a fixed table of recorded ratings
#[derive(Clone, Debug, PartialEq)]
pub struct GroundTruthOracle {
    ratings: HashMap<i64, f64>,
    options: GroundTruthOptions,
}

impl GroundTruthOracle {
    /// Build directly from a table keyed by recorded id
    pub fn from_table(ratings: HashMap<i64, f64>, options: GroundTruthOptions) -> Self {
        Self { ratings, options }
    }

    /// Load a recorded session from disk
    pub fn from_path(path: impl AsRef<Path>, options: GroundTruthOptions) -> Result<Self, OracleError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let oracle = Self::from_reader(BufReader::new(file), options)?;
        info!(
            path = %path.display(),
            ratings = oracle.len(),
            "Loaded ground-truth ratings"
        );
        Ok(oracle)
    }

    /// Load a recorded session from any JSON reader
    pub fn from_reader<R: Read>(reader: R, options: GroundTruthOptions) -> Result<Self, OracleError> {
        let document: Value = serde_json::from_reader(reader)?;
        Self::from_json(&document, options)
    }

    /// Load a recorded session from an already parsed document
    pub fn from_json(document: &Value, options: GroundTruthOptions) -> Result<Self, OracleError> {
        let entries = document
            .get("meta_paths")
            .and_then(Value::as_array)
            .ok_or_else(|| OracleError::Malformed("missing 'meta_paths' list".into()))?;

        let mut ratings = HashMap::new();
        let mut skipped = 0usize;
        for (position, entry) in entries.iter().skip(1).enumerate() {
            if (position + 1) % MARKER_PERIOD == 0 || entry.get(TIME_TO_RATE_KEY).is_some() {
                skipped += 1;
                continue;
            }
            let id = entry
                .get("id")
                .and_then(Value::as_i64)
                .ok_or_else(|| OracleError::Malformed(format!("entry {} has no integer 'id'", position + 1)))?;
            let rating = entry
                .get("rating")
                .and_then(Value::as_f64)
                .ok_or_else(|| OracleError::Malformed(format!("entry {} has no numeric 'rating'", position + 1)))?;
            ratings.insert(id, rating);
        }

        debug!(kept = ratings.len(), skipped, "Parsed recorded rating session");
        Ok(Self { ratings, options })
    }

    pub fn options(&self) -> &GroundTruthOptions {
        &self.options
    }

    /// Number of recorded ratings
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Recorded rating for a candidate, or the default when absent
    pub fn rating_for(&self, id: CandidateId) -> f64 {
        let offset = if self.options.is_zero_indexed { 0 } else { 1 };
        let key = id.0 as i64 + offset;
        self.ratings
            .get(&key)
            .copied()
            .unwrap_or(self.options.default_rating)
    }
}

impl<M> Oracle<M> for GroundTruthOracle {
    fn rate(&mut self, id: CandidateId, _meta_path: &M) -> f64 {
        self.rating_for(id)
    }
}
