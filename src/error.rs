//! Error types for metaexp
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::candidate::CandidateId;

/// Error type for configuration problems detected at construction time
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A selection strategy name that is not in the registry
    #[error("Unknown selection strategy '{name}' (available: {})", .available.join(", "))]
    UnknownStrategy {
        name: String,
        available: Vec<String>,
    },

    /// A hypothesis name that is not in the registry
    #[error("Unknown hypothesis '{name}' (available: {})", .available.join(", "))]
    UnknownHypothesis {
        name: String,
        available: Vec<String>,
    },

    /// A hypothesis-driven strategy was configured without a hypothesis
    #[error("Strategy '{0}' requires a hypothesis")]
    MissingHypothesis(String),

    /// A rating function name that is not in the registry
    #[error("Unknown rating function '{name}' (available: {})", .available.join(", "))]
    UnknownRatingFunction {
        name: String,
        available: Vec<String>,
    },

    /// Any other invalid setting
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Error type for rejected feedback submissions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeedbackError {
    /// The id does not name a candidate
    #[error("{id} is out of range for {len} candidates")]
    OutOfRange { id: CandidateId, len: usize },

    /// The id was already rated in an earlier round
    #[error("{0} has already been rated")]
    AlreadyVisited(CandidateId),

    /// The id appears more than once in one submission
    #[error("{0} appears more than once in the submission")]
    Duplicate(CandidateId),

    /// The rating is NaN or infinite
    #[error("Invalid rating {rating} for {id}")]
    InvalidRating { id: CandidateId, rating: f64 },
}

/// Error type for oracle construction
#[derive(Debug, Error)]
pub enum OracleError {
    /// The rating file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The rating file is not valid JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required field is absent or has the wrong type
    #[error("Malformed rating file: {0}")]
    Malformed(String),
}

/// Error type for engine snapshots
#[derive(Debug, Error)]
pub enum SessionError {
    /// IO error while saving or loading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Snapshot written by a newer version of the library
    #[error("Snapshot version {0} is newer than supported")]
    VersionTooNew(u32),

    /// Snapshot content is inconsistent
    #[error("Corrupted snapshot: {0}")]
    Corrupted(String),
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum MetaExpError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Feedback error
    #[error("Feedback rejected: {0}")]
    Feedback(#[from] FeedbackError),

    /// Oracle error
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Session error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The hypothesis failed to fit or predict
    #[error("Hypothesis error: {0}")]
    Hypothesis(String),

    /// A hypothesis output does not match the candidate count
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Result type alias used across the crate
pub type MetaExpResult<T> = Result<T, MetaExpError>;
