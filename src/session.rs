//! Pausing and resuming an engine
//!
//! An [`EngineSnapshot`] holds everything needed to continue a rating
//! session later: the configuration, every candidate record and the round
//! counter. The hypothesis is not serialized; it is rebuilt on restore and
//! refit on the recorded ratings. The per-round random generator is derived
//! from the seed and round counter, so a restored engine proposes the same
//! batches the uninterrupted engine would have.

use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "checkpoint")]
use std::fs::File;
#[cfg(feature = "checkpoint")]
use std::io::{BufReader, BufWriter};
#[cfg(feature = "checkpoint")]
use std::path::Path;

use crate::candidate::{CandidateRecord, CandidateStore};
use crate::engine::{resolve_hypothesis, Engine, EngineConfig};
use crate::error::{MetaExpResult, SessionError};
use crate::hypothesis::{Hypothesis, HypothesisRegistry};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable state of an [`Engine`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "M: Serialize + for<'a> Deserialize<'a>")]
pub struct EngineSnapshot<M> {
    /// Schema version for forward compatibility
    pub version: u32,
    pub config: EngineConfig,
    pub records: Vec<CandidateRecord<M>>,
    /// Batches handed out before the snapshot was taken
    pub round: usize,
}

impl<M> EngineSnapshot<M>
where
    M: Serialize + for<'de> Deserialize<'de>,
{
    /// Serialize snapshot to a JSON string
    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SessionError::Serialization(format!("Failed to serialize snapshot: {}", e)))
    }

    /// Deserialize snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SessionError::Deserialization(format!("Failed to deserialize snapshot: {}", e)))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<(), SessionError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(SessionError::VersionTooNew(self.version));
        }
        Ok(())
    }
}

/// File-based persistence (requires `checkpoint` feature)
#[cfg(feature = "checkpoint")]
impl<M> EngineSnapshot<M>
where
    M: Serialize + for<'de> Deserialize<'de>,
{
    /// Save snapshot to a file
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SessionError::Serialization(format!("Failed to serialize snapshot: {}", e)))?;
        info!(path = %path.display(), records = self.records.len(), "Saved engine snapshot");
        Ok(())
    }

    /// Load snapshot from a file
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let snapshot: Self = serde_json::from_reader(reader)
            .map_err(|e| SessionError::Deserialization(format!("Failed to deserialize snapshot: {}", e)))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }
}

impl<M: Clone> Engine<M> {
    /// Capture the resumable state of this engine
    pub fn snapshot(&self) -> EngineSnapshot<M> {
        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            config: self.config.clone(),
            records: self.store.records().to_vec(),
            round: self.round,
        }
    }

    /// Resume from a snapshot, rebuilding the hypothesis from `registry`
    pub fn restore(snapshot: EngineSnapshot<M>, registry: &HypothesisRegistry<M>) -> MetaExpResult<Self> {
        let (config, store, round) = unpack(snapshot)?;
        let meta_paths: Vec<M> = store.meta_paths().cloned().collect();
        let hypothesis = resolve_hypothesis(&config, registry, &meta_paths)?;
        Self::resume(store, config, hypothesis, round)
    }
}

impl<M> Engine<M> {
    /// Resume from a snapshot with a freshly constructed hypothesis
    pub fn restore_with_hypothesis(
        snapshot: EngineSnapshot<M>,
        hypothesis: Box<dyn Hypothesis>,
    ) -> MetaExpResult<Self> {
        let (config, store, round) = unpack(snapshot)?;
        let hypothesis = config.strategy.is_hypothesis_driven().then_some(hypothesis);
        Self::resume(store, config, hypothesis, round)
    }

    fn resume(
        store: CandidateStore<M>,
        config: EngineConfig,
        hypothesis: Option<Box<dyn Hypothesis>>,
        round: usize,
    ) -> MetaExpResult<Self> {
        let mut engine = Self::assemble(store, config, hypothesis, round)?;
        if !engine.store.is_first_round() {
            engine.refit()?;
        }
        info!(
            round,
            not_visited = engine.store.count_not_visited(),
            "Restored engine from snapshot"
        );
        Ok(engine)
    }
}

fn unpack<M>(snapshot: EngineSnapshot<M>) -> MetaExpResult<(EngineConfig, CandidateStore<M>, usize)> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SessionError::VersionTooNew(snapshot.version).into());
    }
    snapshot.config.validate()?;
    let store = CandidateStore::from_records(snapshot.records)
        .ok_or_else(|| SessionError::Corrupted("record ids do not match their positions".into()))?;
    if let Some(r) = store.records().iter().find(|r| r.is_visited() && !r.rating.is_finite()) {
        return Err(SessionError::Corrupted(format!("{} has a non-finite rating", r.id)).into());
    }
    Ok((snapshot.config, store, snapshot.round))
}
