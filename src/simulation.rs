//! Offline evaluation: drive an engine with an oracle instead of an analyst

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::candidate::RatedCandidate;
use crate::engine::Engine;
use crate::error::{ConfigError, MetaExpResult};
use crate::oracle::Oracle;

/// Statistics for one completed round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round number
    pub round: usize,
    pub batch_size: usize,
    /// Mean rating the oracle gave this batch
    pub mean_rating: f64,
    /// Unrated candidates left after the round
    pub remaining: usize,
}

/// Why a simulation stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every candidate was rated
    Exhausted,
    /// The oracle declined to rate another batch
    OracleStopped,
    /// The round limit was reached
    RoundLimit,
}

/// Outcome of [`Simulation::run`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport<M> {
    pub rounds: Vec<RoundRecord>,
    /// Rated candidates, best first
    pub output: Vec<RatedCandidate<M>>,
    pub stop_reason: StopReason,
}

impl<M> SimulationReport<M> {
    pub fn rounds_taken(&self) -> usize {
        self.rounds.len()
    }

    /// True if the run ended before every candidate was rated
    pub fn stopped_early(&self) -> bool {
        self.stop_reason != StopReason::Exhausted
    }
}

/// Runs the get_next / rate / update loop against an [`Oracle`]
pub struct Simulation<M, O> {
    engine: Engine<M>,
    oracle: O,
    batch_size: usize,
    max_rounds: Option<usize>,
}

impl<M, O> Simulation<M, O>
where
    M: Clone,
    O: Oracle<M>,
{
    pub fn new(engine: Engine<M>, oracle: O, batch_size: usize) -> MetaExpResult<Self> {
        if batch_size == 0 {
            return Err(ConfigError::Invalid("batch size must be at least 1".into()).into());
        }
        Ok(Self {
            engine,
            oracle,
            batch_size,
            max_rounds: None,
        })
    }

    /// Stop after at most `rounds` batches
    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn engine(&self) -> &Engine<M> {
        &self.engine
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Run until the candidates run out, the oracle stops or the round limit hits
    pub fn run(&mut self) -> MetaExpResult<SimulationReport<M>> {
        info!(
            candidates = self.engine.len(),
            batch_size = self.batch_size,
            strategy = %self.engine.config().strategy,
            "Starting simulation"
        );

        let mut rounds = Vec::new();
        let stop_reason = loop {
            if self.engine.is_complete() {
                break StopReason::Exhausted;
            }
            if !self.oracle.wants_to_continue() {
                break StopReason::OracleStopped;
            }
            if self.max_rounds.is_some_and(|max| rounds.len() >= max) {
                break StopReason::RoundLimit;
            }

            let round = self.engine.get_next(self.batch_size)?;
            if round.is_empty() {
                warn!("Engine proposed an empty batch");
                break StopReason::Exhausted;
            }
            let feedback = self.oracle.rate_batch(&round.batch);
            self.engine.update(&feedback)?;

            let mean_rating = if feedback.is_empty() {
                0.0
            } else {
                feedback.iter().map(|r| r.rating).sum::<f64>() / feedback.len() as f64
            };
            rounds.push(RoundRecord {
                round: self.engine.round(),
                batch_size: round.len(),
                mean_rating,
                remaining: self.engine.count_not_visited(),
            });
        };

        info!(
            rounds = rounds.len(),
            ?stop_reason,
            rated = self.engine.store().count_visited(),
            "Simulation finished"
        );

        Ok(SimulationReport {
            rounds,
            output: self.engine.ranked_output(),
            stop_reason,
        })
    }

    /// Consume the simulation, returning the engine and oracle
    pub fn into_parts(self) -> (Engine<M>, O) {
        (self.engine, self.oracle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{CandidateId, Feedback, Rating};
    use crate::engine::BatchEntry;
    use crate::oracle::{FunctionalOracle, RatingFunction};

    fn labelled(n: usize) -> Vec<Vec<String>> {
        (0..n)
            .map(|i| (0..=i % 4).map(|k| format!("T{}", k)).collect())
            .collect()
    }

    /// Stops after a fixed number of batches
    struct Impatient {
        batches_left: usize,
    }

    impl Oracle<Vec<String>> for Impatient {
        fn rate(&mut self, id: CandidateId, _meta_path: &Vec<String>) -> f64 {
            id.0 as f64
        }

        fn rate_batch(&mut self, batch: &[BatchEntry<Vec<String>>]) -> Feedback {
            self.batches_left = self.batches_left.saturating_sub(1);
            batch
                .iter()
                .map(|e| Rating::new(e.id, self.rate(e.id, &e.meta_path)))
                .collect()
        }

        fn wants_to_continue(&self) -> bool {
            self.batches_left > 0
        }
    }

    #[test]
    fn test_runs_to_exhaustion() {
        let engine = Engine::random(labelled(10), 42);
        let oracle: FunctionalOracle<Vec<String>> =
            FunctionalOracle::from_rating_function(RatingFunction::LengthBased, 0);
        let report = Simulation::new(engine, oracle, 4).unwrap().run().unwrap();

        assert_eq!(report.stop_reason, StopReason::Exhausted);
        assert!(!report.stopped_early());
        assert_eq!(
            report.rounds.iter().map(|r| r.batch_size).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
        assert_eq!(report.rounds.last().unwrap().remaining, 0);
        assert_eq!(report.output.len(), 10);
        assert!(report
            .output
            .windows(2)
            .all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn test_oracle_opt_out() {
        let engine = Engine::random(labelled(10), 1);
        let mut sim = Simulation::new(engine, Impatient { batches_left: 2 }, 3).unwrap();
        let report = sim.run().unwrap();

        assert_eq!(report.stop_reason, StopReason::OracleStopped);
        assert_eq!(report.rounds_taken(), 2);
        assert_eq!(report.output.len(), 6);
        assert_eq!(sim.engine().count_not_visited(), 4);
    }

    #[test]
    fn test_round_limit() {
        let engine = Engine::random(labelled(10), 1);
        let oracle = FunctionalOracle::new(|_: &Vec<String>| 0.5);
        let report = Simulation::new(engine, oracle, 2)
            .unwrap()
            .max_rounds(1)
            .run()
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::RoundLimit);
        assert_eq!(report.rounds_taken(), 1);
        assert_eq!(report.rounds[0].round, 1);
        assert_eq!(report.rounds[0].mean_rating, 0.5);
    }

    #[test]
    fn test_zero_batch_rejected() {
        let engine = Engine::random(labelled(2), 0);
        let oracle = FunctionalOracle::new(|_: &Vec<String>| 0.5);
        assert!(Simulation::new(engine, oracle, 0).is_err());
    }
}
