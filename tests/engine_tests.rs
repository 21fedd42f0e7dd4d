//! End-to-end runs of the engine against scripted analysts and oracles

use std::collections::{HashMap, HashSet};
use std::fs;

use metaexp::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("METAEXP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

type MetaPath = Vec<String>;

fn meta_paths(n: usize) -> Vec<MetaPath> {
    let types = ["Movie", "Actor", "Director", "Genre", "Studio"];
    (0..n)
        .map(|i| {
            (0..2 + i % 3)
                .map(|k| types[(i + k) % types.len()].to_string())
                .collect()
        })
        .collect()
}

/// Jaccard overlap of node types, used as feature similarity
struct TypeOverlap {
    similarity: SimilarityMatrix,
    rated: Vec<(CandidateId, f64)>,
}

impl TypeOverlap {
    fn new(paths: &[MetaPath]) -> Self {
        let sets: Vec<HashSet<&str>> = paths
            .iter()
            .map(|p| p.iter().map(String::as_str).collect())
            .collect();
        let similarity = SimilarityMatrix::from_fn(paths.len(), |i, j| {
            let shared = sets[i].intersection(&sets[j]).count() as f64;
            let union = sets[i].union(&sets[j]).count() as f64;
            if union == 0.0 {
                1.0
            } else {
                shared / union
            }
        });
        Self {
            similarity,
            rated: Vec::new(),
        }
    }
}

impl Hypothesis for TypeOverlap {
    fn update(&mut self, visited: &[CandidateId], ratings: &[f64]) -> MetaExpResult<()> {
        if visited.len() != ratings.len() {
            return Err(MetaExpError::Hypothesis("ids and ratings differ in length".into()));
        }
        self.rated = visited.iter().copied().zip(ratings.iter().copied()).collect();
        Ok(())
    }

    fn predict_rating(&self, ids: &[CandidateId]) -> Vec<f64> {
        ids.iter()
            .map(|id| {
                let (num, den) = self.rated.iter().fold((0.0, 0.0), |(num, den), (k, r)| {
                    let w = self.similarity.get(id.0, k.0) + 1e-3;
                    (num + w * r, den + w)
                });
                if den > 0.0 {
                    num / den
                } else {
                    0.5
                }
            })
            .collect()
    }

    fn uncertainty(&self, ids: &[CandidateId]) -> Vec<f64> {
        ids.iter()
            .map(|id| {
                let closest = self
                    .rated
                    .iter()
                    .map(|(k, _)| self.similarity.get(id.0, k.0))
                    .fold(0.0, f64::max);
                1.0 - closest
            })
            .collect()
    }

    fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}

fn registry() -> HypothesisRegistry<MetaPath> {
    HypothesisRegistry::new().with("type_overlap", |paths: &[MetaPath]| {
        Ok(Box::new(TypeOverlap::new(paths)) as Box<dyn Hypothesis>)
    })
}

#[test]
fn random_strategy_two_rounds_rates_everything() {
    init_tracing();
    let mut engine = Engine::random(meta_paths(10), 42);

    let first = engine.get_next(5).unwrap();
    assert_eq!(first.len(), 5);
    assert!(!first.is_last_batch);
    assert!(first.reference_extremes.is_none());
    let first_ids: HashSet<CandidateId> = first.ids().into_iter().collect();
    assert_eq!(first_ids.len(), 5);

    let submitted: HashMap<CandidateId, f64> = (0..10)
        .map(|i| (CandidateId(i), (i as f64 + 1.0) / 10.0))
        .collect();
    let rate = |round: &RoundResult<MetaPath>| -> Feedback {
        round
            .batch
            .iter()
            .map(|e| Rating::new(e.id, submitted[&e.id]))
            .collect()
    };

    engine.update(&rate(&first)).unwrap();

    let second = engine.get_next(5).unwrap();
    assert!(second.is_last_batch);
    let second_ids: HashSet<CandidateId> = second.ids().into_iter().collect();
    assert_eq!(second_ids.len(), 5);
    assert!(first_ids.is_disjoint(&second_ids));

    let extremes = second.reference_extremes.clone().unwrap();
    assert!(first_ids.contains(&extremes.max_path.id));
    assert!(first_ids.contains(&extremes.min_path.id));
    assert_eq!(extremes.max_path.rating, 1.0);
    assert_eq!(extremes.min_path.rating, 0.0);

    engine.update(&rate(&second)).unwrap();
    let output = engine.create_output();
    assert_eq!(output.len(), 10);
    for rated in &output {
        assert_eq!(rated.rating, submitted[&rated.id]);
    }
}

#[test]
fn strategies_resolve_by_display_name() {
    init_tracing();
    for name in ["Uncertainty Sampling", "GP-Select", "Random Criterion"] {
        let config = EngineConfig::builder()
            .strategy_name(name)
            .hypothesis("type_overlap")
            .build()
            .unwrap();
        let mut engine = Engine::new(meta_paths(15), config, &registry()).unwrap();
        let round = engine.get_next(3).unwrap();
        assert!(!round.is_empty());
    }

    let err = EngineConfig::builder()
        .strategy_name("Expected Improvement")
        .build()
        .unwrap_err();
    match err {
        MetaExpError::Config(ConfigError::UnknownStrategy { available, .. }) => {
            assert_eq!(available.len(), 4);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn uncertainty_simulation_with_functional_oracle() {
    init_tracing();
    let config = EngineConfig::builder()
        .strategy(StrategyKind::UncertaintySampling)
        .hypothesis("type_overlap")
        .seed(7)
        .build()
        .unwrap();
    let engine = Engine::new(meta_paths(20), config, &registry()).unwrap();
    let oracle: FunctionalOracle<MetaPath> =
        FunctionalOracle::from_rating_function(RatingFunction::Entropy, 7);

    let mut simulation = Simulation::new(engine, oracle, 4).unwrap();
    let report = simulation.run().unwrap();

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(report.output.len(), 20);
    assert_eq!(
        report.rounds.iter().map(|r| r.batch_size).sum::<usize>(),
        20
    );
    assert!(report.output.windows(2).all(|w| w[0].rating >= w[1].rating));

    let (engine, oracle) = simulation.into_parts();
    assert_eq!(oracle.rated_count(), 20);
    for rated in engine.create_output() {
        assert_eq!(oracle.memoized(rated.id), Some(rated.rating));
    }
}

#[test]
fn gp_select_simulation_replays_ground_truth_file() {
    init_tracing();
    // Recorded ids are 1-based; every sixth entry after the header is a timing marker
    let mut entries = vec![serde_json::json!({ "time_to_rate": 0.0 })];
    let mut recorded = 0;
    for position in 1.. {
        if position % 6 == 0 {
            entries.push(serde_json::json!({ "time_to_rate": 4.2 }));
            continue;
        }
        recorded += 1;
        entries.push(serde_json::json!({ "id": recorded, "rating": recorded as f64 / 12.0 }));
        if recorded == 12 {
            break;
        }
    }
    let document = serde_json::json!({ "meta_paths": entries });

    let path = std::env::temp_dir().join(format!("metaexp-ground-truth-{}.json", std::process::id()));
    fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    let oracle = GroundTruthOracle::from_path(&path, GroundTruthOptions::default()).unwrap();
    let _ = fs::remove_file(&path);
    assert_eq!(oracle.len(), 12);

    let config = EngineConfig::builder()
        .strategy(StrategyKind::GpSelect)
        .hypothesis("type_overlap")
        .beta(1.0)
        .build()
        .unwrap();
    let engine = Engine::new(meta_paths(12), config, &registry()).unwrap();
    let report = Simulation::new(engine, oracle, 3).unwrap().run().unwrap();

    assert_eq!(report.output.len(), 12);
    let best = &report.output[0];
    assert_eq!(best.id, CandidateId(11));
    assert!((best.rating - 1.0).abs() < 1e-12);
    for rated in &report.output {
        assert!((rated.rating - (rated.id.0 as f64 + 1.0) / 12.0).abs() < 1e-12);
    }
}

#[test]
fn paused_session_resumes_from_disk() {
    init_tracing();
    let config = EngineConfig::builder()
        .strategy(StrategyKind::GpSelect)
        .hypothesis("type_overlap")
        .seed(99)
        .build()
        .unwrap();
    let mut engine = Engine::new(meta_paths(9), config, &registry()).unwrap();
    let round = engine.get_next(3).unwrap();
    let feedback: Feedback = round
        .batch
        .iter()
        .map(|e| Rating::new(e.id, e.meta_path.len() as f64 / 4.0))
        .collect();
    engine.update(&feedback).unwrap();

    let path = std::env::temp_dir().join(format!("metaexp-session-{}.json", std::process::id()));
    engine.snapshot().save(&path).unwrap();
    let snapshot: EngineSnapshot<MetaPath> = EngineSnapshot::load(&path).unwrap();
    let _ = fs::remove_file(&path);

    let mut resumed = Engine::restore(snapshot, &registry()).unwrap();
    assert_eq!(resumed.round(), engine.round());
    assert_eq!(resumed.create_output(), engine.create_output());
    assert_eq!(resumed.get_next(3).unwrap(), engine.get_next(3).unwrap());
}

#[test]
fn rejected_feedback_leaves_engine_untouched() {
    init_tracing();
    let mut engine = Engine::random(meta_paths(5), 1);
    engine
        .update(&Feedback::from_pairs([(0usize, 0.4), (1usize, 0.6)]))
        .unwrap();
    let before = engine.snapshot();

    let err = engine
        .update(&Feedback::from_pairs([(2usize, 0.1), (1usize, 0.9)]))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        MetaExpError::from(FeedbackError::AlreadyVisited(CandidateId(1))).to_string()
    );
    assert_eq!(engine.snapshot(), before);
}
