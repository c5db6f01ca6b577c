//! Property tests for aggregation invariants.
//!
//! Uses proptest to verify, for arbitrary success/failure mixes:
//! 1. Counts always reconcile: successes + failures == samples
//! 2. Statistics are bounded by the observed successes
//! 3. An all-failed non-empty batch is always fatal

use std::collections::BTreeMap;

use proptest::prelude::*;
use varilab_core::{ErrorModel, Sample, SamplingMethod, StudyConfig, UncertainVariable};
use varilab_runner::aggregate::{summarize_study, FatalError};
use varilab_runner::orchestrator::{EvaluationResult, Outcome};

fn make_config() -> StudyConfig {
    StudyConfig {
        runtitle: "props".into(),
        baseline_path: "IN.DAT".into(),
        working_dir: "work".into(),
        seed: 2,
        variables: vec![UncertainVariable::new(
            "x",
            ErrorModel::Uniform { lower: 0.0, upper: 1.0 },
        )],
        output_vars: vec!["y".into()],
        no_samples: 0,
        output_mean: 1.0,
        figure_of_merit: "y".into(),
        latin_hypercube_level: 1,
        method: SamplingMethod::Pseudorandom,
        sobol: None,
        morris: None,
    }
}

fn make_results(outcomes: &[Option<f64>]) -> Vec<EvaluationResult> {
    outcomes
        .iter()
        .enumerate()
        .map(|(index, outcome)| EvaluationResult {
            index,
            sample: Sample { values: vec![("x".into(), index as f64)] },
            outcome: match outcome {
                Some(y) => {
                    let mut outputs = BTreeMap::new();
                    outputs.insert("y".to_string(), *y);
                    Outcome::Success { outputs }
                }
                None => Outcome::Failure { reason: "failed".into() },
            },
        })
        .collect()
}

proptest! {
    /// successes + failures == samples, and the failure list is exact.
    #[test]
    fn counts_reconcile(outcomes in prop::collection::vec(
        prop::option::weighted(0.7, -100.0..100.0_f64), 1..40)
    ) {
        prop_assume!(outcomes.iter().any(|o| o.is_some()));
        let results = make_results(&outcomes);
        let summary = summarize_study(&make_config(), &results).unwrap();

        prop_assert_eq!(summary.n_samples, outcomes.len());
        prop_assert_eq!(summary.n_success + summary.n_failed, outcomes.len());
        prop_assert_eq!(summary.failures.len(), summary.n_failed);
        prop_assert_eq!(
            summary.n_success,
            outcomes.iter().filter(|o| o.is_some()).count()
        );
    }

    /// Mean lies within [min, max] of the successful outputs; std is defined
    /// exactly when there are at least 2 successes.
    #[test]
    fn stats_bounded_by_successes(outcomes in prop::collection::vec(
        prop::option::weighted(0.7, -100.0..100.0_f64), 1..40)
    ) {
        prop_assume!(outcomes.iter().any(|o| o.is_some()));
        let results = make_results(&outcomes);
        let summary = summarize_study(&make_config(), &results).unwrap();

        let y = &summary.outputs[0];
        prop_assert!(y.min <= y.mean + 1e-9);
        prop_assert!(y.mean <= y.max + 1e-9);
        prop_assert_eq!(y.std.is_some(), y.n >= 2);
    }

    /// A non-empty batch where everything failed is fatal, with the full
    /// failure list attached.
    #[test]
    fn all_failed_is_always_fatal(n in 1usize..40) {
        let outcomes: Vec<Option<f64>> = vec![None; n];
        let results = make_results(&outcomes);
        match summarize_study(&make_config(), &results) {
            Err(FatalError::AllSamplesFailed { count, failures, .. }) => {
                prop_assert_eq!(count, n);
                prop_assert_eq!(failures.len(), n);
            }
            other => prop_assert!(false, "expected fatal error, got {other:?}"),
        }
    }
}
