//! Batch orchestration — one evaluator invocation per sample.
//!
//! Evaluations are independent and embarrassingly parallel: the batch is
//! dispatched across a rayon pool (sequential fallback available), with no
//! ordering guarantee between completions. Each evaluation runs against its
//! own working subdirectory; the evaluator is treated as unsafe for shared
//! mutable state, so isolation is this module's job.
//!
//! Failure policy: a per-sample evaluator error, or a configured output
//! variable missing from the result, is recorded as a `Failure` outcome and
//! never aborts the batch. Each sample is attempted exactly once; re-running
//! is a caller decision.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use varilab_core::Sample;

use crate::evaluator::{Evaluator, InputSet};

/// Errors from batch setup. Evaluation failures are outcomes, not errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to create working directory {path}: {source}")]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a single evaluation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Success { outputs: BTreeMap<String, f64> },
    Failure { reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn outputs(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Outcome::Success { outputs } => Some(outputs),
            Outcome::Failure { .. } => None,
        }
    }
}

/// One (sample, outcome) record, tagged with its position in the design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub index: usize,
    pub sample: Sample,
    pub outcome: Outcome,
}

/// Runs a design's samples through the evaluator.
pub struct BatchRunner<'a> {
    evaluator: &'a dyn Evaluator,
    baseline: InputSet,
    output_vars: Vec<String>,
    working_dir: PathBuf,
    parallel: bool,
    cancel: Arc<AtomicBool>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        evaluator: &'a dyn Evaluator,
        baseline: InputSet,
        output_vars: Vec<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            evaluator,
            baseline,
            output_vars,
            working_dir: working_dir.into(),
            parallel: true,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Use an externally owned cancel flag.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag to flip for cooperative cancellation: samples not yet dispatched
    /// are skipped; in-flight evaluations finish and their results are kept.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run every sample once and collect the outcomes.
    ///
    /// Working subdirectories are created up front (the only fallible I/O);
    /// completed results come back sorted by sample index regardless of
    /// completion order.
    pub fn run_batch(&self, samples: &[Sample]) -> Result<Vec<EvaluationResult>, OrchestratorError> {
        let dirs = self.create_work_dirs(samples.len())?;

        let run_one = |(index, sample): (usize, &Sample)| -> Option<EvaluationResult> {
            if self.cancel.load(Ordering::Relaxed) {
                return None;
            }
            Some(self.run_sample(index, sample, &dirs[index]))
        };

        let mut results: Vec<EvaluationResult> = if self.parallel {
            samples.par_iter().enumerate().filter_map(run_one).collect()
        } else {
            samples.iter().enumerate().filter_map(run_one).collect()
        };
        results.sort_by_key(|r| r.index);
        Ok(results)
    }

    /// Evaluate a single sample in its own working directory.
    pub fn run_sample(&self, index: usize, sample: &Sample, work_dir: &Path) -> EvaluationResult {
        let inputs = self.baseline.overlay(sample);

        let outcome = match self.evaluator.evaluate(&inputs, work_dir) {
            Ok(raw) => match self.output_vars.iter().find(|v| !raw.contains_key(*v)) {
                Some(missing) => Outcome::Failure {
                    reason: format!("output variable '{missing}' missing from evaluator result"),
                },
                None => Outcome::Success {
                    outputs: self
                        .output_vars
                        .iter()
                        .map(|v| (v.clone(), raw[v]))
                        .collect(),
                },
            },
            Err(e) => Outcome::Failure { reason: e.to_string() },
        };

        EvaluationResult { index, sample: sample.clone(), outcome }
    }

    fn create_work_dirs(&self, count: usize) -> Result<Vec<PathBuf>, OrchestratorError> {
        (0..count)
            .map(|i| {
                let dir = self.working_dir.join(format!("sample_{i:05}"));
                std::fs::create_dir_all(&dir)
                    .map_err(|source| OrchestratorError::WorkDir { path: dir.clone(), source })?;
                Ok(dir)
            })
            .collect()
    }
}
