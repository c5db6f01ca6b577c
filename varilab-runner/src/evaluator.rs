//! Evaluator boundary — the injected capability that runs one sample.
//!
//! The orchestrator never sees a concrete evaluator, only this trait: merged
//! inputs plus an isolated working directory in, an output-variable map or a
//! failure out. In-process closures, subprocess wrappers, and remote services
//! are all valid implementations.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use varilab_core::Sample;

/// Error from a single evaluator invocation. Non-fatal to the batch.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("evaluator failed: {reason}")]
pub struct EvalError {
    pub reason: String,
}

impl EvalError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Full input-variable set handed to the evaluator: baseline values with a
/// sample's perturbations overlaid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSet {
    values: BTreeMap<String, f64>,
}

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// New set with the sample's values overlaid on this baseline.
    ///
    /// Variables absent from the sample keep their baseline values; the
    /// baseline itself is never mutated.
    pub fn overlay(&self, sample: &Sample) -> InputSet {
        let mut merged = self.clone();
        for (name, value) in sample.iter() {
            merged.values.insert(name.to_string(), value);
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for InputSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

/// External-evaluator capability.
///
/// Implementations must tolerate concurrent calls; each call receives its own
/// working directory and must not share mutable state across calls.
pub trait Evaluator: Send + Sync {
    fn evaluate(
        &self,
        inputs: &InputSet,
        work_dir: &Path,
    ) -> Result<BTreeMap<String, f64>, EvalError>;
}

/// Closure adapter for in-process models and tests.
pub struct FnEvaluator<F> {
    f: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&InputSet) -> Result<BTreeMap<String, f64>, EvalError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&InputSet) -> Result<BTreeMap<String, f64>, EvalError> + Send + Sync,
{
    fn evaluate(
        &self,
        inputs: &InputSet,
        _work_dir: &Path,
    ) -> Result<BTreeMap<String, f64>, EvalError> {
        (self.f)(inputs)
    }
}
