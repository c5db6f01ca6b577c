//! Sampling designs — the matrices of perturbed inputs that drive a study.
//!
//! Four designs:
//! - Plain pseudorandom: independent uniform vectors per sample
//! - Latin Hypercube: stratified, one draw per stratum per variable
//! - Sobol: paired quasi-random matrices for variance-based indices
//! - Morris: one-at-a-time trajectories for elementary-effects screening
//!
//! Every design consumes its draws up front from a named `SeedStream` stream,
//! so matrices are bit-identical for a given (seed, config) regardless of
//! execution concurrency.

pub mod latin;
pub mod morris;
pub mod pseudorandom;
pub mod sobol;

pub use latin::latin_hypercube_design;
pub use morris::{morris_design, MorrisDesign};
pub use pseudorandom::pseudorandom_design;
pub use sobol::{sobol_design, SobolDesign};

use serde::{Deserialize, Serialize};

/// One perturbed input set: ordered (variable name, value) pairs.
///
/// Produced by a design generator, consumed exactly once by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub values: Vec<(String, f64)>,
}

impl Sample {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

/// A generated sample matrix: shared column names plus one row per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Design {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Materialize row `i` as an owned sample.
    pub fn sample(&self, i: usize) -> Sample {
        Sample {
            values: self
                .names
                .iter()
                .cloned()
                .zip(self.rows[i].iter().copied())
                .collect(),
        }
    }

    /// Materialize every row, in order.
    pub fn samples(&self) -> Vec<Sample> {
        (0..self.rows.len()).map(|i| self.sample(i)).collect()
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[j]).collect()
    }
}
