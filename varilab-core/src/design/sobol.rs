//! Sobol design — paired quasi-random matrices for variance-based indices.
//!
//! Pick-freeze construction: two independent base matrices `A` and `B` of
//! `n` quasi-random points in `k` dimensions, plus `k` matrices `AB_i` formed
//! by replacing column `i` of `A` with column `i` of `B`. Row layout in the
//! emitted matrix: `A` rows, `B` rows, then the `AB_1..AB_k` blocks, for
//! `n*(k+2)` rows total.
//!
//! Base points are shifted Halton sequences: per-dimension prime radical
//! inverse, decorrelated by an independent seeded Cranley-Patterson rotation
//! per matrix.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SensitivityDesign};
use crate::design::Design;
use crate::rng::SeedStream;

/// Bases for the per-dimension radical inverse.
const PRIMES: [u64; 32] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131,
];

/// A Sobol sample matrix plus the block structure the aggregator needs to
/// pair outputs back up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SobolDesign {
    pub design: Design,
    /// Base points per matrix (`n`).
    pub n_base: usize,
    pub num_vars: usize,
}

impl SobolDesign {
    pub fn total_rows(&self) -> usize {
        self.n_base * (self.num_vars + 2)
    }

    /// Slice of `y` corresponding to the `A` rows.
    pub fn a_block<'a>(&self, y: &'a [f64]) -> &'a [f64] {
        &y[..self.n_base]
    }

    /// Slice of `y` corresponding to the `B` rows.
    pub fn b_block<'a>(&self, y: &'a [f64]) -> &'a [f64] {
        &y[self.n_base..2 * self.n_base]
    }

    /// Slice of `y` corresponding to the `AB_i` rows for variable `i`.
    pub fn ab_block<'a>(&self, y: &'a [f64], i: usize) -> &'a [f64] {
        let start = (2 + i) * self.n_base;
        &y[start..start + self.n_base]
    }
}

/// Build the `A`/`B`/`AB_i` matrix for a sensitivity design.
///
/// Bounds are validated here, at build time; points are scaled to each
/// variable's [lower, upper] range.
pub fn sobol_design(
    spec: &SensitivityDesign,
    n_base: usize,
    seeds: &SeedStream,
) -> Result<SobolDesign, ConfigError> {
    spec.validate("sobol")?;
    let k = spec.num_vars();
    if k > PRIMES.len() {
        return Err(ConfigError::TooManyVariables {
            design: "sobol".to_string(),
            max: PRIMES.len(),
            got: k,
        });
    }

    let mut rng = seeds.rng_for("design/sobol");
    let shift_a: Vec<f64> = (0..k).map(|_| rng.gen::<f64>()).collect();
    let shift_b: Vec<f64> = (0..k).map(|_| rng.gen::<f64>()).collect();

    let a = halton_matrix(n_base, k, &shift_a);
    let b = halton_matrix(n_base, k, &shift_b);

    let scale = |row: &[f64]| -> Vec<f64> {
        row.iter()
            .zip(&spec.bounds)
            .map(|(u, &(lower, upper))| lower + u * (upper - lower))
            .collect()
    };

    let mut rows = Vec::with_capacity(n_base * (k + 2));
    for row in &a {
        rows.push(scale(row));
    }
    for row in &b {
        rows.push(scale(row));
    }
    for i in 0..k {
        for (row_a, row_b) in a.iter().zip(&b) {
            let mut row = row_a.clone();
            row[i] = row_b[i];
            rows.push(scale(&row));
        }
    }

    Ok(SobolDesign {
        design: Design { names: spec.names.clone(), rows },
        n_base,
        num_vars: k,
    })
}

/// `n` x `k` matrix of shifted Halton points in the unit hypercube.
fn halton_matrix(n: usize, k: usize, shifts: &[f64]) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            (0..k)
                .map(|j| {
                    // Index offset 1 skips the all-zeros first Halton point.
                    let h = radical_inverse(i as u64 + 1, PRIMES[j]);
                    (h + shifts[j]).fract()
                })
                .collect()
        })
        .collect()
}

/// Van der Corput radical inverse of `index` in `base`.
fn radical_inverse(mut index: u64, base: u64) -> f64 {
    let mut result = 0.0;
    let mut fraction = 1.0 / base as f64;
    while index > 0 {
        result += (index % base) as f64 * fraction;
        index /= base;
        fraction /= base as f64;
    }
    result
}
