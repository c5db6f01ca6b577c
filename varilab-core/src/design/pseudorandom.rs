//! Plain pseudorandom design — independent uniform draws per variable.

use rand::Rng;

use crate::config::UncertainVariable;
use crate::design::Design;
use crate::rng::SeedStream;

/// Draw `no_samples` independent uniform vectors and push each component
/// through its variable's error model.
///
/// Draws come from a single seeded stream, consumed row-major, so the matrix
/// is bit-identical for a given (seed, variable list, sample count).
pub fn pseudorandom_design(
    variables: &[UncertainVariable],
    no_samples: usize,
    seeds: &SeedStream,
) -> Design {
    let names: Vec<String> = variables.iter().map(|v| v.name.clone()).collect();
    let mut rng = seeds.rng_for("design/pseudorandom");

    let mut rows = Vec::with_capacity(no_samples);
    for _ in 0..no_samples {
        let row = variables
            .iter()
            .map(|v| v.model.transform(rng.gen::<f64>()))
            .collect();
        rows.push(row);
    }
    Design { names, rows }
}
