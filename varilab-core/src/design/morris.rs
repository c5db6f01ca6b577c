//! Morris screening design — one-at-a-time trajectories for elementary effects.
//!
//! Each trajectory is `k+1` points on a `p`-level grid in the unit hypercube,
//! scaled to the design bounds. Consecutive points differ in exactly one
//! not-yet-changed coordinate by the standard step `delta = p / (2(p-1))`,
//! signed so the point stays inside the hypercube. Every trajectory perturbs
//! all `k` coordinates, in an independently shuffled order.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SensitivityDesign};
use crate::design::Design;
use crate::rng::SeedStream;

/// Grid levels (`p`). Four levels gives delta = 2/3 in unit space.
const GRID_LEVELS: usize = 4;

/// A Morris trajectory set plus the step bookkeeping the aggregator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorrisDesign {
    pub design: Design,
    pub trajectories: usize,
    pub num_vars: usize,
    /// Per trajectory, the ordered (variable index, signed physical step)
    /// applied between consecutive points.
    pub steps: Vec<Vec<(usize, f64)>>,
}

impl MorrisDesign {
    pub fn total_rows(&self) -> usize {
        self.trajectories * (self.num_vars + 1)
    }

    /// Row index of point `p` within trajectory `t`.
    pub fn row_index(&self, t: usize, p: usize) -> usize {
        t * (self.num_vars + 1) + p
    }
}

/// Build `r` one-at-a-time trajectories for a sensitivity design.
///
/// Bounds are validated here, at build time.
pub fn morris_design(
    spec: &SensitivityDesign,
    trajectories: usize,
    seeds: &SeedStream,
) -> Result<MorrisDesign, ConfigError> {
    spec.validate("morris")?;
    let k = spec.num_vars();
    let mut rng = seeds.rng_for("design/morris");

    let p = GRID_LEVELS;
    let delta = p as f64 / (2.0 * (p - 1) as f64);

    let scale = |unit: &[f64]| -> Vec<f64> {
        unit.iter()
            .zip(&spec.bounds)
            .map(|(u, &(lower, upper))| lower + u * (upper - lower))
            .collect()
    };

    let mut rows = Vec::with_capacity(trajectories * (k + 1));
    let mut steps = Vec::with_capacity(trajectories);

    for _ in 0..trajectories {
        // Base point on the grid.
        let mut point: Vec<f64> = (0..k)
            .map(|_| rng.gen_range(0..p) as f64 / (p - 1) as f64)
            .collect();
        rows.push(scale(&point));

        let mut order: Vec<usize> = (0..k).collect();
        order.shuffle(&mut rng);

        let mut traj_steps = Vec::with_capacity(k);
        for &j in &order {
            let up_ok = point[j] + delta <= 1.0 + 1e-9;
            let down_ok = point[j] - delta >= -1e-9;
            let step = if up_ok && down_ok {
                if rng.gen_bool(0.5) { delta } else { -delta }
            } else if up_ok {
                delta
            } else {
                -delta
            };
            point[j] = (point[j] + step).clamp(0.0, 1.0);
            rows.push(scale(&point));

            let (lower, upper) = spec.bounds[j];
            traj_steps.push((j, step * (upper - lower)));
        }
        steps.push(traj_steps);
    }

    Ok(MorrisDesign {
        design: Design { names: spec.names.clone(), rows },
        trajectories,
        num_vars: k,
        steps,
    })
}
