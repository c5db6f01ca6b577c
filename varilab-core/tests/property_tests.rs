//! Property tests for design and distribution invariants.
//!
//! Uses proptest to verify:
//! 1. Determinism — identical seed and config give bit-identical matrices
//! 2. Uniform transform stays inside its bounds for any draw
//! 3. Half-Gaussian transforms never cross their mean
//! 4. Latin Hypercube visits every stratum exactly once per dimension
//! 5. Morris trajectories have the r*(k+1) shape with one change per step

use proptest::prelude::*;
use varilab_core::design::{latin_hypercube_design, morris_design, pseudorandom_design};
use varilab_core::{ErrorModel, SeedStream, SensitivityDesign, UncertainVariable};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_unit_draw() -> impl Strategy<Value = f64> {
    0.0..1.0_f64
}

fn arb_bounds() -> impl Strategy<Value = (f64, f64)> {
    (-100.0..100.0_f64, 0.001..50.0_f64).prop_map(|(lo, width)| (lo, lo + width))
}

fn small_var_set() -> Vec<UncertainVariable> {
    vec![
        UncertainVariable::new("a", ErrorModel::Uniform { lower: 0.0, upper: 1.0 }),
        UncertainVariable::new("b", ErrorModel::Gaussian { mean: 2.0, std: 0.5 }),
        UncertainVariable::new("c", ErrorModel::Relative { mean: 10.0, percentage: 15.0 }),
    ]
}

// ── 1. Determinism ───────────────────────────────────────────────────

proptest! {
    /// Same seed + same config yields a bit-identical sample matrix.
    #[test]
    fn pseudorandom_design_is_deterministic(seed in any::<u64>(), n in 0usize..40) {
        let vars = small_var_set();
        let a = pseudorandom_design(&vars, n, &SeedStream::new(seed));
        let b = pseudorandom_design(&vars, n, &SeedStream::new(seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn latin_design_is_deterministic(seed in any::<u64>(), n in 1usize..40) {
        let vars = small_var_set();
        let a = latin_hypercube_design(&vars, n, 4, &SeedStream::new(seed));
        let b = latin_hypercube_design(&vars, n, 4, &SeedStream::new(seed));
        prop_assert_eq!(a, b);
    }
}

// ── 2. Uniform bounds ────────────────────────────────────────────────

proptest! {
    /// lower <= transform(u) <= upper for every draw in [0,1).
    #[test]
    fn uniform_transform_stays_in_bounds(u in arb_unit_draw(), bounds in arb_bounds()) {
        let (lower, upper) = bounds;
        let model = ErrorModel::Uniform { lower, upper };
        let v = model.transform(u);
        prop_assert!(v >= lower);
        prop_assert!(v <= upper);
    }
}

// ── 3. Half-Gaussian sidedness ───────────────────────────────────────

proptest! {
    #[test]
    fn lower_half_gaussian_never_exceeds_mean(
        u in arb_unit_draw(),
        mean in -50.0..50.0_f64,
        std in 0.001..10.0_f64,
    ) {
        let model = ErrorModel::LowerHalfGaussian { mean, std };
        prop_assert!(model.transform(u) <= mean);
    }

    #[test]
    fn upper_half_gaussian_never_undercuts_mean(
        u in arb_unit_draw(),
        mean in -50.0..50.0_f64,
        std in 0.001..10.0_f64,
    ) {
        let model = ErrorModel::UpperHalfGaussian { mean, std };
        prop_assert!(model.transform(u) >= mean);
    }
}

// ── 4. Latin Hypercube strata ────────────────────────────────────────

proptest! {
    /// For every variable, the N values partition into N distinct strata.
    #[test]
    fn latin_hypercube_strata_unique(seed in any::<u64>(), n in 1usize..50, level in 1usize..5) {
        let vars: Vec<UncertainVariable> = (0..3)
            .map(|i| UncertainVariable::new(
                format!("x{i}"),
                ErrorModel::Uniform { lower: 0.0, upper: 1.0 },
            ))
            .collect();
        let design = latin_hypercube_design(&vars, n, level, &SeedStream::new(seed));
        for j in 0..vars.len() {
            let mut strata: Vec<usize> = design
                .column(j)
                .iter()
                .map(|u| ((u * n as f64).floor() as usize).min(n - 1))
                .collect();
            strata.sort_unstable();
            prop_assert_eq!(strata, (0..n).collect::<Vec<_>>());
        }
    }
}

// ── 5. Morris trajectory shape ───────────────────────────────────────

proptest! {
    #[test]
    fn morris_shape_and_one_at_a_time(seed in any::<u64>(), r in 1usize..12) {
        let spec = SensitivityDesign {
            names: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            bounds: vec![(0.0, 1.0), (1.0, 3.0), (-1.0, 1.0), (10.0, 20.0)],
        };
        let morris = morris_design(&spec, r, &SeedStream::new(seed)).unwrap();
        let k = spec.num_vars();
        prop_assert_eq!(morris.design.len(), r * (k + 1));
        for t in 0..r {
            for s in 0..k {
                let before = &morris.design.rows[morris.row_index(t, s)];
                let after = &morris.design.rows[morris.row_index(t, s + 1)];
                let changed = (0..k).filter(|&j| before[j] != after[j]).count();
                prop_assert_eq!(changed, 1);
            }
        }
    }
}
