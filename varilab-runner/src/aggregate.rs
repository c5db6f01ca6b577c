//! Result aggregation — reduce evaluation results to a study summary.
//!
//! Key rules:
//! - Statistics are computed over `Success` outcomes only; failures are
//!   counted and listed, never silently dropped.
//! - A non-empty batch where every sample failed is a terminal study failure
//!   carrying the per-sample reasons.
//! - Fewer than 2 successes makes std and every sensitivity index undefined;
//!   undefined is reported as `None`, never as zero.
//! - Sobol/Morris estimators need the full paired row structure, so any
//!   failure inside a sensitivity batch marks its indices as undefined.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use varilab_core::stats;
use varilab_core::{MorrisDesign, SobolDesign, StudyConfig};

use crate::orchestrator::EvaluationResult;

/// Terminal study failure: the whole batch is unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FatalError {
    /// Every sample in a non-empty batch failed.
    #[error("all {count} evaluations failed; first failure: {first}")]
    AllSamplesFailed {
        count: usize,
        first: String,
        /// Full per-sample failure list, for diagnosis.
        failures: Vec<FailureRecord>,
    },
}

/// One recorded evaluation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub index: usize,
    pub reason: String,
}

/// Descriptive statistics for one output variable, over successes only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputStats {
    pub name: String,
    pub mean: f64,
    /// None with fewer than 2 successes.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub median: f64,
    pub p90: f64,
    pub n: usize,
}

/// Figure-of-merit comparison against the configured reference mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureOfMerit {
    pub name: String,
    pub reference_mean: f64,
    /// None when the batch produced no successes.
    pub observed_mean: Option<f64>,
    /// (observed - reference) / reference; None without successes or with a
    /// zero reference.
    pub relative_delta: Option<f64>,
}

/// Sobol indices for one (variable, output) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SobolIndex {
    pub variable: String,
    pub output: String,
    pub first_order: Option<f64>,
    pub total_order: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SobolTable {
    pub n_base: usize,
    pub indices: Vec<SobolIndex>,
}

/// Elementary-effect statistics for one (variable, output) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorrisEffect {
    pub variable: String,
    pub output: String,
    /// Mean elementary effect (large magnitude = strong influence).
    pub mean: Option<f64>,
    /// Mean absolute elementary effect.
    pub mean_abs: Option<f64>,
    /// Std of elementary effects (large = nonlinearity or interaction).
    pub std: Option<f64>,
    pub n_trajectories: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorrisTable {
    pub trajectories: usize,
    pub effects: Vec<MorrisEffect>,
}

/// Terminal artifact of a study. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySummary {
    pub runtitle: String,
    pub seed: u64,
    pub n_samples: usize,
    pub n_success: usize,
    pub n_failed: usize,
    pub failures: Vec<FailureRecord>,
    pub outputs: Vec<OutputStats>,
    pub figure_of_merit: FigureOfMerit,
    pub sobol: Option<SobolTable>,
    pub morris: Option<MorrisTable>,
}

/// Reduce the propagation batch to per-output statistics plus the
/// figure-of-merit comparison.
///
/// An empty batch yields a no-data summary (zero counts, no output rows);
/// a non-empty batch with zero successes is a `FatalError`.
pub fn summarize_study(
    config: &StudyConfig,
    results: &[EvaluationResult],
) -> Result<StudySummary, FatalError> {
    let failures = collect_failures(results);
    check_not_all_failed(results, &failures)?;

    let successes: Vec<&EvaluationResult> =
        results.iter().filter(|r| r.outcome.is_success()).collect();

    let outputs = if successes.is_empty() {
        Vec::new()
    } else {
        config
            .output_vars
            .iter()
            .map(|name| output_stats(name, &successes))
            .collect()
    };

    let observed_mean = outputs
        .iter()
        .find(|o| o.name == config.figure_of_merit)
        .map(|o| o.mean);
    let relative_delta = observed_mean.and_then(|m| {
        if config.output_mean == 0.0 {
            None
        } else {
            Some((m - config.output_mean) / config.output_mean)
        }
    });

    Ok(StudySummary {
        runtitle: config.runtitle.clone(),
        seed: config.seed,
        n_samples: results.len(),
        n_success: successes.len(),
        n_failed: failures.len(),
        failures,
        outputs,
        figure_of_merit: FigureOfMerit {
            name: config.figure_of_merit.clone(),
            reference_mean: config.output_mean,
            observed_mean,
            relative_delta,
        },
        sobol: None,
        morris: None,
    })
}

/// Sobol first-/total-order indices from an `A`,`B`,`AB_i` batch.
///
/// First-order uses the Saltelli estimator `mean(y_B * (y_AB_i - y_A)) / V`,
/// total-order the Jansen estimator `mean((y_A - y_AB_i)^2) / (2V)`, with `V`
/// the variance of the pooled A and B outputs. Both are identically zero for
/// a variable the output does not depend on.
pub fn sobol_indices(
    design: &SobolDesign,
    output_vars: &[String],
    results: &[EvaluationResult],
) -> Result<SobolTable, FatalError> {
    let failures = collect_failures(results);
    check_not_all_failed(results, &failures)?;

    let complete = failures.is_empty() && results.len() == design.total_rows();
    let usable = complete && design.n_base >= 2;

    let mut indices = Vec::with_capacity(design.num_vars * output_vars.len());
    for output in output_vars {
        let y = usable.then(|| output_column(output, results));
        for (i, variable) in design.design.names.iter().enumerate() {
            let (first_order, total_order) = match &y {
                Some(y) => single_sobol_pair(design, y, i),
                None => (None, None),
            };
            indices.push(SobolIndex {
                variable: variable.clone(),
                output: output.clone(),
                first_order,
                total_order,
            });
        }
    }

    Ok(SobolTable { n_base: design.n_base, indices })
}

fn single_sobol_pair(design: &SobolDesign, y: &[f64], i: usize) -> (Option<f64>, Option<f64>) {
    let ya = design.a_block(y);
    let yb = design.b_block(y);
    let yab = design.ab_block(y, i);

    let pooled: Vec<f64> = ya.iter().chain(yb).copied().collect();
    let v = match stats::variance(&pooled) {
        Some(v) if v > 1e-300 => v,
        // Degenerate output: no variance to decompose.
        _ => return (None, None),
    };

    let n = design.n_base as f64;
    let first: f64 = yb
        .iter()
        .zip(yab)
        .zip(ya)
        .map(|((b, ab), a)| b * (ab - a))
        .sum::<f64>()
        / n
        / v;
    let total: f64 = ya
        .iter()
        .zip(yab)
        .map(|(a, ab)| (a - ab) * (a - ab))
        .sum::<f64>()
        / (2.0 * n)
        / v;

    (Some(first), Some(total))
}

/// Morris elementary-effect statistics from a trajectory batch.
///
/// The elementary effect of a step is `(y_after - y_before) / signed_step`;
/// mean, mean-absolute, and std are taken across trajectories per variable.
pub fn morris_effects(
    design: &MorrisDesign,
    output_vars: &[String],
    results: &[EvaluationResult],
) -> Result<MorrisTable, FatalError> {
    let failures = collect_failures(results);
    check_not_all_failed(results, &failures)?;

    let complete = failures.is_empty()
        && results.len() == design.total_rows()
        && design.trajectories >= 1;

    let mut effects = Vec::with_capacity(design.num_vars * output_vars.len());
    for output in output_vars {
        let per_var = complete.then(|| elementary_effects(design, &output_column(output, results)));
        for (j, variable) in design.design.names.iter().enumerate() {
            let effect = match &per_var {
                Some(per_var) => {
                    let ees = &per_var[j];
                    MorrisEffect {
                        variable: variable.clone(),
                        output: output.clone(),
                        mean: Some(stats::mean(ees)),
                        mean_abs: Some(stats::mean(
                            &ees.iter().map(|e| e.abs()).collect::<Vec<_>>(),
                        )),
                        std: stats::sample_std(ees),
                        n_trajectories: ees.len(),
                    }
                }
                None => MorrisEffect {
                    variable: variable.clone(),
                    output: output.clone(),
                    mean: None,
                    mean_abs: None,
                    std: None,
                    n_trajectories: 0,
                },
            };
            effects.push(effect);
        }
    }

    Ok(MorrisTable { trajectories: design.trajectories, effects })
}

/// Per-variable elementary effects: `ees[j]` holds one effect per trajectory.
fn elementary_effects(design: &MorrisDesign, y: &[f64]) -> Vec<Vec<f64>> {
    let mut per_var = vec![Vec::with_capacity(design.trajectories); design.num_vars];
    for (t, traj_steps) in design.steps.iter().enumerate() {
        for (s, &(j, step)) in traj_steps.iter().enumerate() {
            let before = y[design.row_index(t, s)];
            let after = y[design.row_index(t, s + 1)];
            per_var[j].push((after - before) / step);
        }
    }
    per_var
}

// ─── Shared helpers ──────────────────────────────────────────────────

fn collect_failures(results: &[EvaluationResult]) -> Vec<FailureRecord> {
    results
        .iter()
        .filter_map(|r| match &r.outcome {
            crate::orchestrator::Outcome::Failure { reason } => Some(FailureRecord {
                index: r.index,
                reason: reason.clone(),
            }),
            _ => None,
        })
        .collect()
}

fn check_not_all_failed(
    results: &[EvaluationResult],
    failures: &[FailureRecord],
) -> Result<(), FatalError> {
    if !results.is_empty() && failures.len() == results.len() {
        return Err(FatalError::AllSamplesFailed {
            count: results.len(),
            first: failures[0].reason.clone(),
            failures: failures.to_vec(),
        });
    }
    Ok(())
}

/// Values of one output across successes, in sample-index order.
fn output_column(name: &str, results: &[EvaluationResult]) -> Vec<f64> {
    let mut pairs: Vec<(usize, f64)> = results
        .iter()
        .filter_map(|r| r.outcome.outputs().map(|o| (r.index, o[name])))
        .collect();
    pairs.sort_by_key(|&(i, _)| i);
    pairs.into_iter().map(|(_, v)| v).collect()
}

fn output_stats(name: &str, successes: &[&EvaluationResult]) -> OutputStats {
    let values: Vec<f64> = successes
        .iter()
        .map(|r| r.outcome.outputs().expect("successes only")[name])
        .collect();
    let sorted = stats::sorted(&values);
    OutputStats {
        name: name.to_string(),
        mean: stats::mean(&values),
        std: stats::sample_std(&values),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        p10: stats::percentile_sorted(&sorted, 10.0),
        median: stats::percentile_sorted(&sorted, 50.0),
        p90: stats::percentile_sorted(&sorted, 90.0),
        n: values.len(),
    }
}
