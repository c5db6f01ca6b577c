//! Study driver — wires designs, orchestration, and aggregation together.
//!
//! One call runs the whole study: build the propagation design from the
//! seeded streams, evaluate it, aggregate, then (if configured) run the
//! Sobol and Morris screening batches and attach their tables to the
//! summary. All pseudorandom draws happen before the first evaluator
//! dispatch.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use thiserror::Error;

use varilab_core::design::{
    latin_hypercube_design, morris_design, pseudorandom_design, sobol_design,
};
use varilab_core::{ConfigError, SamplingMethod, SeedStream, StudyConfig};

use crate::aggregate::{morris_effects, sobol_indices, summarize_study, FatalError, StudySummary};
use crate::evaluator::{Evaluator, InputSet};
use crate::orchestrator::{BatchRunner, EvaluationResult, OrchestratorError};

/// Errors from running a study end to end.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("configuration invalid: {0}")]
    Config(#[from] ConfigError),
    #[error("batch setup failed: {0}")]
    Orchestrator(#[from] OrchestratorError),
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

/// Knobs that do not change sample values, only how the batch executes.
#[derive(Debug, Clone)]
pub struct StudyOptions {
    pub parallel: bool,
    /// Cooperative cancellation, shared across all batches of the study.
    pub cancel: Arc<AtomicBool>,
}

impl Default for StudyOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Everything a finished study produced, raw results included.
#[derive(Debug)]
pub struct StudyOutcome {
    pub summary: StudySummary,
    pub propagation: Vec<EvaluationResult>,
    pub sobol: Vec<EvaluationResult>,
    pub morris: Vec<EvaluationResult>,
}

/// Run a complete study against an injected evaluator.
///
/// The Sobol batch uses `no_samples` base points per matrix; the Morris batch
/// uses `no_samples` trajectories.
pub fn run_study(
    config: &StudyConfig,
    baseline: InputSet,
    evaluator: &dyn Evaluator,
    options: &StudyOptions,
) -> Result<StudyOutcome, StudyError> {
    config.validate()?;
    let seeds = SeedStream::new(config.seed);

    // Every design, and therefore every pseudorandom draw, is materialized
    // before the first evaluator dispatch.
    let design = match config.method {
        SamplingMethod::Pseudorandom => {
            pseudorandom_design(&config.variables, config.no_samples, &seeds)
        }
        SamplingMethod::LatinHypercube => latin_hypercube_design(
            &config.variables,
            config.no_samples,
            config.latin_hypercube_level,
            &seeds,
        ),
    };
    let sobol = config
        .sobol
        .as_ref()
        .map(|spec| sobol_design(spec, config.no_samples, &seeds))
        .transpose()?;
    let morris = config
        .morris
        .as_ref()
        .map(|spec| morris_design(spec, config.no_samples, &seeds))
        .transpose()?;

    let make_runner = |subdir: &str| {
        BatchRunner::new(
            evaluator,
            baseline.clone(),
            config.output_vars.clone(),
            config.working_dir.join(subdir),
        )
        .with_parallelism(options.parallel)
        .with_cancel_flag(Arc::clone(&options.cancel))
    };

    let propagation = make_runner("propagation").run_batch(&design.samples())?;
    let mut summary = summarize_study(config, &propagation)?;

    let mut sobol_results = Vec::new();
    if let Some(sobol) = &sobol {
        sobol_results = make_runner("sobol").run_batch(&sobol.design.samples())?;
        summary.sobol = Some(sobol_indices(sobol, &config.output_vars, &sobol_results)?);
    }

    let mut morris_results = Vec::new();
    if let Some(morris) = &morris {
        morris_results = make_runner("morris").run_batch(&morris.design.samples())?;
        summary.morris = Some(morris_effects(morris, &config.output_vars, &morris_results)?);
    }

    Ok(StudyOutcome {
        summary,
        propagation,
        sobol: sobol_results,
        morris: morris_results,
    })
}
