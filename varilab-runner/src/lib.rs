//! VariLab Runner — study orchestration, aggregation, reports.
//!
//! This crate builds on `varilab-core` to provide:
//! - Study-document loading (JSON/TOML) into a validated config
//! - The evaluator boundary (injected capability) and input overlay
//! - Parallel batch orchestration with per-sample working-directory
//!   isolation and cooperative cancellation
//! - Result aggregation: per-output statistics, figure-of-merit delta,
//!   Sobol indices, Morris elementary effects
//! - Report artifacts (JSON summary, markdown report, CSV results table)

pub mod aggregate;
pub mod config;
pub mod evaluator;
pub mod orchestrator;
pub mod report;
pub mod study;

pub use aggregate::{
    morris_effects, sobol_indices, summarize_study, FailureRecord, FatalError, FigureOfMerit,
    MorrisEffect, MorrisTable, OutputStats, SobolIndex, SobolTable, StudySummary,
};
pub use config::{load_study_file, study_config_from_document, StudyDocument, StudyFileError};
pub use evaluator::{EvalError, Evaluator, FnEvaluator, InputSet};
pub use orchestrator::{BatchRunner, EvaluationResult, OrchestratorError, Outcome};
pub use report::{render_markdown, summary_to_json, write_results_csv, write_summary_json};
pub use study::{run_study, StudyError, StudyOptions, StudyOutcome};
