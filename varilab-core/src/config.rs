//! Study configuration — validated, immutable model of an uncertainty study.
//!
//! A `StudyConfig` is created once at study start and read-only thereafter.
//! Validation is eager and exhaustive: a malformed study fails here, before
//! any design is built and before the external evaluator burns any time.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distribution::{DistributionError, ErrorModel};

/// Errors from study-config validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("variable '{name}': {source}")]
    Distribution {
        name: String,
        #[source]
        source: DistributionError,
    },
    #[error("duplicate uncertain variable '{0}'")]
    DuplicateVariable(String),
    #[error("no output variables configured")]
    NoOutputs,
    #[error("figure of merit '{0}' is not one of the output variables")]
    FigureOfMeritNotOutput(String),
    #[error("latin hypercube level must be >= 1, got {0}")]
    InvalidLatinLevel(usize),
    #[error(
        "sensitivity design '{design}', variable '{name}': lower bound {lower} must be < upper bound {upper}"
    )]
    InvalidBounds {
        design: String,
        name: String,
        lower: f64,
        upper: f64,
    },
    #[error("sensitivity design '{design}': {names} names but {bounds} bounds")]
    BoundsMismatch {
        design: String,
        names: usize,
        bounds: usize,
    },
    #[error("sensitivity design '{design}' supports at most {max} variables, got {got}")]
    TooManyVariables {
        design: String,
        max: usize,
        got: usize,
    },
}

/// One uncertain input: a name and its perturbation family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertainVariable {
    pub name: String,
    pub model: ErrorModel,
}

impl UncertainVariable {
    pub fn new(name: impl Into<String>, model: ErrorModel) -> Self {
        Self { name: name.into(), model }
    }
}

/// Bounded variable set for variance-/effects-based screening.
///
/// Independent of the distribution-based variables: screening designs sample
/// plain [lower, upper] ranges, not error models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityDesign {
    pub names: Vec<String>,
    pub bounds: Vec<(f64, f64)>,
}

impl SensitivityDesign {
    pub fn num_vars(&self) -> usize {
        self.names.len()
    }

    /// Bound checks, raised at design-build time rather than lazily.
    pub fn validate(&self, design: &str) -> Result<(), ConfigError> {
        if self.names.len() != self.bounds.len() {
            return Err(ConfigError::BoundsMismatch {
                design: design.to_string(),
                names: self.names.len(),
                bounds: self.bounds.len(),
            });
        }
        for (name, &(lower, upper)) in self.names.iter().zip(&self.bounds) {
            if !(lower < upper) {
                return Err(ConfigError::InvalidBounds {
                    design: design.to_string(),
                    name: name.clone(),
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }
}

/// Which design drives the main propagation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    #[default]
    Pseudorandom,
    LatinHypercube,
}

/// Complete description of an uncertainty study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    pub runtitle: String,
    /// Baseline input set the evaluator starts from.
    pub baseline_path: PathBuf,
    pub working_dir: PathBuf,
    pub seed: u64,
    /// Ordered uncertain variables; order fixes design-matrix columns.
    pub variables: Vec<UncertainVariable>,
    /// Output variables extracted from every evaluation.
    pub output_vars: Vec<String>,
    pub no_samples: usize,
    /// Reference value for the figure-of-merit comparison.
    pub output_mean: f64,
    /// Must be a member of `output_vars`.
    pub figure_of_merit: String,
    pub latin_hypercube_level: usize,
    #[serde(default)]
    pub method: SamplingMethod,
    #[serde(default)]
    pub sobol: Option<SensitivityDesign>,
    #[serde(default)]
    pub morris: Option<SensitivityDesign>,
}

impl StudyConfig {
    /// Validate every field eagerly.
    ///
    /// Distribution parameters, bound ordering, cross-field references, and
    /// the LHS level are all checked here; nothing is deferred to run time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for var in &self.variables {
            if !seen.insert(var.name.as_str()) {
                return Err(ConfigError::DuplicateVariable(var.name.clone()));
            }
            var.model.validate().map_err(|source| ConfigError::Distribution {
                name: var.name.clone(),
                source,
            })?;
        }

        if self.output_vars.is_empty() {
            return Err(ConfigError::NoOutputs);
        }
        if !self.output_vars.iter().any(|v| v == &self.figure_of_merit) {
            return Err(ConfigError::FigureOfMeritNotOutput(
                self.figure_of_merit.clone(),
            ));
        }
        if self.latin_hypercube_level == 0 {
            return Err(ConfigError::InvalidLatinLevel(0));
        }

        if let Some(sobol) = &self.sobol {
            sobol.validate("sobol")?;
        }
        if let Some(morris) = &self.morris {
            morris.validate("morris")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> StudyConfig {
        StudyConfig {
            runtitle: "tf coil uncertainty".into(),
            baseline_path: "IN.DAT".into(),
            working_dir: "work".into(),
            seed: 2,
            variables: vec![
                UncertainVariable::new(
                    "boundu_walalw",
                    ErrorModel::Uniform { lower: 0.6, upper: 0.9 },
                ),
                UncertainVariable::new(
                    "coreradius",
                    ErrorModel::Gaussian { mean: 0.6, std: 0.15 },
                ),
            ],
            output_vars: vec!["rmajor".into(), "pnetel".into()],
            no_samples: 5,
            output_mean: 8.9,
            figure_of_merit: "rmajor".into(),
            latin_hypercube_level: 4,
            method: SamplingMethod::Pseudorandom,
            sobol: None,
            morris: None,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(make_config().validate().is_ok());
    }

    #[test]
    fn duplicate_variable_rejected() {
        let mut config = make_config();
        config.variables.push(UncertainVariable::new(
            "coreradius",
            ErrorModel::Relative { mean: 1.0, percentage: 10.0 },
        ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateVariable(name)) if name == "coreradius"
        ));
    }

    #[test]
    fn bad_distribution_attributed_to_variable() {
        let mut config = make_config();
        config.variables[1].model = ErrorModel::Gaussian { mean: 0.6, std: 0.0 };
        match config.validate() {
            Err(ConfigError::Distribution { name, .. }) => assert_eq!(name, "coreradius"),
            other => panic!("expected distribution error, got {other:?}"),
        }
    }

    #[test]
    fn figure_of_merit_must_be_an_output() {
        let mut config = make_config();
        config.figure_of_merit = "capcost".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FigureOfMeritNotOutput(_))
        ));
    }

    #[test]
    fn zero_latin_level_rejected() {
        let mut config = make_config();
        config.latin_hypercube_level = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLatinLevel(0))));
    }

    #[test]
    fn inverted_sensitivity_bounds_rejected() {
        let mut config = make_config();
        config.sobol = Some(SensitivityDesign {
            names: vec!["a".into(), "b".into()],
            bounds: vec![(0.0, 1.0), (2.0, 2.0)],
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { ref name, .. }) if name == "b"
        ));
    }

    #[test]
    fn bounds_count_must_match_names() {
        let design = SensitivityDesign {
            names: vec!["a".into()],
            bounds: vec![(0.0, 1.0), (0.0, 1.0)],
        };
        assert!(matches!(
            design.validate("morris"),
            Err(ConfigError::BoundsMismatch { names: 1, bounds: 2, .. })
        ));
    }

    #[test]
    fn config_serialization_round_trip() {
        let config = make_config();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: StudyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
