//! Study-document loading — the declarative description of an uncertainty
//! study, as consumed once at study start.
//!
//! Accepts JSON or TOML, dispatched on file extension. Field casing on
//! uncertainty entries is normalized via aliases: study files in the wild
//! spell the same field both `Std` and `std`, and that is one field, not two.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use varilab_core::{
    ConfigError, ErrorModel, SamplingMethod, SensitivityDesign, StudyConfig, UncertainVariable,
};

/// Errors from study-document loading.
#[derive(Debug, Error)]
pub enum StudyFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unsupported study file extension: '{0}' (expected .json or .toml)")]
    UnsupportedExtension(String),
    #[error("variable '{name}': unknown error type '{errortype}'")]
    UnknownErrorType { name: String, errortype: String },
    #[error("variable '{name}': missing field '{field}' for error type '{errortype}'")]
    MissingField {
        name: String,
        errortype: String,
        field: &'static str,
    },
    #[error("sensitivity design '{design}': num_vars is {num_vars} but {names} names given")]
    NumVarsMismatch {
        design: String,
        num_vars: usize,
        names: usize,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Raw study document, straight off disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyDocument {
    pub config: RawRunConfig,
    #[serde(default)]
    pub uncertainties: Vec<RawUncertainty>,
    #[serde(default)]
    pub output_vars: Vec<String>,
    pub no_samples: usize,
    pub output_mean: f64,
    pub figure_of_merit: String,
    #[serde(default = "default_latin_level")]
    pub latin_hypercube_level: usize,
    #[serde(default)]
    pub sampling_method: Option<SamplingMethod>,
    #[serde(default)]
    pub sobol_uncertainties: Option<RawSensitivity>,
    #[serde(default)]
    pub morris_uncertainties: Option<RawSensitivity>,
}

fn default_latin_level() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRunConfig {
    pub runtitle: String,
    #[serde(rename = "IN.DAT_path")]
    pub baseline_path: PathBuf,
    pub working_directory: PathBuf,
    pub pseudorandom_seed: u64,
}

/// One uncertainty entry. Aliases absorb the casing drift seen in real
/// study files.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUncertainty {
    #[serde(alias = "Varname")]
    pub varname: String,
    #[serde(alias = "Errortype")]
    pub errortype: String,
    #[serde(default, alias = "Mean")]
    pub mean: Option<f64>,
    #[serde(default, alias = "Std")]
    pub std: Option<f64>,
    #[serde(default, alias = "Lower_bound", alias = "lower")]
    pub lower_bound: Option<f64>,
    #[serde(default, alias = "Upper_bound", alias = "upper")]
    pub upper_bound: Option<f64>,
    #[serde(default, alias = "Percentage")]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSensitivity {
    pub names: Vec<String>,
    pub bounds: Vec<(f64, f64)>,
    pub num_vars: usize,
}

/// Load and validate a study document from disk.
pub fn load_study_file(path: &Path) -> Result<StudyConfig, StudyFileError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" && ext != "toml" {
        return Err(StudyFileError::UnsupportedExtension(ext));
    }

    let text = std::fs::read_to_string(path).map_err(|source| StudyFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let doc: StudyDocument = match ext.as_str() {
        "json" => serde_json::from_str(&text).map_err(|e| StudyFileError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        "toml" => toml::from_str(&text).map_err(|e| StudyFileError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        other => return Err(StudyFileError::UnsupportedExtension(other.to_string())),
    };

    study_config_from_document(doc)
}

/// Convert a raw document into a validated `StudyConfig`.
pub fn study_config_from_document(doc: StudyDocument) -> Result<StudyConfig, StudyFileError> {
    let variables = doc
        .uncertainties
        .iter()
        .map(uncertain_variable_from_raw)
        .collect::<Result<Vec<_>, _>>()?;

    let sobol = doc
        .sobol_uncertainties
        .map(|raw| sensitivity_from_raw("sobol", raw))
        .transpose()?;
    let morris = doc
        .morris_uncertainties
        .map(|raw| sensitivity_from_raw("morris", raw))
        .transpose()?;

    let config = StudyConfig {
        runtitle: doc.config.runtitle,
        baseline_path: doc.config.baseline_path,
        working_dir: doc.config.working_directory,
        seed: doc.config.pseudorandom_seed,
        variables,
        output_vars: doc.output_vars,
        no_samples: doc.no_samples,
        output_mean: doc.output_mean,
        figure_of_merit: doc.figure_of_merit,
        latin_hypercube_level: doc.latin_hypercube_level,
        method: doc.sampling_method.unwrap_or_default(),
        sobol,
        morris,
    };
    config.validate()?;
    Ok(config)
}

fn uncertain_variable_from_raw(raw: &RawUncertainty) -> Result<UncertainVariable, StudyFileError> {
    let name = raw.varname.clone();
    let errortype = raw.errortype.clone();
    let require = |field: Option<f64>, label: &'static str| {
        field.ok_or_else(|| StudyFileError::MissingField {
            name: name.clone(),
            errortype: errortype.clone(),
            field: label,
        })
    };

    // Error types are matched case-insensitively, same normalization as the
    // parameter fields.
    let model = match raw.errortype.to_ascii_lowercase().as_str() {
        "gaussian" => ErrorModel::Gaussian {
            mean: require(raw.mean, "mean")?,
            std: require(raw.std, "std")?,
        },
        "uniform" => ErrorModel::Uniform {
            lower: require(raw.lower_bound, "lower_bound")?,
            upper: require(raw.upper_bound, "upper_bound")?,
        },
        "relative" => ErrorModel::Relative {
            mean: require(raw.mean, "mean")?,
            percentage: require(raw.percentage, "percentage")?,
        },
        "lowerhalfgaussian" => ErrorModel::LowerHalfGaussian {
            mean: require(raw.mean, "mean")?,
            std: require(raw.std, "std")?,
        },
        "upperhalfgaussian" => ErrorModel::UpperHalfGaussian {
            mean: require(raw.mean, "mean")?,
            std: require(raw.std, "std")?,
        },
        _ => {
            return Err(StudyFileError::UnknownErrorType {
                name: raw.varname.clone(),
                errortype: raw.errortype.clone(),
            })
        }
    };

    Ok(UncertainVariable { name: raw.varname.clone(), model })
}

fn sensitivity_from_raw(
    design: &str,
    raw: RawSensitivity,
) -> Result<SensitivityDesign, StudyFileError> {
    if raw.num_vars != raw.names.len() {
        return Err(StudyFileError::NumVarsMismatch {
            design: design.to_string(),
            num_vars: raw.num_vars,
            names: raw.names.len(),
        });
    }
    Ok(SensitivityDesign { names: raw.names, bounds: raw.bounds })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_json() -> serde_json::Value {
        serde_json::json!({
            "config": {
                "runtitle": "tf coil uncertainty",
                "IN.DAT_path": "ref/IN.DAT",
                "working_directory": "work",
                "pseudorandom_seed": 2
            },
            "uncertainties": [
                {"Varname": "walalw", "Errortype": "Uniform",
                 "Lower_bound": 0.6, "Upper_bound": 0.9},
                {"Varname": "coreradius", "Errortype": "Gaussian",
                 "Mean": 0.6, "Std": 0.15}
            ],
            "output_vars": ["rmajor", "pnetel"],
            "no_samples": 5,
            "output_mean": 8.9,
            "figure_of_merit": "rmajor",
            "latin_hypercube_level": 4
        })
    }

    fn parse(value: serde_json::Value) -> Result<StudyConfig, StudyFileError> {
        let doc: StudyDocument = serde_json::from_value(value).unwrap();
        study_config_from_document(doc)
    }

    #[test]
    fn json_document_parses_and_validates() {
        let config = parse(base_json()).unwrap();
        assert_eq!(config.runtitle, "tf coil uncertainty");
        assert_eq!(config.seed, 2);
        assert_eq!(config.variables.len(), 2);
        assert_eq!(
            config.variables[0].model,
            ErrorModel::Uniform { lower: 0.6, upper: 0.9 }
        );
        assert_eq!(config.method, SamplingMethod::Pseudorandom);
    }

    #[test]
    fn lowercase_std_and_mean_accepted() {
        let mut value = base_json();
        value["uncertainties"][1] = serde_json::json!({
            "Varname": "coreradius", "Errortype": "Gaussian",
            "mean": 0.6, "std": 0.15
        });
        let config = parse(value).unwrap();
        assert_eq!(
            config.variables[1].model,
            ErrorModel::Gaussian { mean: 0.6, std: 0.15 }
        );
    }

    #[test]
    fn unknown_errortype_names_the_variable() {
        let mut value = base_json();
        value["uncertainties"][0]["Errortype"] = "Triangular".into();
        match parse(value) {
            Err(StudyFileError::UnknownErrorType { name, errortype }) => {
                assert_eq!(name, "walalw");
                assert_eq!(errortype, "Triangular");
            }
            other => panic!("expected unknown error type, got {other:?}"),
        }
    }

    #[test]
    fn missing_parameter_names_the_field() {
        let mut value = base_json();
        value["uncertainties"][1] = serde_json::json!({
            "Varname": "coreradius", "Errortype": "Gaussian", "Mean": 0.6
        });
        match parse(value) {
            Err(StudyFileError::MissingField { name, field, .. }) => {
                assert_eq!(name, "coreradius");
                assert_eq!(field, "std");
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn half_gaussian_errortypes_recognized() {
        let mut value = base_json();
        value["uncertainties"][1] = serde_json::json!({
            "Varname": "coreradius", "Errortype": "LowerHalfGaussian",
            "Mean": 0.6, "Std": 0.15
        });
        let config = parse(value).unwrap();
        assert!(matches!(
            config.variables[1].model,
            ErrorModel::LowerHalfGaussian { .. }
        ));
    }

    #[test]
    fn sobol_num_vars_mismatch_rejected() {
        let mut value = base_json();
        value["sobol_uncertainties"] = serde_json::json!({
            "names": ["kappa", "triang"],
            "bounds": [[1.5, 2.0], [0.3, 0.6]],
            "num_vars": 3
        });
        assert!(matches!(
            parse(value),
            Err(StudyFileError::NumVarsMismatch { num_vars: 3, names: 2, .. })
        ));
    }

    #[test]
    fn invalid_distribution_caught_at_load() {
        let mut value = base_json();
        value["uncertainties"][0]["Lower_bound"] = 1.0.into();
        value["uncertainties"][0]["Upper_bound"] = 0.5.into();
        assert!(matches!(parse(value), Err(StudyFileError::Config(_))));
    }

    #[test]
    fn toml_document_parses() {
        let text = r#"
            no_samples = 3
            output_mean = 8.9
            figure_of_merit = "rmajor"
            latin_hypercube_level = 2
            output_vars = ["rmajor"]
            sampling_method = "latin_hypercube"

            [config]
            runtitle = "toml study"
            "IN.DAT_path" = "ref/IN.DAT"
            working_directory = "work"
            pseudorandom_seed = 7

            [[uncertainties]]
            Varname = "walalw"
            Errortype = "Relative"
            Mean = 10.0
            Percentage = 15.0
        "#;
        let doc: StudyDocument = toml::from_str(text).unwrap();
        let config = study_config_from_document(doc).unwrap();
        assert_eq!(config.runtitle, "toml study");
        assert_eq!(config.method, SamplingMethod::LatinHypercube);
        assert_eq!(
            config.variables[0].model,
            ErrorModel::Relative { mean: 10.0, percentage: 15.0 }
        );
    }

    #[test]
    fn unsupported_extension_rejected() {
        let err = load_study_file(Path::new("study.yaml")).unwrap_err();
        assert!(matches!(err, StudyFileError::UnsupportedExtension(ref e) if e == "yaml"));
    }
}
