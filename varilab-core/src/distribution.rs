//! Error-model distributions for uncertain inputs.
//!
//! Each uncertain variable declares one `ErrorModel`. `transform()` maps a
//! canonical uniform draw `u` in [0,1) to a concrete variable value, so the
//! entire study is a deterministic function of the master seed.
//!
//! Validation is eager: `validate()` runs at config-load time, before any
//! design is built or any evaluator invocation happens.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

/// Errors from error-model validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    /// Parameter set inconsistent with the declared family.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),
    /// Non-positive scale where a positive one is required.
    #[error("domain error: {0}")]
    DomainError(String),
}

/// Perturbation family for one uncertain variable.
///
/// Closed set: every variant carries exactly the parameters its family
/// requires, and construction-time validation matches exhaustively with no
/// fallback branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorModel {
    /// Unbounded Gaussian perturbation.
    Gaussian { mean: f64, std: f64 },
    /// Uniform on [lower, upper).
    Uniform { lower: f64, upper: f64 },
    /// Symmetric multiplicative perturbation: mean * (1 ± percentage/100).
    Relative { mean: f64, percentage: f64 },
    /// Lower half of a Gaussian centered at `mean`; realizations <= mean.
    LowerHalfGaussian { mean: f64, std: f64 },
    /// Upper half of a Gaussian centered at `mean`; realizations >= mean.
    UpperHalfGaussian { mean: f64, std: f64 },
}

impl ErrorModel {
    /// Check the parameter set against the family's requirements.
    pub fn validate(&self) -> Result<(), DistributionError> {
        match *self {
            ErrorModel::Gaussian { std, .. }
            | ErrorModel::LowerHalfGaussian { std, .. }
            | ErrorModel::UpperHalfGaussian { std, .. } => {
                if !std.is_finite() || std <= 0.0 {
                    return Err(DistributionError::DomainError(format!(
                        "std must be > 0, got {std}"
                    )));
                }
                Ok(())
            }
            ErrorModel::Uniform { lower, upper } => {
                if !(lower < upper) {
                    return Err(DistributionError::InvalidDistribution(format!(
                        "uniform requires lower < upper, got [{lower}, {upper}]"
                    )));
                }
                Ok(())
            }
            ErrorModel::Relative { percentage, .. } => {
                if !percentage.is_finite() || percentage < 0.0 {
                    return Err(DistributionError::InvalidDistribution(format!(
                        "relative requires percentage >= 0, got {percentage}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Map a canonical uniform draw `u` in [0,1) to a variable value.
    ///
    /// Pure: identical `(model, u)` always yields an identical value,
    /// independent of draw order or thread scheduling. Assumes a validated
    /// model.
    pub fn transform(&self, u: f64) -> f64 {
        match *self {
            ErrorModel::Gaussian { mean, std } => mean + std * standard_normal_quantile(u),
            ErrorModel::Uniform { lower, upper } => lower + u * (upper - lower),
            ErrorModel::Relative { mean, percentage } => {
                mean * (1.0 + (2.0 * u - 1.0) * percentage / 100.0)
            }
            // Fold u into the lower half of the CDF range [0, 0.5).
            ErrorModel::LowerHalfGaussian { mean, std } => {
                mean + std * standard_normal_quantile(u * 0.5)
            }
            // Mirror: fold u into [0.5, 1).
            ErrorModel::UpperHalfGaussian { mean, std } => {
                mean + std * standard_normal_quantile(0.5 + u * 0.5)
            }
        }
    }

    /// Family name as spelled in study documents.
    pub fn family(&self) -> &'static str {
        match self {
            ErrorModel::Gaussian { .. } => "Gaussian",
            ErrorModel::Uniform { .. } => "Uniform",
            ErrorModel::Relative { .. } => "Relative",
            ErrorModel::LowerHalfGaussian { .. } => "LowerHalfGaussian",
            ErrorModel::UpperHalfGaussian { .. } => "UpperHalfGaussian",
        }
    }
}

/// Standard-normal quantile.
///
/// `u` is clamped away from the endpoints so a degenerate draw of exactly 0.0
/// cannot produce an infinite variable value.
fn standard_normal_quantile(u: f64) -> f64 {
    const EPS: f64 = 1e-12;
    let unit = Normal::new(0.0, 1.0).expect("unit normal is valid");
    unit.inverse_cdf(u.clamp(EPS, 1.0 - EPS))
}
