//! VariLab Core — uncertainty-study engine primitives.
//!
//! This crate contains the deterministic heart of the engine:
//! - Error-model distributions (Gaussian, Uniform, Relative, half-Gaussians)
//!   with eager validation and a pure uniform-draw transform
//! - Validated, immutable study configuration
//! - Deterministic RNG streams (master seed expanded via BLAKE3)
//! - Sampling designs: plain pseudorandom, Latin Hypercube, Sobol paired
//!   matrices, Morris trajectories
//! - Pure statistics helpers shared with the aggregation layer

pub mod config;
pub mod design;
pub mod distribution;
pub mod rng;
pub mod stats;

pub use config::{
    ConfigError, SamplingMethod, SensitivityDesign, StudyConfig, UncertainVariable,
};
pub use design::{
    latin_hypercube_design, morris_design, pseudorandom_design, sobol_design, Design,
    MorrisDesign, Sample, SobolDesign,
};
pub use distribution::{DistributionError, ErrorModel};
pub use rng::SeedStream;
