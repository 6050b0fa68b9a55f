//! Simulation-based statistical inference.
//!
//! This crate implements bootstrap resampling and permutation testing for five
//! statistics: a proportion, a difference in proportions, a mean, a difference
//! in means, and a regression slope.
//!
//! # Components
//!
//! - [`sample`]: the immutable, column-oriented sample store
//! - [`statistic`]: scalar statistics computed from a sample
//! - [`resample`]: seeded generation of bootstrap, permutation and point-null replicates
//! - [`distribution`]: empirical distributions built from replicates, sequentially or in parallel
//! - [`inference`]: percentile confidence intervals and tail-proportion p-values
//! - [`study`]: end-to-end estimation and hypothesis-testing runs
//! - [`synthetic`]: generators for the classic example datasets
//!
//! # Example
//!
//! ```
//! use infersim_core::{
//!     Column, EmpiricalDistribution, ResampleMode, ResampleSeed, Sample, Statistic,
//! };
//!
//! let sample = Sample::from_columns([(
//!     "color",
//!     Column::categorical(["red", "white", "white", "red", "white"]),
//! )])?;
//! let statistic = Statistic::Proportion {
//!     response: "color".to_owned(),
//!     success: "red".to_owned(),
//! };
//! assert_eq!(statistic.calculate(&sample)?, 0.4);
//!
//! let mode = ResampleMode::Bootstrap { strata: None };
//! let distribution = EmpiricalDistribution::generate(
//!     &sample,
//!     &mode,
//!     &statistic,
//!     200,
//!     ResampleSeed::from_u64(7),
//! )?;
//! let interval = distribution.confidence_interval(0.9)?;
//! assert!(interval.lower <= interval.upper);
//! # Ok::<(), infersim_core::InferenceError>(())
//! ```

pub use self::{
    config::*,
    distribution::*,
    inference::*,
    resample::*,
    sample::*,
    statistic::*,
    study::{Estimate, HypothesisTest},
};

pub mod config;
pub mod distribution;
pub mod inference;
pub mod resample;
pub mod sample;
pub mod statistic;
pub mod study;
pub mod synthetic;

/// Failure of an inference operation.
///
/// Errors are raised where the offending input is first seen; no operation
/// returns a partial result alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum InferenceError {
    /// Malformed input: wrong variable type, unknown level or direction,
    /// degenerate variance, non-positive replicate count.
    #[display("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
    /// The sample is too small for the requested statistic.
    #[display("insufficient data: {reason}")]
    InsufficientData { reason: String },
}

impl InferenceError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    pub(crate) fn insufficient(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = InferenceError> = std::result::Result<T, E>;
