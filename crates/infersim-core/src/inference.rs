//! Confidence intervals and p-values derived from an empirical distribution.
//!
//! # Percentile interval
//!
//! For `N` sorted values and confidence level `L`, the bounds are the values at
//! the 0-indexed ranks `floor(N * (1 - L) / 2)` and `ceil(N * (1 + L) / 2)`,
//! clamped to `[0, N - 1]`.
//!
//! # Tail-proportion p-value
//!
//! - `less`: share of values `<=` the observed statistic
//! - `greater`: share of values `>=` the observed statistic
//! - `both`: twice the smaller of those two shares, capped at 1

use std::{fmt, str::FromStr};

use infersim_stats::percentiles;
use serde::{Deserialize, Serialize};

use crate::{EmpiricalDistribution, InferenceError, Result};

/// A confidence interval with its level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

impl ConfidenceInterval {
    /// Percentile-method interval of `distribution` at confidence `level`.
    ///
    /// # Errors
    ///
    /// [`InferenceError::InvalidParameter`] if `level` is not in `(0, 1)` or the
    /// distribution has fewer than 2 values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use infersim_core::{ConfidenceInterval, EmpiricalDistribution};
    /// let dist = EmpiricalDistribution::from_values((1..=100).map(f64::from).collect());
    /// let ci = ConfidenceInterval::percentile(&dist, 0.9)?;
    /// assert_eq!((ci.lower, ci.upper), (6.0, 96.0));
    /// # Ok::<(), infersim_core::InferenceError>(())
    /// ```
    pub fn percentile(distribution: &EmpiricalDistribution, level: f64) -> Result<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(InferenceError::invalid(format!(
                "confidence level must lie in (0, 1), got {level}"
            )));
        }
        if distribution.len() < 2 {
            return Err(InferenceError::invalid(format!(
                "a percentile interval needs at least 2 replicates, got {}",
                distribution.len()
            )));
        }
        let sorted = distribution.sorted_values();
        let lower = percentiles::compute_percentile(&sorted, 100.0 * (1.0 - level) / 2.0);
        let upper = percentiles::compute_upper_percentile(&sorted, 100.0 * (1.0 + level) / 2.0);
        Ok(Self {
            lower,
            upper,
            level,
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Tail of the null distribution a p-value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Less,
    Greater,
    #[default]
    Both,
}

impl Direction {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Less => "less",
            Self::Greater => "greater",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts `less`/`left`, `greater`/`right` and `both`/`two-sided`/`two_sided`.
impl FromStr for Direction {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "less" | "left" => Ok(Self::Less),
            "greater" | "right" => Ok(Self::Greater),
            "both" | "two-sided" | "two_sided" | "two sided" => Ok(Self::Both),
            _ => Err(InferenceError::invalid(format!(
                "unknown direction '{s}', expected less, greater or both"
            ))),
        }
    }
}

/// Outcome of comparing a p-value with a significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    RejectNull,
    FailToReject,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RejectNull => "reject the null hypothesis",
            Self::FailToReject => "fail to reject the null hypothesis",
        })
    }
}

/// A p-value in `[0, 1]` with the direction it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PValue {
    pub value: f64,
    pub direction: Direction,
}

impl PValue {
    /// Share of `distribution` at least as extreme as `observed`.
    ///
    /// # Errors
    ///
    /// [`InferenceError::InvalidParameter`] if `observed` is not finite or the
    /// distribution is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use infersim_core::{Direction, EmpiricalDistribution, PValue};
    /// let null = EmpiricalDistribution::from_values(vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    /// assert_eq!(PValue::compute(&null, 1.0, Direction::Greater)?.value, 0.4);
    /// assert_eq!(PValue::compute(&null, 1.0, Direction::Both)?.value, 0.8);
    /// # Ok::<(), infersim_core::InferenceError>(())
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn compute(
        distribution: &EmpiricalDistribution,
        observed: f64,
        direction: Direction,
    ) -> Result<Self> {
        if !observed.is_finite() {
            return Err(InferenceError::invalid(format!(
                "observed statistic must be finite, got {observed}"
            )));
        }
        if distribution.is_empty() {
            return Err(InferenceError::invalid(
                "cannot compute a p-value from an empty distribution",
            ));
        }
        let n = distribution.len() as f64;
        let values = distribution.values();
        let at_most = values.iter().filter(|&&v| v <= observed).count() as f64 / n;
        let at_least = values.iter().filter(|&&v| v >= observed).count() as f64 / n;
        let value = match direction {
            Direction::Less => at_most,
            Direction::Greater => at_least,
            Direction::Both => (2.0 * f64::min(at_most, at_least)).min(1.0),
        };
        Ok(Self { value, direction })
    }

    /// Rejects the null hypothesis when the p-value is at most `alpha`.
    ///
    /// # Errors
    ///
    /// [`InferenceError::InvalidParameter`] if `alpha` is not in `(0, 1)`.
    pub fn decide(&self, alpha: f64) -> Result<Decision> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(InferenceError::invalid(format!(
                "significance level must lie in (0, 1), got {alpha}"
            )));
        }
        Ok(if self.value <= alpha {
            Decision::RejectNull
        } else {
            Decision::FailToReject
        })
    }
}
