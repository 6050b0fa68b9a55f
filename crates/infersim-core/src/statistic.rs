//! Scalar statistics of a sample.
//!
//! Each [`Statistic`] names the variables it reads, so the same value can be
//! recomputed on every replicate of a resampled sample. All calculations are
//! pure and skip missing values.
//!
//! | kind | roles | value |
//! |---|---|---|
//! | proportion | response, success level | share of records equal to the success level |
//! | diff in proportions | response, success level, grouping, order | `p(first) - p(second)` |
//! | mean | response | arithmetic mean |
//! | diff in means | response, grouping, order | `mean(first) - mean(second)` |
//! | slope | response, explanatory | least-squares slope of response on explanatory |

use std::{fmt, str::FromStr};

use infersim_stats::descriptive;
use serde::{Deserialize, Serialize};

use crate::{InferenceError, Result, Sample};

/// The category of a statistic, without its variable roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatisticKind {
    Proportion,
    DiffInProportions,
    Mean,
    DiffInMeans,
    Slope,
}

impl StatisticKind {
    pub const ALL: [Self; 5] = [
        Self::Proportion,
        Self::DiffInProportions,
        Self::Mean,
        Self::DiffInMeans,
        Self::Slope,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Proportion => "proportion",
            Self::DiffInProportions => "diff-in-proportions",
            Self::Mean => "mean",
            Self::DiffInMeans => "diff-in-means",
            Self::Slope => "slope",
        }
    }

    /// Whether the statistic relates the response to a second variable.
    #[must_use]
    pub fn has_explanatory(self) -> bool {
        !matches!(self, Self::Proportion | Self::Mean)
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the kebab-case names as well as the short forms `prop`,
/// `diff in props` and `diff in means`.
impl FromStr for StatisticKind {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "proportion" | "prop" => Ok(Self::Proportion),
            "diff-in-proportions" | "diff-in-props" => Ok(Self::DiffInProportions),
            "mean" => Ok(Self::Mean),
            "diff-in-means" => Ok(Self::DiffInMeans),
            "slope" => Ok(Self::Slope),
            _ => Err(InferenceError::invalid(format!(
                "unknown statistic '{s}', expected one of: {}",
                Self::ALL.map(Self::name).join(", ")
            ))),
        }
    }
}

/// A statistic together with the variables it is computed from.
///
/// For the difference statistics `explanatory` is the categorical grouping
/// variable and `order` names the two levels subtracted (first minus second).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Statistic {
    Proportion {
        response: String,
        success: String,
    },
    DiffInProportions {
        response: String,
        success: String,
        explanatory: String,
        order: [String; 2],
    },
    Mean {
        response: String,
    },
    DiffInMeans {
        response: String,
        explanatory: String,
        order: [String; 2],
    },
    Slope {
        response: String,
        explanatory: String,
    },
}

impl Statistic {
    #[must_use]
    pub fn kind(&self) -> StatisticKind {
        match self {
            Self::Proportion { .. } => StatisticKind::Proportion,
            Self::DiffInProportions { .. } => StatisticKind::DiffInProportions,
            Self::Mean { .. } => StatisticKind::Mean,
            Self::DiffInMeans { .. } => StatisticKind::DiffInMeans,
            Self::Slope { .. } => StatisticKind::Slope,
        }
    }

    #[must_use]
    pub fn response(&self) -> &str {
        match self {
            Self::Proportion { response, .. }
            | Self::DiffInProportions { response, .. }
            | Self::Mean { response }
            | Self::DiffInMeans { response, .. }
            | Self::Slope { response, .. } => response,
        }
    }

    /// The explanatory (or grouping) variable, if the statistic has one.
    #[must_use]
    pub fn explanatory(&self) -> Option<&str> {
        match self {
            Self::Proportion { .. } | Self::Mean { .. } => None,
            Self::DiffInProportions { explanatory, .. }
            | Self::DiffInMeans { explanatory, .. }
            | Self::Slope { explanatory, .. } => Some(explanatory),
        }
    }

    /// Computes the statistic on `sample`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use infersim_core::{Column, Sample, Statistic};
    /// let sample = Sample::from_columns([
    ///     ("team", Column::categorical(["a", "b", "a", "b"])),
    ///     ("salary", Column::numeric([3.0, 1.0, 5.0, 2.0])),
    /// ])?;
    /// let statistic = Statistic::DiffInMeans {
    ///     response: "salary".to_owned(),
    ///     explanatory: "team".to_owned(),
    ///     order: ["a".to_owned(), "b".to_owned()],
    /// };
    /// assert_eq!(statistic.calculate(&sample)?, 2.5);
    /// # Ok::<(), infersim_core::InferenceError>(())
    /// ```
    pub fn calculate(&self, sample: &Sample) -> Result<f64> {
        match self {
            Self::Proportion { response, success } => proportion(sample, response, success),
            Self::DiffInProportions {
                response,
                success,
                explanatory,
                order,
            } => diff_in_proportions(sample, response, success, explanatory, order),
            Self::Mean { response } => mean(sample, response),
            Self::DiffInMeans {
                response,
                explanatory,
                order,
            } => diff_in_means(sample, response, explanatory, order),
            Self::Slope {
                response,
                explanatory,
            } => slope(sample, response, explanatory),
        }
    }
}

/// Fraction of non-missing records whose `variable` equals `success`.
///
/// # Errors
///
/// - [`InferenceError::InvalidParameter`] if `variable` is not categorical or
///   `success` is not one of its levels
/// - [`InferenceError::InsufficientData`] if every value is missing
pub fn proportion(sample: &Sample, variable: &str, success: &str) -> Result<f64> {
    let (codes, success_code) = success_codes(sample, variable, success)?;
    proportion_over(codes, 0..codes.len(), success_code)
        .ok_or_else(|| InferenceError::insufficient(format!("'{variable}' has no observed values")))
}

/// `proportion(first group) - proportion(second group)`, groups given by `order`.
///
/// # Errors
///
/// - [`InferenceError::InvalidParameter`] if `order` does not name two distinct
///   levels of `grouping`, or for the reasons [`proportion`] fails
/// - [`InferenceError::InsufficientData`] if either group has no observed value
pub fn diff_in_proportions(
    sample: &Sample,
    variable: &str,
    success: &str,
    grouping: &str,
    order: &[String; 2],
) -> Result<f64> {
    let (codes, success_code) = success_codes(sample, variable, success)?;
    let grouped = sample.group_by(grouping)?;
    let [first, second] = grouped.pair(order)?;
    let p = |rows: &[usize], level: &str| {
        proportion_over(codes, rows.iter().copied(), success_code).ok_or_else(|| {
            InferenceError::insufficient(format!("group '{level}' has no observed '{variable}'"))
        })
    };
    Ok(p(first, &order[0])? - p(second, &order[1])?)
}

/// Arithmetic mean of the non-missing values of a numeric variable.
///
/// # Errors
///
/// - [`InferenceError::InvalidParameter`] if `variable` is not numeric
/// - [`InferenceError::InsufficientData`] if every value is missing
pub fn mean(sample: &Sample, variable: &str) -> Result<f64> {
    let values = sample.numeric(variable)?;
    mean_over(values, 0..values.len())
        .ok_or_else(|| InferenceError::insufficient(format!("'{variable}' has no observed values")))
}

/// `mean(first group) - mean(second group)`, groups given by `order`.
///
/// # Errors
///
/// - [`InferenceError::InvalidParameter`] if `variable` is not numeric or
///   `order` does not name two distinct levels of `grouping`
/// - [`InferenceError::InsufficientData`] if either group has no observed value
pub fn diff_in_means(
    sample: &Sample,
    variable: &str,
    grouping: &str,
    order: &[String; 2],
) -> Result<f64> {
    let values = sample.numeric(variable)?;
    let grouped = sample.group_by(grouping)?;
    let [first, second] = grouped.pair(order)?;
    let m = |rows: &[usize], level: &str| {
        mean_over(values, rows.iter().copied()).ok_or_else(|| {
            InferenceError::insufficient(format!("group '{level}' has no observed '{variable}'"))
        })
    };
    Ok(m(first, &order[0])? - m(second, &order[1])?)
}

/// Least-squares slope of `response` regressed on `explanatory`.
///
/// Only records where both variables are present take part.
///
/// # Errors
///
/// - [`InferenceError::InvalidParameter`] if either variable is not numeric or
///   `explanatory` has zero variance
/// - [`InferenceError::InsufficientData`] if fewer than two complete records remain
pub fn slope(sample: &Sample, response: &str, explanatory: &str) -> Result<f64> {
    let ys = sample.numeric(response)?;
    let xs = sample.numeric(explanatory)?;
    let (xs, ys): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    if xs.len() < 2 {
        return Err(InferenceError::insufficient(format!(
            "slope needs at least 2 complete records, got {}",
            xs.len()
        )));
    }
    descriptive::least_squares_slope(&xs, &ys).ok_or_else(|| {
        InferenceError::invalid(format!(
            "explanatory variable '{explanatory}' has zero variance"
        ))
    })
}

fn success_codes<'s>(
    sample: &'s Sample,
    variable: &str,
    success: &str,
) -> Result<(&'s [Option<usize>], usize)> {
    let (levels, codes) = sample.categorical(variable)?;
    let success_code = levels
        .iter()
        .position(|level| level == success)
        .ok_or_else(|| {
            InferenceError::invalid(format!(
                "'{success}' is not a level of '{variable}' (levels: {})",
                levels.join(", ")
            ))
        })?;
    Ok((codes, success_code))
}

#[expect(clippy::cast_precision_loss)]
fn proportion_over<I>(codes: &[Option<usize>], rows: I, success_code: usize) -> Option<f64>
where
    I: IntoIterator<Item = usize>,
{
    let (hits, total) = rows
        .into_iter()
        .filter_map(|row| codes[row])
        .fold((0_usize, 0_usize), |(hits, total), code| {
            (hits + usize::from(code == success_code), total + 1)
        });
    (total > 0).then(|| hits as f64 / total as f64)
}

fn mean_over<I>(values: &[Option<f64>], rows: I) -> Option<f64>
where
    I: IntoIterator<Item = usize>,
{
    let observed = rows
        .into_iter()
        .filter_map(|row| values[row])
        .collect::<Vec<_>>();
    descriptive::mean(&observed)
}
