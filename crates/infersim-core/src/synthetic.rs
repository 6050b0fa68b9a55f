//! Generators for the classic teaching datasets.
//!
//! Every generator draws from the caller's generator, so a seeded
//! [`ResampleSeed::rng`](crate::ResampleSeed::rng) reproduces the dataset.

use std::{fmt, str::FromStr};

use rand::{Rng, seq::SliceRandom as _};
use rand_distr::{Distribution as _, Normal};

use crate::{Column, InferenceError, Result, Sample};

/// Bowl of `size` marbles in column `color`, exactly `round(size * red_fraction)`
/// of them `red` and the rest `white`, in random order.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn bowl<R>(rng: &mut R, size: usize, red_fraction: f64) -> Result<Sample>
where
    R: Rng + ?Sized,
{
    if !(0.0..=1.0).contains(&red_fraction) {
        return Err(InferenceError::invalid(format!(
            "red fraction must lie in [0, 1], got {red_fraction}"
        )));
    }
    let red = (size as f64 * red_fraction).round() as usize;
    let mut colors = (0..size)
        .map(|i| if i < red { "red" } else { "white" })
        .collect::<Vec<_>>();
    colors.shuffle(rng);
    Sample::from_columns([("color", Column::categorical(colors))])
}

/// Two groups `a` and `b` of `n_per_group` normal draws each, in columns
/// `group` and `value`.
pub fn two_groups<R>(rng: &mut R, n_per_group: usize, means: [f64; 2], sd: f64) -> Result<Sample>
where
    R: Rng + ?Sized,
{
    let mut groups = Vec::with_capacity(2 * n_per_group);
    let mut values = Vec::with_capacity(2 * n_per_group);
    for (label, mean) in ["a", "b"].into_iter().zip(means) {
        let normal = normal(mean, sd)?;
        for _ in 0..n_per_group {
            groups.push(label);
            values.push(normal.sample(rng));
        }
    }
    Sample::from_columns([
        ("group", Column::categorical(groups)),
        ("value", Column::numeric(values)),
    ])
}

/// `n` points with `x` uniform in `[0, 10)` and
/// `y = intercept + slope * x + N(0, noise_sd)`.
pub fn regression<R>(
    rng: &mut R,
    n: usize,
    slope: f64,
    intercept: f64,
    noise_sd: f64,
) -> Result<Sample>
where
    R: Rng + ?Sized,
{
    let noise = normal(0.0, noise_sd)?;
    let (xs, ys): (Vec<_>, Vec<_>) = (0..n)
        .map(|_| {
            let x = rng.random_range(0.0..10.0);
            (x, intercept + slope * x + noise.sample(rng))
        })
        .unzip();
    Sample::from_columns([("x", Column::numeric(xs)), ("y", Column::numeric(ys))])
}

/// Survey of `n_per_group` respondents per `gender` (`female`, `male`) whose
/// `smokes` answer is `yes` with the group's rate.
pub fn smoking<R>(rng: &mut R, n_per_group: usize, rates: [f64; 2]) -> Result<Sample>
where
    R: Rng + ?Sized,
{
    if let Some(rate) = rates.iter().find(|r| !(0.0..=1.0).contains(*r)) {
        return Err(InferenceError::invalid(format!(
            "smoking rate must lie in [0, 1], got {rate}"
        )));
    }
    let mut genders = Vec::with_capacity(2 * n_per_group);
    let mut answers = Vec::with_capacity(2 * n_per_group);
    for (gender, rate) in ["female", "male"].into_iter().zip(rates) {
        for _ in 0..n_per_group {
            genders.push(gender);
            answers.push(if rng.random_bool(rate) { "yes" } else { "no" });
        }
    }
    Sample::from_columns([
        ("gender", Column::categorical(genders)),
        ("smokes", Column::categorical(answers)),
    ])
}

fn normal(mean: f64, sd: f64) -> Result<Normal<f64>> {
    Normal::new(mean, sd).map_err(|e| {
        InferenceError::invalid(format!("bad normal distribution N({mean}, {sd}): {e}"))
    })
}

/// A named dataset with fixed generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// 100 marbles, 36% red.
    Bowl,
    /// Two groups of 25 drawn from `N(10, 2)`.
    TwoGroups,
    /// 50 points on `y = 2 + 0.9x` with noise sd 0.5.
    Regression,
    /// 200 respondents per gender, smoking rates 18% and 24%.
    Smoking,
}

impl Scenario {
    pub const ALL: [Self; 4] = [Self::Bowl, Self::TwoGroups, Self::Regression, Self::Smoking];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bowl => "bowl",
            Self::TwoGroups => "two-groups",
            Self::Regression => "regression",
            Self::Smoking => "smoking",
        }
    }

    pub fn generate<R>(self, rng: &mut R) -> Result<Sample>
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Bowl => bowl(rng, 100, 0.36),
            Self::TwoGroups => two_groups(rng, 25, [10.0, 10.0], 2.0),
            Self::Regression => regression(rng, 50, 0.9, 2.0, 0.5),
            Self::Smoking => smoking(rng, 200, [0.18, 0.24]),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name() == normalized)
            .ok_or_else(|| {
                InferenceError::invalid(format!(
                    "unknown scenario '{s}', expected one of: bowl, two-groups, regression, smoking"
                ))
            })
    }
}
