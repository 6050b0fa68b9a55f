//! Seeded generation of synthetic samples.
//!
//! [`Replicates`] turns one observed [`Sample`] into a finite, lazy sequence
//! of synthetic samples according to a [`ResampleMode`]:
//!
//! - **Bootstrap**: records drawn uniformly with replacement; with `strata`,
//!   draws happen within each level of the strata variable so every group
//!   keeps its size.
//! - **Permute**: one uniform shuffle of the response column per replicate,
//!   every other variable untouched. Simulates independence of the response
//!   from the explanatory variable.
//! - **Draw**: point null for a proportion. The response is redrawn record by
//!   record, equal to the success level with probability `p`.
//! - **Point mean**: point null for a mean. The response is shifted so its
//!   mean equals `mu`, then bootstrapped.
//!
//! # Reproducibility
//!
//! A [`ResampleSeed`] seeds a master PCG generator. The master draws one
//! child seed per replicate, in order, and each replicate is built only from
//! its child generator. The same seed, mode and sample therefore always yield
//! the same replicates, and replicates can be built on any thread without
//! changing the result (see [`crate::EmpiricalDistribution::generate_parallel`]).
//!
//! # Example
//!
//! ```
//! use infersim_core::{Column, Replicates, ResampleMode, ResampleSeed, Sample};
//!
//! let sample = Sample::from_columns([("x", Column::numeric([1.0, 2.0, 3.0]))])?;
//! let mode = ResampleMode::Bootstrap { strata: None };
//! let seed = ResampleSeed::from_u64(42);
//!
//! let first = Replicates::new(&sample, &mode, 5, seed)?.collect::<Vec<_>>();
//! let again = Replicates::new(&sample, &mode, 5, seed)?.collect::<Vec<_>>();
//! assert_eq!(first, again);
//! assert!(first.iter().all(|r| r.len() == 3));
//! # Ok::<(), infersim_core::InferenceError>(())
//! ```

use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::{IndexedRandom as _, SliceRandom as _},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Column, InferenceError, Result, Sample, Statistic, StatisticKind};

/// Seed for deterministic replicate generation.
///
/// A 128-bit seed for the PCG generator behind [`Replicates`]. It is
/// serialized and parsed as 32 hexadecimal characters so runs can be recorded
/// and repeated.
///
/// # Example
///
/// ```
/// use infersim_core::ResampleSeed;
/// use rand::Rng as _;
///
/// let seed: ResampleSeed = rand::rng().random();
/// let parsed: ResampleSeed = seed.to_string().parse()?;
/// assert_eq!(seed, parsed);
/// # Ok::<(), infersim_core::InferenceError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleSeed([u8; 16]);

impl ResampleSeed {
    /// Seed whose big-endian value is `value`.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }

    /// Generator for this seed.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }

    /// The per-replicate seeds derived from `self`, in generation order.
    #[must_use]
    pub fn replicate_seeds(self, count: usize) -> Vec<ResampleSeed> {
        let mut master = self.rng();
        (0..count).map(|_| master.random()).collect()
    }
}

impl fmt::Display for ResampleSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for ResampleSeed {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 32 {
            return Err(InferenceError::invalid(format!(
                "invalid hex seed: expected 32 characters, got {}",
                s.len()
            )));
        }
        let num = u128::from_str_radix(s, 16)
            .map_err(|e| InferenceError::invalid(format!("invalid hex seed: {s} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for ResampleSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResampleSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `ResampleSeed` values using the standard random distribution.
impl Distribution<ResampleSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ResampleSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        ResampleSeed(seed)
    }
}

/// How replicates are generated from the observed sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ResampleMode {
    /// Resampling with replacement, within the levels of `strata` if given.
    Bootstrap { strata: Option<String> },
    /// Shuffling of `response` across records.
    Permute { response: String },
    /// Independent draws of a categorical `response`: `success` with
    /// probability `p`, otherwise one of the other observed levels.
    Draw {
        response: String,
        success: String,
        p: f64,
    },
    /// Bootstrap of a numeric `response` shifted to have mean `mu`.
    PointMean { response: String, mu: f64 },
}

impl ResampleMode {
    /// Bootstrap mode for estimating `statistic`.
    ///
    /// Difference statistics are stratified by their grouping variable so each
    /// replicate keeps both groups at their observed sizes.
    #[must_use]
    pub fn bootstrap_for(statistic: &Statistic) -> Self {
        let strata = match statistic.kind() {
            StatisticKind::DiffInProportions | StatisticKind::DiffInMeans => {
                statistic.explanatory().map(str::to_owned)
            }
            _ => None,
        };
        Self::Bootstrap { strata }
    }

    /// Null-generating mode for testing `statistic`.
    ///
    /// Two-variable statistics use permutation (null of independence) and take
    /// no `null_value`. Proportion and mean need the hypothesized value.
    ///
    /// # Errors
    ///
    /// [`InferenceError::InvalidParameter`] if `null_value` is missing for a
    /// single-variable statistic or given for a two-variable one.
    pub fn null_for(statistic: &Statistic, null_value: Option<f64>) -> Result<Self> {
        match (statistic, null_value) {
            (Statistic::Proportion { response, success }, Some(p)) => Ok(Self::Draw {
                response: response.clone(),
                success: success.clone(),
                p,
            }),
            (Statistic::Mean { response }, Some(mu)) => Ok(Self::PointMean {
                response: response.clone(),
                mu,
            }),
            (Statistic::Proportion { .. } | Statistic::Mean { .. }, None) => {
                Err(InferenceError::invalid(format!(
                    "testing a {} needs a hypothesized null value",
                    statistic.kind()
                )))
            }
            (_, Some(value)) => Err(InferenceError::invalid(format!(
                "a {} is tested against independence; null value {value} is not used",
                statistic.kind()
            ))),
            (_, None) => Ok(Self::Permute {
                response: statistic.response().to_owned(),
            }),
        }
    }
}

/// A mode checked against a sample, with its per-run work done once.
#[derive(Debug, Clone)]
pub(crate) enum ResamplePlan {
    Bootstrap {
        strata: Option<Vec<Vec<usize>>>,
    },
    Permute {
        column: usize,
    },
    Draw {
        column: usize,
        success: usize,
        others: Vec<usize>,
        p: f64,
    },
    PointMean {
        shifted: Sample,
    },
}

impl ResamplePlan {
    pub(crate) fn new(sample: &Sample, mode: &ResampleMode) -> Result<Self> {
        match mode {
            ResampleMode::Bootstrap { strata: None } => Ok(Self::Bootstrap { strata: None }),
            ResampleMode::Bootstrap {
                strata: Some(strata),
            } => {
                let grouped = sample.group_by(strata)?;
                let mut rows = grouped
                    .groups()
                    .map(|(_, rows)| rows.to_vec())
                    .collect::<Vec<_>>();
                // Records with a missing stratum are resampled among themselves
                let (_, codes) = sample.categorical(strata)?;
                let unlabeled = codes
                    .iter()
                    .enumerate()
                    .filter_map(|(row, code)| code.is_none().then_some(row))
                    .collect::<Vec<_>>();
                rows.push(unlabeled);
                rows.retain(|r| !r.is_empty());
                Ok(Self::Bootstrap { strata: Some(rows) })
            }
            ResampleMode::Permute { response } => Ok(Self::Permute {
                column: sample.variable_index(response)?,
            }),
            ResampleMode::Draw {
                response,
                success,
                p,
            } => {
                if !(0.0..=1.0).contains(p) {
                    return Err(InferenceError::invalid(format!(
                        "null proportion must lie in [0, 1], got {p}"
                    )));
                }
                let (levels, codes) = sample.categorical(response)?;
                let success_code = levels.iter().position(|l| l == success).ok_or_else(|| {
                    InferenceError::invalid(format!("'{success}' is not a level of '{response}'"))
                })?;
                let mut others = codes
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|&code| code != success_code)
                    .collect::<Vec<_>>();
                others.sort_unstable();
                others.dedup();
                if others.is_empty() && *p < 1.0 {
                    return Err(InferenceError::insufficient(format!(
                        "'{response}' has no observed level other than '{success}' to draw"
                    )));
                }
                Ok(Self::Draw {
                    column: sample.variable_index(response)?,
                    success: success_code,
                    others,
                    p: *p,
                })
            }
            ResampleMode::PointMean { response, mu } => {
                if !mu.is_finite() {
                    return Err(InferenceError::invalid(format!(
                        "null mean must be finite, got {mu}"
                    )));
                }
                let observed_mean = crate::statistic::mean(sample, response)?;
                let shift = mu - observed_mean;
                let values = sample.numeric(response)?;
                let shifted = Column::Numeric(values.iter().map(|v| v.map(|v| v + shift)).collect());
                Ok(Self::PointMean {
                    shifted: sample.replace_column(sample.variable_index(response)?, shifted),
                })
            }
        }
    }

    /// Builds one replicate from `sample` using only `rng`.
    pub(crate) fn replicate<R>(&self, sample: &Sample, rng: &mut R) -> Sample
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Bootstrap { strata: None } => sample.select_rows(&bootstrap_rows(sample.len(), rng)),
            Self::Bootstrap {
                strata: Some(strata),
            } => {
                let mut rows = vec![0; sample.len()];
                for stratum in strata {
                    for &slot in stratum {
                        rows[slot] = stratum[rng.random_range(0..stratum.len())];
                    }
                }
                sample.select_rows(&rows)
            }
            Self::Permute { column } => {
                let permuted = match &sample.variables()[*column].column {
                    Column::Categorical { levels, codes } => {
                        let mut codes = codes.clone();
                        codes.shuffle(rng);
                        Column::Categorical {
                            levels: levels.clone(),
                            codes,
                        }
                    }
                    Column::Numeric(values) => {
                        let mut values = values.clone();
                        values.shuffle(rng);
                        Column::Numeric(values)
                    }
                };
                sample.replace_column(*column, permuted)
            }
            Self::Draw {
                column,
                success,
                others,
                p,
            } => {
                let Column::Categorical { levels, codes } = &sample.variables()[*column].column
                else {
                    unreachable!("draw plans are built for categorical columns only");
                };
                let drawn = codes
                    .iter()
                    .map(|code| {
                        code.map(|_| {
                            if rng.random_bool(*p) {
                                *success
                            } else {
                                others.choose(rng).copied().unwrap_or(*success)
                            }
                        })
                    })
                    .collect();
                sample.replace_column(
                    *column,
                    Column::Categorical {
                        levels: levels.clone(),
                        codes: drawn,
                    },
                )
            }
            Self::PointMean { shifted } => {
                shifted.select_rows(&bootstrap_rows(shifted.len(), rng))
            }
        }
    }
}

fn bootstrap_rows<R>(len: usize, rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    (0..len).map(|_| rng.random_range(0..len)).collect()
}

/// Lazy sequence of replicates of a sample.
///
/// Finite (`count` items) and restartable: constructing it again with the
/// same arguments yields the same sequence.
#[derive(Debug, Clone)]
pub struct Replicates<'a> {
    sample: &'a Sample,
    plan: ResamplePlan,
    master: Pcg32,
    remaining: usize,
}

impl<'a> Replicates<'a> {
    /// Prepares `count` replicates of `sample` under `mode`.
    ///
    /// # Errors
    ///
    /// - [`InferenceError::InvalidParameter`] if `count` is zero or the mode
    ///   names an unknown or wrongly typed variable, an unknown level, or an
    ///   out-of-range null value
    /// - [`InferenceError::InsufficientData`] if the strata variable has fewer
    ///   than two observed levels, or a draw has no alternative level
    pub fn new(
        sample: &'a Sample,
        mode: &ResampleMode,
        count: usize,
        seed: ResampleSeed,
    ) -> Result<Self> {
        if count == 0 {
            return Err(InferenceError::invalid("replicate count must be positive"));
        }
        Ok(Self {
            sample,
            plan: ResamplePlan::new(sample, mode)?,
            master: seed.rng(),
            remaining: count,
        })
    }
}

impl Iterator for Replicates<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let seed: ResampleSeed = self.master.random();
        Some(self.plan.replicate(self.sample, &mut seed.rng()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Replicates<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_groups() -> Sample {
        Sample::from_columns([
            ("g", Column::categorical(["a", "a", "a", "b", "b"])),
            ("x", Column::numeric([1.0, 2.0, 3.0, 10.0, 20.0])),
        ])
        .unwrap()
    }

    fn sorted(values: &[Option<f64>]) -> Vec<f64> {
        let mut values = values.iter().flatten().copied().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        values
    }

    #[test]
    fn test_zero_replicates_rejected() {
        let sample = two_groups();
        let mode = ResampleMode::Bootstrap { strata: None };
        let err = Replicates::new(&sample, &mode, 0, ResampleSeed::from_u64(1)).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_stratified_bootstrap_keeps_groups_in_place() {
        let sample = two_groups();
        let mode = ResampleMode::Bootstrap {
            strata: Some("g".to_owned()),
        };
        for replicate in Replicates::new(&sample, &mode, 50, ResampleSeed::from_u64(3)).unwrap() {
            assert_eq!(replicate.column("g").unwrap(), sample.column("g").unwrap());
            let xs = replicate.numeric("x").unwrap();
            assert!(xs[..3].iter().flatten().all(|x| *x < 5.0));
            assert!(xs[3..].iter().flatten().all(|x| *x >= 10.0));
        }
    }

    #[test]
    fn test_permutation_conserves_values() {
        let sample = two_groups();
        let mode = ResampleMode::Permute {
            response: "x".to_owned(),
        };
        for replicate in Replicates::new(&sample, &mode, 20, ResampleSeed::from_u64(5)).unwrap() {
            assert_eq!(replicate.column("g").unwrap(), sample.column("g").unwrap());
            assert_eq!(
                sorted(replicate.numeric("x").unwrap()),
                sorted(sample.numeric("x").unwrap())
            );
        }
    }

    #[test]
    fn test_replicates_differ_within_a_run() {
        let sample = two_groups();
        let mode = ResampleMode::Permute {
            response: "x".to_owned(),
        };
        let replicates = Replicates::new(&sample, &mode, 30, ResampleSeed::from_u64(9))
            .unwrap()
            .collect::<Vec<_>>();
        assert!(replicates.iter().any(|r| r != &replicates[0]));
    }

    #[test]
    fn test_draw_only_produces_observed_levels() {
        let sample = Sample::from_columns([(
            "color",
            Column::categorical(["red", "white", "white", "white"]),
        )])
        .unwrap();
        let mode = ResampleMode::Draw {
            response: "color".to_owned(),
            success: "red".to_owned(),
            p: 0.5,
        };
        for replicate in Replicates::new(&sample, &mode, 20, ResampleSeed::from_u64(11)).unwrap() {
            let (levels, codes) = replicate.categorical("color").unwrap();
            assert_eq!(levels.len(), 2);
            assert!(codes.iter().all(|c| matches!(c, Some(0 | 1))));
        }
    }

    #[test]
    fn test_draw_rejects_bad_probability() {
        let sample = Sample::from_columns([("c", Column::categorical(["a", "b"]))]).unwrap();
        let mode = ResampleMode::Draw {
            response: "c".to_owned(),
            success: "a".to_owned(),
            p: 1.5,
        };
        let err = Replicates::new(&sample, &mode, 1, ResampleSeed::from_u64(1)).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_point_mean_shifts_response() {
        let sample = two_groups();
        let mode = ResampleMode::PointMean {
            response: "x".to_owned(),
            mu: 0.0,
        };
        let plan = ResamplePlan::new(&sample, &mode).unwrap();
        let ResamplePlan::PointMean { shifted } = plan else {
            panic!("expected point-mean plan");
        };
        let mean = crate::statistic::mean(&shifted, "x").unwrap();
        assert!(mean.abs() < 1e-12);
    }

    #[test]
    fn test_null_for_selects_mode() {
        let slope = Statistic::Slope {
            response: "y".to_owned(),
            explanatory: "x".to_owned(),
        };
        assert_eq!(
            ResampleMode::null_for(&slope, None).unwrap(),
            ResampleMode::Permute {
                response: "y".to_owned()
            }
        );
        assert!(ResampleMode::null_for(&slope, Some(0.0)).is_err());

        let mean = Statistic::Mean {
            response: "y".to_owned(),
        };
        assert!(ResampleMode::null_for(&mean, None).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_seed_hex_round_trip() {
        let seed = ResampleSeed::from_u64(0xDEAD_BEEF);
        assert_eq!(seed.to_string(), "000000000000000000000000deadbeef");
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(serde_json::from_str::<ResampleSeed>(&json).unwrap(), seed);
        assert!("xyz".parse::<ResampleSeed>().unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_replicate_seeds_match_iterator() {
        let sample = two_groups();
        let mode = ResampleMode::Bootstrap { strata: None };
        let seed = ResampleSeed::from_u64(17);
        let plan = ResamplePlan::new(&sample, &mode).unwrap();
        let from_seeds = seed
            .replicate_seeds(10)
            .into_iter()
            .map(|s| plan.replicate(&sample, &mut s.rng()))
            .collect::<Vec<_>>();
        let from_iter = Replicates::new(&sample, &mode, 10, seed)
            .unwrap()
            .collect::<Vec<_>>();
        assert_eq!(from_seeds, from_iter);
    }
}
