//! End-to-end inference runs.
//!
//! A run computes the observed statistic, simulates its empirical
//! distribution, and reduces it:
//!
//! ```text
//! Sample + Statistic
//!     ↓
//! observed value ── calculate
//!     ↓
//! ResampleMode ──── bootstrap (estimate) or null generation (test)
//!     ↓
//! EmpiricalDistribution
//!     ↓
//! ConfidenceInterval / PValue + Decision
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    ConfidenceInterval, Decision, EmpiricalDistribution, InferenceConfig, PValue, ResampleMode,
    ResampleSeed, Result, Sample, Statistic,
};

/// Bootstrap estimate of a statistic with its percentile interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub statistic: Statistic,
    pub observed: f64,
    pub interval: ConfidenceInterval,
    pub mode: ResampleMode,
    pub seed: ResampleSeed,
    pub distribution: EmpiricalDistribution,
}

/// Simulation-based hypothesis test of a statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisTest {
    pub statistic: Statistic,
    pub observed: f64,
    pub null_value: Option<f64>,
    pub p_value: PValue,
    pub alpha: f64,
    pub decision: Decision,
    pub mode: ResampleMode,
    pub seed: ResampleSeed,
    pub distribution: EmpiricalDistribution,
}

/// Bootstraps `statistic` and derives its confidence interval.
///
/// Difference statistics are bootstrapped within their groups.
///
/// # Examples
///
/// ```
/// # use infersim_core::{study, synthetic, InferenceConfig, ResampleSeed, Statistic};
/// let sample = synthetic::bowl(&mut ResampleSeed::from_u64(1).rng(), 100, 0.36)?;
/// let statistic = Statistic::Proportion {
///     response: "color".to_owned(),
///     success: "red".to_owned(),
/// };
/// let config = InferenceConfig {
///     seed: Some(ResampleSeed::from_u64(2)),
///     ..InferenceConfig::default()
/// };
/// let estimate = study::estimate(&sample, &statistic, &config)?;
/// assert_eq!(estimate.observed, 0.36);
/// assert!(estimate.interval.contains(0.36));
/// # Ok::<(), infersim_core::InferenceError>(())
/// ```
pub fn estimate(sample: &Sample, statistic: &Statistic, config: &InferenceConfig) -> Result<Estimate> {
    config.validate()?;
    let observed = statistic.calculate(sample)?;
    let mode = ResampleMode::bootstrap_for(statistic);
    let seed = config.seed_or_random();
    let distribution = simulate(sample, &mode, statistic, config, seed)?;
    let interval = distribution.confidence_interval(config.confidence_level)?;
    Ok(Estimate {
        statistic: statistic.clone(),
        observed,
        interval,
        mode,
        seed,
        distribution,
    })
}

/// Tests `statistic` against its null hypothesis.
///
/// Two-variable statistics are tested against independence by permutation;
/// a proportion or mean is tested against the hypothesized `null_value`.
pub fn test(
    sample: &Sample,
    statistic: &Statistic,
    null_value: Option<f64>,
    config: &InferenceConfig,
) -> Result<HypothesisTest> {
    config.validate()?;
    let observed = statistic.calculate(sample)?;
    let mode = ResampleMode::null_for(statistic, null_value)?;
    let seed = config.seed_or_random();
    let distribution = simulate(sample, &mode, statistic, config, seed)?;
    let p_value = distribution.p_value(observed, config.direction)?;
    let decision = p_value.decide(config.alpha)?;
    Ok(HypothesisTest {
        statistic: statistic.clone(),
        observed,
        null_value,
        p_value,
        alpha: config.alpha,
        decision,
        mode,
        seed,
        distribution,
    })
}

fn simulate(
    sample: &Sample,
    mode: &ResampleMode,
    statistic: &Statistic,
    config: &InferenceConfig,
    seed: ResampleSeed,
) -> Result<EmpiricalDistribution> {
    match config.threads {
        Some(threads) if threads.get() > 1 => EmpiricalDistribution::generate_parallel(
            sample,
            mode,
            statistic,
            config.replicates,
            seed,
            threads,
        ),
        _ => EmpiricalDistribution::generate(sample, mode, statistic, config.replicates, seed),
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use crate::{Column, Direction};

    use super::*;

    fn config(seed: u64) -> InferenceConfig {
        InferenceConfig {
            replicates: 200,
            seed: Some(ResampleSeed::from_u64(seed)),
            ..InferenceConfig::default()
        }
    }

    fn separated_groups() -> Sample {
        Sample::from_columns([
            (
                "g",
                Column::categorical(["a", "a", "a", "a", "a", "b", "b", "b", "b", "b"]),
            ),
            (
                "x",
                Column::numeric([1.0, 1.2, 0.9, 1.1, 1.0, 3.0, 3.2, 2.9, 3.1, 3.0]),
            ),
        ])
        .unwrap()
    }

    fn diff_in_means() -> Statistic {
        Statistic::DiffInMeans {
            response: "x".to_owned(),
            explanatory: "g".to_owned(),
            order: ["a".to_owned(), "b".to_owned()],
        }
    }

    #[test]
    fn test_estimate_is_reproducible() {
        let sample = separated_groups();
        let first = estimate(&sample, &diff_in_means(), &config(5)).unwrap();
        let second = estimate(&sample, &diff_in_means(), &config(5)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.mode,
            ResampleMode::Bootstrap {
                strata: Some("g".to_owned())
            }
        );
    }

    #[test]
    fn test_threads_do_not_change_result() {
        let sample = separated_groups();
        let sequential = test(&sample, &diff_in_means(), None, &config(8)).unwrap();
        let threaded = InferenceConfig {
            threads: NonZeroUsize::new(4),
            ..config(8)
        };
        let parallel = test(&sample, &diff_in_means(), None, &threaded).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_separated_groups_reject_independence() {
        let sample = separated_groups();
        let result = test(&sample, &diff_in_means(), None, &config(13)).unwrap();
        assert!(result.p_value.value < 0.05);
        assert!(result.decision.is_reject_null());
    }

    #[test]
    fn test_mean_against_point_null() {
        let sample = Sample::from_columns([(
            "x",
            Column::numeric([9.8, 10.1, 10.0, 9.9, 10.2, 10.0, 9.7, 10.3]),
        )])
        .unwrap();
        let statistic = Statistic::Mean {
            response: "x".to_owned(),
        };
        let far = test(&sample, &statistic, Some(12.0), &config(21)).unwrap();
        assert!(far.decision.is_reject_null());
        let near = test(&sample, &statistic, Some(10.0), &config(21)).unwrap();
        assert!(near.decision.is_fail_to_reject());
        assert_eq!(near.p_value.direction, Direction::Both);
    }

    #[test]
    fn test_slope_interval_with_binary_predictor() {
        let sample = Sample::from_columns([
            (
                "dose",
                Column::numeric([0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
            ),
            (
                "effect",
                Column::numeric([1.1, 0.8, 1.3, 0.9, 1.0, 2.2, 1.9, 2.4, 2.0, 2.1]),
            ),
        ])
        .unwrap();
        let statistic = Statistic::Slope {
            response: "effect".to_owned(),
            explanatory: "dose".to_owned(),
        };
        for seed in 0..20 {
            let larger = InferenceConfig {
                replicates: 1000,
                ..config(seed)
            };
            let result = estimate(&sample, &statistic, &larger).unwrap();
            assert_eq!(result.distribution.len(), 1000);
            assert!(result.interval.lower <= result.interval.upper);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let sample = separated_groups();
        let bad = InferenceConfig {
            confidence_level: 2.0,
            ..config(1)
        };
        let err = estimate(&sample, &diff_in_means(), &bad).unwrap_err();
        assert!(err.is_invalid_parameter());
    }
}
