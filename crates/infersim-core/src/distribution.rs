//! Empirical distributions of a statistic over replicates.

use std::{num::NonZeroUsize, panic, thread};

use infersim_stats::{descriptive::DescriptiveStats, histogram::Histogram};
use serde::{Deserialize, Serialize};

use crate::{
    ConfidenceInterval, Direction, InferenceError, PValue, ResampleMode, ResampleSeed, Result,
    Sample, Statistic,
    resample::ResamplePlan,
};

/// Values of a statistic, one per replicate, in generation order.
///
/// The order carries no meaning beyond reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmpiricalDistribution {
    values: Vec<f64>,
}

impl EmpiricalDistribution {
    #[must_use]
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Computes `statistic` on each of `replicates` replicates of `sample`.
    ///
    /// A replicate on which the statistic is undefined, such as a bootstrap
    /// slope whose explanatory values all coincide, is redrawn from the same
    /// replicate seed up to [`MAX_REPLICATE_DRAWS`] times. The distribution is
    /// therefore conditional on the statistic being defined.
    ///
    /// # Errors
    ///
    /// - [`InferenceError::InvalidParameter`] if `replicates` is zero or the
    ///   mode is invalid for `sample`
    /// - the statistic's own error if it cannot be computed on `sample` itself
    /// - [`InferenceError::InsufficientData`] if a replicate stays undefined
    ///   after every redraw
    pub fn generate(
        sample: &Sample,
        mode: &ResampleMode,
        statistic: &Statistic,
        replicates: usize,
        seed: ResampleSeed,
    ) -> Result<Self> {
        let plan = prepare(sample, mode, statistic, replicates)?;
        let values = seed
            .replicate_seeds(replicates)
            .into_iter()
            .map(|seed| replicate_value(&plan, sample, statistic, seed))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { values })
    }

    /// Like [`Self::generate`], but spreads the replicates over `threads` workers.
    ///
    /// Each replicate is built from its own derived seed, so the result is
    /// identical to [`Self::generate`] for the same arguments.
    pub fn generate_parallel(
        sample: &Sample,
        mode: &ResampleMode,
        statistic: &Statistic,
        replicates: usize,
        seed: ResampleSeed,
        threads: NonZeroUsize,
    ) -> Result<Self> {
        let plan = &prepare(sample, mode, statistic, replicates)?;
        let seeds = seed.replicate_seeds(replicates);
        let chunk_len = replicates.div_ceil(threads.get());

        let mut values = vec![0.0; replicates];
        let results = thread::scope(|s| {
            let handles = values
                .chunks_mut(chunk_len)
                .zip(seeds.chunks(chunk_len))
                .map(|(out, seeds)| {
                    s.spawn(move || -> Result<()> {
                        for (slot, seed) in out.iter_mut().zip(seeds) {
                            *slot = replicate_value(plan, sample, statistic, *seed)?;
                        }
                        Ok(())
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect::<Vec<_>>()
        });
        results.into_iter().collect::<Result<()>>()?;

        Ok(Self { values })
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in ascending order.
    #[must_use]
    pub fn sorted_values(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    /// Descriptive statistics of the distribution; its standard deviation is
    /// the simulation standard error. `None` when empty.
    #[must_use]
    pub fn summary(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::from_sorted(&self.sorted_values())
    }

    /// Equal-width bin counts for an external renderer.
    #[must_use]
    pub fn histogram(&self, bins: usize) -> Histogram {
        Histogram::from_sorted(&self.sorted_values(), bins)
    }

    /// Percentile confidence interval; see [`ConfidenceInterval::percentile`].
    pub fn confidence_interval(&self, level: f64) -> Result<ConfidenceInterval> {
        ConfidenceInterval::percentile(self, level)
    }

    /// Tail-proportion p-value; see [`PValue::compute`].
    pub fn p_value(&self, observed: f64, direction: Direction) -> Result<PValue> {
        PValue::compute(self, observed, direction)
    }
}

/// Draws of a single replicate before its statistic counts as undefined.
pub const MAX_REPLICATE_DRAWS: usize = 100;

fn prepare(
    sample: &Sample,
    mode: &ResampleMode,
    statistic: &Statistic,
    replicates: usize,
) -> Result<ResamplePlan> {
    if replicates == 0 {
        return Err(InferenceError::invalid("replicate count must be positive"));
    }
    let plan = ResamplePlan::new(sample, mode)?;
    // Redraws only cover failures introduced by resampling.
    statistic.calculate(sample)?;
    Ok(plan)
}

fn replicate_value(
    plan: &ResamplePlan,
    sample: &Sample,
    statistic: &Statistic,
    seed: ResampleSeed,
) -> Result<f64> {
    let mut rng = seed.rng();
    let mut draws = 0;
    loop {
        let replicate = plan.replicate(sample, &mut rng);
        draws += 1;
        match statistic.calculate(&replicate) {
            Ok(value) => return Ok(value),
            Err(e) if draws >= MAX_REPLICATE_DRAWS => {
                return Err(InferenceError::insufficient(format!(
                    "statistic stayed undefined over {draws} draws of one replicate: {e}"
                )));
            }
            Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Column;

    use super::*;

    fn grouped() -> Sample {
        Sample::from_columns([
            ("g", Column::categorical(["a", "b", "a", "b", "a", "b", "a", "b"])),
            ("x", Column::numeric([1.0, 4.0, 2.0, 3.0, 5.0, 7.0, 1.5, 2.5])),
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

    fn binary_predictor() -> Sample {
        Sample::from_columns([
            ("x", Column::numeric([0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0])),
            ("y", Column::numeric([1.0, 2.0, 1.5, 0.5, 1.2, 3.0, 2.5, 3.5, 2.8, 3.1])),
        ])
        .unwrap()
    }

    fn slope() -> Statistic {
        Statistic::Slope {
            response: "y".to_owned(),
            explanatory: "x".to_owned(),
        }
    }

    #[test]
    fn test_degenerate_bootstrap_slopes_are_redrawn() {
        // A 10-record bootstrap repeats a single x value with probability 1/512,
        // so 5000 replicates hit it with near certainty.
        let sample = binary_predictor();
        let mode = ResampleMode::bootstrap_for(&slope());
        for seed in 0..5 {
            let seed = ResampleSeed::from_u64(seed);
            let dist =
                EmpiricalDistribution::generate(&sample, &mode, &slope(), 5000, seed).unwrap();
            assert_eq!(dist.len(), 5000);
            assert!(dist.values().iter().all(|v| v.is_finite()));
            let parallel = EmpiricalDistribution::generate_parallel(
                &sample,
                &mode,
                &slope(),
                5000,
                seed,
                NonZeroUsize::new(4).unwrap(),
            )
            .unwrap();
            assert_eq!(parallel, dist);
        }
    }

    #[test]
    fn test_statistic_undefined_on_sample_is_not_redrawn() {
        let sample = Sample::from_columns([
            ("x", Column::numeric([2.0, 2.0, 2.0])),
            ("y", Column::numeric([1.0, 2.0, 3.0])),
        ])
        .unwrap();
        let mode = ResampleMode::bootstrap_for(&slope());
        let err =
            EmpiricalDistribution::generate(&sample, &mode, &slope(), 10, ResampleSeed::from_u64(3))
                .unwrap_err();
        assert!(err.is_invalid_parameter(), "{err}");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sample = grouped();
        let statistic = diff_in_means();
        let mode = ResampleMode::Permute {
            response: "x".to_owned(),
        };
        let seed = ResampleSeed::from_u64(2024);
        let sequential =
            EmpiricalDistribution::generate(&sample, &mode, &statistic, 101, seed).unwrap();
        for threads in [1, 3, 8] {
            let parallel = EmpiricalDistribution::generate_parallel(
                &sample,
                &mode,
                &statistic,
                101,
                seed,
                NonZeroUsize::new(threads).unwrap(),
            )
            .unwrap();
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn test_more_threads_than_replicates() {
        let sample = grouped();
        let mode = ResampleMode::bootstrap_for(&diff_in_means());
        let dist = EmpiricalDistribution::generate_parallel(
            &sample,
            &mode,
            &diff_in_means(),
            3,
            ResampleSeed::from_u64(1),
            NonZeroUsize::new(16).unwrap(),
        )
        .unwrap();
        assert_eq!(dist.len(), 3);
    }

    #[test]
    fn test_parallel_rejects_zero_replicates() {
        let sample = grouped();
        let mode = ResampleMode::Bootstrap { strata: None };
        let err = EmpiricalDistribution::generate_parallel(
            &sample,
            &mode,
            &diff_in_means(),
            0,
            ResampleSeed::from_u64(1),
            NonZeroUsize::MIN,
        )
        .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_summary_and_histogram() {
        let dist = EmpiricalDistribution::from_values(vec![3.0, 1.0, 2.0]);
        let summary = dist.summary().unwrap();
        assert_eq!(summary.mean, 2.0);
        assert_eq!(dist.histogram(2).total_count(), 3);
        assert!(EmpiricalDistribution::from_values(vec![]).summary().is_none());
    }
}
