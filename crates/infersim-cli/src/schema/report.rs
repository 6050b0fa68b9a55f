use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use infersim_core::{
    ConfidenceInterval, Decision, EmpiricalDistribution, Estimate, HypothesisTest, PValue,
    ResampleMode, ResampleSeed, Statistic,
};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum ReportDetail {
    #[default]
    Summary,
    Full,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistogramBinReport {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

/// How the empirical distribution was simulated, and its shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationReport {
    pub mode: ResampleMode,
    pub seed: ResampleSeed,
    pub replicates: usize,
    pub mean: f64,
    pub standard_error: f64,
    pub histogram: Vec<HistogramBinReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<EmpiricalDistribution>,
}

impl SimulationReport {
    fn new(
        mode: ResampleMode,
        seed: ResampleSeed,
        distribution: EmpiricalDistribution,
        bins: usize,
        detail: ReportDetail,
    ) -> anyhow::Result<Self> {
        let summary = distribution
            .summary()
            .context("Simulation produced no replicates")?;
        let histogram = distribution
            .histogram(bins)
            .bins
            .into_iter()
            .map(|bin| HistogramBinReport {
                start: bin.range.start,
                end: bin.range.end,
                count: bin.count,
            })
            .collect();
        Ok(Self {
            mode,
            seed,
            replicates: distribution.len(),
            mean: summary.mean,
            standard_error: summary.std_dev,
            histogram,
            values: (detail == ReportDetail::Full).then_some(distribution),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfidenceIntervalReport {
    pub generated_at: DateTime<Utc>,
    pub dataset: PathBuf,
    pub records: usize,
    pub statistic: Statistic,
    pub observed: f64,
    pub interval: ConfidenceInterval,
    pub simulation: SimulationReport,
}

impl ConfidenceIntervalReport {
    pub fn new(
        dataset: PathBuf,
        records: usize,
        estimate: Estimate,
        bins: usize,
        detail: ReportDetail,
    ) -> anyhow::Result<Self> {
        let Estimate {
            statistic,
            observed,
            interval,
            mode,
            seed,
            distribution,
        } = estimate;
        Ok(Self {
            generated_at: Utc::now(),
            dataset,
            records,
            statistic,
            observed,
            interval,
            simulation: SimulationReport::new(mode, seed, distribution, bins, detail)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HypothesisTestReport {
    pub generated_at: DateTime<Utc>,
    pub dataset: PathBuf,
    pub records: usize,
    pub statistic: Statistic,
    pub null_value: Option<f64>,
    pub observed: f64,
    pub p_value: PValue,
    pub alpha: f64,
    pub decision: Decision,
    pub simulation: SimulationReport,
}

impl HypothesisTestReport {
    pub fn new(
        dataset: PathBuf,
        records: usize,
        test: HypothesisTest,
        bins: usize,
        detail: ReportDetail,
    ) -> anyhow::Result<Self> {
        let HypothesisTest {
            statistic,
            observed,
            null_value,
            p_value,
            alpha,
            decision,
            mode,
            seed,
            distribution,
        } = test;
        Ok(Self {
            generated_at: Utc::now(),
            dataset,
            records,
            statistic,
            null_value,
            observed,
            p_value,
            alpha,
            decision,
            simulation: SimulationReport::new(mode, seed, distribution, bins, detail)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation(detail: ReportDetail) -> SimulationReport {
        SimulationReport::new(
            ResampleMode::Bootstrap { strata: None },
            ResampleSeed::from_u64(3),
            EmpiricalDistribution::from_values(vec![0.1, 0.2, 0.2, 0.4]),
            3,
            detail,
        )
        .unwrap()
    }

    #[test]
    fn test_summary_omits_values() {
        let report = simulation(ReportDetail::Summary);
        assert_eq!(report.replicates, 4);
        assert_eq!(report.histogram.len(), 3);
        assert_eq!(report.histogram.iter().map(|b| b.count).sum::<u64>(), 4);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("values").is_none());
        assert_eq!(json["mode"]["mode"], "bootstrap");
        assert_eq!(json["seed"], "00000000000000000000000000000003");
    }

    #[test]
    fn test_full_detail_keeps_values() {
        let report = simulation(ReportDetail::Full);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["values"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_detail_parsing() {
        assert_eq!("full".parse::<ReportDetail>().unwrap(), ReportDetail::Full);
        assert!("verbose".parse::<ReportDetail>().is_err());
    }

    #[test]
    fn test_empty_distribution_is_an_error() {
        let result = SimulationReport::new(
            ResampleMode::Bootstrap { strata: None },
            ResampleSeed::from_u64(3),
            EmpiricalDistribution::from_values(vec![]),
            3,
            ReportDetail::Summary,
        );
        assert!(result.is_err());
    }
}
