use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, bail};
use infersim_core::{InferenceConfig, ResampleSeed, Sample, Statistic, StatisticKind};

use crate::{schema::report::ReportDetail, util};

/// Dataset and the statistic to compute on it.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatisticArg {
    /// Dataset JSON file
    dataset: PathBuf,
    /// Statistic: proportion, diff-in-proportions, mean, diff-in-means or slope
    #[arg(long)]
    statistic: StatisticKind,
    /// Response variable
    #[arg(long)]
    response: String,
    /// Explanatory variable of two-variable statistics
    #[arg(long)]
    explanatory: Option<String>,
    /// Level counted as a success in proportions
    #[arg(long)]
    success: Option<String>,
    /// Group order of differences as `FIRST,SECOND`; first two observed groups when omitted
    #[arg(long)]
    order: Option<String>,
}

impl StatisticArg {
    pub(crate) fn dataset(&self) -> &PathBuf {
        &self.dataset
    }

    pub(crate) fn load_sample(&self) -> anyhow::Result<Sample> {
        eprintln!("Loading dataset {}...", self.dataset.display());
        let sample = util::load_sample(&self.dataset)?;
        eprintln!(
            "Loaded {} records of {} variables",
            sample.len(),
            sample.variables().len()
        );
        Ok(sample)
    }

    pub(crate) fn build_statistic(&self, sample: &Sample) -> anyhow::Result<Statistic> {
        let kind = self.statistic;
        let response = self.response.clone();
        if !kind.has_explanatory() && self.explanatory.is_some() {
            bail!("--explanatory is not used by a {kind}");
        }
        let statistic = match kind {
            StatisticKind::Proportion => Statistic::Proportion {
                response,
                success: self.success(kind)?,
            },
            StatisticKind::DiffInProportions => {
                let explanatory = self.explanatory(kind)?;
                Statistic::DiffInProportions {
                    response,
                    success: self.success(kind)?,
                    order: self.order(sample, &explanatory)?,
                    explanatory,
                }
            }
            StatisticKind::Mean => Statistic::Mean { response },
            StatisticKind::DiffInMeans => {
                let explanatory = self.explanatory(kind)?;
                Statistic::DiffInMeans {
                    response,
                    order: self.order(sample, &explanatory)?,
                    explanatory,
                }
            }
            StatisticKind::Slope => Statistic::Slope {
                response,
                explanatory: self.explanatory(kind)?,
            },
        };
        Ok(statistic)
    }

    fn success(&self, kind: StatisticKind) -> anyhow::Result<String> {
        self.success
            .clone()
            .with_context(|| format!("--success is required for a {kind}"))
    }

    fn explanatory(&self, kind: StatisticKind) -> anyhow::Result<String> {
        self.explanatory
            .clone()
            .with_context(|| format!("--explanatory is required for a {kind}"))
    }

    fn order(&self, sample: &Sample, explanatory: &str) -> anyhow::Result<[String; 2]> {
        if let Some(order) = &self.order {
            return parse_order(order);
        }
        let grouped = sample.group_by(explanatory)?;
        let groups = grouped
            .groups()
            .map(|(level, _)| level.to_owned())
            .collect::<Vec<_>>();
        let [first, second] = <[String; 2]>::try_from(groups).map_err(|groups| {
            anyhow::anyhow!(
                "'{explanatory}' has {} groups ({}); choose two with --order",
                groups.len(),
                groups.join(", ")
            )
        })?;
        eprintln!("Using group order {first}, {second}");
        Ok([first, second])
    }
}

fn parse_order(order: &str) -> anyhow::Result<[String; 2]> {
    let groups = order
        .split(',')
        .map(|level| level.trim().to_owned())
        .collect::<Vec<_>>();
    <[String; 2]>::try_from(groups)
        .map_err(|_| anyhow::anyhow!("--order needs exactly two groups, got '{order}'"))
}

/// Simulation settings shared by every inference command.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulationArg {
    /// Inference configuration JSON file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of replicates [default: 1000]
    #[arg(long)]
    reps: Option<usize>,
    /// Seed as 32 hex digits; random when omitted
    #[arg(long)]
    seed: Option<ResampleSeed>,
    /// Worker threads for replicate generation
    #[arg(long)]
    threads: Option<NonZeroUsize>,
    /// Number of histogram bins in the report
    #[arg(long, default_value_t = 20)]
    bins: usize,
    /// Report detail: summary, or full to include every replicate value
    #[arg(long, default_value = "summary")]
    detail: ReportDetail,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl SimulationArg {
    /// Configuration file (or defaults) overridden by the flags given.
    pub(crate) fn config(&self) -> anyhow::Result<InferenceConfig> {
        let mut config = match &self.config {
            Some(path) => util::load_config(path)?,
            None => InferenceConfig::default(),
        };
        if let Some(reps) = self.reps {
            config.replicates = reps;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        Ok(config)
    }

    pub(crate) fn bins(&self) -> usize {
        self.bins
    }

    pub(crate) fn detail(&self) -> ReportDetail {
        self.detail
    }

    pub(crate) fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}
