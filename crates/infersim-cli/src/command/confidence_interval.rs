use infersim_core::study;

use crate::{schema::report::ConfidenceIntervalReport, util};

use super::common::{SimulationArg, StatisticArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ConfidenceIntervalArg {
    #[clap(flatten)]
    statistic: StatisticArg,
    /// Confidence level in (0, 1) [default: 0.95]
    #[arg(long)]
    level: Option<f64>,
    #[clap(flatten)]
    simulation: SimulationArg,
}

pub(crate) fn run(arg: &ConfidenceIntervalArg) -> anyhow::Result<()> {
    let ConfidenceIntervalArg {
        statistic: statistic_arg,
        level,
        simulation,
    } = arg;
    let mut config = simulation.config()?;
    if let Some(level) = *level {
        config.confidence_level = level;
    }

    let sample = statistic_arg.load_sample()?;
    let statistic = statistic_arg.build_statistic(&sample)?;

    eprintln!(
        "Bootstrapping {} with {} replicates...",
        statistic.kind(),
        config.replicates
    );
    let estimate = study::estimate(&sample, &statistic, &config)?;

    eprintln!();
    eprintln!("Confidence interval");
    eprintln!("  Statistic: {}", statistic.kind());
    eprintln!("  Observed:  {:.5}", estimate.observed);
    eprintln!(
        "  {:.0}% CI:   [{:.2}, {:.2}]",
        estimate.interval.level * 100.0,
        estimate.interval.lower,
        estimate.interval.upper
    );
    eprintln!("  Seed:      {}", estimate.seed);

    let report = ConfidenceIntervalReport::new(
        statistic_arg.dataset().clone(),
        sample.len(),
        estimate,
        simulation.bins(),
        simulation.detail(),
    )?;
    eprintln!("  Std error: {:.5}", report.simulation.standard_error);
    util::write_json(&report, simulation.output())?;

    Ok(())
}
