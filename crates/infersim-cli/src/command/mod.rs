use clap::{Parser, Subcommand};

use self::{
    confidence_interval::ConfidenceIntervalArg, generate_data::GenerateDataArg,
    hypothesis_test::HypothesisTestArg,
};

mod common;
mod confidence_interval;
mod generate_data;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Estimate a statistic with a bootstrap percentile confidence interval
    ConfidenceInterval(#[clap(flatten)] ConfidenceIntervalArg),
    /// Test a statistic against a simulated null distribution
    HypothesisTest(#[clap(flatten)] HypothesisTestArg),
    /// Write one of the built-in example datasets
    GenerateData(#[clap(flatten)] GenerateDataArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::ConfidenceInterval(arg) => confidence_interval::run(&arg)?,
        Mode::HypothesisTest(arg) => hypothesis_test::run(&arg)?,
        Mode::GenerateData(arg) => generate_data::run(&arg)?,
    }
    Ok(())
}
