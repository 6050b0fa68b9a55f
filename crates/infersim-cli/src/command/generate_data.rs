use std::path::PathBuf;

use infersim_core::{ResampleSeed, synthetic::Scenario};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateDataArg {
    /// Dataset to generate: bowl, two-groups, regression or smoking
    scenario: Scenario,
    /// Seed as 32 hex digits; random when omitted
    #[arg(long)]
    seed: Option<ResampleSeed>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateDataArg) -> anyhow::Result<()> {
    let GenerateDataArg {
        scenario,
        seed,
        output,
    } = arg;
    let seed = seed.unwrap_or_else(rand::random);

    eprintln!("Generating {scenario} dataset (seed {seed})...");
    let sample = scenario.generate(&mut seed.rng())?;
    let dataset = sample.to_dataset();
    util::write_json(&dataset, output.as_deref())?;

    eprintln!(
        "Generated {} records of {}",
        dataset.records.len(),
        dataset
            .variables
            .iter()
            .map(|v| format!("{} ({})", v.name, v.kind))
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }

    Ok(())
}
