//! JSON files read and written by the commands.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context as _;
use infersim_core::{Dataset, InferenceConfig, Sample};
use serde::{Serialize, de::DeserializeOwned};

/// Writes `value` as pretty-printed JSON to `path`, or to stdout without one.
pub(crate) fn write_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    let target = path.map_or_else(|| "stdout".to_owned(), |p| p.display().to_string());
    let mut writer: Box<dyn io::Write> = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer).with_context(|| format!("Failed to write newline to {target}"))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {target}"))?;
    Ok(())
}

/// Reads a `{ "variables": [...], "records": [...] }` file into a validated sample.
pub(crate) fn load_sample(path: &Path) -> anyhow::Result<Sample> {
    let dataset: Dataset = read_json("dataset", path)?;
    Sample::from_dataset(&dataset).with_context(|| format!("Invalid dataset: {}", path.display()))
}

/// Reads an inference configuration; absent keys take their defaults.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<InferenceConfig> {
    read_json("config", path)
}

fn read_json<T>(what: &str, path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file =
        File::open(path).with_context(|| format!("Failed to open {what} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {what} file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use infersim_core::{ResampleSeed, synthetic::Scenario};

    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("infersim-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_written_dataset_loads_as_sample() {
        let path = scratch_file("dataset.json");
        let sample = Scenario::Smoking
            .generate(&mut ResampleSeed::from_u64(6).rng())
            .unwrap();
        write_json(&sample.to_dataset(), Some(&path)).unwrap();
        let loaded = load_sample(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded.to_dataset(), sample.to_dataset());
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let path = scratch_file("config.json");
        fs::write(&path, r#"{ "replicates": 250 }"#).unwrap();
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.replicates, 250);
        assert_eq!(config.confidence_level, InferenceConfig::default().confidence_level);
    }

    #[test]
    fn test_errors_name_the_file() {
        let missing = scratch_file("missing.json");
        let err = load_config(&missing).unwrap_err();
        assert!(err.to_string().contains("config file"), "{err}");

        let path = scratch_file("bad-dataset.json");
        fs::write(&path, r#"{ "variables": [], "records": [] }"#).unwrap();
        let err = load_sample(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(err.to_string().starts_with("Invalid dataset"), "{err}");
    }
}
