use std::num::NonZeroUsize;

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{Direction, InferenceError, ResampleSeed, Result};

pub const DEFAULT_REPLICATES: usize = 1000;
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Settings of one inference run.
///
/// Every field has a default, so a partial JSON object is a valid configuration:
///
/// ```
/// # use infersim_core::{Direction, InferenceConfig};
/// let config: InferenceConfig = serde_json::from_str(r#"{"replicates": 500, "direction": "less"}"#)?;
/// assert_eq!(config.replicates, 500);
/// assert_eq!(config.confidence_level, 0.95);
/// assert_eq!(config.direction, Direction::Less);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Number of replicates in the empirical distribution.
    pub replicates: usize,
    /// Level of percentile confidence intervals.
    pub confidence_level: f64,
    /// Significance threshold for the reported decision.
    pub alpha: f64,
    /// Tail of the null distribution used for p-values.
    pub direction: Direction,
    /// Seed of the run; a fresh random seed is used when absent.
    pub seed: Option<ResampleSeed>,
    /// Worker threads for replicate generation; sequential when absent.
    pub threads: Option<NonZeroUsize>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            replicates: DEFAULT_REPLICATES,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            alpha: DEFAULT_ALPHA,
            direction: Direction::default(),
            seed: None,
            threads: None,
        }
    }
}

impl InferenceConfig {
    /// Checks every setting for range errors.
    pub fn validate(&self) -> Result<()> {
        if self.replicates == 0 {
            return Err(InferenceError::invalid("replicate count must be positive"));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(InferenceError::invalid(format!(
                "confidence level must lie in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(InferenceError::invalid(format!(
                "significance level must lie in (0, 1), got {}",
                self.alpha
            )));
        }
        Ok(())
    }

    /// The configured seed, or a fresh one from the thread-local generator.
    #[must_use]
    pub fn seed_or_random(&self) -> ResampleSeed {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }
}
