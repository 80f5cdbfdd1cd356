//! Engine parameters.

use crate::alloc::check_exploration_rate;
use crate::{Error, Result, DEFAULT_EXPLORATION_RATE, DEFAULT_SAMPLES};

/// Tunables for one analysis call.
///
/// The significance level is intentionally absent: it is fixed at
/// [`SIGNIFICANCE_LEVEL`](crate::SIGNIFICANCE_LEVEL).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Monte Carlo rounds. More rounds, less noise, more latency.
    pub samples: usize,
    /// Share of budget spread evenly across arms, in `[0, 1]`.
    pub exploration_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            exploration_rate: DEFAULT_EXPLORATION_RATE,
        }
    }
}

impl EngineConfig {
    /// Reject configurations that cannot produce a result.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSamples`] or [`Error::InvalidExplorationRate`].
    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(Error::InvalidSamples {
                samples: self.samples,
            });
        }
        check_exploration_rate(self.exploration_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.samples, 10_000);
        assert_eq!(cfg.exploration_rate, 0.2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = EngineConfig {
            samples: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(Error::InvalidSamples { samples: 0 }));
        let cfg = EngineConfig {
            exploration_rate: 2.0,
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(Error::InvalidExplorationRate { rate: 2.0 })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_take_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"samples": 2000}"#).unwrap();
        assert_eq!(cfg.samples, 2_000);
        assert_eq!(cfg.exploration_rate, 0.2);
    }
}
