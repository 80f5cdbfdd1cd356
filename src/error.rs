//! Error type for the caller-visible failure modes.
//!
//! Only malformed configuration (and explicit cancellation of a sharded run)
//! is surfaced. Degenerate *data* never produces an error: it is absorbed with
//! a fallback value and recorded as an [`AnalysisNote`](crate::AnalysisNote).

use thiserror::Error;

/// Errors returned by the engine entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Monte Carlo sample count must be at least 1.
    #[error("samples must be > 0, got {samples}")]
    InvalidSamples { samples: usize },

    /// Exploration rate must be finite and lie in `[0, 1]`.
    #[error("exploration rate must be in [0, 1], got {rate}")]
    InvalidExplorationRate { rate: f64 },

    /// Sharded estimation needs at least one shard.
    #[error("shards must be > 0, got {shards}")]
    InvalidShards { shards: usize },

    /// A sharded estimation was cancelled before every shard finished.
    #[error("win-probability estimation was cancelled")]
    Cancelled,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let e = Error::InvalidExplorationRate { rate: 1.5 };
        assert_eq!(e.to_string(), "exploration rate must be in [0, 1], got 1.5");
        let e = Error::InvalidSamples { samples: 0 };
        assert!(e.to_string().contains("got 0"));
    }
}
