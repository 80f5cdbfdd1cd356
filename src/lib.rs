//! `allot`: Thompson-sampling budget allocation for ad experiments.
//!
//! Designed for the "which ad variant gets the budget" problem: a handful of
//! arms (creatives, landing pages, bid strategies) each accumulate
//! impressions and clicks, and you need to decide how to split spend between
//! them and when to stop testing.
//!
//! A [`VariantStats`] carries one arm's counters:
//! - `impressions`, `clicks`, `conversions`: monotone counters.
//! - `spend`, `revenue`: monetary accumulators (reporting only).
//! - `is_control`: the baseline arm for significance and lift.
//!
//! Each arm's CTR belief is a Beta posterior with `alpha = clicks + 1` and
//! `beta = impressions - clicks + 1` ([`PosteriorParams`]).
//!
//! **Goals:**
//! - **Stateless**: every call takes a snapshot and returns a fresh result.
//!   Nothing is cached between calls; independent experiments can be analyzed
//!   concurrently without locking.
//! - **Reproducible**: randomness is always injected. Same snapshot, same
//!   sample count, same seed → same numbers.
//! - **No NaN out**: degenerate data (no arms, one arm, no impressions, zero
//!   standard error, inconsistent counters) takes a documented fallback and is
//!   recorded as an [`AnalysisNote`]. Only bad configuration is an [`Error`].
//!
//! **Building blocks** (leaves first):
//! - [`beta_pdf`] / [`ln_gamma`] / [`gamma`]: Beta density, evaluated in log
//!   space so counts up to 10^6 impressions do not overflow.
//! - [`PosteriorSampler`] / [`sample_beta`]: Beta draws from two Gamma draws.
//! - [`estimate_win_probabilities`]: Monte Carlo probability that each arm
//!   has the highest CTR. [`estimate_win_probabilities_sharded`] splits the
//!   rounds over independent RNG streams (on the rayon pool with the
//!   `parallel` feature) and supports cancellation.
//! - [`two_proportion_z_test`]: frequentist check of a challenger vs the
//!   control at the fixed 5% level.
//! - [`allocate`]: win probabilities → budget percentages with an exploration
//!   floor.
//! - [`recommend`]: roll out (> 0.95), shift budget (> 0.80), or continue.
//! - [`analyze`]: all of the above in one call, producing a [`BanditResult`].
//!
//! ```rust
//! use allot::{analyze_seeded, Action, EngineConfig, VariantStats};
//!
//! let arms = vec![
//!     VariantStats::new("control", 1_000, 100).control(),
//!     VariantStats::new("new_headline", 1_000, 120),
//! ];
//! let result = analyze_seeded(&arms, &EngineConfig::default(), 7).unwrap();
//!
//! let total: f64 = result.allocation.values().sum();
//! assert!((total - 100.0).abs() < 1e-6);
//! assert!(!result.significance.unwrap().is_significant);
//! assert_ne!(result.recommendation.action, Action::RollOut);
//! ```
//!
//! **Non-goals:**
//! - No storage, transport, scheduling, or rendering. Callers fetch the
//!   counters, decide how often to call, and display the result.
//! - No validation of upstream data quality beyond recording what looks off.
//!
//! **Features:**
//! - `serde`: `Serialize`/`Deserialize` on configs and results.
//! - `parallel`: run Monte Carlo shards on rayon.

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod variant;
pub use variant::*;

mod beta;
pub use beta::*;

mod posterior;
pub use posterior::*;

mod seed;
pub use seed::*;

mod engine;
pub use engine::*;

mod significance;
pub use significance::*;

mod alloc;
pub use alloc::*;

mod recommend;
pub use recommend::*;

mod config;
pub use config::*;

mod analysis;
pub use analysis::*;
