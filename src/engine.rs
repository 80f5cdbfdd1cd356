//! Monte Carlo estimation of each arm's probability of being best.
//!
//! Every round draws one sample from each arm's Beta posterior; the arm with
//! the largest draw wins the round. Win probability is the arm's share of
//! rounds. This is the exploration signal Thompson sampling acts on: a value
//! near 1 means the arm's posterior almost always dominates its competitors.
//!
//! Notes:
//! - Ties go to the arm seen first in the input slice.
//! - Results are keyed by arm id; repeated ids have their shares summed.
//! - The same variants, sample count, and seed reproduce the result exactly.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{derive_seed, Error, PosteriorSampler, Result, VariantStats};

/// Default number of Monte Carlo rounds.
pub const DEFAULT_SAMPLES: usize = 10_000;

fn samplers(variants: &[VariantStats]) -> Vec<PosteriorSampler> {
    variants
        .iter()
        .map(|v| PosteriorSampler::from_params(v.posterior()))
        .collect()
}

/// Accumulate `rounds` Thompson rounds into `wins` (indexed like `samplers`).
fn count_wins<R: Rng + ?Sized>(
    samplers: &[PosteriorSampler],
    rounds: usize,
    rng: &mut R,
    wins: &mut [u64],
) {
    for _ in 0..rounds {
        let mut best = 0usize;
        let mut best_draw = f64::NEG_INFINITY;
        for (i, s) in samplers.iter().enumerate() {
            let x = s.sample(rng);
            // Strict comparison: earlier arms keep ties.
            if x > best_draw {
                best_draw = x;
                best = i;
            }
        }
        wins[best] += 1;
    }
}

fn to_probabilities(variants: &[VariantStats], wins: &[u64], samples: usize) -> BTreeMap<String, f64> {
    let n = samples as f64;
    let mut out: BTreeMap<String, f64> = BTreeMap::new();
    for (v, &w) in variants.iter().zip(wins) {
        *out.entry(v.id.clone()).or_insert(0.0) += w as f64 / n;
    }
    out
}

/// Fallbacks that need no simulation: no arms, or a single arm.
fn trivial(variants: &[VariantStats]) -> Option<BTreeMap<String, f64>> {
    match variants {
        [] => Some(BTreeMap::new()),
        [only] => Some(BTreeMap::from([(only.id.clone(), 1.0)])),
        _ => None,
    }
}

/// Estimate each arm's probability of having the highest CTR.
///
/// - `samples` Monte Carlo rounds (must be `> 0`).
/// - Zero arms → empty map; one arm → probability `1.0` without simulation.
/// - Arms with no impressions sample from the uniform prior, so a brand-new
///   arm keeps a nonzero chance of winning.
///
/// Returned probabilities lie in `[0, 1]` and sum to 1.
///
/// # Errors
///
/// [`Error::InvalidSamples`] if `samples == 0`.
pub fn estimate_win_probabilities<R: Rng + ?Sized>(
    variants: &[VariantStats],
    samples: usize,
    rng: &mut R,
) -> Result<BTreeMap<String, f64>> {
    if samples == 0 {
        return Err(Error::InvalidSamples { samples });
    }
    if let Some(out) = trivial(variants) {
        return Ok(out);
    }
    tracing::debug!(variants = variants.len(), samples, "estimating win probabilities");

    let samplers = samplers(variants);
    let mut wins = vec![0u64; variants.len()];
    count_wins(&samplers, samples, rng, &mut wins);
    Ok(to_probabilities(variants, &wins, samples))
}

/// [`estimate_win_probabilities`] with a `StdRng` seeded from `seed`.
pub fn estimate_win_probabilities_seeded(
    variants: &[VariantStats],
    samples: usize,
    seed: u64,
) -> Result<BTreeMap<String, f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    estimate_win_probabilities(variants, samples, &mut rng)
}

/// Configuration for sharded estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShardConfig {
    /// Total Monte Carlo rounds across all shards.
    pub samples: usize,
    /// Number of independent shards.
    pub shards: usize,
    /// Base seed; shard `i` uses `derive_seed(seed, i)`.
    pub seed: u64,
    /// Rounds per batch. Cancellation is checked between batches.
    pub batch_size: usize,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            shards: 8,
            seed: 0,
            batch_size: 1_024,
        }
    }
}

/// Rounds assigned to `shard`: an even split with the remainder spread over
/// the first shards.
fn shard_rounds(samples: usize, shards: usize, shard: usize) -> usize {
    samples / shards + usize::from(shard < samples % shards)
}

fn run_shard(
    samplers: &[PosteriorSampler],
    cfg: &ShardConfig,
    shard: usize,
    cancel: Option<&AtomicBool>,
) -> Option<Vec<u64>> {
    let mut rng = StdRng::seed_from_u64(derive_seed(cfg.seed, shard as u64));
    let mut wins = vec![0u64; samplers.len()];
    let mut left = shard_rounds(cfg.samples, cfg.shards, shard);
    let batch = cfg.batch_size.max(1);
    while left > 0 {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return None;
        }
        let n = left.min(batch);
        count_wins(samplers, n, &mut rng, &mut wins);
        left -= n;
    }
    Some(wins)
}

#[cfg(feature = "parallel")]
fn run_shards(
    samplers: &[PosteriorSampler],
    cfg: &ShardConfig,
    cancel: Option<&AtomicBool>,
) -> Option<Vec<Vec<u64>>> {
    use rayon::prelude::*;
    (0..cfg.shards)
        .into_par_iter()
        .map(|i| run_shard(samplers, cfg, i, cancel))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_shards(
    samplers: &[PosteriorSampler],
    cfg: &ShardConfig,
    cancel: Option<&AtomicBool>,
) -> Option<Vec<Vec<u64>>> {
    (0..cfg.shards)
        .map(|i| run_shard(samplers, cfg, i, cancel))
        .collect()
}

/// Sharded [`estimate_win_probabilities`].
///
/// Each shard owns an independent `StdRng` stream and its own win counters;
/// counters are merged by addition, so the result depends only on `cfg` and
/// not on thread scheduling. With the `parallel` feature shards run on the
/// rayon pool, otherwise they run in sequence with identical output.
///
/// If `cancel` is set while shards are running, no result is produced.
///
/// # Errors
///
/// - [`Error::InvalidSamples`] if `cfg.samples == 0`.
/// - [`Error::InvalidShards`] if `cfg.shards == 0`.
/// - [`Error::Cancelled`] if `cancel` was observed set.
pub fn estimate_win_probabilities_sharded(
    variants: &[VariantStats],
    cfg: &ShardConfig,
    cancel: Option<&AtomicBool>,
) -> Result<BTreeMap<String, f64>> {
    if cfg.samples == 0 {
        return Err(Error::InvalidSamples { samples: cfg.samples });
    }
    if cfg.shards == 0 {
        return Err(Error::InvalidShards { shards: cfg.shards });
    }
    if let Some(out) = trivial(variants) {
        return Ok(out);
    }
    tracing::debug!(
        variants = variants.len(),
        samples = cfg.samples,
        shards = cfg.shards,
        "estimating win probabilities (sharded)"
    );

    let samplers = samplers(variants);
    let Some(per_shard) = run_shards(&samplers, cfg, cancel) else {
        tracing::debug!("win-probability estimation cancelled");
        return Err(Error::Cancelled);
    };
    let mut wins = vec![0u64; variants.len()];
    for shard in per_shard {
        for (total, w) in wins.iter_mut().zip(shard) {
            *total += w;
        }
    }
    Ok(to_probabilities(variants, &wins, cfg.samples))
}

/// Posterior mean CTR per arm (deterministic companion to win probability).
pub fn posterior_means(variants: &[VariantStats]) -> BTreeMap<String, f64> {
    variants
        .iter()
        .map(|v| (v.id.clone(), v.posterior().mean()))
        .collect()
}
