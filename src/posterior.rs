//! Posterior sampling for a single arm.
//!
//! A Beta draw is built from two Gamma draws: if `x ~ Gamma(α, 1)` and
//! `y ~ Gamma(β, 1)` then `x / (x + y) ~ Beta(α, β)`. The random source is
//! always supplied by the caller, so a seeded `StdRng` reproduces a run.

use rand::Rng;
use rand_distr::{Distribution, Gamma};

use crate::{PosteriorParams, VariantStats};

/// Reusable Beta(alpha, beta) sampler.
///
/// Building the two Gamma distributions has a setup cost, so the Monte Carlo
/// loop constructs one sampler per arm and reuses it for every draw.
#[derive(Debug, Clone)]
pub struct PosteriorSampler {
    params: PosteriorParams,
    gammas: Option<(Gamma<f64>, Gamma<f64>)>,
}

impl PosteriorSampler {
    /// Sampler for Beta(alpha, beta).
    ///
    /// Non-finite or non-positive parameters produce a sampler that always
    /// returns `0.5`.
    pub fn new(alpha: f64, beta: f64) -> Self {
        let valid = alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0;
        let gammas = if valid {
            match (Gamma::new(alpha, 1.0), Gamma::new(beta, 1.0)) {
                (Ok(x), Ok(y)) => Some((x, y)),
                _ => None,
            }
        } else {
            None
        };
        Self {
            params: PosteriorParams { alpha, beta },
            gammas,
        }
    }

    pub fn from_params(params: PosteriorParams) -> Self {
        Self::new(params.alpha, params.beta)
    }

    pub fn params(&self) -> PosteriorParams {
        self.params
    }

    /// One draw `θ ∈ (0, 1)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let Some((gx, gy)) = &self.gammas else {
            return 0.5;
        };
        let x = gx.sample(rng);
        let y = gy.sample(rng);
        let s = x + y;
        if s > 0.0 && s.is_finite() {
            x / s
        } else {
            // Both draws underflowed; fall back to the posterior mean.
            self.params.mean()
        }
    }
}

/// One draw from Beta(alpha, beta).
///
/// Prefer [`PosteriorSampler`] when drawing repeatedly from the same posterior.
pub fn sample_beta<R: Rng + ?Sized>(alpha: f64, beta: f64, rng: &mut R) -> f64 {
    PosteriorSampler::new(alpha, beta).sample(rng)
}

/// One draw from Gamma(shape, 1).
///
/// Supports any positive (including non-integer) shape. Invalid shapes yield
/// `0.0`.
pub fn sample_gamma<R: Rng + ?Sized>(shape: f64, rng: &mut R) -> f64 {
    if !(shape.is_finite() && shape > 0.0) {
        return 0.0;
    }
    match Gamma::new(shape, 1.0) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.0,
    }
}

/// One draw from an arm's CTR posterior.
pub fn sample_posterior<R: Rng + ?Sized>(variant: &VariantStats, rng: &mut R) -> f64 {
    PosteriorSampler::from_params(variant.posterior()).sample(rng)
}
