//! Two-proportion Z-test on click-through rates.
//!
//! Frequentist companion to the Bayesian win probabilities: it answers
//! whether the observed CTR gap between two arms is larger than sampling
//! noise would explain at the fixed 5% level.

use crate::VariantStats;

/// Two-sided significance level. Fixed, not configurable.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Impressions below which a side is reported as an insufficient sample.
pub const MIN_SAMPLE_SIZE: u64 = 100;

/// Outcome of comparing a challenger arm against a baseline arm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignificanceResult {
    /// Arm on the `a` side of the test.
    pub challenger: String,
    /// Arm on the `b` side of the test.
    pub control: String,
    /// `(ctr_a - ctr_b) / SE`; positive when the challenger leads.
    pub z_statistic: f64,
    /// Two-sided p-value in `[0, 1]`.
    pub p_value: f64,
    /// `p_value < SIGNIFICANCE_LEVEL`.
    pub is_significant: bool,
    /// Both sides have at least [`MIN_SAMPLE_SIZE`] impressions.
    pub sufficient_sample: bool,
}

/// Complementary error function (Abramowitz & Stegun 7.1.26, |ε| ≤ 1.5e-7).
fn erfc(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A: [f64; 5] = [
        0.254_829_592,
        -0.284_496_736,
        1.421_413_741,
        -1.453_152_027,
        1.061_405_429,
    ];
    let ax = x.abs();
    let t = 1.0 / (1.0 + P * ax);
    let poly = t * (A[0] + t * (A[1] + t * (A[2] + t * (A[3] + t * A[4]))));
    let tail = poly * (-ax * ax).exp();
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

/// Standard normal CDF `Φ(x)`.
pub fn normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    (0.5 * erfc(-x / std::f64::consts::SQRT_2)).clamp(0.0, 1.0)
}

/// Two-sided p-value for a standard normal statistic: `2 (1 - Φ(|z|))`.
pub fn two_sided_p_value(z: f64) -> f64 {
    if !z.is_finite() {
        return if z.is_nan() { 1.0 } else { 0.0 };
    }
    // erfc(|z|/√2) == 2 (1 - Φ(|z|)), without cancellation in the tail.
    erfc(z.abs() / std::f64::consts::SQRT_2).clamp(0.0, 1.0)
}

/// CTR with clicks clamped to impressions, so bad upstream data cannot push
/// a rate past 1.
fn clamped_ctr(v: &VariantStats) -> f64 {
    if v.impressions == 0 {
        0.0
    } else {
        v.clicks.min(v.impressions) as f64 / v.impressions as f64
    }
}

/// Pooled standard error of the CTR difference, `None` when it is zero or
/// undefined.
pub(crate) fn pooled_standard_error(a: &VariantStats, b: &VariantStats) -> Option<f64> {
    if a.impressions == 0 || b.impressions == 0 {
        return None;
    }
    let (n1, n2) = (a.impressions as f64, b.impressions as f64);
    let x1 = a.clicks.min(a.impressions) as f64;
    let x2 = b.clicks.min(b.impressions) as f64;
    let pooled = (x1 + x2) / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    (se > 0.0 && se.is_finite()).then_some(se)
}

/// Two-proportion Z-test of `a`'s CTR against `b`'s CTR using the pooled
/// standard error.
///
/// A zero (or undefined) standard error, which happens when neither side has
/// clicks, every impression clicked, or a side has no impressions, yields the
/// neutral result `z = 0, p = 1, not significant`. The numeric result is
/// returned even for small samples; `sufficient_sample` flags them.
pub fn two_proportion_z_test(a: &VariantStats, b: &VariantStats) -> SignificanceResult {
    let sufficient_sample = a.impressions >= MIN_SAMPLE_SIZE && b.impressions >= MIN_SAMPLE_SIZE;
    let neutral = SignificanceResult {
        challenger: a.id.clone(),
        control: b.id.clone(),
        z_statistic: 0.0,
        p_value: 1.0,
        is_significant: false,
        sufficient_sample,
    };
    let Some(se) = pooled_standard_error(a, b) else {
        return neutral;
    };

    let z = (clamped_ctr(a) - clamped_ctr(b)) / se;
    let p_value = two_sided_p_value(z);
    SignificanceResult {
        z_statistic: z,
        p_value,
        is_significant: p_value < SIGNIFICANCE_LEVEL,
        ..neutral
    }
}
