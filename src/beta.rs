//! Beta density and the Gamma function it is built on.
//!
//! Everything is evaluated in log space and exponentiated only at the end:
//! `Γ(α)` overflows `f64` once `α` passes ~171, which a posterior reaches
//! after a few hundred clicks.

use std::f64::consts::PI;

/// Lanczos coefficients for g = 7, n = 9.
#[allow(clippy::excessive_precision)]
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

const LANCZOS_G: f64 = 7.0;

/// Lanczos series `A_g(x)` for the shifted argument `x = z - 1`.
fn lanczos_sum(x: f64) -> f64 {
    let mut acc = LANCZOS[0];
    for (i, &c) in LANCZOS[1..].iter().enumerate() {
        acc += c / (x + i as f64 + 1.0);
    }
    acc
}

fn is_pole(z: f64) -> bool {
    z <= 0.0 && z.fract() == 0.0
}

/// `ln |Γ(z)|`.
///
/// Uses the reflection formula for `z < 0.5`. Returns `+∞` at the poles
/// (non-positive integers) and `NaN` for `NaN` input.
pub fn ln_gamma(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if is_pole(z) {
        return f64::INFINITY;
    }
    if z < 0.5 {
        // ln|Γ(z)| = ln π - ln|sin(πz)| - ln Γ(1 - z)
        let s = (PI * z).sin().abs();
        return PI.ln() - s.ln() - ln_gamma(1.0 - z);
    }
    let x = z - 1.0;
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + lanczos_sum(x).ln()
}

/// `Γ(z)`.
///
/// Direct evaluation overflows to `+∞` for `z > ~171.6`; use [`ln_gamma`] for
/// anything derived from impression counts. Returns `NaN` at the poles.
pub fn gamma(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if is_pole(z) {
        return f64::NAN;
    }
    if z < 0.5 {
        return PI / ((PI * z).sin() * gamma(1.0 - z));
    }
    ln_gamma(z).exp()
}

/// `ln B(a, b) = ln Γ(a) + ln Γ(b) - ln Γ(a + b)`.
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Log density of Beta(alpha, beta) at `x`.
///
/// `-∞` outside the open interval `(0, 1)` or for invalid parameters.
pub fn ln_beta_pdf(x: f64, alpha: f64, beta: f64) -> f64 {
    if !(x > 0.0 && x < 1.0) || !(alpha > 0.0 && beta > 0.0) {
        return f64::NEG_INFINITY;
    }
    if !(alpha.is_finite() && beta.is_finite()) {
        return f64::NEG_INFINITY;
    }
    (alpha - 1.0) * x.ln() + (beta - 1.0) * (-x).ln_1p() - ln_beta(alpha, beta)
}

/// Density of Beta(alpha, beta) at `x`.
///
/// Returns `0.0` at or beyond the boundary of `(0, 1)` so callers can probe a
/// fixed grid without special-casing the endpoints. Invalid parameters
/// (`alpha <= 0` or `beta <= 0`) also yield `0.0`.
pub fn beta_pdf(x: f64, alpha: f64, beta: f64) -> f64 {
    let ln_p = ln_beta_pdf(x, alpha, beta);
    if ln_p == f64::NEG_INFINITY {
        return 0.0;
    }
    let p = ln_p.exp();
    if p.is_finite() {
        p
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Composite Simpson's rule over `[lo, hi]` with `n` (even) intervals.
    fn simpson(lo: f64, hi: f64, n: usize, f: impl Fn(f64) -> f64) -> f64 {
        let h = (hi - lo) / n as f64;
        let mut acc = f(lo) + f(hi);
        for i in 1..n {
            let w = if i % 2 == 1 { 4.0 } else { 2.0 };
            acc += w * f(lo + i as f64 * h);
        }
        acc * h / 3.0
    }

    #[test]
    fn ln_gamma_matches_known_values() {
        assert!(ln_gamma(1.0).abs() < 1e-12);
        assert!(ln_gamma(2.0).abs() < 1e-12);
        // Γ(0.5) = √π
        assert!((ln_gamma(0.5) - PI.sqrt().ln()).abs() < 1e-12);
        // Γ(5) = 24, Γ(10) = 362880
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(10.0) - 362_880f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn gamma_matches_factorials_and_reflection() {
        assert!((gamma(6.0) - 120.0).abs() < 1e-9);
        assert!((gamma(0.5) - PI.sqrt()).abs() < 1e-12);
        // Γ(-0.5) = -2√π
        assert!((gamma(-0.5) + 2.0 * PI.sqrt()).abs() < 1e-10);
        // Γ(0.25) ≈ 3.6256099082
        assert!((gamma(0.25) - 3.625_609_908_2).abs() < 1e-9);
        assert!(gamma(0.0).is_nan());
        assert!(gamma(-3.0).is_nan());
    }

    #[test]
    fn ln_gamma_stays_finite_for_large_arguments() {
        // Stirling: ln Γ(z) ≈ (z - 0.5) ln z - z + 0.5 ln 2π
        for &z in &[1.0e3_f64, 1.0e5, 1.0e6 + 1.0] {
            let stirling = (z - 0.5) * z.ln() - z + 0.5 * (2.0 * PI).ln() + 1.0 / (12.0 * z);
            let got = ln_gamma(z);
            assert!(got.is_finite());
            assert!((got - stirling).abs() / stirling < 1e-12, "z={z} got={got}");
        }
        assert!(gamma(200.0).is_infinite());
    }

    #[test]
    fn uniform_density_is_one() {
        for &x in &[0.001, 0.25, 0.5, 0.999] {
            assert!((beta_pdf(x, 1.0, 1.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn density_is_zero_outside_open_interval() {
        for &x in &[0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert_eq!(beta_pdf(x, 2.0, 3.0), 0.0);
        }
        assert_eq!(beta_pdf(0.5, 0.0, 1.0), 0.0);
        assert_eq!(beta_pdf(0.5, 1.0, -2.0), 0.0);
    }

    #[test]
    fn density_matches_closed_form() {
        // Beta(2, 3): 12 x (1 - x)^2
        let x = 0.3;
        assert!((beta_pdf(x, 2.0, 3.0) - 12.0 * x * (1.0 - x) * (1.0 - x)).abs() < 1e-10);
    }

    #[test]
    fn density_integrates_to_one() {
        for &(a, b) in &[(1.0, 1.0), (2.0, 5.0), (5.0, 2.0), (30.5, 12.25), (121.0, 881.0)] {
            let area = simpson(0.0, 1.0, 20_000, |x| beta_pdf(x, a, b));
            assert!((area - 1.0).abs() < 1e-3, "alpha={a} beta={b} area={area}");
        }
    }

    #[test]
    fn density_integrates_to_one_at_million_impressions() {
        // 1e6 impressions, 3% CTR: the mass sits in a band a few 1e-4 wide.
        let (a, b): (f64, f64) = (30_001.0, 970_001.0);
        let mean = a / (a + b);
        let sd = (a * b / ((a + b).powi(2) * (a + b + 1.0))).sqrt();
        let area = simpson(mean - 12.0 * sd, mean + 12.0 * sd, 4_000, |x| beta_pdf(x, a, b));
        assert!((area - 1.0).abs() < 1e-3, "area={area}");
        assert!(beta_pdf(mean, a, b).is_finite());
    }

    proptest! {
        #[test]
        fn density_is_finite_and_non_negative(
            x in 0.0f64..1.0,
            a in 1.0f64..1.0e6,
            b in 1.0f64..1.0e6,
        ) {
            let p = beta_pdf(x, a, b);
            prop_assert!(p.is_finite());
            prop_assert!(p >= 0.0);
        }
    }
}
