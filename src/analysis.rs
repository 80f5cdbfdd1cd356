//! One-shot analysis of an experiment snapshot.
//!
//! [`analyze`] composes the pieces of the crate into a single
//! [`BanditResult`]:
//! 1. validate the configuration (nothing is computed for a bad config),
//! 2. scan the counters for data-quality problems (recorded, never rejected),
//! 3. estimate win probabilities,
//! 4. turn them into an allocation,
//! 5. test the leader against the control arm,
//! 6. map the top win probability to a recommendation.
//!
//! Every fallback taken along the way is recorded as a typed
//! [`AnalysisNote`], so a reporting layer can explain the numbers without
//! re-deriving them.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::significance::pooled_standard_error;
use crate::{
    allocate, estimate_win_probabilities, posterior_means, recommend, two_proportion_z_test,
    Action, EngineConfig, Recommendation, Result, SignificanceResult, VariantStats,
    MIN_SAMPLE_SIZE,
};

/// Audit notes attached to a result.
///
/// Notes are small and typed. Prefer adding variants over changing the
/// meaning of existing ones.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalysisNote {
    /// No arms were supplied; every map is empty.
    NoVariants,

    /// Only one arm was supplied; it wins with probability 1 without
    /// simulation.
    SingleVariant,

    /// An arm has no impressions and samples from the uniform prior.
    UniformPrior { variant: String },

    /// Several arms share an id; their win shares were summed.
    DuplicateId { variant: String },

    /// Upstream data reports more clicks than impressions. Failures were
    /// treated as zero.
    ClicksExceedImpressions {
        variant: String,
        impressions: u64,
        clicks: u64,
    },

    /// Upstream data reports more conversions than clicks. Tolerated.
    ConversionsExceedClicks {
        variant: String,
        clicks: u64,
        conversions: u64,
    },

    /// No arm is marked as control; significance was not tested.
    NoControl,

    /// More than one arm is marked as control; the first one was used.
    MultipleControls { controls: Vec<String> },

    /// The control is the leader; the strongest challenger was tested
    /// against it instead.
    LeaderIsControl { challenger: String },

    /// A tested arm has fewer than [`MIN_SAMPLE_SIZE`] impressions.
    InsufficientSample { variant: String, impressions: u64 },

    /// The pooled standard error was zero; the test result is neutral.
    ZeroStandardError,
}

/// Everything the engine computed for one snapshot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BanditResult {
    /// Probability each arm has the highest CTR. Sums to 1.
    pub win_probability: BTreeMap<String, f64>,
    /// Recommended budget share per arm, in percent. Sums to 100.
    pub allocation: BTreeMap<String, f64>,
    /// Posterior mean CTR per arm.
    pub posterior_mean: BTreeMap<String, f64>,
    /// Arm with the highest win probability (first seen on ties).
    pub leader: Option<String>,
    /// Challenger vs control, when a control and a challenger exist.
    pub significance: Option<SignificanceResult>,
    pub recommendation: Recommendation,
    /// Monte Carlo rounds used.
    pub samples: usize,
    pub notes: Vec<AnalysisNote>,
}

/// Record data-quality problems. Nothing here rejects input.
fn scan_variants(variants: &[VariantStats], notes: &mut Vec<AnalysisNote>) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for v in variants {
        *seen.entry(v.id.as_str()).or_insert(0) += 1;
        if v.impressions == 0 {
            notes.push(AnalysisNote::UniformPrior {
                variant: v.id.clone(),
            });
        }
        if v.clicks_exceed_impressions() {
            tracing::warn!(
                variant = %v.id,
                impressions = v.impressions,
                clicks = v.clicks,
                "clicks exceed impressions"
            );
            notes.push(AnalysisNote::ClicksExceedImpressions {
                variant: v.id.clone(),
                impressions: v.impressions,
                clicks: v.clicks,
            });
        }
        if v.conversions_exceed_clicks() {
            tracing::warn!(
                variant = %v.id,
                clicks = v.clicks,
                conversions = v.conversions,
                "conversions exceed clicks"
            );
            notes.push(AnalysisNote::ConversionsExceedClicks {
                variant: v.id.clone(),
                clicks: v.clicks,
                conversions: v.conversions,
            });
        }
    }
    for (id, n) in seen {
        if n > 1 {
            tracing::warn!(variant = %id, count = n, "duplicate variant id");
            notes.push(AnalysisNote::DuplicateId {
                variant: id.to_string(),
            });
        }
    }
}

/// Highest-probability arm among `candidates`, first seen on ties.
fn best_by_probability<'a>(
    candidates: impl Iterator<Item = &'a VariantStats>,
    win_probability: &BTreeMap<String, f64>,
) -> Option<&'a VariantStats> {
    let mut best: Option<(&VariantStats, f64)> = None;
    for v in candidates {
        let p = win_probability.get(&v.id).copied().unwrap_or(0.0);
        if best.map_or(true, |(_, bp)| p > bp) {
            best = Some((v, p));
        }
    }
    best.map(|(v, _)| v)
}

/// Test the leader (or, if the leader is the control, the strongest
/// challenger) against the control arm.
fn test_against_control(
    variants: &[VariantStats],
    leader: &VariantStats,
    win_probability: &BTreeMap<String, f64>,
    notes: &mut Vec<AnalysisNote>,
) -> Option<SignificanceResult> {
    let controls: Vec<&VariantStats> = variants.iter().filter(|v| v.is_control).collect();
    let Some(&control) = controls.first() else {
        notes.push(AnalysisNote::NoControl);
        return None;
    };
    if controls.len() > 1 {
        tracing::warn!(count = controls.len(), "multiple control arms; using the first");
        notes.push(AnalysisNote::MultipleControls {
            controls: controls.iter().map(|v| v.id.clone()).collect(),
        });
    }

    let challenger = if leader.id != control.id {
        leader
    } else {
        let c = best_by_probability(
            variants.iter().filter(|v| v.id != control.id),
            win_probability,
        )?;
        notes.push(AnalysisNote::LeaderIsControl {
            challenger: c.id.clone(),
        });
        c
    };

    for v in [challenger, control] {
        if v.impressions < MIN_SAMPLE_SIZE {
            notes.push(AnalysisNote::InsufficientSample {
                variant: v.id.clone(),
                impressions: v.impressions,
            });
        }
    }
    if pooled_standard_error(challenger, control).is_none() {
        notes.push(AnalysisNote::ZeroStandardError);
    }
    Some(two_proportion_z_test(challenger, control))
}

/// Analyze one experiment snapshot.
///
/// Stateless: the same inputs and random stream give the same result, and
/// independent experiments can be analyzed concurrently.
///
/// # Errors
///
/// Only invalid configuration is an error (see [`EngineConfig::validate`]);
/// it is reported before any computation.
pub fn analyze<R: Rng + ?Sized>(
    variants: &[VariantStats],
    cfg: &EngineConfig,
    rng: &mut R,
) -> Result<BanditResult> {
    cfg.validate()?;

    let mut notes = Vec::new();
    match variants.len() {
        0 => notes.push(AnalysisNote::NoVariants),
        1 => notes.push(AnalysisNote::SingleVariant),
        _ => {}
    }
    scan_variants(variants, &mut notes);

    let win_probability = estimate_win_probabilities(variants, cfg.samples, rng)?;
    let allocation = allocate(&win_probability, cfg.exploration_rate)?;

    let leader = best_by_probability(variants.iter(), &win_probability);
    let significance = leader
        .and_then(|l| test_against_control(variants, l, &win_probability, &mut notes));
    let recommendation = match leader {
        Some(l) => recommend(win_probability.get(&l.id).copied().unwrap_or(0.0)),
        None => Recommendation {
            action: Action::Continue,
            confidence: 0.0,
        },
    };

    tracing::debug!(
        variants = variants.len(),
        leader = leader.map(|l| l.id.as_str()),
        action = ?recommendation.action,
        confidence = recommendation.confidence,
        "analysis complete"
    );

    Ok(BanditResult {
        win_probability,
        allocation,
        posterior_mean: posterior_means(variants),
        leader: leader.map(|l| l.id.clone()),
        significance,
        recommendation,
        samples: cfg.samples,
        notes,
    })
}

/// [`analyze`] with a `StdRng` seeded from `seed`.
pub fn analyze_seeded(
    variants: &[VariantStats],
    cfg: &EngineConfig,
    seed: u64,
) -> Result<BanditResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    analyze(variants, cfg, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn cfg(samples: usize) -> EngineConfig {
        EngineConfig {
            samples,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn empty_experiment_is_an_empty_result() {
        let r = analyze_seeded(&[], &EngineConfig::default(), 0).unwrap();
        assert!(r.win_probability.is_empty());
        assert!(r.allocation.is_empty());
        assert_eq!(r.leader, None);
        assert_eq!(r.significance, None);
        assert_eq!(r.recommendation.action, Action::Continue);
        assert_eq!(r.notes, vec![AnalysisNote::NoVariants]);
    }

    #[test]
    fn invalid_config_is_rejected_before_computation() {
        let arms = vec![VariantStats::new("a", 10, 1)];
        let bad = EngineConfig {
            exploration_rate: -0.5,
            ..EngineConfig::default()
        };
        assert_eq!(
            analyze_seeded(&arms, &bad, 0),
            Err(Error::InvalidExplorationRate { rate: -0.5 })
        );
        assert_eq!(
            analyze_seeded(&arms, &cfg(0), 0),
            Err(Error::InvalidSamples { samples: 0 })
        );
    }

    #[test]
    fn single_control_arm_has_nothing_to_test() {
        let arms = vec![VariantStats::new("only", 500, 50).control()];
        let r = analyze_seeded(&arms, &cfg(1_000), 0).unwrap();
        assert_eq!(r.win_probability["only"], 1.0);
        assert!((r.allocation["only"] - 100.0).abs() < 1e-9);
        assert_eq!(r.significance, None);
        assert!(r.notes.contains(&AnalysisNote::SingleVariant));
    }

    #[test]
    fn leader_is_tested_against_control() {
        let arms = vec![
            VariantStats::new("control", 10_000, 1_000).control(),
            VariantStats::new("b", 10_000, 1_300),
        ];
        let r = analyze_seeded(&arms, &cfg(5_000), 1).unwrap();
        assert_eq!(r.leader.as_deref(), Some("b"));
        let s = r.significance.unwrap();
        assert_eq!((s.challenger.as_str(), s.control.as_str()), ("b", "control"));
        assert!(s.is_significant);
        assert_eq!(r.recommendation.action, Action::RollOut);
    }

    #[test]
    fn control_leading_tests_strongest_challenger() {
        let arms = vec![
            VariantStats::new("weak", 5_000, 300),
            VariantStats::new("control", 5_000, 600).control(),
            VariantStats::new("mid", 5_000, 450),
        ];
        let r = analyze_seeded(&arms, &cfg(5_000), 2).unwrap();
        assert_eq!(r.leader.as_deref(), Some("control"));
        let s = r.significance.unwrap();
        assert_eq!(s.control, "control");
        assert!(s.z_statistic < 0.0);
        assert!(r.notes.iter().any(|n| matches!(n, AnalysisNote::LeaderIsControl { .. })));
    }

    #[test]
    fn missing_control_skips_significance() {
        let arms = vec![VariantStats::new("a", 100, 10), VariantStats::new("b", 100, 12)];
        let r = analyze_seeded(&arms, &cfg(1_000), 3).unwrap();
        assert_eq!(r.significance, None);
        assert!(r.notes.contains(&AnalysisNote::NoControl));
    }

    #[test]
    fn data_quality_problems_are_noted_not_rejected() {
        let arms = vec![
            VariantStats::new("control", 1_000, 100).control(),
            VariantStats {
                conversions: 50,
                ..VariantStats::new("leaky", 100, 20)
            },
            VariantStats::new("broken", 10, 30),
            VariantStats::new("fresh", 0, 0),
        ];
        let r = analyze_seeded(&arms, &cfg(2_000), 4).unwrap();
        let sum: f64 = r.win_probability.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(r.notes.iter().any(|n| matches!(n, AnalysisNote::ConversionsExceedClicks { variant, .. } if variant == "leaky")));
        assert!(r.notes.iter().any(|n| matches!(n, AnalysisNote::ClicksExceedImpressions { variant, .. } if variant == "broken")));
        assert!(r.notes.contains(&AnalysisNote::UniformPrior {
            variant: "fresh".to_string()
        }));
    }

    #[test]
    fn small_and_degenerate_tests_are_noted() {
        let arms = vec![
            VariantStats::new("control", 50, 0).control(),
            VariantStats::new("b", 60, 0),
        ];
        let r = analyze_seeded(&arms, &cfg(1_000), 5).unwrap();
        assert!(r.notes.contains(&AnalysisNote::ZeroStandardError));
        assert!(r.notes.contains(&AnalysisNote::InsufficientSample {
            variant: "control".to_string(),
            impressions: 50
        }));
        let s = r.significance.unwrap();
        assert_eq!(s.p_value, 1.0);
        assert!(!s.sufficient_sample);
    }

    #[test]
    fn multiple_controls_use_the_first() {
        let arms = vec![
            VariantStats::new("c1", 1_000, 100).control(),
            VariantStats::new("c2", 1_000, 100).control(),
            VariantStats::new("b", 1_000, 200),
        ];
        let r = analyze_seeded(&arms, &cfg(1_000), 6).unwrap();
        assert_eq!(r.significance.unwrap().control, "c1");
        assert!(r.notes.contains(&AnalysisNote::MultipleControls {
            controls: vec!["c1".to_string(), "c2".to_string()]
        }));
    }

    #[test]
    fn seeded_analysis_is_reproducible() {
        let arms = vec![
            VariantStats::new("control", 1_000, 100).control(),
            VariantStats::new("b", 1_000, 120),
        ];
        let a = analyze_seeded(&arms, &EngineConfig::default(), 99).unwrap();
        let b = analyze_seeded(&arms, &EngineConfig::default(), 99).unwrap();
        assert_eq!(a, b);
    }
}
