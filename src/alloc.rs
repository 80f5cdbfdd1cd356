//! Budget allocation from win probabilities.
//!
//! Each arm gets `p·(1 − ε) + ε/K` before normalization, so every arm keeps a
//! floor of `100·ε/K` percent even when its win probability is 0. That floor
//! is what keeps under-sampled arms from starving.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Default exploration rate.
pub const DEFAULT_EXPLORATION_RATE: f64 = 0.2;

pub(crate) fn check_exploration_rate(rate: f64) -> Result<()> {
    if rate.is_finite() && (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(Error::InvalidExplorationRate { rate })
    }
}

/// Convert win probabilities into a percentage split summing to 100.
///
/// - `exploration_rate = 0`: allocation tracks win probability exactly.
/// - `exploration_rate = 1`: uniform split.
/// - Negative or non-finite probabilities count as 0.
/// - If nothing carries weight (e.g. all probabilities 0 with no
///   exploration), falls back to a uniform split.
/// - Empty input returns an empty map.
///
/// # Errors
///
/// [`Error::InvalidExplorationRate`] unless `exploration_rate` is finite and
/// in `[0, 1]`.
pub fn allocate(
    win_probabilities: &BTreeMap<String, f64>,
    exploration_rate: f64,
) -> Result<BTreeMap<String, f64>> {
    check_exploration_rate(exploration_rate)?;
    if win_probabilities.is_empty() {
        return Ok(BTreeMap::new());
    }

    let k = win_probabilities.len() as f64;
    let floor = exploration_rate / k;
    let mut raw: BTreeMap<String, f64> = BTreeMap::new();
    let mut total = 0.0;
    for (id, &p) in win_probabilities {
        let p = if p.is_finite() && p > 0.0 { p } else { 0.0 };
        let w = p * (1.0 - exploration_rate) + floor;
        total += w;
        raw.insert(id.clone(), w);
    }

    if total <= 0.0 || !total.is_finite() {
        tracing::warn!(arms = win_probabilities.len(), "no allocation weight; splitting uniformly");
        return Ok(win_probabilities
            .keys()
            .map(|id| (id.clone(), 100.0 / k))
            .collect());
    }

    for w in raw.values_mut() {
        *w = 100.0 * *w / total;
    }
    Ok(raw)
}
