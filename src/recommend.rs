//! Qualitative action from the leader's win probability.
//!
//! The thresholds are fixed heuristics. Boundary values fall in the lower
//! bracket: exactly 0.95 is `ShiftBudget`, exactly 0.80 is `Continue`.

/// Above this win probability the leader should be rolled out.
pub const ROLL_OUT_THRESHOLD: f64 = 0.95;

/// Above this win probability budget should shift toward the leader.
pub const SHIFT_BUDGET_THRESHOLD: f64 = 0.80;

/// What the caller should do with the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Action {
    /// Stop the experiment and send all traffic to the leader.
    RollOut,
    /// Keep testing, but move budget toward the leader.
    ShiftBudget,
    /// Not enough evidence yet.
    Continue,
}

/// Action plus the confidence that triggered it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recommendation {
    pub action: Action,
    /// The win probability the action was derived from.
    pub confidence: f64,
}

/// Map the maximum win probability to an [`Action`].
///
/// Non-finite input is treated as no evidence (`Continue`, confidence 0).
pub fn recommend(max_win_probability: f64) -> Recommendation {
    if !max_win_probability.is_finite() {
        return Recommendation {
            action: Action::Continue,
            confidence: 0.0,
        };
    }
    let action = if max_win_probability > ROLL_OUT_THRESHOLD {
        Action::RollOut
    } else if max_win_probability > SHIFT_BUDGET_THRESHOLD {
        Action::ShiftBudget
    } else {
        Action::Continue
    };
    Recommendation {
        action,
        confidence: max_win_probability,
    }
}
