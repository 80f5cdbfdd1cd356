//! Per-arm counters and the Beta posterior derived from them.

/// Observed counters for one experiment arm.
///
/// Counters are supplied fresh on every call; nothing here is owned or
/// mutated by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariantStats {
    /// Stable identifier for the arm.
    pub id: String,
    pub impressions: u64,
    pub clicks: u64,
    /// Expected to satisfy `conversions <= clicks`; not enforced.
    pub conversions: u64,
    /// Monetary spend accumulated by the arm.
    pub spend: f64,
    /// Monetary revenue attributed to the arm.
    pub revenue: f64,
    /// Baseline arm for lift and significance comparisons.
    pub is_control: bool,
}

impl VariantStats {
    /// Arm with the given click counters and no money accounting.
    pub fn new(id: impl Into<String>, impressions: u64, clicks: u64) -> Self {
        Self {
            id: id.into(),
            impressions,
            clicks,
            ..Self::default()
        }
    }

    /// Same arm, marked as the experiment's control.
    #[must_use]
    pub fn control(mut self) -> Self {
        self.is_control = true;
        self
    }

    /// Click-through rate, `0.0` when there are no impressions.
    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64
        }
    }

    /// Conversions per click, `0.0` when there are no clicks.
    pub fn conversion_rate(&self) -> f64 {
        if self.clicks == 0 {
            0.0
        } else {
            self.conversions as f64 / self.clicks as f64
        }
    }

    pub fn cost_per_click(&self) -> Option<f64> {
        (self.clicks > 0 && self.spend.is_finite()).then(|| self.spend / self.clicks as f64)
    }

    /// Revenue divided by spend.
    pub fn return_on_ad_spend(&self) -> Option<f64> {
        (self.spend > 0.0 && self.spend.is_finite() && self.revenue.is_finite())
            .then(|| self.revenue / self.spend)
    }

    /// Relative CTR lift over `control`: `(ctr - ctr_control) / ctr_control`.
    ///
    /// `None` when the control has a zero CTR.
    pub fn relative_lift(&self, control: &VariantStats) -> Option<f64> {
        let base = control.ctr();
        (base > 0.0).then(|| (self.ctr() - base) / base)
    }

    /// Beta posterior over the arm's CTR under a uniform prior.
    pub fn posterior(&self) -> PosteriorParams {
        PosteriorParams::from_counts(self.impressions, self.clicks)
    }

    pub(crate) fn clicks_exceed_impressions(&self) -> bool {
        self.clicks > self.impressions
    }

    pub(crate) fn conversions_exceed_clicks(&self) -> bool {
        self.conversions > self.clicks
    }
}

/// Beta(alpha, beta) posterior parameters.
///
/// Both parameters are always `>= 1`, so the distribution is well defined
/// even with no observations (uniform prior).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PosteriorParams {
    pub alpha: f64,
    pub beta: f64,
}

impl PosteriorParams {
    /// `alpha = clicks + 1`, `beta = (impressions - clicks) + 1`.
    ///
    /// Failures saturate at zero when upstream data reports more clicks than
    /// impressions.
    pub fn from_counts(impressions: u64, clicks: u64) -> Self {
        let failures = impressions.saturating_sub(clicks);
        Self {
            alpha: clicks as f64 + 1.0,
            beta: failures as f64 + 1.0,
        }
    }

    pub fn mean(&self) -> f64 {
        let denom = self.alpha + self.beta;
        if denom <= 0.0 {
            0.5
        } else {
            self.alpha / denom
        }
    }

    pub fn variance(&self) -> f64 {
        let s = self.alpha + self.beta;
        if s <= 0.0 {
            return 0.0;
        }
        (self.alpha * self.beta) / (s * s * (s + 1.0))
    }
}
