use serde::{Deserialize, Serialize};

use crate::power::PowerBreakdown;
use crate::tiers::global::GlobalTier;
use crate::tiers::repeaters::{BandVerdict, RepeaterBand, RepeaterTier};
use crate::tiers::Tier;

/// Working state of one evaluation, moved from stage to stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChipState {
    /// Current total power estimate in W.
    pub estimate: f64,
    pub power: PowerBreakdown,
    /// Power left over for repeaters after logic, wires and clock.
    pub repeater_budget: f64,
    /// Local tier followed by the unrepeated tiers, ascending in pitch.
    pub tiers: Vec<Tier>,
    pub global: Option<GlobalTier>,
    /// Repeated tiers below the global tier, in insertion order.
    pub repeater_tiers: Vec<RepeaterTier>,
    /// Repeated wire bands of this iteration, global band first.
    pub bands: Vec<RepeaterBand>,
    /// Bands from the previous iteration; these block vias on lower tiers.
    pub prev_bands: Vec<RepeaterBand>,
    pub repeaters: f64,
    pub repeater_area: f64,
    pub verdict: Option<BandVerdict>,
}

impl ChipState {
    pub fn new(estimate: f64) -> Self {
        Self {
            estimate,
            ..Default::default()
        }
    }

    /// Shortest wire bucket routed on the global or a repeated tier.
    pub fn repeated_from(&self) -> Option<usize> {
        self.repeater_tiers
            .last()
            .map(|tier| tier.lo)
            .or_else(|| self.global.as_ref().map(|global| global.lo))
    }

    /// Prepares for the next iteration of the power loop.
    pub(crate) fn next_iteration(mut self, estimate: f64) -> Self {
        self.estimate = estimate;
        self.prev_bands = std::mem::take(&mut self.bands);
        self
    }
}
