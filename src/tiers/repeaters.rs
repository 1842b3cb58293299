use serde::{Deserialize, Serialize};

use super::Context;
use crate::chip::ChipState;
use crate::error::{IntSimError, Result};
use crate::solve::pitch_for_resistance;

/// Delay of an optimally repeated line is `2.5 sqrt(ro co r c)` per unit length.
pub const REPEATED_DELAY_COEFF: f64 = 2.5;

/// Why repeater insertion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandVerdict {
    /// Every bucket below the global tier carries repeaters.
    Exhausted,
    /// The power budget is spent.
    RejectedPower,
    /// Repeaters would not fit in the area left over by logic.
    RejectedArea,
    /// The band would need a pitch below the minimum.
    RejectedPitch,
    /// The optimal repeater would be smaller than a unit inverter.
    RejectedSize,
    /// The band's wires are shorter than the optimal repeater spacing.
    RejectedSpacing,
    TierCeiling,
}

/// Wires of buckets `lo..=hi` and the repeaters they carry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepeaterBand {
    pub lo: usize,
    pub hi: usize,
    pub count: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepeaterTier {
    pub pitch: f64,
    pub lo: usize,
    pub hi: usize,
    pub efficiency: f64,
    pub repeaters: f64,
    /// Repeater size in unit inverters.
    pub size: f64,
    /// Distance between repeaters in m.
    pub spacing: f64,
}

/// Optimal repeater spacing and size at `pitch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeaterSizing {
    pub spacing: f64,
    pub size: f64,
}

impl RepeaterSizing {
    pub fn at(ctx: &Context, pitch: f64) -> Self {
        let p = ctx.params;
        let r = p.r_per_len(pitch);
        Self {
            spacing: (2.0 * p.ro * p.co / (r * p.c_wire)).sqrt(),
            size: (p.ro * p.c_wire / (r * p.co)).sqrt(),
        }
    }
}

/// Repeater count, area and power of one band.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BandCost {
    count: f64,
    area: f64,
    dynamic: f64,
    leakage: f64,
}

impl BandCost {
    fn new(ctx: &Context, lo: usize, hi: usize, sizing: RepeaterSizing) -> Self {
        let p = ctx.params;
        let d = &p.design;
        let count = ctx.wld.length_between(lo, hi) * p.chi * ctx.gate_pitch / sizing.spacing;
        let units = count * sizing.size;
        Self {
            count,
            area: units * d.inverter_area * p.feature_size.powi(2),
            dynamic: d.activity * units * 2.0 * p.co * p.vdd.powi(2) * d.frequency,
            leakage: units * p.ileak * p.w_unit * (1.0 + d.pmos_ratio) / 2.0 * p.vdd,
        }
    }

    fn charge(&self, chip: &mut ChipState, lo: usize, hi: usize) {
        chip.repeaters += self.count;
        chip.repeater_area += self.area;
        chip.power.repeater_dynamic += self.dynamic;
        chip.power.repeater_leakage += self.leakage;
        chip.repeater_budget -= self.dynamic + self.leakage;
        chip.bands.push(RepeaterBand {
            lo,
            hi,
            count: self.count,
        });
    }
}

/// Repeats the global wires, then successively shorter bands until one is rejected.
pub fn insert_repeaters(ctx: &Context, mut chip: ChipState) -> Result<ChipState> {
    let p = ctx.params;
    let d = &p.design;
    let lmax = ctx.lmax();
    let global = chip
        .global
        .ok_or_else(|| IntSimError::invalid("global", "global tier must be sized first"))?;
    let available = d.die_area - d.ngates * p.gate_area(ctx.sizing.width);

    chip.repeaters = 0.0;
    chip.repeater_area = 0.0;
    chip.power.repeater_dynamic = 0.0;
    chip.power.repeater_leakage = 0.0;
    chip.repeater_tiers.clear();
    chip.bands.clear();

    // Global wires are repeated first, regardless of the power budget.
    let sizing = RepeaterSizing::at(ctx, global.pitch);
    let cost = BandCost::new(ctx, global.lo, lmax, sizing);
    let verdict = if cost.area > available {
        BandVerdict::RejectedArea
    } else {
        cost.charge(&mut chip, global.lo, lmax);
        repeat_bands(ctx, &mut chip, global.pitch, global.lo - 1, available)?
    };

    log::debug!(
        "{} repeater tiers, {:.3e} repeaters, stopped with {verdict:?}",
        chip.repeater_tiers.len(),
        chip.repeaters
    );
    chip.verdict = Some(verdict);
    Ok(chip)
}

/// Repeats successively shorter bands ending at `hi` until one is rejected.
fn repeat_bands(
    ctx: &Context,
    chip: &mut ChipState,
    global_pitch: f64,
    mut hi: usize,
    available: f64,
) -> Result<BandVerdict> {
    let p = ctx.params;
    let d = &p.design;
    let verdict = loop {
        if hi < 1 {
            break BandVerdict::Exhausted;
        }
        if chip.repeater_budget <= 0.0 {
            break BandVerdict::RejectedPower;
        }
        if available - chip.repeater_area <= 0.0 {
            break BandVerdict::RejectedArea;
        }
        if 1 + chip.repeater_tiers.len() >= d.max_tier {
            break BandVerdict::TierCeiling;
        }

        // Pitch at which the longest wire of the band meets the delay budget when repeated.
        let per_len = p.max_wire_delay() / (hi as f64 * ctx.gate_pitch);
        let r_need = (per_len / REPEATED_DELAY_COEFF).powi(2) / (p.ro * p.co * p.c_wire);
        let pitch = pitch_for_resistance(p, r_need, global_pitch)?;
        if pitch < p.min_pitch() {
            break BandVerdict::RejectedPitch;
        }
        let sizing = RepeaterSizing::at(ctx, pitch);
        if sizing.size < 1.0 {
            break BandVerdict::RejectedSize;
        }

        let efficiency = d.repeater_efficiency - ctx.via_blockage(hi + 1, pitch, &chip.prev_bands);
        let lo = ctx.shortest_fit(hi, pitch, ctx.capacity(efficiency));
        if lo as f64 * ctx.gate_pitch <= sizing.spacing {
            break BandVerdict::RejectedSpacing;
        }

        let cost = BandCost::new(ctx, lo, hi, sizing);
        if chip.repeater_area + cost.area > available {
            break BandVerdict::RejectedArea;
        }

        cost.charge(chip, lo, hi);
        chip.repeater_tiers.push(RepeaterTier {
            pitch,
            lo,
            hi,
            efficiency,
            repeaters: cost.count,
            size: sizing.size,
            spacing: sizing.spacing,
        });
        hi = lo - 1;
    };
    Ok(verdict)
}
