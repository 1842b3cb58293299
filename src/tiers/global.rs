use serde::{Deserialize, Serialize};

use super::{Context, WIRE_DELAY_COEFF};
use crate::chip::ChipState;
use crate::error::Result;
use crate::solve::{fixed_point, pitch_for_resistance};

pub const MIN_CLOCK_FACTOR: f64 = 0.35;
pub const MAX_CLOCK_FACTOR: f64 = 1.0;

/// Topmost tier carrying power, ground, clock and the longest signal wires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalTier {
    pub pitch: f64,
    /// Shortest bucket routed on the global tier; the longest is always `lmax`.
    pub lo: usize,
    /// Signal wiring efficiency after power, clock and vias.
    pub efficiency: f64,
    /// Pitch required by the IR drop limit.
    pub ir_pitch: f64,
    /// Pitch required by the clock slew limit.
    pub clock_pitch: f64,
    pub clock_factor: f64,
    /// Share of the tier taken by the clock H-tree.
    pub clock_fraction: f64,
}

/// Fraction of the slew budget the clock spine may use, given its RC
/// delay `rc` at the IR-limited pitch.
pub fn clock_factor(rc: f64, slew_budget: f64) -> f64 {
    (rc / slew_budget).clamp(MIN_CLOCK_FACTOR, MAX_CLOCK_FACTOR)
}

/// Sizes the global tier for the current power estimate.
pub fn global_interconnect(ctx: &Context, mut chip: ChipState) -> Result<ChipState> {
    let p = ctx.params;
    let d = &p.design;
    let min_pitch = p.min_pitch();

    let current_density = chip.estimate / (p.vdd * d.die_area);
    let drop = d.ir_drop_fraction * p.vdd;
    let ir_pitch = fixed_point("power grid pitch", min_pitch, |x| {
        current_density * d.pad_pitch.powi(2) * p.resistivity(x)
            / (2.0 * d.aspect_ratio * d.power_track_fraction * drop)
    })?
    .max(min_pitch);

    let spine = d.die_area.sqrt() / 2.0;
    let slew_budget = d.slew_threshold * p.period();
    let rc = WIRE_DELAY_COEFF * p.r_per_len(ir_pitch) * p.c_wire * spine * spine;
    let cf = clock_factor(rc, slew_budget);
    let r_need = cf * slew_budget / (WIRE_DELAY_COEFF * p.c_wire * spine * spine);
    let clock_pitch = pitch_for_resistance(p, r_need, ir_pitch)?;

    let pitch = ir_pitch.max(clock_pitch);
    let clock_fraction = ctx.clock.global_wire * pitch / (2.0 * d.die_area);
    let efficiency = d.router_efficiency
        - d.power_track_fraction
        - clock_fraction
        - ctx.via_blockage(ctx.lmax(), pitch, &chip.prev_bands);
    let lo = ctx.shortest_fit(ctx.lmax(), pitch, ctx.capacity(efficiency));

    log::debug!(
        "global tier pitch {pitch:.3e} m (IR {ir_pitch:.3e}, clock {clock_pitch:.3e}), routes buckets {lo}..={}",
        ctx.lmax()
    );

    chip.global = Some(GlobalTier {
        pitch,
        lo,
        efficiency,
        ir_pitch,
        clock_pitch,
        clock_factor: cf,
        clock_fraction,
    });
    Ok(chip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::tests::Fixture;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_factor_clamps() {
        assert_eq!(clock_factor(0.0, 1.0), MIN_CLOCK_FACTOR);
        assert_eq!(clock_factor(0.1, 1.0), MIN_CLOCK_FACTOR);
        assert_eq!(clock_factor(0.5, 1.0), 0.5);
        assert_eq!(clock_factor(3.0, 1.0), MAX_CLOCK_FACTOR);
    }

    #[test]
    fn test_global_tier_reference() {
        let fx = Fixture::reference();
        let ctx = fx.ctx();
        let chip = global_interconnect(&ctx, ChipState::new(121.0876)).unwrap();
        let global = chip.global.unwrap();
        assert_eq!(global.clock_factor, 1.0);
        assert!(global.clock_pitch > global.ir_pitch);
        assert_relative_eq!(global.pitch, 1.7513e-6, max_relative = 1e-3);
        assert!(global.lo > 1 && global.lo <= ctx.lmax());
        assert!(ctx.wire_area(global.lo, ctx.lmax(), global.pitch) <= ctx.capacity(global.efficiency));
    }

    #[test]
    fn test_ir_pitch_grows_with_power() {
        let fx = Fixture::reference();
        let ctx = fx.ctx();
        let low = global_interconnect(&ctx, ChipState::new(50.0)).unwrap();
        let high = global_interconnect(&ctx, ChipState::new(500.0)).unwrap();
        assert!(high.global.unwrap().ir_pitch > low.global.unwrap().ir_pitch);
    }
}
