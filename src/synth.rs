use serde::{Deserialize, Serialize};

use crate::chip::ChipState;
use crate::error::{IntSimError, Result};
use crate::params::TechParams;
use crate::power::{baseline, ClockTree};
use crate::sizing::{size_gates, GateSizing};
use crate::tiers::global::global_interconnect;
use crate::tiers::local::{local_interconnect, no_repeaters, NoRepeaterOutcome};
use crate::tiers::repeaters::insert_repeaters;
use crate::tiers::Context;
use crate::wld::WireLengthDistribution;

/// Initial total power estimate in W.
pub const INITIAL_ESTIMATE: f64 = 120.0;
/// The loop stops once estimate and computed total agree this closely, in W.
pub const POWER_TOLERANCE: f64 = 0.5;
pub const MAX_POWER_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    Converged,
    /// The tier ceiling was hit before all wires were routed; figures are partial.
    TierCeiling,
    /// The power loop ran out of iterations.
    IterationLimit,
}

/// Energy per clock cycle in J.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitEnergy {
    pub read: f64,
    pub write: f64,
    pub leakage: f64,
}

/// Result of one interconnect synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub params: TechParams,
    pub sizing: GateSizing,
    pub wld: WireLengthDistribution,
    pub clock: ClockTree,
    pub gate_pitch: f64,
    pub chip: ChipState,
    /// Power estimate of the last iteration.
    pub estimate: f64,
    pub iterations: usize,
    pub convergence: Convergence,
}

impl Synthesis {
    pub fn run(params: &TechParams) -> Result<Self> {
        let d = &params.design;
        let sizing = size_gates(params)?;
        let wld = WireLengthDistribution::generate(
            d.ngates,
            sizing.nsockets(params),
            d.rent_k,
            d.rent_p,
            d.fanout,
        )?;
        let clock = ClockTree::new(params, sizing.width);
        let ctx = Context::new(params, &wld, &sizing, &clock);
        let gate_pitch = ctx.gate_pitch;

        let (chip, iterations, convergence) = power_loop(&ctx)?;

        Ok(Self {
            params: params.clone(),
            sizing,
            estimate: chip.estimate,
            wld,
            clock,
            gate_pitch,
            chip,
            iterations,
            convergence,
        })
    }

    #[inline]
    pub fn converged(&self) -> bool {
        self.convergence == Convergence::Converged
    }

    pub fn total_power(&self) -> f64 {
        self.chip.power.total()
    }

    /// Per-cycle energies for the calling simulator.
    pub fn unit_energy(&self) -> UnitEnergy {
        let f = self.params.design.frequency;
        let power = &self.chip.power;
        let switching = (power.dynamic() + power.wire()) / f;
        UnitEnergy {
            read: switching,
            write: switching,
            leakage: power.leakage() / f,
        }
    }

    pub fn total_area(&self) -> f64 {
        self.params.design.die_area
    }

    pub fn logic_area(&self) -> f64 {
        self.params.design.ngates * self.params.gate_area(self.sizing.width)
    }

    pub fn available_area(&self) -> f64 {
        self.total_area() - self.logic_area() - self.chip.repeater_area
    }

    /// Rescales the result for a changed operating point without re-deriving pitches.
    ///
    /// Recognized names are `frequency`, `temperature` and `voltage`; anything
    /// else is ignored with a warning.
    pub fn update(&mut self, name: &str, value: f64) -> Result<()> {
        if matches!(name, "frequency" | "voltage") && !(value.is_finite() && value > 0.0) {
            return Err(IntSimError::invalid(
                "update",
                format!("{name} must be positive, got {value}"),
            ));
        }
        match name {
            "frequency" => {
                let old = self.params.design.frequency;
                self.chip.power.scale_dynamic(value / old);
                self.params.design.frequency = value;
            }
            "temperature" => {
                let ileak = self.params.leakage_at(value)?;
                self.chip.power.scale_leakage(ileak / self.params.ileak);
                self.params.ileak = ileak;
                self.params.design.temperature = value;
            }
            "voltage" => {
                if value <= self.params.vt {
                    return Err(IntSimError::invalid(
                        "update",
                        format!("need vdd > vt, got vdd = {value}, vt = {}", self.params.vt),
                    ));
                }
                let ratio = value / self.params.vdd;
                self.chip.power.scale_dynamic(ratio * ratio);
                self.chip.power.scale_leakage(ratio);
                self.params.vdd = value;
                self.params.design.supply_voltage = Some(value);
            }
            _ => log::warn!("ignoring update of unknown parameter `{name}`"),
        }
        Ok(())
    }
}

fn power_loop(ctx: &Context) -> Result<(ChipState, usize, Convergence)> {
    let mut chip = ChipState::new(INITIAL_ESTIMATE);

    for iteration in 1..=MAX_POWER_ITERATIONS {
        chip = baseline(ctx, chip);
        chip = local_interconnect(ctx, chip)?;
        let (next, outcome) = no_repeaters(ctx, chip)?;
        chip = next;
        if outcome == NoRepeaterOutcome::TierCeiling {
            log::error!(
                "tier ceiling of {} reached in iteration {iteration}; returning partial result",
                ctx.params.design.max_tier
            );
            return Ok((chip, iteration, Convergence::TierCeiling));
        }
        chip = global_interconnect(ctx, chip)?;
        chip = insert_repeaters(ctx, chip)?;

        let total = chip.power.total();
        log::debug!(
            "iteration {iteration}: estimate {:.3} W, total {total:.3} W",
            chip.estimate
        );
        if (chip.estimate - total).abs() <= POWER_TOLERANCE {
            log::info!("power converged to {total:.3} W after {iteration} iterations");
            return Ok((chip, iteration, Convergence::Converged));
        }
        let estimate = (chip.estimate + total) / 2.0;
        chip = chip.next_iteration(estimate);
    }

    log::warn!("power loop did not converge within {MAX_POWER_ITERATIONS} iterations");
    Ok((chip, MAX_POWER_ITERATIONS, Convergence::IterationLimit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DesignParams;
    use crate::tech::TechNode;
    use approx::assert_relative_eq;

    fn defaults() -> Synthesis {
        let params = TechParams::setup(TechNode::N45, DesignParams::default()).unwrap();
        Synthesis::run(&params).unwrap()
    }

    #[test]
    fn test_defaults_converge() {
        let synth = defaults();
        assert!(synth.converged());
        assert_eq!(synth.sizing.width, 1);
        assert!(synth.iterations > 1 && synth.iterations < MAX_POWER_ITERATIONS);
        assert_relative_eq!(synth.total_power(), 32.16, max_relative = 0.01);
        assert!((synth.estimate - synth.total_power()).abs() <= POWER_TOLERANCE);
    }

    #[test]
    fn test_unit_energy() {
        let synth = defaults();
        let energy = synth.unit_energy();
        assert_eq!(energy.read, energy.write);
        let per_cycle = synth.total_power() / synth.params.design.frequency;
        assert_relative_eq!(energy.read + energy.leakage, per_cycle, max_relative = 1e-12);
        assert_eq!(synth.total_area(), 35e-6);
    }

    #[test]
    fn test_update_frequency_rescales_dynamic() {
        let mut synth = defaults();
        let before = synth.chip.power;
        synth.update("frequency", 2e9).unwrap();
        let after = synth.chip.power;
        assert_relative_eq!(after.dynamic(), 2.0 * before.dynamic(), max_relative = 1e-12);
        assert_relative_eq!(after.wire(), 2.0 * before.wire(), max_relative = 1e-12);
        assert_eq!(after.leakage(), before.leakage());
    }

    #[test]
    fn test_update_voltage() {
        let mut synth = defaults();
        let before = synth.chip.power;
        synth.update("voltage", 0.5).unwrap();
        let after = synth.chip.power;
        assert_relative_eq!(after.dynamic(), 0.25 * before.dynamic(), max_relative = 1e-12);
        assert_relative_eq!(after.leakage(), 0.5 * before.leakage(), max_relative = 1e-12);
    }

    #[test]
    fn test_update_voltage_below_threshold() {
        let mut synth = defaults();
        let before = synth.clone();
        let vt = synth.params.vt;
        assert!(synth.update("voltage", vt).is_err());
        assert!(synth.update("voltage", 0.5 * vt).is_err());
        assert_eq!(synth, before);
    }

    #[test]
    fn test_update_temperature() {
        let mut synth = defaults();
        let before = synth.chip.power;
        synth.update("temperature", 350.0).unwrap();
        assert!(synth.chip.power.leakage() > before.leakage());
        assert_eq!(synth.chip.power.dynamic(), before.dynamic());
        assert!(synth.update("temperature", 500.0).is_err());
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut synth = defaults();
        let before = synth.clone();
        synth.update("flux_capacitance", 1.21).unwrap();
        assert_eq!(synth, before);
    }
}
