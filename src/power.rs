use serde::{Deserialize, Serialize};

use crate::chip::ChipState;
use crate::params::TechParams;
use crate::tiers::Context;

/// Power components in watts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerBreakdown {
    pub logic_dynamic: f64,
    pub logic_leakage: f64,
    pub wire_dynamic: f64,
    pub clock_dynamic: f64,
    pub repeater_dynamic: f64,
    pub repeater_leakage: f64,
}

impl PowerBreakdown {
    /// Switching power of logic, clock and repeaters.
    pub fn dynamic(&self) -> f64 {
        self.logic_dynamic + self.clock_dynamic + self.repeater_dynamic
    }

    pub fn wire(&self) -> f64 {
        self.wire_dynamic
    }

    pub fn leakage(&self) -> f64 {
        self.logic_leakage + self.repeater_leakage
    }

    pub fn total(&self) -> f64 {
        self.dynamic() + self.wire() + self.leakage()
    }

    /// Everything except repeaters.
    pub fn baseline(&self) -> f64 {
        self.logic_dynamic + self.logic_leakage + self.wire_dynamic + self.clock_dynamic
    }

    pub(crate) fn scale_dynamic(&mut self, factor: f64) {
        self.logic_dynamic *= factor;
        self.wire_dynamic *= factor;
        self.clock_dynamic *= factor;
        self.repeater_dynamic *= factor;
    }

    pub(crate) fn scale_leakage(&mut self, factor: f64) {
        self.logic_leakage *= factor;
        self.repeater_leakage *= factor;
    }
}

/// Buffered H-tree clock network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockTree {
    pub latches: f64,
    pub buffers: f64,
    /// Wire from buffers to latches in m.
    pub local_wire: f64,
    /// H-tree wire feeding the buffers in m.
    pub global_wire: f64,
    /// Switched capacitance per cycle.
    pub capacitance: f64,
}

impl ClockTree {
    pub fn new(params: &TechParams, width: usize) -> Self {
        let d = &params.design;
        let w = width as f64;
        let latches = d.ngates * d.latch_ratio;
        let buffers = latches / d.latches_per_buffer;
        let local_wire = (d.die_area * latches).sqrt();
        let global_wire = 1.5 * (d.die_area * buffers).sqrt();

        let latch_cap = latches * 2.0 * params.co * w;
        let wire_cap = (local_wire + global_wire) * params.c_wire;
        // Buffers are sized for a fan-out of four into their latches.
        let buffer_cap = buffers * (d.latches_per_buffer * 2.0 * w / 4.0) * 2.0 * params.co;

        Self {
            latches,
            buffers,
            local_wire,
            global_wire,
            capacitance: latch_cap + wire_cap + buffer_cap,
        }
    }

    pub fn power(&self, params: &TechParams) -> f64 {
        self.capacitance * params.vdd.powi(2) * params.design.frequency
    }
}

/// Computes logic, wire and clock power for the current estimate and
/// leaves the remainder as the repeater budget.
pub fn baseline(ctx: &Context, mut chip: ChipState) -> ChipState {
    let p = ctx.params;
    let d = &p.design;
    let w = ctx.sizing.width as f64;
    let v2f = p.vdd.powi(2) * d.frequency;

    chip.power.logic_dynamic = d.activity * d.ngates * (d.fanout + 1.0) * p.co * w * v2f;
    chip.power.logic_leakage = d.ngates * p.ileak * p.w_unit * w * p.vdd;
    chip.power.wire_dynamic =
        d.activity * ctx.wld.total_length() * p.chi * ctx.gate_pitch * p.c_wire * v2f;
    chip.power.clock_dynamic = ctx.clock.power(p);

    chip.repeater_budget = chip.estimate - chip.power.baseline();
    log::debug!(
        "baseline power {:.3} W, repeater budget {:.3} W",
        chip.power.baseline(),
        chip.repeater_budget
    );
    chip
}
