use serde::{Deserialize, Serialize};

use crate::error::{IntSimError, Result};
use crate::params::TechParams;
use crate::wld::average_length;

pub const MAX_GATE_WIDTH: usize = 40;

/// Outcome of gate sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateSizing {
    /// Gate width in unit transistors.
    pub width: usize,
    /// Fastest clock the critical path supports at this width.
    pub max_frequency: f64,
    /// Fraction of the die covered by logic gates.
    pub pgates: f64,
}

impl GateSizing {
    /// Number of gate sockets on the die.
    pub fn nsockets(&self, params: &TechParams) -> f64 {
        params.design.ngates / self.pgates
    }

    /// Side of one gate socket in m.
    pub fn gate_pitch(&self, params: &TechParams) -> f64 {
        (params.design.die_area / self.nsockets(params)).sqrt()
    }
}

/// Critical path limited clock frequency for gates of width `w`.
///
/// Returns `None` when gates this wide do not fit on the die.
pub fn max_frequency(params: &TechParams, w: usize) -> Option<f64> {
    let d = &params.design;
    let a_gate = params.gate_area(w);
    let pgates = d.ngates * a_gate / d.die_area;
    if pgates > 1.0 {
        return None;
    }

    let l_avg = average_length(d.die_area / a_gate, d.rent_p);
    let c_wire_gate = params.chi * d.fanout * l_avg * a_gate.sqrt() * params.c_wire;

    // NAND2: two series pull-down devices, one pull-up.
    let wf = w as f64;
    let r_pd = 2.0 * params.ro / wf;
    let r_pu = params.ro * params.drive_ratio / (d.pmos_ratio * wf);
    let c_load = (d.fanout + 1.0) * params.co * wf + c_wire_gate;
    let tau = 0.7 * 0.5 * (r_pd + r_pu) * c_load;

    Some(1.0 / (d.critical_path_depth * (1.0 + d.delay_margin) * tau))
}

/// Picks the narrowest gate that meets the target frequency.
pub fn size_gates(params: &TechParams) -> Result<GateSizing> {
    let target = params.design.frequency;
    let mut best = 0.0_f64;

    for width in 1..=MAX_GATE_WIDTH {
        let Some(fmax) = max_frequency(params, width) else {
            continue;
        };
        best = best.max(fmax);
        if fmax >= target {
            let pgates = params.design.ngates * params.gate_area(width) / params.design.die_area;
            log::info!(
                "gate width {width} reaches {:.3} GHz, logic covers {:.1}% of the die",
                fmax / 1e9,
                100.0 * pgates
            );
            return Ok(GateSizing {
                width,
                max_frequency: fmax,
                pgates,
            });
        }
    }

    Err(IntSimError::FrequencyUnreachable { target, best })
}
