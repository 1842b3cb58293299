//! Assignment of wire-length buckets to metal tiers.
//!
//! A tier of pitch `p` holds `2 A eff` of wire area, where `eff` is the
//! router efficiency less the area lost to vias passing through the tier.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::TechParams;
use crate::power::ClockTree;
use crate::sizing::GateSizing;
use crate::solve::pitch_for_resistance;
use crate::wld::WireLengthDistribution;

use self::repeaters::RepeaterBand;

pub mod global;
pub mod local;
pub mod repeaters;

/// Elmore coefficient for a distributed RC line.
pub const WIRE_DELAY_COEFF: f64 = 0.4;

/// A pair of metal layers routing wires up to `max_length` gate pitches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub pitch: f64,
    pub max_length: usize,
    pub efficiency: f64,
}

/// Read-only inputs shared by every tier stage.
pub struct Context<'a> {
    pub params: &'a TechParams,
    pub wld: &'a WireLengthDistribution,
    pub sizing: &'a GateSizing,
    pub clock: &'a ClockTree,
    /// Side of a gate socket in m.
    pub gate_pitch: f64,
}

impl<'a> Context<'a> {
    pub fn new(
        params: &'a TechParams,
        wld: &'a WireLengthDistribution,
        sizing: &'a GateSizing,
        clock: &'a ClockTree,
    ) -> Self {
        Self {
            params,
            wld,
            sizing,
            clock,
            gate_pitch: sizing.gate_pitch(params),
        }
    }

    #[inline]
    pub fn lmax(&self) -> usize {
        self.wld.lmax()
    }

    /// Wire area of buckets `lo..=hi` routed at `pitch`.
    pub fn wire_area(&self, lo: usize, hi: usize, pitch: f64) -> f64 {
        self.wld.length_between(lo, hi) * self.params.chi * self.gate_pitch * pitch
    }

    /// Routable area of a tier with efficiency `eff`.
    #[inline]
    pub fn capacity(&self, eff: f64) -> f64 {
        2.0 * self.params.design.die_area * eff
    }

    /// Fraction of a tier at `pitch` lost to vias of wires starting at bucket `first`.
    ///
    /// Each wire and each repeater of the previous iteration drops two vias;
    /// power and ground stacks add two per `ground_via_pitch` square.
    pub fn via_blockage(&self, first: usize, pitch: f64, prev_bands: &[RepeaterBand]) -> f64 {
        let d = &self.params.design;
        let wires = self.wld.count_between(first, self.lmax());
        let repeaters: f64 = prev_bands
            .iter()
            .map(|band| {
                if band.lo >= first {
                    band.count
                } else if band.hi >= first {
                    band.count * self.wld.length_between(first, band.hi)
                        / self.wld.length_between(band.lo, band.hi)
                } else {
                    0.0
                }
            })
            .sum();
        let vias = 2.0 * wires + 2.0 * repeaters + 2.0 * d.die_area / d.ground_via_pitch.powi(2);
        vias * pitch * pitch / d.die_area
    }

    /// Unrepeated delay of the longest wire in bucket `l` at `pitch`.
    pub fn wire_delay(&self, l: usize, pitch: f64) -> f64 {
        let len = l as f64 * self.gate_pitch;
        WIRE_DELAY_COEFF * self.params.r_per_len(pitch) * self.params.c_wire * len * len
    }

    #[inline]
    pub fn delay_ok(&self, l: usize, pitch: f64) -> bool {
        self.wire_delay(l, pitch) <= self.params.max_wire_delay()
    }

    /// Smallest pitch no finer than `floor` at which bucket `l` meets the wire delay budget.
    pub fn delay_pitch(&self, l: usize, floor: f64) -> Result<f64> {
        if self.delay_ok(l, floor) {
            return Ok(floor);
        }
        let len = l as f64 * self.gate_pitch;
        let r_need =
            self.params.max_wire_delay() / (WIRE_DELAY_COEFF * self.params.c_wire * len * len);
        Ok(pitch_for_resistance(self.params, r_need, floor)?.max(floor))
    }

    /// Checks whether a tier after bucket `last` can route up to bucket `l`.
    ///
    /// With `fixed` the tier keeps pitch `floor` and must meet the delay
    /// budget as is; otherwise the pitch widens until it does.
    pub fn tier_fit(
        &self,
        last: usize,
        l: usize,
        floor: f64,
        fixed: bool,
        prev_bands: &[RepeaterBand],
    ) -> Result<Option<Tier>> {
        let pitch = if fixed {
            if !self.delay_ok(l, floor) {
                return Ok(None);
            }
            floor
        } else {
            self.delay_pitch(l, floor)?
        };
        let efficiency =
            self.params.design.router_efficiency - self.via_blockage(last + 1, pitch, prev_bands);
        if self.wire_area(last + 1, l, pitch) > self.capacity(efficiency) {
            return Ok(None);
        }
        Ok(Some(Tier {
            pitch,
            max_length: l,
            efficiency,
        }))
    }

    /// Longest tier after bucket `last`, or `None` if not even bucket `last + 1` fits.
    ///
    /// Feasibility is monotone in the tier's longest bucket, so bisection finds it.
    pub fn longest_fit(
        &self,
        last: usize,
        floor: f64,
        fixed: bool,
        prev_bands: &[RepeaterBand],
    ) -> Result<Option<Tier>> {
        let (mut lo, mut hi) = (last + 1, self.lmax());
        if self.tier_fit(last, lo, floor, fixed, prev_bands)?.is_none() {
            return Ok(None);
        }
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if self.tier_fit(last, mid, floor, fixed, prev_bands)?.is_some() {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        self.tier_fit(last, lo, floor, fixed, prev_bands)
    }

    /// Smallest bucket `lo` such that buckets `lo..=hi` fit in `capacity` at `pitch`.
    ///
    /// Bucket `hi` is always included, even when it overflows on its own.
    pub fn shortest_fit(&self, hi: usize, pitch: f64, capacity: f64) -> usize {
        if self.wire_area(hi, hi, pitch) > capacity {
            return hi;
        }
        let (mut lo, mut top) = (1, hi);
        while lo < top {
            let mid = (lo + top) / 2;
            if self.wire_area(mid, hi, pitch) <= capacity {
                top = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }
}
