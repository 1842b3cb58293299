use std::collections::HashMap;
use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tera::{Context, Value};

use crate::chip::ChipState;
use crate::error::Result;
use crate::params::DesignParams;
use crate::power::PowerBreakdown;
use crate::synth::{Convergence, Synthesis, UnitEnergy};
use crate::tech::TechNode;
use crate::tiers::global::GlobalTier;
use crate::tiers::repeaters::BandVerdict;
use crate::TEMPLATES;

pub const REPORT_TEMPLATE: &str = "report.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierKind {
    Local,
    Repeated,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    pub kind: TierKind,
    pub pitch: f64,
    /// Shortest and longest bucket on the tier, in gate pitches.
    pub min_length: usize,
    pub max_length: usize,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaBreakdown {
    pub logic: f64,
    pub repeater: f64,
    pub available: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub node: TechNode,
    pub design: DesignParams,
    pub vdd: f64,
    pub vt: f64,
    pub gate_width: usize,
    pub max_frequency: f64,
    pub pgates: f64,
    pub gate_pitch: f64,
    pub lmax: usize,
    pub wires: f64,
    pub tiers: Vec<TierSummary>,
    pub global: Option<GlobalTier>,
    pub repeaters: f64,
    pub verdict: Option<BandVerdict>,
    pub area: AreaBreakdown,
    pub power: PowerBreakdown,
    pub total_power: f64,
    pub energy: UnitEnergy,
    pub iterations: usize,
    pub convergence: Convergence,
}

/// Merges unrepeated and repeated tiers into one list ascending by pitch.
///
/// Unrepeated tiers are cut off where repeated wiring begins. The order is by
/// pitch alone, so a global tier narrower than the widest unrepeated tiers sorts
/// between them rather than on top of the stack.
pub fn merge_tiers(chip: &ChipState) -> Vec<TierSummary> {
    let cutoff = chip.repeated_from();

    let mut start = 1;
    let mut local = Vec::with_capacity(chip.tiers.len());
    for tier in &chip.tiers {
        let min_length = start;
        start = start.max(tier.max_length + 1);
        let max_length = match cutoff {
            Some(cutoff) if min_length >= cutoff => break,
            Some(cutoff) => tier.max_length.min(cutoff - 1),
            None => tier.max_length,
        };
        local.push(TierSummary {
            kind: TierKind::Local,
            pitch: tier.pitch,
            min_length,
            max_length,
            efficiency: tier.efficiency,
        });
    }

    let global = chip.global.iter().map(|global| TierSummary {
        kind: TierKind::Global,
        pitch: global.pitch,
        min_length: global.lo,
        max_length: chip
            .bands
            .first()
            .map(|band| band.hi)
            .or_else(|| chip.tiers.last().map(|tier| tier.max_length))
            .unwrap_or(global.lo),
        efficiency: global.efficiency,
    });
    let repeated = global
        .chain(chip.repeater_tiers.iter().map(|tier| TierSummary {
            kind: TierKind::Repeated,
            pitch: tier.pitch,
            min_length: tier.lo,
            max_length: tier.hi,
            efficiency: tier.efficiency,
        }))
        .collect::<Vec<_>>();

    local
        .into_iter()
        .merge_by(repeated.into_iter().rev(), |a, b| a.pitch <= b.pitch)
        .collect()
}

impl Synthesis {
    pub fn report(&self) -> Report {
        let logic = self.logic_area();
        let repeater = self.chip.repeater_area;
        Report {
            node: self.params.node,
            design: self.params.design.clone(),
            vdd: self.params.vdd,
            vt: self.params.vt,
            gate_width: self.sizing.width,
            max_frequency: self.sizing.max_frequency,
            pgates: self.sizing.pgates,
            gate_pitch: self.gate_pitch,
            lmax: self.wld.lmax(),
            wires: self.wld.total_count(),
            tiers: merge_tiers(&self.chip),
            global: self.chip.global,
            repeaters: self.chip.repeaters,
            verdict: self.chip.verdict,
            area: AreaBreakdown {
                logic,
                repeater,
                available: self.available_area(),
                total: self.total_area(),
            },
            power: self.chip.power,
            total_power: self.total_power(),
            energy: self.unit_energy(),
            iterations: self.iterations,
            convergence: self.convergence,
        }
    }
}

pub fn render_report(report: &Report) -> Result<String> {
    Ok(TEMPLATES.render(REPORT_TEMPLATE, &Context::from_serialize(report)?)?)
}

pub fn save_report(path: impl AsRef<Path>, report: &Report) -> Result<()> {
    write_file(path, render_report(report)?)
}

pub fn save_json(path: impl AsRef<Path>, report: &Report) -> Result<()> {
    write_file(path, serde_json::to_string_pretty(report)?)
}

fn write_file(path: impl AsRef<Path>, contents: String) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Tera filter printing a number in scientific notation with `digits` decimals.
pub(crate) fn sci(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let x = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg(format!("`sci` expects a number, got {value}")))?;
    let digits = args.get("digits").and_then(Value::as_u64).unwrap_or(3) as usize;
    Ok(Value::String(format!("{x:.digits$e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::repeaters::{RepeaterBand, RepeaterTier};
    use crate::tiers::Tier;

    fn tier(pitch: f64, max_length: usize) -> Tier {
        Tier {
            pitch,
            max_length,
            efficiency: 0.4,
        }
    }

    fn repeater_tier(pitch: f64, lo: usize, hi: usize) -> RepeaterTier {
        RepeaterTier {
            pitch,
            lo,
            hi,
            efficiency: 0.35,
            repeaters: 1e3,
            size: 100.0,
            spacing: 1e-4,
        }
    }

    fn sample_chip() -> ChipState {
        let mut chip = ChipState::new(100.0);
        chip.tiers = vec![
            tier(0.9e-7, 277),
            tier(2.1e-7, 1299),
            tier(3.9e-7, 2641),
            tier(6.0e-7, 4157),
            tier(8.2e-7, 5824),
            tier(1.07e-6, 7660),
            tier(1.34e-6, 9728),
            tier(4.36e-6, 32365),
        ];
        chip.global = Some(GlobalTier {
            pitch: 1.75e-6,
            lo: 16658,
            efficiency: 0.14,
            ir_pitch: 3.8e-7,
            clock_pitch: 1.75e-6,
            clock_factor: 1.0,
            clock_fraction: 0.05,
        });
        chip.bands = vec![RepeaterBand {
            lo: 16658,
            hi: 32365,
            count: 1e5,
        }];
        chip.repeater_tiers = vec![
            repeater_tier(1.55e-6, 12247, 16657),
            repeater_tier(1.15e-6, 9292, 12246),
            repeater_tier(8.8e-7, 6914, 9291),
        ];
        chip
    }

    #[test]
    fn test_merge_is_ascending_by_pitch() {
        let merged = merge_tiers(&sample_chip());
        for pair in merged.windows(2) {
            assert!(pair[0].pitch <= pair[1].pitch);
        }
        assert_eq!(merged.last().unwrap().kind, TierKind::Global);
        assert_eq!(merged.last().unwrap().max_length, 32365);
        assert_eq!(
            merged.iter().filter(|t| t.kind == TierKind::Repeated).count(),
            3
        );
    }

    #[test]
    fn test_merge_truncates_local_tiers() {
        let merged = merge_tiers(&sample_chip());
        let local = merged
            .iter()
            .filter(|t| t.kind == TierKind::Local)
            .collect::<Vec<_>>();
        assert_eq!(local.len(), 6);
        assert_eq!(local[0].min_length, 1);
        assert_eq!(local[1].min_length, 278);
        assert_eq!(local[5].min_length, 5825);
        assert_eq!(local[5].max_length, 6913);
    }

    #[test]
    fn test_merge_without_repeaters() {
        let mut chip = sample_chip();
        chip.global = None;
        chip.bands.clear();
        chip.repeater_tiers.clear();
        let merged = merge_tiers(&chip);
        assert_eq!(merged.len(), 8);
        assert!(merged.iter().all(|t| t.kind == TierKind::Local));
    }

    #[test]
    fn test_merge_with_unrepeated_global() {
        let mut chip = sample_chip();
        chip.bands.clear();
        chip.repeater_tiers.clear();
        let merged = merge_tiers(&chip);
        let global = merged.last().unwrap();
        assert_eq!(global.kind, TierKind::Global);
        assert_eq!(global.min_length, 16658);
        assert_eq!(global.max_length, 32365);
    }

    #[test]
    fn test_merge_places_narrow_global_by_pitch() {
        let mut chip = sample_chip();
        chip.repeater_tiers.clear();
        if let Some(global) = chip.global.as_mut() {
            global.pitch = 1.0e-6;
        }
        let merged = merge_tiers(&chip);
        let at = merged
            .iter()
            .position(|t| t.kind == TierKind::Global)
            .unwrap();
        assert_eq!(merged[at - 1].pitch, 8.2e-7);
        assert_eq!(merged[at + 1].pitch, 1.07e-6);
        for pair in merged.windows(2) {
            assert!(pair[0].pitch <= pair[1].pitch);
        }
    }

    #[test]
    fn test_sci_filter() {
        let mut args = HashMap::new();
        let out = sci(&Value::from(1234.0), &args).unwrap();
        assert_eq!(out, Value::String("1.234e3".to_string()));
        args.insert("digits".to_string(), Value::from(1));
        let out = sci(&Value::from(0.00025), &args).unwrap();
        assert_eq!(out, Value::String("2.5e-4".to_string()));
        assert!(sci(&Value::from("x"), &args).is_err());
    }
}
