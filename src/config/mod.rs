use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{IntSimError, Result as IntSimResult};
use crate::params::DesignParams;
use crate::tech::TechNode;
use crate::Result;

/// Transistors per logic gate when deriving the gate count.
pub const TRANSISTORS_PER_GATE: f64 = 4.0;

/// Named attributes of a module or a technology. Zero means unset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub node: f64,
    pub area: f64,
    pub temperature: f64,
    pub transistors: f64,
    pub frequency: f64,
    pub voltage: f64,
    pub threshold: f64,
    pub depth: f64,
    pub activity: f64,

    pub pad_pitch: f64,
    pub router_efficiency: f64,
    pub repeater_efficiency: f64,
    pub fanout: f64,
    pub max_tier: f64,
    pub latches_per_buffer: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Base name of the output files.
    pub name: Option<String>,
    pub module: Attributes,
    pub technology: Attributes,
}

pub fn parse_config(path: impl AsRef<Path>) -> Result<SimConfig> {
    let contents = fs::read_to_string(path)?;
    let data = toml::from_str(&contents)?;
    Ok(data)
}

/// The technology value wins unless it is zero; then the module value, if set.
fn override_value(technology: f64, module: f64) -> Option<f64> {
    [technology, module].into_iter().find(|&v| v != 0.0)
}

impl SimConfig {
    /// Merges the two attribute sets onto the built-in defaults.
    pub fn resolve(&self) -> IntSimResult<(TechNode, DesignParams)> {
        let (t, m) = (&self.technology, &self.module);
        let pick = |field: fn(&Attributes) -> f64| override_value(field(t), field(m));

        let nm = pick(|a| a.node).ok_or_else(|| IntSimError::invalid("node", "no node given"))?;
        if nm.fract() != 0.0 || nm < 0.0 || nm > u32::MAX as f64 {
            return Err(IntSimError::invalid(
                "node",
                format!("expected an integer size in nm, got {nm}"),
            ));
        }
        let node = TechNode::from_nm(nm as u32)?;

        let mut design = DesignParams::default();
        if let Some(transistors) = pick(|a| a.transistors) {
            design.ngates = transistors / TRANSISTORS_PER_GATE;
        }
        if let Some(v) = pick(|a| a.area) {
            design.die_area = v;
        }
        if let Some(v) = pick(|a| a.temperature) {
            design.temperature = v;
        }
        if let Some(v) = pick(|a| a.frequency) {
            design.frequency = v;
        }
        if let Some(v) = pick(|a| a.depth) {
            design.critical_path_depth = v;
        }
        if let Some(v) = pick(|a| a.activity) {
            design.activity = v;
        }
        design.supply_voltage = pick(|a| a.voltage);
        design.threshold_voltage = pick(|a| a.threshold);

        if let Some(v) = pick(|a| a.pad_pitch) {
            design.pad_pitch = v;
        }
        if let Some(v) = pick(|a| a.router_efficiency) {
            design.router_efficiency = v;
        }
        if let Some(v) = pick(|a| a.repeater_efficiency) {
            design.repeater_efficiency = v;
        }
        if let Some(v) = pick(|a| a.fanout) {
            design.fanout = v;
        }
        if let Some(v) = pick(|a| a.max_tier) {
            if v.fract() != 0.0 || v < 0.0 {
                return Err(IntSimError::invalid(
                    "max_tier",
                    format!("expected a whole number of tiers, got {v}"),
                ));
            }
            design.max_tier = v as usize;
        }
        if let Some(v) = pick(|a| a.latches_per_buffer) {
            design.latches_per_buffer = v;
        }

        Ok((node, design))
    }

    pub fn name(&self, node: TechNode) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("intsim_{}nm", node.nm()))
    }
}
