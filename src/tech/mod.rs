use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt::{Display, Formatter};

use crate::error::{IntSimError, Result};

pub mod nodes;

pub const MIN_TEMPERATURE: u32 = 300;
pub const MAX_TEMPERATURE: u32 = 400;

/// Spacing of the leakage anchors in kelvin.
const ANCHOR_STEP: u32 = 10;

#[derive(Serialize_repr, Deserialize_repr, PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[repr(u32)]
pub enum TechNode {
    N16 = 16,
    N22 = 22,
    N32 = 32,
    N45 = 45,
    N65 = 65,
    N90 = 90,
    N180 = 180,
}

impl TechNode {
    pub const ALL: [TechNode; 7] = [
        TechNode::N16,
        TechNode::N22,
        TechNode::N32,
        TechNode::N45,
        TechNode::N65,
        TechNode::N90,
        TechNode::N180,
    ];

    /// Exact match only; nodes are never interpolated.
    pub fn from_nm(nm: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|node| node.nm() == nm)
            .ok_or(IntSimError::UnsupportedNode(nm))
    }

    #[inline]
    pub fn nm(&self) -> u32 {
        *self as u32
    }

    /// Minimum feature size in meters.
    #[inline]
    pub fn feature_size(&self) -> f64 {
        self.nm() as f64 * 1e-9
    }

    pub fn profile(&self) -> &'static NodeProfile {
        match self {
            TechNode::N16 => &nodes::N16,
            TechNode::N22 => &nodes::N22,
            TechNode::N32 => &nodes::N32,
            TechNode::N45 => &nodes::N45,
            TechNode::N65 => &nodes::N65,
            TechNode::N90 => &nodes::N90,
            TechNode::N180 => &nodes::N180,
        }
    }
}

impl Display for TechNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}nm", self.nm())
    }
}

/// Process constants for one technology node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeProfile {
    /// Nominal supply voltage.
    pub vdd: f64,
    /// Threshold voltage.
    pub vt: f64,
    /// Equivalent oxide thickness in meters.
    pub tox: f64,
    /// Electrical channel length in meters.
    pub l_elec: f64,
    /// NMOS to PMOS saturation current ratio at equal width.
    pub drive_ratio: f64,
    /// Off-current per meter of device width at 300, 310, ..., 400 K.
    pub leakage_anchors: [f64; 11],
}

impl NodeProfile {
    pub fn leakage_table(&self) -> LeakageTable {
        LeakageTable::from_anchors(&self.leakage_anchors)
    }
}

/// Per-degree off-current table covering 300-400 K inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakageTable {
    per_degree: Vec<f64>,
}

impl LeakageTable {
    /// Expands 10 K anchors into a per-degree table by geometric interpolation.
    pub fn from_anchors(anchors: &[f64; 11]) -> Self {
        let span = MAX_TEMPERATURE - MIN_TEMPERATURE;
        let per_degree = (0..=span)
            .map(|offset| {
                let j = (offset / ANCHOR_STEP).min(anchors.len() as u32 - 2);
                let frac = (offset - j * ANCHOR_STEP) as f64 / ANCHOR_STEP as f64;
                let (a, b) = (anchors[j as usize], anchors[j as usize + 1]);
                a * (b / a).powf(frac)
            })
            .collect();
        Self { per_degree }
    }

    /// Off-current per meter of width at `temperature`, rounded to the nearest kelvin.
    pub fn at(&self, temperature: f64) -> Result<f64> {
        let index = Self::index(temperature)?;
        Ok(self.per_degree[index])
    }

    fn index(temperature: f64) -> Result<usize> {
        if !temperature.is_finite()
            || temperature.round() < MIN_TEMPERATURE as f64
            || temperature.round() > MAX_TEMPERATURE as f64
        {
            return Err(IntSimError::TemperatureOutOfRange(temperature));
        }
        Ok(temperature.round() as usize - MIN_TEMPERATURE as usize)
    }

    pub fn len(&self) -> usize {
        self.per_degree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_degree.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.per_degree.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_nm_exact_match() {
        assert_eq!(TechNode::from_nm(45).unwrap(), TechNode::N45);
        assert_eq!(TechNode::from_nm(180).unwrap(), TechNode::N180);
        assert!(matches!(
            TechNode::from_nm(40),
            Err(IntSimError::UnsupportedNode(40))
        ));
        assert!(TechNode::from_nm(0).is_err());
    }

    #[test]
    fn test_leakage_table_hits_anchors() {
        let profile = TechNode::N45.profile();
        let table = profile.leakage_table();
        assert_eq!(table.len(), 101);
        for (i, anchor) in profile.leakage_anchors.iter().enumerate() {
            let t = 300.0 + 10.0 * i as f64;
            assert_relative_eq!(table.at(t).unwrap(), *anchor, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_leakage_table_bounds() {
        let table = TechNode::N22.profile().leakage_table();
        assert!(table.at(300.0).is_ok());
        assert!(table.at(400.0).is_ok());
        assert!(matches!(
            table.at(299.0),
            Err(IntSimError::TemperatureOutOfRange(_))
        ));
        assert!(table.at(401.0).is_err());
        assert!(table.at(f64::NAN).is_err());
    }

    #[test]
    fn test_leakage_monotone_for_all_nodes() {
        for node in TechNode::ALL {
            let table = node.profile().leakage_table();
            let values = table.iter().copied().collect::<Vec<_>>();
            for pair in values.windows(2) {
                assert!(pair[1] >= pair[0], "{node} leakage table is not monotone");
            }
        }
    }
}
