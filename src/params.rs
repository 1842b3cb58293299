use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{IntSimError, Result};
use crate::tech::{LeakageTable, TechNode};

/// Vacuum permittivity in F/m.
pub const EPS0: f64 = 8.854187817e-12;
/// Carrier saturation velocity in m/s.
pub const VSAT: f64 = 1e5;
/// Low-field carrier mobility in m^2/(V s).
pub const MOBILITY: f64 = 0.03;

/// Inputs to an interconnect synthesis run.
///
/// Every field has a default so that callers only set what they know.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default, derive(Debug))]
#[serde(default)]
pub struct DesignParams {
    /// Number of logic gates.
    pub ngates: f64,
    /// Rent's rule coefficient.
    pub rent_k: f64,
    /// Rent's rule exponent.
    pub rent_p: f64,
    /// Average gate fan-out.
    pub fanout: f64,
    /// Switching activity factor.
    pub activity: f64,
    /// Target clock frequency in Hz.
    pub frequency: f64,
    /// Number of gates on the critical path.
    pub critical_path_depth: f64,
    /// Die area in m^2.
    pub die_area: f64,
    /// Operating temperature in kelvin.
    pub temperature: f64,
    /// Overrides the node's nominal supply voltage.
    #[builder(setter(strip_option))]
    pub supply_voltage: Option<f64>,
    /// Overrides the node's threshold voltage.
    #[builder(setter(strip_option))]
    pub threshold_voltage: Option<f64>,

    /// Bulk wire resistivity in ohm m.
    pub resistivity: f64,
    /// Relative permittivity of the inter-layer dielectric.
    pub permittivity: f64,
    /// Wire thickness over width.
    pub aspect_ratio: f64,
    pub mean_free_path: f64,
    pub specularity: f64,
    pub reflectivity: f64,

    pub router_efficiency: f64,
    pub repeater_efficiency: f64,
    /// Maximum number of wiring tiers.
    pub max_tier: usize,
    /// Power pad pitch in m.
    pub pad_pitch: f64,
    pub ir_drop_fraction: f64,
    /// Share of the global tier given to power and ground.
    pub power_track_fraction: f64,

    pub latch_ratio: f64,
    pub latches_per_buffer: f64,
    /// Allowed clock slew as a fraction of the period.
    pub slew_threshold: f64,
    pub delay_margin: f64,
    /// Allowed wire delay as a fraction of the period.
    pub wire_delay_fraction: f64,

    /// Gate area is `(gate_area_base + gate_area_per_width * w) F^2`.
    pub gate_area_base: f64,
    pub gate_area_per_width: f64,
    /// Repeater area per unit size in F^2.
    pub inverter_area: f64,
    pub pmos_ratio: f64,
    /// Unit transistor width in multiples of F.
    pub unit_width_ratio: f64,
    /// Pitch of power/ground via stacks in m.
    pub ground_via_pitch: f64,
}

impl DesignParams {
    #[inline]
    pub fn builder() -> DesignParamsBuilder {
        DesignParamsBuilder::default()
    }
}

impl Default for DesignParams {
    fn default() -> Self {
        Self {
            ngates: 58e6,
            rent_k: 4.0,
            rent_p: 0.6,
            fanout: 4.0,
            activity: 0.1,
            frequency: 1e9,
            critical_path_depth: 10.0,
            die_area: 35e-6,
            temperature: 300.0,
            supply_voltage: None,
            threshold_voltage: None,
            resistivity: 2.2e-8,
            permittivity: 2.5,
            aspect_ratio: 2.0,
            mean_free_path: 39e-9,
            specularity: 0.0,
            reflectivity: 0.3,
            router_efficiency: 0.5,
            repeater_efficiency: 0.4,
            max_tier: 20,
            pad_pitch: 400e-6,
            ir_drop_fraction: 0.05,
            power_track_fraction: 0.2,
            latch_ratio: 0.05,
            latches_per_buffer: 16.0,
            slew_threshold: 0.1,
            delay_margin: 0.2,
            wire_delay_fraction: 0.25,
            gate_area_base: 30.0,
            gate_area_per_width: 12.0,
            inverter_area: 12.0,
            pmos_ratio: 2.0,
            unit_width_ratio: 1.0,
            ground_via_pitch: 10e-6,
        }
    }
}

/// Design parameters plus everything derived from them and the node tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechParams {
    pub node: TechNode,
    pub design: DesignParams,
    leakage: LeakageTable,

    /// Minimum feature size in m.
    pub feature_size: f64,
    pub vdd: f64,
    pub vt: f64,
    pub tox: f64,
    pub l_elec: f64,
    pub drive_ratio: f64,
    /// Off-current per meter of width at the operating temperature.
    pub ileak: f64,

    /// Gate oxide capacitance per unit area.
    pub cox: f64,
    /// Saturation current per meter of width.
    pub idsat: f64,
    /// Unit transistor width in m.
    pub w_unit: f64,
    /// Output resistance of a unit inverter.
    pub ro: f64,
    /// Input capacitance of a unit inverter.
    pub co: f64,

    /// Ground and coupling capacitance per length from the Sakurai fits.
    pub c_ground: f64,
    pub c_coupling: f64,
    /// Total wire capacitance per length.
    pub c_wire: f64,
    /// Point-to-point to net length correction.
    pub chi: f64,
}

impl TechParams {
    pub fn setup(node: TechNode, design: DesignParams) -> Result<Self> {
        validate(&design)?;

        let profile = node.profile();
        let vdd = design.supply_voltage.unwrap_or(profile.vdd);
        let vt = design.threshold_voltage.unwrap_or(profile.vt);
        if !(vt > 0.0 && vdd > vt) {
            return Err(IntSimError::invalid(
                "supply_voltage",
                format!("need vdd > vt > 0, got vdd = {vdd}, vt = {vt}"),
            ));
        }

        let leakage = profile.leakage_table();
        let ileak = leakage.at(design.temperature)?;

        let f = node.feature_size();
        let cox = 3.9 * EPS0 / profile.tox;
        let esat_l = 2.0 * VSAT * profile.l_elec / MOBILITY;
        let vov = vdd - vt;
        let idsat = cox * VSAT * vov * vov / (vov + esat_l);

        let w_unit = design.unit_width_ratio * f;
        let ro = 0.75 * vdd / (idsat * w_unit);
        let co = cox * profile.l_elec * w_unit * (1.0 + design.pmos_ratio);

        // All wire dimensions scale with pitch, so the capacitance per length does not.
        let eps = EPS0 * design.permittivity;
        let w_h = 1.0 / design.aspect_ratio;
        let t_h = 1.0_f64;
        let s_h = 1.0 / design.aspect_ratio;
        let c_ground = eps * (1.15 * w_h + 2.8 * t_h.powf(0.222));
        let c_coupling =
            eps * (0.03 * w_h + 0.83 * t_h - 0.07 * t_h.powf(0.222)) * s_h.powf(-1.34);
        let c_wire = 2.0 * (c_ground + c_coupling);

        let chi = 4.0 / (design.fanout + 3.0);

        Ok(Self {
            node,
            leakage,
            feature_size: f,
            vdd,
            vt,
            tox: profile.tox,
            l_elec: profile.l_elec,
            drive_ratio: profile.drive_ratio,
            ileak,
            cox,
            idsat,
            w_unit,
            ro,
            co,
            c_ground,
            c_coupling,
            c_wire,
            chi,
            design,
        })
    }

    /// Effective resistivity at `pitch` including surface and grain-boundary scattering.
    pub fn resistivity(&self, pitch: f64) -> f64 {
        let d = &self.design;
        let w = pitch / 2.0;
        let surface =
            0.375 * d.mean_free_path * (1.0 - d.specularity) * (1.0 + 1.0 / d.aspect_ratio) / w;
        let grain = 1.5 * d.mean_free_path * d.reflectivity / ((1.0 - d.reflectivity) * w);
        d.resistivity * (1.0 + surface + grain)
    }

    /// Resistance per unit length of a wire at `pitch`.
    pub fn r_per_len(&self, pitch: f64) -> f64 {
        let w = pitch / 2.0;
        self.resistivity(pitch) / (self.design.aspect_ratio * w * w)
    }

    #[inline]
    pub fn min_pitch(&self) -> f64 {
        2.0 * self.feature_size
    }

    /// Area of a logic gate of width `w` in m^2.
    #[inline]
    pub fn gate_area(&self, w: usize) -> f64 {
        let d = &self.design;
        (d.gate_area_base + d.gate_area_per_width * w as f64) * self.feature_size.powi(2)
    }

    /// Longest wire delay a signal may spend in the interconnect.
    #[inline]
    pub fn max_wire_delay(&self) -> f64 {
        self.design.wire_delay_fraction / self.design.frequency
    }

    #[inline]
    pub fn period(&self) -> f64 {
        1.0 / self.design.frequency
    }

    /// Off-current per meter of width at `temperature`.
    pub fn leakage_at(&self, temperature: f64) -> Result<f64> {
        self.leakage.at(temperature)
    }
}

fn validate(d: &DesignParams) -> Result<()> {
    let positive = [
        ("ngates", d.ngates),
        ("rent_k", d.rent_k),
        ("fanout", d.fanout),
        ("activity", d.activity),
        ("frequency", d.frequency),
        ("critical_path_depth", d.critical_path_depth),
        ("die_area", d.die_area),
        ("resistivity", d.resistivity),
        ("permittivity", d.permittivity),
        ("aspect_ratio", d.aspect_ratio),
        ("pad_pitch", d.pad_pitch),
        ("latch_ratio", d.latch_ratio),
        ("gate_area_base", d.gate_area_base),
        ("gate_area_per_width", d.gate_area_per_width),
        ("inverter_area", d.inverter_area),
        ("pmos_ratio", d.pmos_ratio),
        ("unit_width_ratio", d.unit_width_ratio),
        ("ground_via_pitch", d.ground_via_pitch),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(IntSimError::invalid(
                name,
                format!("must be positive and finite, got {value}"),
            ));
        }
    }

    let fractions = [
        ("router_efficiency", d.router_efficiency),
        ("repeater_efficiency", d.repeater_efficiency),
        ("ir_drop_fraction", d.ir_drop_fraction),
        ("power_track_fraction", d.power_track_fraction),
        ("slew_threshold", d.slew_threshold),
        ("wire_delay_fraction", d.wire_delay_fraction),
    ];
    for (name, value) in fractions {
        if !(value > 0.0 && value <= 1.0) {
            return Err(IntSimError::invalid(
                name,
                format!("must lie in (0, 1], got {value}"),
            ));
        }
    }

    if d.ngates <= 1.0 {
        return Err(IntSimError::invalid("ngates", "need more than one gate"));
    }
    if !(d.rent_p > 0.0 && d.rent_p < 1.0) || (d.rent_p - 0.5).abs() <= 1e-6 {
        // p = 0.5 makes the count antiderivative singular.
        return Err(IntSimError::invalid(
            "rent_p",
            format!("must lie in (0, 1) and differ from 0.5, got {}", d.rent_p),
        ));
    }
    if !(d.mean_free_path.is_finite() && d.mean_free_path >= 0.0) {
        return Err(IntSimError::invalid("mean_free_path", "must be non-negative"));
    }
    if !(0.0..=1.0).contains(&d.specularity) {
        return Err(IntSimError::invalid("specularity", "must lie in [0, 1]"));
    }
    if !(0.0..1.0).contains(&d.reflectivity) {
        return Err(IntSimError::invalid("reflectivity", "must lie in [0, 1)"));
    }
    if !(d.delay_margin.is_finite() && d.delay_margin >= 0.0) {
        return Err(IntSimError::invalid("delay_margin", "must be non-negative"));
    }
    if d.max_tier < 2 {
        return Err(IntSimError::invalid(
            "max_tier",
            format!("need at least 2 tiers, got {}", d.max_tier),
        ));
    }
    if !(d.latches_per_buffer >= 1.0) {
        return Err(IntSimError::invalid(
            "latches_per_buffer",
            "need at least one latch per buffer",
        ));
    }
    if let Some(v) = d.supply_voltage {
        if !(v.is_finite() && v > 0.0) {
            return Err(IntSimError::invalid("supply_voltage", "must be positive"));
        }
    }
    Ok(())
}
