use approx::assert_relative_eq;

use crate::params::DesignParams;
use crate::paths::{out_json, out_report};
use crate::report::{render_report, save_json, save_report, Report, TierKind};
use crate::synth::{Convergence, Synthesis, POWER_TOLERANCE};
use crate::tech::TechNode;
use crate::tiers::repeaters::BandVerdict;
use crate::{estimate, IntSimError};

fn reference_design() -> DesignParams {
    DesignParams::builder()
        .frequency(8e9)
        .critical_path_depth(6.0)
        .activity(0.03)
        .build()
        .unwrap()
}

fn reference() -> Synthesis {
    estimate(TechNode::N45, reference_design()).unwrap()
}

#[test]
fn test_reference_chip() {
    let synth = reference();
    assert_eq!(synth.convergence, Convergence::Converged);
    assert_eq!(synth.sizing.width, 3);
    assert_eq!(synth.wld.lmax(), 32365);
    assert_relative_eq!(synth.gate_pitch, 3.6558e-7, max_relative = 1e-3);
    assert_relative_eq!(synth.total_power(), 121.43, max_relative = 0.01);
    assert!((synth.estimate - synth.total_power()).abs() <= POWER_TOLERANCE);

    assert_eq!(synth.chip.tiers.len(), 11);
    assert_eq!(synth.chip.repeater_tiers.len(), 3);
    assert_eq!(synth.chip.verdict, Some(BandVerdict::RejectedPower));

    let global = synth.chip.global.unwrap();
    assert_eq!(global.clock_factor, 1.0);
    assert_relative_eq!(global.pitch, 1.7513e-6, max_relative = 1e-3);

    assert_relative_eq!(synth.logic_area(), 7.7517e-6, max_relative = 1e-4);
    assert_relative_eq!(synth.chip.repeater_area, 2.85e-6, max_relative = 0.02);
}

#[test]
fn test_area_accounting() {
    let synth = reference();
    let report = synth.report();
    let area = report.area;
    assert!(area.logic + area.repeater <= area.total);
    assert_relative_eq!(
        area.logic + area.repeater + area.available,
        area.total,
        max_relative = 1e-12
    );
}

#[test]
fn test_pitches_respect_minimum() {
    let synth = reference();
    let min_pitch = synth.params.min_pitch();
    let report = synth.report();
    for tier in &report.tiers {
        assert!(tier.pitch >= min_pitch);
    }
    for pair in report.tiers.windows(2) {
        assert!(pair[0].pitch <= pair[1].pitch);
    }
    assert_eq!(report.tiers.last().unwrap().kind, TierKind::Global);
}

#[test]
fn test_repeaters_never_overflow_die() {
    let design = DesignParams {
        inverter_area: 2000.0,
        ..reference_design()
    };
    let synth = estimate(TechNode::N45, design).unwrap();
    let area = synth.report().area;
    assert!(area.available >= 0.0);
    assert!(area.logic + area.repeater <= area.total);
    assert_eq!(synth.chip.verdict, Some(BandVerdict::RejectedArea));
    assert!(synth.chip.repeater_tiers.is_empty());
}

#[test]
fn test_deterministic() {
    assert_eq!(reference(), reference());
}

#[test]
fn test_tier_ceiling_returns_partial_result() {
    let design = DesignParams {
        max_tier: 3,
        ..reference_design()
    };
    let synth = estimate(TechNode::N45, design).unwrap();
    assert_eq!(synth.convergence, Convergence::TierCeiling);
    assert!(!synth.converged());
    assert_eq!(synth.iterations, 1);
    assert_eq!(synth.chip.tiers.len(), 3);
    assert!(synth.chip.global.is_none());
    assert!(synth.total_power() > 0.0);
}

#[test]
fn test_unreachable_frequency() {
    let design = DesignParams {
        frequency: 80e9,
        ..reference_design()
    };
    assert!(matches!(
        estimate(TechNode::N45, design),
        Err(IntSimError::FrequencyUnreachable { .. })
    ));
}

#[test]
fn test_leakage_grows_with_temperature() {
    let cold = reference();
    let hot = estimate(
        TechNode::N45,
        DesignParams {
            temperature: 350.0,
            ..reference_design()
        },
    )
    .unwrap();
    assert!(hot.chip.power.logic_leakage > cold.chip.power.logic_leakage);
    assert!(hot.total_power() > cold.total_power());
}

#[test]
fn test_report_artifacts() {
    let synth = reference();
    let report = synth.report();
    let dir = tempfile::tempdir().unwrap();

    let text = render_report(&report).unwrap();
    assert!(text.contains("Wiring tiers"));
    assert!(text.contains("Converged"));

    let report_path = out_report(dir.path(), "reference");
    save_report(&report_path, &report).unwrap();
    assert_eq!(std::fs::read_to_string(&report_path).unwrap(), text);

    let json_path = out_json(dir.path(), "reference");
    save_json(&json_path, &report).unwrap();
    let parsed: Report = serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(parsed.tiers.len(), report.tiers.len());
    assert_eq!(parsed.node, TechNode::N45);
    assert_eq!(parsed.convergence, Convergence::Converged);
}

macro_rules! test_node {
    ( $name:ident, $node:expr ) => {
        paste::paste! {
            #[test]
            fn [<test_converges_ $name>]() {
                let design = DesignParams {
                    ngates: 1e7,
                    die_area: 50e-6,
                    frequency: 1e9,
                    ..Default::default()
                };
                let synth = estimate($node, design).unwrap();
                assert!(synth.converged());
                assert!(synth.total_power() > 0.0);
                assert!(synth.logic_area() + synth.chip.repeater_area <= synth.total_area());
                let energy = synth.unit_energy();
                assert!(energy.read > 0.0 && energy.leakage > 0.0);
                for tier in &synth.chip.tiers {
                    assert!(tier.pitch >= synth.params.min_pitch());
                }
            }
        }
    };
}

test_node!(n16, TechNode::N16);
test_node!(n22, TechNode::N22);
test_node!(n32, TechNode::N32);
test_node!(n45, TechNode::N45);
test_node!(n65, TechNode::N65);
test_node!(n90, TechNode::N90);
test_node!(n180, TechNode::N180);
