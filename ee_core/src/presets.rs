//! Worked-example inputs, one per module.
//!
//! These are the figures used throughout the documentation and tests, and
//! what `ee-calc example <module>` prints as a starting template.

use crate::calculations::{
    ConduitInput, DropMethod, FaultLocation, LengthMode, ModuleKind, PowerFactorInput,
    PowerQualityInput, PvInput, ShortCircuitInput, SystemPhase, VoltageDropInput,
};
use crate::calculations::CalculationInput;

/// Worked example input for a module
pub fn example_input(module: ModuleKind) -> CalculationInput {
    match module {
        ModuleKind::Conduit => CalculationInput::Conduit(ConduitInput {
            conductor_size_mm2: Some(70.0),
            phase_count: Some(3.0),
            neutral_count: Some(1.0),
            ground_count: Some(1.0),
            spare_count: Some(1.0),
            cable_od_mm: Some(22.0),
            conduit_type: "emt".to_string(),
            conduit_id_mm: Some(63.0),
            conduit_fill_percent: Some(40.0),
            wireway_fill_percent: Some(20.0),
            wireway_width_mm: Some(200.0),
            wireway_height_mm: Some(100.0),
        }),
        ModuleKind::VoltageDrop => CalculationInput::VoltageDrop(VoltageDropInput {
            system: SystemPhase::Three,
            voltage_v: Some(400.0),
            current_a: Some(150.0),
            power_kw: Some(80.0),
            power_factor: Some(0.9),
            length_m: Some(120.0),
            length_mode: LengthMode::OneWay,
            conductor_size_mm2: Some(70.0),
            material: "cu".to_string(),
            temperature_c: Some(75.0),
            parallel_runs: Some(1.0),
            method: DropMethod::ResistanceReactance,
            reactance_ohm_per_km: Some(0.08),
            drop_limit_percent: Some(3.0),
        }),
        ModuleKind::ShortCircuit => CalculationInput::ShortCircuit(ShortCircuitInput {
            kva: Some(2000.0),
            secondary_v: Some(400.0),
            percent_z: Some(6.0),
            xr_ratio: Some(8.0),
            fault_location: FaultLocation::Feeder,
            feeder_length_m: Some(80.0),
            conductor_size_mm2: Some(95.0),
            parallel_runs: Some(2.0),
        }),
        ModuleKind::PowerFactor => CalculationInput::PowerFactor(PowerFactorInput {
            kw: Some(500.0),
            pf_existing: Some(0.75),
            pf_target: Some(0.95),
            voltage_v: Some(400.0),
            system: SystemPhase::Three,
            penalty_per_kvar: Some(2.0),
        }),
        ModuleKind::PowerQuality => CalculationInput::PowerQuality(PowerQualityInput {
            thd_v_percent: Some(6.0),
            thd_i_percent: Some(22.0),
            unbalance_percent: Some(2.5),
            power_factor: Some(0.82),
            sag_events: Some(3.0),
            vfd_load_percent: Some(40.0),
            ups_load_percent: Some(20.0),
            symptoms: Vec::new(),
        }),
        ModuleKind::Pv => CalculationInput::Pv(PvInput {
            area_m2: Some(800.0),
            panel_power_w: Some(550.0),
            panel_area_m2: Some(2.4),
            performance_ratio: Some(0.8),
            annual_yield_kwh_per_kwp: Some(1500.0),
            irradiation_kwh_per_m2_day: Some(4.8),
            dc_ac_ratio: Some(1.2),
            energy_price: Some(0.12),
            escalation_percent: Some(2.0),
            cost_per_kw: Some(900.0),
            om_percent: Some(1.5),
            incentive: Some(0.0),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::LibrarySnapshot;

    #[test]
    fn test_example_module_matches_request() {
        for kind in ModuleKind::ALL {
            assert_eq!(example_input(kind).module(), kind);
        }
    }

    #[test]
    fn test_example_json_reparses() {
        for kind in ModuleKind::ALL {
            let input = example_input(kind);
            let json = serde_json::to_string(&input).unwrap();
            let parsed: CalculationInput = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, input);
        }
    }

    #[test]
    fn test_example_digests() {
        let library = LibrarySnapshot::default();
        let digest = |kind| {
            let response = example_input(kind).evaluate(&library);
            (
                response.summary().unwrap_or_default().to_string(),
                response.snapshot().unwrap_or_default().to_string(),
            )
        };

        assert_eq!(
            digest(ModuleKind::Conduit),
            (
                "Conduit fill 73.167 %, wireway fill 11.404 %".to_string(),
                "Conduit 91 mm, wireway 150x100 mm".to_string()
            )
        );
        assert_eq!(digest(ModuleKind::PowerFactor).1, "Recommended bank 300 kvar");
        assert_eq!(digest(ModuleKind::PowerQuality).0, "Recommendations 6");
        assert_eq!(digest(ModuleKind::Pv).1, "Payback 7 yrs");
    }
}
