//! # AC Voltage Drop
//!
//! Voltage drop along a feeder for a balanced three-phase or single-phase load.
//!
//! ## Method
//!
//! ```text
//! R_m   = (ρ / A) × (1 + α × (T − 20))           Ω/m
//! R     = R_m × L × k_len / n                     k_len = 0.5 for loop length
//! X     = (x / 1000) × L × k_len / n
//! ΔV    = k × I × (R·cosφ + X·sinφ)               k = √3 (3φ) or 2 (1φ)
//! ΔV %  = ΔV / V × 100
//! ```
//!
//! With the resistive-only method the `X·sinφ` term is dropped. When the
//! load current is blank it is derived from real power:
//! `I = (P / PF) × 1000 / (√3 × V)` (or `/ V` for single-phase).
//!
//! ## Example
//!
//! ```rust
//! use ee_core::calculations::voltage_drop::{calculate, VoltageDropInput};
//! use ee_core::library::LibrarySnapshot;
//!
//! let input = VoltageDropInput {
//!     voltage_v: Some(400.0),
//!     current_a: Some(150.0),
//!     power_factor: Some(0.9),
//!     length_m: Some(120.0),
//!     conductor_size_mm2: Some(70.0),
//!     material: "cu".to_string(),
//!     temperature_c: Some(75.0),
//!     reactance_ohm_per_km: Some(0.08),
//!     ..Default::default()
//! };
//!
//! let report = calculate(&input, &LibrarySnapshot::default()).unwrap();
//! assert!((report.results.drop_v - 9.4915).abs() < 0.001);
//! assert!(report.results.pass);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult, Violation};
use crate::library::{CableImpedance, LibrarySnapshot};
use crate::units::{format_number, format_quantity, per_km_to_per_m, SQRT_3};
use crate::validation::Validator;

use super::{Report, ResultSummary, SystemPhase};

/// Conductor material used when the input leaves it blank
pub const DEFAULT_MATERIAL: &str = "cu";
/// Conductor temperature used when the input leaves it blank (°C)
pub const DEFAULT_TEMPERATURE_C: f64 = 75.0;
/// Allowed drop used when the input leaves it blank (%)
pub const DEFAULT_DROP_LIMIT_PERCENT: f64 = 3.0;

/// How the entered length is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthMode {
    /// Route length from source to load
    #[default]
    #[serde(rename = "oneway", alias = "one-way", alias = "one_way")]
    OneWay,
    /// Total conductor loop (out and back); halved before use
    #[serde(rename = "loop")]
    Loop,
}

impl LengthMode {
    fn multiplier(&self) -> f64 {
        match self {
            LengthMode::OneWay => 1.0,
            LengthMode::Loop => 0.5,
        }
    }
}

/// Impedance model for the drop formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DropMethod {
    /// R·cosφ only
    #[serde(rename = "r", alias = "resistive")]
    Resistive,
    /// R·cosφ + X·sinφ
    #[default]
    #[serde(rename = "rx", alias = "r+x")]
    ResistanceReactance,
}

/// Where the reactance per km came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactanceSource {
    Input,
    Library,
    Default,
}

/// Input parameters for a voltage drop check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "system": "3ph",
///   "voltage_v": 400,
///   "current_a": 150,
///   "power_factor": 0.9,
///   "length_m": 120,
///   "length_mode": "oneway",
///   "conductor_size_mm2": 70,
///   "material": "cu",
///   "temperature_c": 75,
///   "parallel_runs": 1,
///   "method": "rx",
///   "reactance_ohm_per_km": 0.08,
///   "drop_limit_percent": 3
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoltageDropInput {
    #[serde(default)]
    pub system: SystemPhase,

    /// Nominal system voltage (V, line-to-line for 3φ)
    #[serde(default, with = "crate::validation::lenient")]
    pub voltage_v: Option<f64>,

    /// Load current (A); blank derives it from `power_kw`
    #[serde(default, with = "crate::validation::lenient")]
    pub current_a: Option<f64>,

    /// Real power (kW), used only when `current_a` is blank
    #[serde(default, with = "crate::validation::lenient")]
    pub power_kw: Option<f64>,

    /// Load power factor; blank is treated as unity
    #[serde(default, with = "crate::validation::lenient")]
    pub power_factor: Option<f64>,

    /// Feeder length (m)
    #[serde(default, with = "crate::validation::lenient")]
    pub length_m: Option<f64>,

    #[serde(default)]
    pub length_mode: LengthMode,

    /// Conductor cross-section (mm²)
    #[serde(default, with = "crate::validation::lenient")]
    pub conductor_size_mm2: Option<f64>,

    /// Conductor material key in the library ("cu", "al")
    #[serde(default)]
    pub material: String,

    /// Conductor operating temperature (°C)
    #[serde(default, with = "crate::validation::lenient")]
    pub temperature_c: Option<f64>,

    /// Conductors in parallel per phase (minimum 1)
    #[serde(default, with = "crate::validation::lenient")]
    pub parallel_runs: Option<f64>,

    #[serde(default)]
    pub method: DropMethod,

    /// Cable reactance (Ω/km); blank uses the library value for the size
    #[serde(default, with = "crate::validation::lenient")]
    pub reactance_ohm_per_km: Option<f64>,

    /// Allowed voltage drop (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub drop_limit_percent: Option<f64>,
}

/// Results from a voltage drop check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageDropResult {
    /// Load current used (A)
    pub current_a: f64,
    /// Whether the current was derived from real power
    pub current_derived: bool,
    /// Power factor used for the angle, after clamping to [0.1, 1]
    pub power_factor: f64,
    /// Conductor resistance at temperature (Ω/m)
    pub resistance_ohm_per_m: f64,
    /// Feeder resistance (Ω)
    pub total_resistance_ohm: f64,
    /// Reactance per km applied (Ω/km)
    pub reactance_ohm_per_km: f64,
    pub reactance_source: ReactanceSource,
    /// Feeder reactance (Ω)
    pub total_reactance_ohm: f64,
    /// √3 for three-phase, 2 for single-phase
    pub length_factor: f64,
    /// Voltage drop (V)
    pub drop_v: f64,
    /// Voltage drop as a share of nominal (%)
    pub drop_percent: f64,
    /// Voltage at the load end (V)
    pub receiving_v: f64,
    /// Allowed drop applied (%)
    pub limit_percent: f64,
    pub pass: bool,
}

impl ResultSummary for VoltageDropResult {
    fn summary(&self) -> String {
        format!(
            "ΔV {} ({})",
            format_quantity(self.drop_v, "V"),
            format_quantity(self.drop_percent, "%")
        )
    }

    fn snapshot(&self) -> String {
        format!("Receiving voltage {}", format_quantity(self.receiving_v, "V"))
    }
}

fn unknown_material(material: &str) -> Violation {
    Violation::new(
        "material",
        material,
        format!("Conductor material '{}' is not in the library.", material),
    )
}

/// Calculate the voltage drop along a feeder.
///
/// # Returns
///
/// * `Ok(Report<VoltageDropResult>)` - Drop, receiving voltage, and pass/fail
/// * `Err(CalcError::InvalidInput)` - Missing voltage, length, or size; unknown
///   material; or (checked afterwards) a load current that is not positive
pub fn calculate(input: &VoltageDropInput, library: &LibrarySnapshot) -> CalcResult<Report<VoltageDropResult>> {
    let mut v = Validator::new();
    let voltage = v.positive("voltage_v", "Voltage", input.voltage_v);
    let length = v.positive("length_m", "Length", input.length_m);
    let size_mm2 = v.positive("conductor_size_mm2", "Conductor size", input.conductor_size_mm2);
    let pf_input = v.finite("power_factor", "Power factor", input.power_factor);
    let temperature = v
        .finite("temperature_c", "Temperature", input.temperature_c)
        .unwrap_or(DEFAULT_TEMPERATURE_C);
    let parallel = v
        .finite("parallel_runs", "Parallel runs", input.parallel_runs)
        .unwrap_or(1.0)
        .max(1.0);
    let reactance_input = v.finite("reactance_ohm_per_km", "Reactance", input.reactance_ohm_per_km);
    let limit = v
        .finite("drop_limit_percent", "Voltage drop limit", input.drop_limit_percent)
        .unwrap_or(DEFAULT_DROP_LIMIT_PERCENT);

    let material = match input.material.trim() {
        "" => DEFAULT_MATERIAL.to_string(),
        other => other.to_lowercase(),
    };
    let conductor = library.conductor(&material).copied();
    if conductor.is_none() {
        let violation = unknown_material(&material);
        v.reject(&violation.field, violation.value, violation.reason);
    }
    v.finish()?;
    let conductor = conductor.ok_or_else(|| CalcError::InvalidInput {
        violations: vec![unknown_material(&material)],
    })?;

    let mut warnings = Vec::new();
    let mut steps = Vec::new();

    let pf_raw = match pf_input {
        Some(pf) => pf,
        None => {
            warnings.push("Power factor not given; unity assumed.".to_string());
            1.0
        }
    };
    let power_factor = pf_raw.clamp(0.1, 1.0);
    if power_factor != pf_raw {
        warnings.push(format!(
            "Power factor {} clamped to {}.",
            format_number(pf_raw),
            format_number(power_factor)
        ));
    }

    // A zero or non-numeric current falls back to real power
    let given_current = input.current_a.filter(|c| *c != 0.0 && !c.is_nan());
    let current_derived = given_current.is_none();
    let current = match given_current {
        Some(current) => Some(current),
        None => input.power_kw.filter(|kw| *kw > 0.0).map(|kw| {
            let apparent_kva = kw / pf_raw;
            match input.system {
                SystemPhase::Three => apparent_kva * 1000.0 / (SQRT_3 * voltage),
                SystemPhase::Single => apparent_kva * 1000.0 / voltage,
            }
        }),
    };
    let mut deferred = Validator::new();
    let current = deferred.positive("current_a", "Load current", current);
    deferred.finish()?;

    if current_derived {
        let formula = match input.system {
            SystemPhase::Three => "I = (P / PF) × 1000 / (√3 × V)",
            SystemPhase::Single => "I = (P / PF) × 1000 / V",
        };
        steps.push(format!("{} = {}", formula, format_quantity(current, "A")));
    } else {
        steps.push(format!("I = {}", format_quantity(current, "A")));
    }

    let length_multiplier = input.length_mode.multiplier();
    let resistance_per_m = conductor.resistance_ohm_per_m(size_mm2, temperature);
    let total_resistance = resistance_per_m * length * length_multiplier / parallel;

    let (reactance_per_km, reactance_source) = match reactance_input {
        Some(x) => (x, ReactanceSource::Input),
        None => match library.cable_impedance(size_mm2) {
            Some(z) => (z.x, ReactanceSource::Library),
            None => (CableImpedance::FALLBACK.x, ReactanceSource::Default),
        },
    };
    let total_reactance = per_km_to_per_m(reactance_per_km) * length * length_multiplier / parallel;

    let phi = power_factor.acos();
    let (cos_phi, sin_phi) = (phi.cos(), phi.sin());
    let length_factor = match input.system {
        SystemPhase::Three => SQRT_3,
        SystemPhase::Single => 2.0,
    };
    let reactive_term = match input.method {
        DropMethod::ResistanceReactance => total_reactance * sin_phi,
        DropMethod::Resistive => 0.0,
    };
    let drop = length_factor * current * (total_resistance * cos_phi + reactive_term);
    let drop_percent = drop / voltage * 100.0;
    let receiving = voltage - drop;
    let pass = drop_percent <= limit;

    steps.push(format!(
        "R (Ω) = ρ/A × (1 + α(T − 20)) × length = {}",
        format_quantity(total_resistance, "Ω")
    ));
    steps.push(format!("X (Ω) = {}", format_quantity(total_reactance, "Ω")));
    let formula = match input.method {
        DropMethod::ResistanceReactance => "I × (R·cosφ + X·sinφ)",
        DropMethod::Resistive => "I × R·cosφ",
    };
    steps.push(format!(
        "ΔV = {} × {} ({})",
        format_number(length_factor),
        formula,
        input.system.display_name()
    ));
    steps.push(format!("ΔV = {}", format_quantity(drop, "V")));
    steps.push(format!("ΔV % = ΔV / V × 100 = {}", format_quantity(drop_percent, "%")));

    if !pass {
        warnings.push(format!(
            "Voltage drop {} exceeds the {} limit.",
            format_quantity(drop_percent, "%"),
            format_quantity(limit, "%")
        ));
    }
    if reactance_source == ReactanceSource::Default && input.method == DropMethod::ResistanceReactance {
        warnings.push(format!(
            "No library reactance for {}; {} used.",
            format_quantity(size_mm2, "mm²"),
            format_quantity(reactance_per_km, "Ω/km")
        ));
    }

    tracing::debug!(current, drop, drop_percent, pass, "voltage drop complete");

    Ok(Report {
        results: VoltageDropResult {
            current_a: current,
            current_derived,
            power_factor,
            resistance_ohm_per_m: resistance_per_m,
            total_resistance_ohm: total_resistance,
            reactance_ohm_per_km: reactance_per_km,
            reactance_source,
            total_reactance_ohm: total_reactance,
            length_factor,
            drop_v: drop,
            drop_percent,
            receiving_v: receiving,
            limit_percent: limit,
            pass,
        },
        derivation_steps: steps,
        warnings,
        notes: vec![
            "R calculated from resistivity and temperature coefficient library.".to_string(),
            "Select R+X method to include reactance and power factor angle.".to_string(),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feeder() -> VoltageDropInput {
        VoltageDropInput {
            system: SystemPhase::Three,
            voltage_v: Some(400.0),
            current_a: Some(150.0),
            power_kw: None,
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
        }
    }

    fn run(input: &VoltageDropInput) -> Report<VoltageDropResult> {
        calculate(input, &LibrarySnapshot::default()).unwrap()
    }

    #[test]
    fn test_reference_feeder() {
        let r = run(&feeder()).results;

        // ρ/A × (1 + 0.00393 × 55) = 2.9952e-4 Ω/m
        assert!((r.resistance_ohm_per_m - 2.9952e-4).abs() < 1e-8);
        assert!((r.total_resistance_ohm - 0.0359424).abs() < 1e-6);
        assert!((r.total_reactance_ohm - 0.0096).abs() < 1e-9);
        assert!((r.drop_v - 9.4915).abs() < 0.001);
        assert!((r.drop_percent - 2.3729).abs() < 0.001);
        assert!((r.receiving_v - 390.5085).abs() < 0.001);
        assert!(r.pass);
    }

    #[test]
    fn test_receiving_and_percent_identities() {
        for system in [SystemPhase::Single, SystemPhase::Three] {
            let mut input = feeder();
            input.system = system;
            let r = run(&input).results;
            assert!((r.receiving_v - (400.0 - r.drop_v)).abs() < 1e-9);
            assert!((r.drop_percent - r.drop_v / 400.0 * 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unity_pf_ignores_reactance() {
        let mut input = feeder();
        input.power_factor = Some(1.0);
        let rx = run(&input).results.drop_v;
        input.method = DropMethod::Resistive;
        let r_only = run(&input).results.drop_v;
        assert!((rx - r_only).abs() < 1e-9);
    }

    #[test]
    fn test_resistive_method() {
        let mut input = feeder();
        input.method = DropMethod::Resistive;
        let r = run(&input).results;
        // √3 × 150 × 0.0359424 × 0.9
        assert!((r.drop_v - 8.4043).abs() < 0.001);
    }

    #[test]
    fn test_loop_length_halves_impedance() {
        let mut input = feeder();
        input.length_mode = LengthMode::Loop;
        input.length_m = Some(240.0);
        let looped = run(&input).results;
        let oneway = run(&feeder()).results;
        assert!((looped.drop_v - oneway.drop_v).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_runs_divide_impedance() {
        let mut input = feeder();
        input.parallel_runs = Some(2.0);
        let r = run(&input).results;
        assert!((r.total_resistance_ohm - 0.0179712).abs() < 1e-6);

        input.parallel_runs = Some(0.0);
        assert!((run(&input).results.total_resistance_ohm - 0.0359424).abs() < 1e-6);
    }

    #[test]
    fn test_single_phase_uses_factor_two() {
        let mut input = feeder();
        input.system = SystemPhase::Single;
        input.voltage_v = Some(230.0);
        let r = run(&input).results;
        assert_eq!(r.length_factor, 2.0);
        assert!(run(&input).derivation_steps.iter().any(|s| s == "ΔV = 2 × I × (R·cosφ + X·sinφ) (single-phase)"));
        let expected = 2.0 * 150.0 * (0.0359424 * 0.9 + 0.0096 * (1.0f64 - 0.81).sqrt());
        assert!((r.drop_v - expected).abs() < 1e-6);
    }

    #[test]
    fn test_current_derived_from_power() {
        let mut input = feeder();
        input.current_a = None;
        input.power_kw = Some(80.0);
        let report = run(&input);
        // (80 / 0.9) × 1000 / (√3 × 400) = 128.30 A
        assert!((report.results.current_a - 128.3001).abs() < 0.001);
        assert!(report.results.current_derived);
        assert!(report.derivation_steps[0].starts_with("I = (P / PF)"));
    }

    #[test]
    fn test_zero_current_falls_back_to_power() {
        let mut input = feeder();
        input.current_a = Some(0.0);
        input.power_kw = Some(80.0);
        assert!(run(&input).results.current_derived);
    }

    #[test]
    fn test_missing_current_and_power_is_deferred_error() {
        let mut input = feeder();
        input.current_a = None;
        let err = calculate(&input, &LibrarySnapshot::default()).unwrap_err();
        assert_eq!(err.messages(), vec!["Load current must be greater than 0.".to_string()]);
    }

    #[test]
    fn test_deferred_check_runs_after_required_fields() {
        let mut input = feeder();
        input.current_a = None;
        input.voltage_v = None;
        input.length_m = Some(-1.0);
        let err = calculate(&input, &LibrarySnapshot::default()).unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "Voltage must be greater than 0.".to_string(),
                "Length must be greater than 0.".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_material() {
        let mut input = feeder();
        input.material = "ag".to_string();
        let err = calculate(&input, &LibrarySnapshot::default()).unwrap_err();
        assert_eq!(err.violations()[0].field, "material");
    }

    #[test]
    fn test_blank_optional_fields_use_defaults() {
        let mut input = feeder();
        input.material = String::new();
        input.temperature_c = None;
        input.drop_limit_percent = None;
        input.power_factor = None;
        input.reactance_ohm_per_km = None;
        let report = run(&input);
        assert_eq!(report.results.limit_percent, 3.0);
        assert_eq!(report.results.power_factor, 1.0);
        assert_eq!(report.results.reactance_source, ReactanceSource::Library);
        assert!(report.warnings.iter().any(|w| w.contains("unity")));
        assert!((report.results.total_resistance_ohm - 0.0359424).abs() < 1e-6);
    }

    #[test]
    fn test_reactance_falls_back_to_default() {
        let mut input = feeder();
        input.reactance_ohm_per_km = None;
        input.conductor_size_mm2 = Some(240.0);
        let report = run(&input);
        assert_eq!(report.results.reactance_source, ReactanceSource::Default);
        assert_eq!(report.results.reactance_ohm_per_km, 0.08);
    }

    #[test]
    fn test_exceeding_limit_fails_with_warning() {
        let mut input = feeder();
        input.drop_limit_percent = Some(2.0);
        let report = run(&input);
        assert!(!report.results.pass);
        assert!(report.warnings[0].starts_with("Voltage drop 2.373 %"));
    }

    #[test]
    fn test_summary_strings() {
        let r = run(&feeder()).results;
        assert_eq!(r.summary(), "ΔV 9.491 V (2.373 %)");
        assert_eq!(r.snapshot(), "Receiving voltage 390.509 V");
    }
}
