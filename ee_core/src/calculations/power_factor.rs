//! # Power Factor Correction
//!
//! Capacitor bank sizing to raise a load's power factor to a target.
//!
//! ```text
//! φ1   = arccos(PF_existing)       PF_existing clamped to [0.1, 1]
//! φ2   = arccos(PF_target)         PF_target clamped to [PF_existing, 1]
//! kvar = P × (tan φ1 − tan φ2)
//! I    = P × 1000 / (√3 × V × PF)  (or V × PF for single-phase)
//! ```
//!
//! The recommended bank is the smallest standard size at or above the
//! required kvar; above the largest standard size the raw kvar is reported.

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::selection::first_at_least;
use crate::units::{format_number, format_quantity, SQRT_3};
use crate::validation::Validator;

use super::{Report, ResultSummary, SystemPhase};

/// Standard capacitor bank ratings (kvar), ascending
pub const STANDARD_BANKS_KVAR: [f64; 15] = [
    5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 75.0, 100.0, 150.0, 200.0, 300.0, 400.0, 500.0,
];

/// Input parameters for capacitor bank sizing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "kw": 500,
///   "pf_existing": 0.75,
///   "pf_target": 0.95,
///   "voltage_v": 400,
///   "system": "3ph",
///   "penalty_per_kvar": 2
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerFactorInput {
    /// Real power (kW)
    #[serde(default, with = "crate::validation::lenient")]
    pub kw: Option<f64>,

    #[serde(default, with = "crate::validation::lenient")]
    pub pf_existing: Option<f64>,

    #[serde(default, with = "crate::validation::lenient")]
    pub pf_target: Option<f64>,

    /// System voltage (V)
    #[serde(default, with = "crate::validation::lenient")]
    pub voltage_v: Option<f64>,

    #[serde(default)]
    pub system: SystemPhase,

    /// Utility penalty per kvar per year; blank or zero means no penalty
    #[serde(default, with = "crate::validation::lenient")]
    pub penalty_per_kvar: Option<f64>,
}

/// Results from capacitor bank sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerFactorResult {
    /// Existing PF after clamping
    pub pf_existing: f64,
    /// Target PF after clamping
    pub pf_target: f64,
    /// arccos(PF_existing) (rad)
    pub phi1_rad: f64,
    /// arccos(PF_target) (rad)
    pub phi2_rad: f64,
    /// Required reactive compensation (kvar)
    pub kvar: f64,
    /// Recommended bank rating (kvar)
    pub recommended_kvar: f64,
    /// Whether the recommendation is a standard catalog size
    pub standard_bank: bool,
    /// Line current at the existing PF (A)
    pub current_before_a: f64,
    /// Line current at the target PF (A)
    pub current_after_a: f64,
    /// kvar × penalty rate, when a penalty applies
    pub annual_savings: Option<f64>,
}

impl ResultSummary for PowerFactorResult {
    fn summary(&self) -> String {
        format!("Required kvar {}", format_quantity(self.kvar, "kvar"))
    }

    fn snapshot(&self) -> String {
        format!("Recommended bank {}", format_quantity(self.recommended_kvar, "kvar"))
    }
}

fn line_current(kw: f64, voltage: f64, pf: f64, system: SystemPhase) -> f64 {
    match system {
        SystemPhase::Three => kw * 1000.0 / (SQRT_3 * voltage * pf),
        SystemPhase::Single => kw * 1000.0 / (voltage * pf),
    }
}

/// Size a capacitor bank.
///
/// # Example
///
/// ```rust
/// use ee_core::calculations::power_factor::{calculate, PowerFactorInput};
///
/// let input = PowerFactorInput {
///     kw: Some(500.0),
///     pf_existing: Some(0.75),
///     pf_target: Some(0.95),
///     voltage_v: Some(400.0),
///     ..Default::default()
/// };
/// let report = calculate(&input).unwrap();
/// assert_eq!(report.results.recommended_kvar, 300.0);
/// ```
pub fn calculate(input: &PowerFactorInput) -> CalcResult<Report<PowerFactorResult>> {
    let mut v = Validator::new();
    let kw = v.positive("kw", "Real power", input.kw);
    let pf_existing_raw = v.positive("pf_existing", "Existing PF", input.pf_existing);
    let pf_target_raw = v.positive("pf_target", "Target PF", input.pf_target);
    let voltage = v.positive("voltage_v", "Voltage", input.voltage_v);
    let penalty = v
        .finite("penalty_per_kvar", "Penalty rate", input.penalty_per_kvar)
        .unwrap_or(0.0);
    v.finish()?;

    let mut warnings = Vec::new();

    let pf_existing = pf_existing_raw.clamp(0.1, 1.0);
    let pf_target = pf_target_raw.clamp(pf_existing, 1.0);
    if pf_target_raw < pf_existing {
        warnings.push(format!(
            "Target PF {} is below the existing PF; no correction applied.",
            format_number(pf_target_raw)
        ));
    }

    let phi1 = pf_existing.acos();
    let phi2 = pf_target.acos();
    let kvar = kw * (phi1.tan() - phi2.tan());

    let catalog_hit = first_at_least(&STANDARD_BANKS_KVAR, kvar, |bank| *bank).copied();
    let recommended = catalog_hit.unwrap_or(kvar);
    if catalog_hit.is_none() {
        warnings.push(format!(
            "Required kvar exceeds the largest standard bank ({}); split into multiple steps.",
            format_quantity(STANDARD_BANKS_KVAR[STANDARD_BANKS_KVAR.len() - 1], "kvar")
        ));
    }

    let current_before = line_current(kw, voltage, pf_existing, input.system);
    let current_after = line_current(kw, voltage, pf_target, input.system);
    let annual_savings = (penalty > 0.0).then(|| kvar * penalty);

    let mut steps = vec![
        format!("φ1 = arccos(PF₁) = {}", format_quantity(phi1, "rad")),
        format!("φ2 = arccos(PF₂) = {}", format_quantity(phi2, "rad")),
        format!("kvar = kW × (tanφ1 - tanφ2) = {}", format_quantity(kvar, "kvar")),
        format!("Recommended bank = {}", format_quantity(recommended, "kvar")),
        format!(
            "I before = {}, I after = {}",
            format_quantity(current_before, "A"),
            format_quantity(current_after, "A")
        ),
    ];
    if let Some(savings) = annual_savings {
        steps.push(format!("Annual savings = kvar × penalty = {}", format_number(savings)));
    }

    tracing::debug!(kvar, recommended, "capacitor bank sized");

    Ok(Report {
        results: PowerFactorResult {
            pf_existing,
            pf_target,
            phi1_rad: phi1,
            phi2_rad: phi2,
            kvar,
            recommended_kvar: recommended,
            standard_bank: catalog_hit.is_some(),
            current_before_a: current_before,
            current_after_a: current_after,
            annual_savings,
        },
        derivation_steps: steps,
        warnings,
        notes: vec![
            "Capacitor bank rounded up to the next standard size.".to_string(),
            "Annual savings use the penalty rate if provided.".to_string(),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant() -> PowerFactorInput {
        PowerFactorInput {
            kw: Some(500.0),
            pf_existing: Some(0.75),
            pf_target: Some(0.95),
            voltage_v: Some(400.0),
            system: SystemPhase::Three,
            penalty_per_kvar: Some(2.0),
        }
    }

    #[test]
    fn test_reference_plant() {
        let r = calculate(&plant()).unwrap().results;
        let expected = 500.0 * ((0.75f64).acos().tan() - (0.95f64).acos().tan());
        assert!((r.kvar - expected).abs() < 1e-9);
        assert!((r.kvar - 276.6165).abs() < 0.001);
        assert_eq!(r.recommended_kvar, 300.0);
        assert!(r.standard_bank);
        assert!((r.current_before_a - 962.25).abs() < 0.01);
        assert!((r.current_after_a - 759.67).abs() < 0.01);
        assert!((r.annual_savings.unwrap() - 553.233).abs() < 0.001);
    }

    #[test]
    fn test_recommended_is_smallest_adequate_bank() {
        for kw in [10.0, 42.0, 90.0, 180.0, 400.0, 850.0] {
            let mut input = plant();
            input.kw = Some(kw);
            let r = calculate(&input).unwrap().results;
            assert!(r.recommended_kvar >= r.kvar);
            let smaller: Vec<_> = STANDARD_BANKS_KVAR.iter().filter(|b| **b < r.recommended_kvar).collect();
            assert!(smaller.iter().all(|b| **b < r.kvar));
        }
    }

    #[test]
    fn test_above_catalog_reports_raw_kvar() {
        let mut input = plant();
        input.kw = Some(2000.0);
        let report = calculate(&input).unwrap();
        assert_eq!(report.results.recommended_kvar, report.results.kvar);
        assert!(!report.results.standard_bank);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_target_clamped_to_existing() {
        let mut input = plant();
        input.pf_target = Some(0.7);
        let report = calculate(&input).unwrap();
        assert_eq!(report.results.pf_target, 0.75);
        assert!(report.results.kvar.abs() < 1e-9);
        assert_eq!(report.results.recommended_kvar, 5.0);
        assert!(report.warnings[0].contains("below the existing PF"));
    }

    #[test]
    fn test_existing_pf_clamped() {
        let mut input = plant();
        input.pf_existing = Some(1.4);
        let r = calculate(&input).unwrap().results;
        assert_eq!(r.pf_existing, 1.0);
        assert_eq!(r.pf_target, 1.0);
    }

    #[test]
    fn test_no_penalty_means_no_savings() {
        let mut input = plant();
        input.penalty_per_kvar = None;
        assert_eq!(calculate(&input).unwrap().results.annual_savings, None);
        input.penalty_per_kvar = Some(0.0);
        assert_eq!(calculate(&input).unwrap().results.annual_savings, None);
    }

    #[test]
    fn test_single_phase_current() {
        let mut input = plant();
        input.system = SystemPhase::Single;
        input.voltage_v = Some(230.0);
        let r = calculate(&input).unwrap().results;
        assert!((r.current_before_a - 500_000.0 / (230.0 * 0.75)).abs() < 1e-6);
    }

    #[test]
    fn test_required_fields() {
        let err = calculate(&PowerFactorInput::default()).unwrap_err();
        assert_eq!(err.violations().len(), 4);
        assert_eq!(err.violations()[1].reason, "Existing PF must be greater than 0.");
    }

    #[test]
    fn test_summary_strings() {
        let r = calculate(&plant()).unwrap().results;
        assert_eq!(r.summary(), "Required kvar 276.617 kvar");
        assert_eq!(r.snapshot(), "Recommended bank 300 kvar");
    }
}
