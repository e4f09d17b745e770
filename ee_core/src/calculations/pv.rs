//! # PV Sizing & Payback
//!
//! Sizes a rooftop or ground-mount PV array for an available area and
//! projects a simple 25-year cashflow.
//!
//! ## Method
//!
//! ```text
//! panels   = floor(area / panel_area)
//! kWp      = panels × panel_W / 1000
//! inverter = kWp / DC:AC
//! energy   = kWp × yield × PR                   (yield in kWh/kWp/yr)
//!          = kWp × irradiation × 365 × PR       (when yield is blank or 0)
//!          = 0                                  (neither given; warns)
//! capex    = kWp × cost_per_kW − incentive
//! ```
//!
//! The cashflow itself lives in [`super::cashflow`].
//!
//! ## Limitations
//!
//! - No degradation, taxes, financing, or inverter replacement
//! - O&M is flat, not escalated
//!
//! ## Example
//!
//! ```rust
//! use ee_core::calculations::pv::{calculate, PvInput};
//!
//! let input = PvInput {
//!     area_m2: Some(800.0),
//!     panel_power_w: Some(550.0),
//!     panel_area_m2: Some(2.4),
//!     performance_ratio: Some(0.8),
//!     annual_yield_kwh_per_kwp: Some(1500.0),
//!     dc_ac_ratio: Some(1.2),
//!     energy_price: Some(0.12),
//!     escalation_percent: Some(2.0),
//!     cost_per_kw: Some(900.0),
//!     om_percent: Some(1.5),
//!     ..Default::default()
//! };
//!
//! let report = calculate(&input).unwrap();
//! assert_eq!(report.results.panel_count, 333);
//! assert_eq!(report.results.payback_year, Some(7));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::units::{format_number, format_quantity};
use crate::validation::Validator;

use super::cashflow::{project, CashflowParams, CashflowRow, PROJECTION_YEARS};
use super::{Report, ResultSummary};

/// Input parameters for PV sizing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "area_m2": 800,
///   "panel_power_w": 550,
///   "panel_area_m2": 2.4,
///   "performance_ratio": 0.8,
///   "irradiation_kwh_per_m2_day": 4.8,
///   "annual_yield_kwh_per_kwp": 1500,
///   "dc_ac_ratio": 1.2,
///   "energy_price": 0.12,
///   "escalation_percent": 2,
///   "cost_per_kw": 900,
///   "om_percent": 1.5,
///   "incentive": 0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PvInput {
    /// Usable area (m²)
    #[serde(default, with = "crate::validation::lenient")]
    pub area_m2: Option<f64>,

    /// Panel rating (W)
    #[serde(default, with = "crate::validation::lenient")]
    pub panel_power_w: Option<f64>,

    /// Panel footprint (m²)
    #[serde(default, with = "crate::validation::lenient")]
    pub panel_area_m2: Option<f64>,

    /// Performance ratio (0-1)
    #[serde(default, with = "crate::validation::lenient")]
    pub performance_ratio: Option<f64>,

    /// Specific yield (kWh/kWp/yr); takes precedence over irradiation
    #[serde(default, with = "crate::validation::lenient")]
    pub annual_yield_kwh_per_kwp: Option<f64>,

    /// Daily irradiation (kWh/m²/day)
    #[serde(default, with = "crate::validation::lenient")]
    pub irradiation_kwh_per_m2_day: Option<f64>,

    #[serde(default, with = "crate::validation::lenient")]
    pub dc_ac_ratio: Option<f64>,

    /// Energy price in year 1 (per kWh)
    #[serde(default, with = "crate::validation::lenient")]
    pub energy_price: Option<f64>,

    /// Yearly price escalation (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub escalation_percent: Option<f64>,

    /// Installed cost per kWp
    #[serde(default, with = "crate::validation::lenient")]
    pub cost_per_kw: Option<f64>,

    /// Yearly O&M as a share of capex (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub om_percent: Option<f64>,

    /// Upfront incentive, subtracted from capex
    #[serde(default, with = "crate::validation::lenient")]
    pub incentive: Option<f64>,
}

/// Which resource figure produced the energy estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyBasis {
    SpecificYield,
    Irradiation,
    /// Neither figure given; energy is 0
    Unspecified,
}

/// Largest panel count held exactly by the f64 arithmetic downstream (2^53)
const MAX_PANELS: f64 = 9_007_199_254_740_992.0;

/// Results from PV sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvResult {
    pub panel_count: u64,
    /// DC array size (kWp)
    pub system_size_kwp: f64,
    /// AC inverter size (kW)
    pub inverter_size_kw: f64,
    /// First-year production (kWh/yr)
    pub annual_energy_kwh: f64,
    pub energy_basis: EnergyBasis,
    /// Net upfront cost after incentives
    pub capex: f64,
    /// First year with cumulative cash ≥ 0
    pub payback_year: Option<u32>,
    /// One row per projected year
    pub cashflow: Vec<CashflowRow>,
}

impl ResultSummary for PvResult {
    fn summary(&self) -> String {
        format!("PV size {}", format_quantity(self.system_size_kwp, "kWp"))
    }

    fn snapshot(&self) -> String {
        match self.payback_year {
            Some(year) => format!("Payback {} yrs", year),
            None => "Payback N/A".to_string(),
        }
    }
}

/// Size the array and project its cashflow.
///
/// # Returns
///
/// * `Ok(Report<PvResult>)` - Array size, energy, capex, cashflow and payback
/// * `Err(CalcError::InvalidInput)` - Missing area, panel power, panel area,
///   PR, or DC:AC ratio; a panel count beyond 2^53; or a non-numeric
///   financial or resource field
pub fn calculate(input: &PvInput) -> CalcResult<Report<PvResult>> {
    let mut v = Validator::new();
    let area = v.positive("area_m2", "Available area", input.area_m2);
    let panel_power = v.positive("panel_power_w", "Panel power", input.panel_power_w);
    let panel_area = v.positive("panel_area_m2", "Panel area", input.panel_area_m2);
    let pr = v.positive("performance_ratio", "Performance ratio", input.performance_ratio);
    let dc_ac = v.positive("dc_ac_ratio", "DC/AC ratio", input.dc_ac_ratio);

    let annual_yield = v.finite("annual_yield_kwh_per_kwp", "Annual yield", input.annual_yield_kwh_per_kwp);
    let irradiation = v.finite("irradiation_kwh_per_m2_day", "Irradiation", input.irradiation_kwh_per_m2_day);
    let (energy_basis, resource) = match (annual_yield, irradiation) {
        (Some(y), _) if y > 0.0 => (EnergyBasis::SpecificYield, y),
        (_, Some(h)) if h > 0.0 => (EnergyBasis::Irradiation, h),
        _ => (EnergyBasis::Unspecified, 0.0),
    };

    let panels = (area / panel_area).floor();
    if panel_area > 0.0 && panels > MAX_PANELS {
        v.reject(
            "area_m2",
            area.to_string(),
            "Available area holds more panels than can be counted exactly.",
        );
    }

    let mut money = |field: &str, label: &str, value: Option<f64>| v.finite(field, label, value).unwrap_or(0.0);
    let price = money("energy_price", "Energy price", input.energy_price);
    let escalation = money("escalation_percent", "Escalation", input.escalation_percent) / 100.0;
    let cost_per_kw = money("cost_per_kw", "Cost per kW", input.cost_per_kw);
    let om_fraction = money("om_percent", "O&M", input.om_percent) / 100.0;
    let incentive = money("incentive", "Incentive", input.incentive);
    v.finish()?;

    let panel_count = panels as u64;
    let system_size = panels * panel_power / 1000.0;
    let inverter_size = system_size / dc_ac;
    let annual_energy = match energy_basis {
        EnergyBasis::SpecificYield => system_size * resource * pr,
        EnergyBasis::Irradiation => system_size * resource * 365.0 * pr,
        EnergyBasis::Unspecified => 0.0,
    };
    let capex = system_size * cost_per_kw - incentive;

    let projection = project(&CashflowParams {
        capex,
        annual_energy_kwh: annual_energy,
        energy_price: price,
        escalation,
        om_fraction,
    });

    let mut warnings = Vec::new();
    if panel_count == 0 {
        warnings.push("Available area is smaller than one panel.".to_string());
    }
    if energy_basis == EnergyBasis::Unspecified {
        warnings.push("No annual yield or irradiation given; annual energy taken as 0.".to_string());
    }
    if projection.payback_year.is_none() {
        warnings.push(format!("Payback not reached within {} years.", PROJECTION_YEARS));
    }

    let energy_step = match energy_basis {
        EnergyBasis::SpecificYield => "Annual energy = size × yield × PR",
        EnergyBasis::Irradiation => "Annual energy = size × irradiation × 365 × PR",
        EnergyBasis::Unspecified => "Annual energy (no yield or irradiation)",
    };
    let steps = vec![
        format!("Panel count = floor(area / panelArea) = {}", panel_count),
        format!("System size = panels × W / 1000 = {}", format_quantity(system_size, "kWp")),
        format!("Inverter size = size / DC:AC = {}", format_quantity(inverter_size, "kW")),
        format!("{} = {}", energy_step, format_quantity(annual_energy, "kWh/yr")),
        format!("Capex = size × cost per kW − incentive = {}", format_number(capex)),
        match projection.payback_year {
            Some(year) => format!("Payback = first year with cumulative ≥ 0 = year {}", year),
            None => format!("Payback = not reached in {} years", PROJECTION_YEARS),
        },
    ];

    tracing::debug!(
        panel_count,
        system_size,
        payback = ?projection.payback_year,
        "pv sizing complete"
    );

    Ok(Report {
        results: PvResult {
            panel_count,
            system_size_kwp: system_size,
            inverter_size_kw: inverter_size,
            annual_energy_kwh: annual_energy,
            energy_basis,
            capex,
            payback_year: projection.payback_year,
            cashflow: projection.rows,
        },
        derivation_steps: steps,
        warnings,
        notes: vec![
            "Energy estimate uses PR and user-supplied yield or irradiation.".to_string(),
            "Financials are simplified and do not include tax or financing.".to_string(),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooftop() -> PvInput {
        PvInput {
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
        }
    }

    #[test]
    fn test_reference_rooftop() {
        let r = calculate(&rooftop()).unwrap().results;
        assert_eq!(r.panel_count, 333);
        assert!((r.system_size_kwp - 183.15).abs() < 1e-9);
        assert!((r.inverter_size_kw - 152.625).abs() < 1e-9);
        assert!((r.annual_energy_kwh - 219_780.0).abs() < 1e-6);
        assert_eq!(r.energy_basis, EnergyBasis::SpecificYield);
        assert!((r.capex - 164_835.0).abs() < 1e-6);
        assert_eq!(r.cashflow.len(), 25);
        assert_eq!(r.payback_year, Some(7));
    }

    #[test]
    fn test_payback_is_smallest_nonnegative_year() {
        let r = calculate(&rooftop()).unwrap().results;
        let first = r.cashflow.iter().find(|row| row.cumulative >= 0.0).map(|row| row.year);
        assert_eq!(r.payback_year, first);
    }

    #[test]
    fn test_irradiation_used_without_yield() {
        let mut input = rooftop();
        input.annual_yield_kwh_per_kwp = Some(0.0);
        let report = calculate(&input).unwrap();
        assert_eq!(report.results.energy_basis, EnergyBasis::Irradiation);
        // 183.15 × 4.8 × 365 × 0.8
        assert!((report.results.annual_energy_kwh - 256_703.04).abs() < 1e-6);
        assert!(report.derivation_steps[3].contains("irradiation × 365"));
    }

    #[test]
    fn test_no_resource_gives_zero_energy() {
        let mut input = rooftop();
        input.annual_yield_kwh_per_kwp = None;
        input.irradiation_kwh_per_m2_day = None;
        let report = calculate(&input).unwrap();
        let r = &report.results;
        assert_eq!(r.energy_basis, EnergyBasis::Unspecified);
        assert_eq!(r.annual_energy_kwh, 0.0);
        assert_eq!(r.panel_count, 333);
        assert_eq!(r.payback_year, None);
        assert!(report
            .warnings
            .iter()
            .any(|w| w == "No annual yield or irradiation given; annual energy taken as 0."));
    }

    #[test]
    fn test_large_area_counts_every_panel() {
        let mut input = rooftop();
        input.area_m2 = Some(1e10);
        input.panel_area_m2 = Some(1.0);
        let r = calculate(&input).unwrap().results;
        assert_eq!(r.panel_count, 10_000_000_000);
        assert!((r.system_size_kwp - 5.5e9).abs() < 1.0);
    }

    #[test]
    fn test_uncountable_panel_count_rejected() {
        let mut input = rooftop();
        input.area_m2 = Some(1e30);
        input.panel_area_m2 = Some(1.0);
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.violations()[0].field, "area_m2");
    }

    #[test]
    fn test_required_fields_reported_together() {
        let err = calculate(&PvInput::default()).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "area_m2",
                "panel_power_w",
                "panel_area_m2",
                "performance_ratio",
                "dc_ac_ratio",
            ]
        );
    }

    #[test]
    fn test_blank_financials_are_zero() {
        let input = PvInput {
            energy_price: None,
            escalation_percent: None,
            cost_per_kw: None,
            om_percent: None,
            incentive: None,
            ..rooftop()
        };
        let r = calculate(&input).unwrap().results;
        assert_eq!(r.capex, 0.0);
        assert_eq!(r.payback_year, Some(1));
    }

    #[test]
    fn test_non_numeric_financial_field_rejected() {
        let input: PvInput = serde_json::from_str(
            r#"{"area_m2": 800, "panel_power_w": 550, "panel_area_m2": 2.4,
                "performance_ratio": 0.8, "annual_yield_kwh_per_kwp": 1500,
                "dc_ac_ratio": 1.2, "energy_price": "twelve cents"}"#,
        )
        .unwrap();
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.violations()[0].reason, "Energy price must be a number.");
    }

    #[test]
    fn test_incentive_reduces_capex() {
        let mut input = rooftop();
        input.incentive = Some(50_000.0);
        let r = calculate(&input).unwrap().results;
        assert!((r.capex - 114_835.0).abs() < 1e-6);
        assert!(r.payback_year.unwrap() < 7);
    }

    #[test]
    fn test_payback_not_reached_warns() {
        let mut input = rooftop();
        input.energy_price = Some(0.001);
        let report = calculate(&input).unwrap();
        assert_eq!(report.results.payback_year, None);
        assert_eq!(report.results.snapshot(), "Payback N/A");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_summary_strings() {
        let r = calculate(&rooftop()).unwrap().results;
        assert_eq!(r.summary(), "PV size 183.15 kWp");
        assert_eq!(r.snapshot(), "Payback 7 yrs");
    }
}
