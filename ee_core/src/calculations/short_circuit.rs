//! # Short-Circuit Estimate
//!
//! Symmetrical fault current at the transformer secondary terminals or at
//! the end of a feeder, from the transformer impedance alone.
//!
//! ## Method
//!
//! ```text
//! Zbase   = V² / (kVA × 1000)
//! Zsource = (%Z / 100) × Zbase
//! Zcable  = √(r² + x²) × L / 1000 / n        (feeder faults only)
//! Ztotal  = Zsource + Zcable
//! Isc     = V / Ztotal
//! Ipeak  ≈ Isc × (1 + 0.2 × X/R)             (when X/R is given)
//! ```
//!
//! ## Limitations
//!
//! - Transformer contribution only; the utility source impedance is ignored
//! - Source and cable impedances are added as magnitudes, not as R + jX
//!   phasors, which understates Ztotal slightly when their angles differ
//!
//! ## Example
//!
//! ```rust
//! use ee_core::calculations::short_circuit::{calculate, ShortCircuitInput};
//! use ee_core::library::LibrarySnapshot;
//!
//! let input = ShortCircuitInput {
//!     kva: Some(2000.0),
//!     secondary_v: Some(400.0),
//!     percent_z: Some(6.0),
//!     ..Default::default()
//! };
//!
//! let report = calculate(&input, &LibrarySnapshot::default()).unwrap();
//! // 400 V / 0.0048 Ω
//! assert!((report.results.fault_current_a - 83_333.33).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::library::{CableImpedance, LibrarySnapshot};
use crate::units::{format_number, format_quantity, per_km_to_per_m};
use crate::validation::Validator;

use super::{Report, ResultSummary};

/// Where the fault is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FaultLocation {
    /// Transformer secondary terminals
    #[default]
    #[serde(rename = "terminal", alias = "terminals", alias = "transformer")]
    Terminals,
    /// Load end of a feeder
    #[serde(rename = "feeder")]
    Feeder,
}

/// Input parameters for a short-circuit estimate.
///
/// ## JSON Example
///
/// ```json
/// {
///   "kva": 2000,
///   "secondary_v": 400,
///   "percent_z": 6,
///   "xr_ratio": 8,
///   "fault_location": "feeder",
///   "feeder_length_m": 80,
///   "conductor_size_mm2": 95,
///   "parallel_runs": 2
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortCircuitInput {
    /// Transformer rating (kVA)
    #[serde(default, with = "crate::validation::lenient")]
    pub kva: Option<f64>,

    /// Secondary line voltage (V)
    #[serde(default, with = "crate::validation::lenient")]
    pub secondary_v: Option<f64>,

    /// Transformer impedance (%)
    #[serde(default, with = "crate::validation::lenient")]
    pub percent_z: Option<f64>,

    /// X/R ratio; blank omits the peak estimate
    #[serde(default, with = "crate::validation::lenient")]
    pub xr_ratio: Option<f64>,

    #[serde(default)]
    pub fault_location: FaultLocation,

    /// Feeder length (m); blank counts as 0 for feeder faults
    #[serde(default, with = "crate::validation::lenient")]
    pub feeder_length_m: Option<f64>,

    /// Feeder conductor size (mm²); blank uses the fallback impedance
    #[serde(default, with = "crate::validation::lenient")]
    pub conductor_size_mm2: Option<f64>,

    /// Feeder conductors in parallel per phase (minimum 1)
    #[serde(default, with = "crate::validation::lenient")]
    pub parallel_runs: Option<f64>,
}

/// Results from a short-circuit estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortCircuitResult {
    pub location: FaultLocation,
    /// Base impedance (Ω)
    pub z_base_ohm: f64,
    /// Transformer impedance (Ω)
    pub z_source_ohm: f64,
    /// Per-km cable impedance used, for feeder faults
    pub cable_impedance: Option<CableImpedance>,
    /// Feeder impedance magnitude (Ω); zero at the terminals
    pub z_cable_ohm: f64,
    /// Zsource + Zcable (Ω)
    pub z_total_ohm: f64,
    /// Symmetrical RMS fault current (A)
    pub fault_current_a: f64,
    /// Fault current at the transformer terminals, V / Zsource (A)
    pub terminal_fault_current_a: f64,
    /// Peak making current estimate (A)
    pub peak_current_a: Option<f64>,
}

impl ResultSummary for ShortCircuitResult {
    fn summary(&self) -> String {
        format!("Fault current {}", format_quantity(self.fault_current_a, "A"))
    }

    fn snapshot(&self) -> String {
        format!("Ztotal {}", format_quantity(self.z_total_ohm, "Ω"))
    }
}

/// Feeder field that takes part in the estimate: present, finite and positive
fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Estimate the prospective fault current.
///
/// A feeder fault with no usable length treats the feeder impedance as 0;
/// a missing conductor size uses [`CableImpedance::FALLBACK`]. Both add a
/// warning.
///
/// # Returns
///
/// * `Ok(Report<ShortCircuitResult>)` - Impedances, fault and peak currents
/// * `Err(CalcError::InvalidInput)` - Missing kVA, voltage, or %Z
pub fn calculate(input: &ShortCircuitInput, library: &LibrarySnapshot) -> CalcResult<Report<ShortCircuitResult>> {
    let mut v = Validator::new();
    let kva = v.positive("kva", "Transformer kVA", input.kva);
    let voltage = v.positive("secondary_v", "Secondary voltage", input.secondary_v);
    let percent_z = v.positive("percent_z", "%Z", input.percent_z);
    let xr_ratio = v.finite("xr_ratio", "X/R ratio", input.xr_ratio);
    let parallel = v
        .finite("parallel_runs", "Parallel runs", input.parallel_runs)
        .unwrap_or(1.0)
        .max(1.0);
    v.finish()?;

    let mut warnings = Vec::new();
    let feeder = match input.fault_location {
        FaultLocation::Feeder => {
            let length = usable(input.feeder_length_m).unwrap_or_else(|| {
                warnings.push("Feeder length not given; feeder impedance taken as 0.".to_string());
                0.0
            });
            Some((length, usable(input.conductor_size_mm2)))
        }
        FaultLocation::Terminals => None,
    };

    let z_base = voltage.powi(2) / (kva * 1000.0);
    let z_source = percent_z / 100.0 * z_base;
    let terminal_fault_current = voltage / z_source;

    let mut steps = vec![
        format!("Zbase = V² / S = {}", format_quantity(z_base, "Ω")),
        format!("Zsource = %Z × Zbase = {}", format_quantity(z_source, "Ω")),
    ];

    let (cable_impedance, z_cable) = match feeder {
        Some((length, size_mm2)) => {
            let per_km = match size_mm2.and_then(|size| library.cable_impedance(size)) {
                Some(z) => z,
                None => {
                    let cable = size_mm2
                        .map(|size| format!("{} cable", format_quantity(size, "mm²")))
                        .unwrap_or_else(|| "unspecified conductor size".to_string());
                    warnings.push(format!(
                        "No library impedance for {}; {} + j{} Ω/km assumed.",
                        cable,
                        format_number(CableImpedance::FALLBACK.r),
                        format_number(CableImpedance::FALLBACK.x)
                    ));
                    CableImpedance::FALLBACK
                }
            };
            let r = per_km_to_per_m(per_km.r) * length;
            let x = per_km_to_per_m(per_km.x) * length;
            let z_cable = (r.powi(2) + x.powi(2)).sqrt() / parallel;
            steps.push(format!(
                "Zcable = √(R² + X²) / parallel runs = {}",
                format_quantity(z_cable, "Ω")
            ));
            (Some(per_km), z_cable)
        }
        None => {
            steps.push(format!("Zcable = {} (fault at transformer terminals)", format_quantity(0.0, "Ω")));
            (None, 0.0)
        }
    };

    let z_total = z_source + z_cable;
    let fault_current = voltage / z_total;
    let peak_current = xr_ratio
        .filter(|xr| *xr > 0.0)
        .map(|xr| fault_current * (1.0 + 0.2 * xr));

    steps.push(format!("Ztotal = Zsource + Zcable = {}", format_quantity(z_total, "Ω")));
    steps.push(format!("Isc = V / Ztotal = {}", format_quantity(fault_current, "A")));
    if let Some(peak) = peak_current {
        steps.push(format!("Ipeak ≈ Isc × (1 + 0.2 × X/R) = {}", format_quantity(peak, "A")));
    }

    tracing::debug!(z_total, fault_current, "short-circuit estimate complete");

    Ok(Report {
        results: ShortCircuitResult {
            location: input.fault_location,
            z_base_ohm: z_base,
            z_source_ohm: z_source,
            cable_impedance,
            z_cable_ohm: z_cable,
            z_total_ohm: z_total,
            fault_current_a: fault_current,
            terminal_fault_current_a: terminal_fault_current,
            peak_current_a: peak_current,
        },
        derivation_steps: steps,
        warnings,
        notes: vec![
            "Transformer contribution only. Upstream utility impedance not included.".to_string(),
            "Cable impedance based on editable library values.".to_string(),
            "Safety note: results are preliminary estimates. Validate with detailed short-circuit study."
                .to_string(),
        ],
    })
}
