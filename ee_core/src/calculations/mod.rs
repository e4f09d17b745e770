//! # Electrical Design Calculations
//!
//! This module contains the six calculation modules. Each one follows the
//! pattern:
//!
//! - `*Input` - Raw input fields (JSON-serializable, leniently parsed)
//! - `*Result` - Numeric results (JSON-serializable)
//! - `calculate(input, library) -> CalcResult<Report<*Result>>` - Pure calculation function
//!
//! Calculations never touch shared state: the caller passes the
//! [`LibrarySnapshot`] captured for this call, and the same input and
//! snapshot always produce the same report.
//!
//! ## Available Calculations
//!
//! - [`conduit`] - Conduit and wireway fill sizing
//! - [`voltage_drop`] - AC feeder voltage drop
//! - [`short_circuit`] - Transformer-fed fault current estimate
//! - [`power_factor`] - Capacitor bank sizing for PF correction
//! - [`power_quality`] - Rule-based power-quality diagnostics
//! - [`pv`] - PV system sizing with a 25-year cashflow ([`cashflow`])
//!
//! ## Dispatch
//!
//! [`CalculationInput`] tags an input with its module (`"module": "vdrop"`)
//! and [`CalculationInput::evaluate`] returns the [`CalcResponse`] envelope:
//! either `{"errors": [...]}` or the results with narration.

pub mod cashflow;
pub mod conduit;
pub mod power_factor;
pub mod power_quality;
pub mod pv;
pub mod short_circuit;
pub mod voltage_drop;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::library::LibrarySnapshot;

// Re-export commonly used types
pub use conduit::{ConduitInput, ConduitResult};
pub use power_factor::{PowerFactorInput, PowerFactorResult};
pub use power_quality::{PowerQualityInput, PowerQualityResult, Symptom};
pub use pv::{PvInput, PvResult};
pub use short_circuit::{FaultLocation, ShortCircuitInput, ShortCircuitResult};
pub use voltage_drop::{DropMethod, LengthMode, VoltageDropInput, VoltageDropResult};

/// Supply system: single-phase or balanced three-phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SystemPhase {
    #[serde(rename = "1ph", alias = "single", alias = "1")]
    Single,
    #[default]
    #[serde(rename = "3ph", alias = "three", alias = "3")]
    Three,
}

impl SystemPhase {
    pub fn display_name(&self) -> &'static str {
        match self {
            SystemPhase::Single => "single-phase",
            SystemPhase::Three => "three-phase",
        }
    }
}

/// A calculation's output: numeric results plus the narration around them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report<T> {
    /// Module-specific numeric results
    pub results: T,
    /// Ordered derivation narration ("Zbase = V² / S = 0.08 Ω")
    pub derivation_steps: Vec<String>,
    /// Advisory messages; never suppress the results
    pub warnings: Vec<String>,
    /// Fixed assumption notes for the module
    pub notes: Vec<String>,
}

/// One-line digests of a result, used for scenario lists and comparisons.
pub trait ResultSummary {
    /// Headline figure, e.g. "Fault current 30,275.737 A"
    fn summary(&self) -> String;
    /// Secondary figure, e.g. "Ztotal 0.013 Ω"
    fn snapshot(&self) -> String;
}

impl<T: Serialize + ResultSummary> Report<T> {
    /// Convert into the serialized response envelope
    pub fn into_response(self) -> CalcResult<CalcResponse> {
        let summary = self.results.summary();
        let snapshot = self.results.snapshot();
        let results = serde_json::to_value(&self.results).map_err(CalcError::serialization)?;
        Ok(CalcResponse::Success {
            results,
            derivation_steps: self.derivation_steps,
            warnings: self.warnings,
            notes: self.notes,
            summary,
            snapshot,
        })
    }
}

/// The call contract's output: errors or results, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalcResponse {
    Failure {
        errors: Vec<String>,
    },
    Success {
        results: serde_json::Value,
        derivation_steps: Vec<String>,
        warnings: Vec<String>,
        notes: Vec<String>,
        summary: String,
        snapshot: String,
    },
}

impl CalcResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, CalcResponse::Success { .. })
    }

    /// Error messages (empty on success)
    pub fn errors(&self) -> &[String] {
        match self {
            CalcResponse::Failure { errors } => errors,
            CalcResponse::Success { .. } => &[],
        }
    }

    /// Headline digest (None on failure)
    pub fn summary(&self) -> Option<&str> {
        match self {
            CalcResponse::Success { summary, .. } => Some(summary),
            CalcResponse::Failure { .. } => None,
        }
    }

    /// Secondary digest (None on failure)
    pub fn snapshot(&self) -> Option<&str> {
        match self {
            CalcResponse::Success { snapshot, .. } => Some(snapshot),
            CalcResponse::Failure { .. } => None,
        }
    }
}

impl From<CalcError> for CalcResponse {
    fn from(error: CalcError) -> Self {
        CalcResponse::Failure {
            errors: error.messages(),
        }
    }
}

/// The six calculation modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleKind {
    #[serde(rename = "conduit")]
    Conduit,
    #[serde(rename = "vdrop")]
    VoltageDrop,
    #[serde(rename = "shortcircuit")]
    ShortCircuit,
    #[serde(rename = "pfc")]
    PowerFactor,
    #[serde(rename = "powerquality")]
    PowerQuality,
    #[serde(rename = "pv")]
    Pv,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 6] = [
        ModuleKind::Conduit,
        ModuleKind::VoltageDrop,
        ModuleKind::ShortCircuit,
        ModuleKind::PowerFactor,
        ModuleKind::PowerQuality,
        ModuleKind::Pv,
    ];

    /// Stable module id used in input documents and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            ModuleKind::Conduit => "conduit",
            ModuleKind::VoltageDrop => "vdrop",
            ModuleKind::ShortCircuit => "shortcircuit",
            ModuleKind::PowerFactor => "pfc",
            ModuleKind::PowerQuality => "powerquality",
            ModuleKind::Pv => "pv",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ModuleKind::Conduit => "Conduit & Wireway Fill",
            ModuleKind::VoltageDrop => "Voltage Drop",
            ModuleKind::ShortCircuit => "Short-Circuit Estimate",
            ModuleKind::PowerFactor => "Power Factor Correction",
            ModuleKind::PowerQuality => "Power Quality Advisor",
            ModuleKind::Pv => "PV Sizing & Payback",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModuleKind {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        let kind = match normalized.as_str() {
            "conduit" | "wireway" => ModuleKind::Conduit,
            "vdrop" | "voltagedrop" => ModuleKind::VoltageDrop,
            "shortcircuit" | "fault" => ModuleKind::ShortCircuit,
            "pfc" | "powerfactor" => ModuleKind::PowerFactor,
            "powerquality" | "pq" => ModuleKind::PowerQuality,
            "pv" | "solar" => ModuleKind::Pv,
            _ => {
                return Err(CalcError::UnknownModule {
                    module: s.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

/// Enum wrapper for all calculation inputs.
///
/// Serialized with a `module` tag so a single document carries both the
/// module id and its fields:
///
/// ```json
/// { "module": "pfc", "kw": 500, "pf_existing": 0.75, "pf_target": 0.95, "voltage_v": 400 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module")]
pub enum CalculationInput {
    #[serde(rename = "conduit")]
    Conduit(ConduitInput),
    #[serde(rename = "vdrop")]
    VoltageDrop(VoltageDropInput),
    #[serde(rename = "shortcircuit")]
    ShortCircuit(ShortCircuitInput),
    #[serde(rename = "pfc")]
    PowerFactor(PowerFactorInput),
    #[serde(rename = "powerquality")]
    PowerQuality(PowerQualityInput),
    #[serde(rename = "pv")]
    Pv(PvInput),
}

impl CalculationInput {
    pub fn module(&self) -> ModuleKind {
        match self {
            CalculationInput::Conduit(_) => ModuleKind::Conduit,
            CalculationInput::VoltageDrop(_) => ModuleKind::VoltageDrop,
            CalculationInput::ShortCircuit(_) => ModuleKind::ShortCircuit,
            CalculationInput::PowerFactor(_) => ModuleKind::PowerFactor,
            CalculationInput::PowerQuality(_) => ModuleKind::PowerQuality,
            CalculationInput::Pv(_) => ModuleKind::Pv,
        }
    }

    /// Build an input for `module` from an untagged field document.
    ///
    /// A `module` key already present in the document is ignored in favor
    /// of the explicit module.
    pub fn from_fields(module: ModuleKind, fields: serde_json::Value) -> CalcResult<Self> {
        let mut fields = match fields {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                return Err(CalcError::serialization(format!(
                    "expected a JSON object of input fields, got {}",
                    other
                )))
            }
        };
        fields.insert(
            "module".to_string(),
            serde_json::Value::String(module.id().to_string()),
        );
        serde_json::from_value(serde_json::Value::Object(fields)).map_err(CalcError::serialization)
    }

    /// Run the calculation, keeping a failure as a typed error.
    pub fn try_evaluate(&self, library: &LibrarySnapshot) -> CalcResult<CalcResponse> {
        match self {
            CalculationInput::Conduit(input) => conduit::calculate(input, library)?.into_response(),
            CalculationInput::VoltageDrop(input) => voltage_drop::calculate(input, library)?.into_response(),
            CalculationInput::ShortCircuit(input) => short_circuit::calculate(input, library)?.into_response(),
            CalculationInput::PowerFactor(input) => power_factor::calculate(input)?.into_response(),
            CalculationInput::PowerQuality(input) => power_quality::calculate(input)?.into_response(),
            CalculationInput::Pv(input) => pv::calculate(input)?.into_response(),
        }
    }

    /// Run the calculation against the given library snapshot.
    pub fn evaluate(&self, library: &LibrarySnapshot) -> CalcResponse {
        let response = self
            .try_evaluate(library)
            .unwrap_or_else(CalcResponse::from);
        tracing::debug!(module = %self.module(), success = response.is_success(), "evaluated");
        response
    }
}
