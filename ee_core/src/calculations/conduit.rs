//! # Conduit & Wireway Fill Sizing
//!
//! Sizes a conduit and a wireway for a bundle of identical cables.
//!
//! ## Method
//!
//! ```text
//! A_cable    = π × (OD/2)²
//! A_total    = A_cable × (phase + neutral + ground + spare)
//! A_req      = A_total / fill_limit            (conduit and wireway limits)
//! fill %     = A_total / A_installed × 100
//! ```
//!
//! The recommended conduit is the smallest catalog diameter (for the chosen
//! conduit type) whose internal area reaches `A_req`; if none does, the
//! largest size is recommended. Wireways are picked the same way by W × H.
//!
//! ## Assumptions
//!
//! - Every conductor has the same outer diameter (the cable OD input)
//! - Fill limits left blank default to the library percentages
//!
//! ## Example
//!
//! ```rust
//! use ee_core::calculations::conduit::{calculate, ConduitInput};
//! use ee_core::library::LibrarySnapshot;
//!
//! let input = ConduitInput {
//!     conductor_size_mm2: Some(70.0),
//!     phase_count: Some(3.0),
//!     neutral_count: Some(1.0),
//!     ground_count: Some(1.0),
//!     spare_count: Some(1.0),
//!     cable_od_mm: Some(22.0),
//!     conduit_type: "emt".to_string(),
//!     conduit_id_mm: Some(63.0),
//!     wireway_width_mm: Some(200.0),
//!     wireway_height_mm: Some(100.0),
//!     ..Default::default()
//! };
//!
//! let report = calculate(&input, &LibrarySnapshot::default()).unwrap();
//! assert_eq!(report.results.recommended_conduit_mm, Some(91.0));
//! assert!(report.results.conduit_fill_percent > 73.0);
//! assert!(!report.warnings.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::library::{LibrarySnapshot, WirewaySize};
use crate::selection::first_at_least_or_largest;
use crate::units::{circle_area_mm2, format_number, format_quantity};
use crate::validation::Validator;

use super::{Report, ResultSummary};

/// Input parameters for conduit and wireway sizing.
///
/// ## JSON Example
///
/// ```json
/// {
///   "conductor_size_mm2": 70,
///   "phase_count": 3,
///   "neutral_count": 1,
///   "ground_count": 1,
///   "spare_count": 1,
///   "cable_od_mm": 22,
///   "conduit_type": "emt",
///   "conduit_id_mm": 63,
///   "conduit_fill_percent": 40,
///   "wireway_fill_percent": 20,
///   "wireway_width_mm": 200,
///   "wireway_height_mm": 100
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConduitInput {
    /// Conductor cross-section (mm²)
    #[serde(default, with = "crate::validation::lenient")]
    pub conductor_size_mm2: Option<f64>,

    /// Number of phase conductors
    #[serde(default, with = "crate::validation::lenient")]
    pub phase_count: Option<f64>,

    /// Number of neutral conductors
    #[serde(default, with = "crate::validation::lenient")]
    pub neutral_count: Option<f64>,

    /// Number of protective earth conductors
    #[serde(default, with = "crate::validation::lenient")]
    pub ground_count: Option<f64>,

    /// Number of spare conductors
    #[serde(default, with = "crate::validation::lenient")]
    pub spare_count: Option<f64>,

    /// Cable outer diameter, applied to every conductor (mm)
    #[serde(default, with = "crate::validation::lenient")]
    pub cable_od_mm: Option<f64>,

    /// Conduit catalog key ("pvc", "emt", "rmc", "hdpe")
    #[serde(default)]
    pub conduit_type: String,

    /// Installed conduit internal diameter (mm)
    #[serde(default, with = "crate::validation::lenient")]
    pub conduit_id_mm: Option<f64>,

    /// Maximum conduit fill (%); blank uses the library default
    #[serde(default, with = "crate::validation::lenient")]
    pub conduit_fill_percent: Option<f64>,

    /// Maximum wireway fill (%); blank uses the library default
    #[serde(default, with = "crate::validation::lenient")]
    pub wireway_fill_percent: Option<f64>,

    /// Installed wireway internal width (mm)
    #[serde(default, with = "crate::validation::lenient")]
    pub wireway_width_mm: Option<f64>,

    /// Installed wireway internal height (mm)
    #[serde(default, with = "crate::validation::lenient")]
    pub wireway_height_mm: Option<f64>,
}

/// Conductor role within the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductorRole {
    Phase,
    Neutral,
    Ground,
    Spare,
}

impl ConductorRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConductorRole::Phase => "Phase",
            ConductorRole::Neutral => "Neutral",
            ConductorRole::Ground => "Ground",
            ConductorRole::Spare => "Spares",
        }
    }
}

/// One line of the conductor summary table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConductorRow {
    pub role: ConductorRole,
    /// Conductors in this role; any finite value ≥ 0
    pub count: f64,
    /// Assumed outer diameter (mm)
    pub od_mm: f64,
}

/// Results from conduit and wireway sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConduitResult {
    /// Sum of all role counts
    pub total_conductors: f64,
    /// Area of one cable (mm²)
    pub cable_area_mm2: f64,
    /// Area of the whole bundle (mm²)
    pub total_area_mm2: f64,

    /// Conduit fill limit applied (%)
    pub conduit_fill_limit_percent: f64,
    /// Wireway fill limit applied (%)
    pub wireway_fill_limit_percent: f64,

    /// Conduit internal area needed to respect the fill limit (mm²)
    pub required_conduit_area_mm2: f64,
    /// Wireway internal area needed to respect the fill limit (mm²)
    pub required_wireway_area_mm2: f64,

    /// Internal area of the installed conduit (mm²)
    pub installed_conduit_area_mm2: f64,
    /// Actual fill of the installed conduit (%)
    pub conduit_fill_percent: f64,

    /// Actual fill of the installed wireway (%), when its dimensions were given
    pub wireway_fill_percent: Option<f64>,

    /// Recommended conduit internal diameter (mm); `None` if the conduit
    /// type has no catalog in the library
    pub recommended_conduit_mm: Option<f64>,
    /// Recommended wireway section
    pub recommended_wireway: Option<WirewaySize>,

    /// Per-role conductor counts
    pub conductor_summary: Vec<ConductorRow>,
}

impl ConduitResult {
    /// Check that the installed conduit respects its fill limit
    pub fn conduit_within_limit(&self) -> bool {
        self.conduit_fill_percent <= self.conduit_fill_limit_percent
    }
}

impl ResultSummary for ConduitResult {
    fn summary(&self) -> String {
        let wireway = self
            .wireway_fill_percent
            .map(|fill| format_quantity(fill, "%"))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "Conduit fill {}, wireway fill {}",
            format_quantity(self.conduit_fill_percent, "%"),
            wireway
        )
    }

    fn snapshot(&self) -> String {
        let conduit = self
            .recommended_conduit_mm
            .map(format_number)
            .unwrap_or_else(|| "custom".to_string());
        let wireway = self
            .recommended_wireway
            .map(|w| w.label())
            .unwrap_or_else(|| "custom".to_string());
        format!("Conduit {} mm, wireway {} mm", conduit, wireway)
    }
}

fn effective_limit(requested: Option<f64>, default_percent: f64) -> f64 {
    requested
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(default_percent)
}

/// Size a conduit and wireway for the given conductor bundle.
///
/// # Returns
///
/// * `Ok(Report<ConduitResult>)` - Sizing results, derivation, and fill warnings
/// * `Err(CalcError::InvalidInput)` - Every rejected field (size, OD, conduit ID,
///   negative counts)
pub fn calculate(input: &ConduitInput, library: &LibrarySnapshot) -> CalcResult<Report<ConduitResult>> {
    let mut v = Validator::new();
    let size_mm2 = v.positive("conductor_size_mm2", "Conductor size", input.conductor_size_mm2);
    let cable_od = v.positive("cable_od_mm", "Cable OD", input.cable_od_mm);
    let conduit_id = v.positive("conduit_id_mm", "Conduit internal diameter", input.conduit_id_mm);

    let roles = [
        (ConductorRole::Phase, "phase_count", "Phase count", input.phase_count),
        (ConductorRole::Neutral, "neutral_count", "Neutral count", input.neutral_count),
        (ConductorRole::Ground, "ground_count", "Ground count", input.ground_count),
        (ConductorRole::Spare, "spare_count", "Spare count", input.spare_count),
    ];
    let conductor_summary: Vec<ConductorRow> = roles
        .iter()
        .map(|(role, field, label, value)| ConductorRow {
            role: *role,
            count: v.non_negative(field, label, *value),
            od_mm: cable_od,
        })
        .collect();

    let wireway_width = v.finite("wireway_width_mm", "Wireway width", input.wireway_width_mm);
    let wireway_height = v.finite("wireway_height_mm", "Wireway height", input.wireway_height_mm);

    let limits = &library.fill_limits;
    let conduit_limit = effective_limit(input.conduit_fill_percent, limits.conduit_percent);
    let wireway_limit = effective_limit(input.wireway_fill_percent, limits.wireway_percent);

    let total_conductors: f64 = conductor_summary.iter().map(|row| row.count).sum();
    if !total_conductors.is_finite() {
        v.reject(
            "total_conductors",
            total_conductors.to_string(),
            "Total conductor count is too large.",
        );
    }
    v.finish()?;

    let cable_area = circle_area_mm2(cable_od);
    let total_area = cable_area * total_conductors;

    let required_conduit_area = total_area / (conduit_limit / 100.0);
    let required_wireway_area = total_area / (wireway_limit / 100.0);

    let installed_conduit_area = circle_area_mm2(conduit_id);
    let conduit_fill_percent = total_area / installed_conduit_area * 100.0;

    let installed_wireway_area = match (wireway_width, wireway_height) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some(w * h),
        _ => None,
    };
    let wireway_fill_percent = installed_wireway_area.map(|area| total_area / area * 100.0);

    let mut warnings = Vec::new();

    let conduit_type = input.conduit_type.trim().to_lowercase();
    let recommended_conduit_mm = match limits.conduit_catalog(&conduit_type) {
        Some(catalog) => {
            first_at_least_or_largest(catalog, required_conduit_area, |d| circle_area_mm2(*d)).copied()
        }
        None => {
            warnings.push(format!(
                "No conduit catalog for type '{}'; size the conduit manually.",
                input.conduit_type
            ));
            None
        }
    };
    let recommended_wireway =
        first_at_least_or_largest(&limits.wireway_sizes, required_wireway_area, WirewaySize::area_mm2).copied();

    if conduit_fill_percent > conduit_limit {
        warnings.push(format!(
            "Conduit fill {} exceeds the {} limit.",
            format_quantity(conduit_fill_percent, "%"),
            format_quantity(conduit_limit, "%")
        ));
    }
    if let Some(fill) = wireway_fill_percent {
        if fill > wireway_limit {
            warnings.push(format!(
                "Wireway fill {} exceeds the {} limit.",
                format_quantity(fill, "%"),
                format_quantity(wireway_limit, "%")
            ));
        }
    }

    let mut steps = vec![
        format!("Total conductors = {} conductors", format_number(total_conductors)),
        format!("Cable area = π × (OD/2)² = {}", format_quantity(cable_area, "mm²")),
        format!("Total conductor area = {}", format_quantity(total_area, "mm²")),
        format!(
            "Required conduit area = Total area / fill limit = {}",
            format_quantity(required_conduit_area, "mm²")
        ),
        format!(
            "Required wireway area = Total area / wireway fill = {}",
            format_quantity(required_wireway_area, "mm²")
        ),
        format!(
            "Conduit fill = Total area / (π × (ID/2)²) × 100 = {}",
            format_quantity(conduit_fill_percent, "%")
        ),
    ];
    if let Some(fill) = wireway_fill_percent {
        steps.push(format!(
            "Wireway fill = Total area / (W × H) × 100 = {}",
            format_quantity(fill, "%")
        ));
    }
    steps.extend(conductor_summary.iter().filter(|row| row.count > 0.0).map(|row| {
        format!(
            "{}: {} × {}",
            row.role.display_name(),
            format_number(row.count),
            format_quantity(row.od_mm, "mm")
        )
    }));
    if let Some(library_od) = library.cable_od_mm(size_mm2) {
        steps.push(format!(
            "Library OD reference for {} cable = {}",
            format_quantity(size_mm2, "mm²"),
            format_quantity(library_od, "mm")
        ));
    }

    let results = ConduitResult {
        total_conductors,
        cable_area_mm2: cable_area,
        total_area_mm2: total_area,
        conduit_fill_limit_percent: conduit_limit,
        wireway_fill_limit_percent: wireway_limit,
        required_conduit_area_mm2: required_conduit_area,
        required_wireway_area_mm2: required_wireway_area,
        installed_conduit_area_mm2: installed_conduit_area,
        conduit_fill_percent,
        wireway_fill_percent,
        recommended_conduit_mm,
        recommended_wireway,
        conductor_summary,
    };

    tracing::debug!(
        total_conductors,
        fill_percent = conduit_fill_percent,
        recommended = ?results.recommended_conduit_mm,
        "conduit sizing complete"
    );

    Ok(Report {
        results,
        derivation_steps: steps,
        warnings,
        notes: vec![
            "Uses user-defined cable OD for all conductors.".to_string(),
            "Conduit and wireway catalogs come from the editable property library.".to_string(),
        ],
    })
}
