//! # Property Library
//!
//! Physical-property tables and raceway catalogs read by the calculation
//! modules. A [`LibrarySnapshot`] is immutable for the duration of a call:
//! every calculation takes `&LibrarySnapshot`, and edits produce a new
//! snapshot that replaces the old one wholesale (see [`LibraryStore`]).
//!
//! ## Tables
//!
//! - **conductors**: material key → resistivity (Ω·mm²/m) and temperature coefficient
//! - **reactance**: size key (mm²) → R and X per km
//! - **cable_od**: size key (mm²) → typical cable outer diameter (mm)
//! - **fill_limits**: default fill percentages, conduit and wireway catalogs
//!
//! ## Example
//!
//! ```rust
//! use ee_core::library::LibrarySnapshot;
//!
//! let library = LibrarySnapshot::default();
//! assert!(library.validate().is_ok());
//! assert_eq!(library.fill_limits.conduit_percent, 40.0);
//!
//! let cu = library.conductor("cu").expect("copper is built in");
//! assert!((cu.resistivity - 0.01724).abs() < 1e-9);
//! ```

pub mod conductors;
pub mod raceways;
pub mod store;

pub use conductors::{size_key, CableImpedance, ConductorProperties, REFERENCE_TEMPERATURE_C};
pub use raceways::{FillLimits, WirewaySize};
pub use store::LibraryStore;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Built once and shared by every caller that uses the defaults
static DEFAULT_LIBRARY: Lazy<LibrarySnapshot> = Lazy::new(|| LibrarySnapshot {
    conductors: conductors::default_conductors(),
    reactance: conductors::default_reactance(),
    cable_od: conductors::default_cable_od(),
    fill_limits: FillLimits::default(),
});

/// Get a reference to the built-in default library
pub fn default_library() -> &'static LibrarySnapshot {
    &DEFAULT_LIBRARY
}

/// Immutable set of property tables used by one calculation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    /// Conductor material properties keyed by material ("cu", "al")
    pub conductors: BTreeMap<String, ConductorProperties>,
    /// Cable R/X per km keyed by size in mm² ("70")
    pub reactance: BTreeMap<String, CableImpedance>,
    /// Typical cable outer diameter (mm) keyed by size in mm²
    pub cable_od: BTreeMap<String, f64>,
    /// Fill limits and raceway catalogs
    pub fill_limits: FillLimits,
}

impl Default for LibrarySnapshot {
    fn default() -> Self {
        DEFAULT_LIBRARY.clone()
    }
}

impl LibrarySnapshot {
    /// Look up a conductor material
    pub fn conductor(&self, material: &str) -> Option<&ConductorProperties> {
        self.conductors.get(material)
    }

    /// Cable impedance for a conductor size, if the table has one
    pub fn cable_impedance(&self, size_mm2: f64) -> Option<CableImpedance> {
        self.reactance.get(&size_key(size_mm2)).copied()
    }

    /// Typical outer diameter for a conductor size, if the table has one
    pub fn cable_od_mm(&self, size_mm2: f64) -> Option<f64> {
        self.cable_od.get(&size_key(size_mm2)).copied()
    }

    /// Parse a snapshot from JSON and check its invariants
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let snapshot: LibrarySnapshot = serde_json::from_str(json).map_err(CalcError::serialization)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the table invariants.
    ///
    /// - at least one conductor material, with positive resistivity
    /// - every catalog non-empty and strictly ascending
    /// - fill percentages in (0, 100]
    ///
    /// Calculations do not call this; it guards snapshot replacement.
    pub fn validate(&self) -> CalcResult<()> {
        if self.conductors.is_empty() {
            return Err(CalcError::invalid_library("conductor table is empty"));
        }
        for (material, props) in &self.conductors {
            if !(props.resistivity.is_finite() && props.resistivity > 0.0) || !props.temp_coeff.is_finite() {
                return Err(CalcError::invalid_library(format!(
                    "conductor '{}' needs a positive resistivity and a finite temperature coefficient",
                    material
                )));
            }
        }

        let limits = &self.fill_limits;
        check_percent("conduit_percent", limits.conduit_percent)?;
        check_percent("wireway_percent", limits.wireway_percent)?;

        if limits.conduit_sizes.is_empty() {
            return Err(CalcError::invalid_library("no conduit catalogs defined"));
        }
        for (conduit_type, sizes) in &limits.conduit_sizes {
            check_ascending(&format!("conduit catalog '{}'", conduit_type), sizes)?;
        }

        let wireway_areas: Vec<f64> = limits.wireway_sizes.iter().map(WirewaySize::area_mm2).collect();
        check_ascending("wireway catalog", &wireway_areas)?;

        Ok(())
    }
}

fn check_percent(name: &str, value: f64) -> CalcResult<()> {
    if value.is_finite() && value > 0.0 && value <= 100.0 {
        Ok(())
    } else {
        Err(CalcError::invalid_library(format!(
            "{} must be in (0, 100], got {}",
            name, value
        )))
    }
}

fn check_ascending(name: &str, values: &[f64]) -> CalcResult<()> {
    if values.is_empty() {
        return Err(CalcError::invalid_library(format!("{} is empty", name)));
    }
    if values.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
        return Err(CalcError::invalid_library(format!(
            "{} contains a non-positive entry",
            name
        )));
    }
    if values.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(CalcError::invalid_library(format!(
            "{} must be sorted ascending",
            name
        )));
    }
    Ok(())
}
