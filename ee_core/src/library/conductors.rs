//! Conductor Properties
//!
//! Resistivity and temperature coefficient per conductor material, and the
//! per-size cable impedance table used for feeder impedance.
//!
//! Tables are keyed by strings so an operator-edited library can add
//! materials ("cu", "al", ...) and sizes ("25", "70", ...) without code changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Temperature at which library resistivity values are quoted (°C)
pub const REFERENCE_TEMPERATURE_C: f64 = 20.0;

/// Resistive properties of a conductor material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConductorProperties {
    /// Resistivity at 20 °C (Ω·mm²/m)
    pub resistivity: f64,
    /// Temperature coefficient of resistance (1/°C)
    pub temp_coeff: f64,
}

impl ConductorProperties {
    /// Resistance per metre (Ω/m) of one conductor of `area_mm2` at `temperature_c`.
    ///
    /// R_T = (ρ / A) × (1 + α × (T − 20))
    pub fn resistance_ohm_per_m(&self, area_mm2: f64, temperature_c: f64) -> f64 {
        let r20 = self.resistivity / area_mm2;
        r20 * (1.0 + self.temp_coeff * (temperature_c - REFERENCE_TEMPERATURE_C))
    }
}

/// Per-kilometre resistance and reactance of a cable size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CableImpedance {
    /// Resistance (Ω/km)
    pub r: f64,
    /// Reactance (Ω/km)
    pub x: f64,
}

impl CableImpedance {
    /// Used when a conductor size has no entry in the reactance table
    pub const FALLBACK: CableImpedance = CableImpedance { r: 0.3, x: 0.08 };
}

/// Table key for a conductor size: the size in mm² rounded to a whole number.
///
/// `size_key(95.0) == "95"`, `size_key(69.6) == "70"`.
pub fn size_key(size_mm2: f64) -> String {
    format!("{}", size_mm2.round() as i64)
}

pub(crate) fn default_conductors() -> BTreeMap<String, ConductorProperties> {
    BTreeMap::from([
        (
            "cu".to_string(),
            ConductorProperties {
                resistivity: 0.01724,
                temp_coeff: 0.00393,
            },
        ),
        (
            "al".to_string(),
            ConductorProperties {
                resistivity: 0.02826,
                temp_coeff: 0.00403,
            },
        ),
    ])
}

pub(crate) fn default_reactance() -> BTreeMap<String, CableImpedance> {
    [
        (25, 0.78, 0.08),
        (50, 0.39, 0.075),
        (70, 0.27, 0.07),
        (95, 0.2, 0.065),
        (120, 0.16, 0.062),
        (150, 0.13, 0.06),
    ]
    .into_iter()
    .map(|(size, r, x)| (size.to_string(), CableImpedance { r, x }))
    .collect()
}

pub(crate) fn default_cable_od() -> BTreeMap<String, f64> {
    [(25, 12.0), (50, 18.0), (70, 22.0), (95, 26.0), (120, 30.0), (150, 34.0)]
        .into_iter()
        .map(|(size, od)| (size.to_string(), od))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistance_at_reference_temperature() {
        let cu = default_conductors()["cu"];
        // 0.01724 / 70 = 2.4629e-4 Ω/m
        assert!((cu.resistance_ohm_per_m(70.0, 20.0) - 2.4629e-4).abs() < 1e-8);
    }

    #[test]
    fn test_resistance_rises_with_temperature() {
        let cu = default_conductors()["cu"];
        let r75 = cu.resistance_ohm_per_m(70.0, 75.0);
        // × (1 + 0.00393 × 55) = × 1.21615
        assert!((r75 - 2.9952e-4).abs() < 1e-8);
        assert!(r75 > cu.resistance_ohm_per_m(70.0, 20.0));
    }

    #[test]
    fn test_aluminium_more_resistive_than_copper() {
        let table = default_conductors();
        assert!(table["al"].resistance_ohm_per_m(50.0, 20.0) > table["cu"].resistance_ohm_per_m(50.0, 20.0));
    }

    #[test]
    fn test_size_key_rounds() {
        assert_eq!(size_key(95.0), "95");
        assert_eq!(size_key(69.6), "70");
        assert_eq!(size_key(120.4), "120");
    }

    #[test]
    fn test_default_tables_cover_same_sizes() {
        let reactance = default_reactance();
        let od = default_cable_od();
        assert_eq!(reactance.len(), 6);
        assert!(reactance.keys().all(|k| od.contains_key(k)));
        assert_eq!(reactance["95"], CableImpedance { r: 0.2, x: 0.065 });
    }
}
