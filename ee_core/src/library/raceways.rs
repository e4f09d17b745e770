//! Raceway Catalogs
//!
//! Conduit internal diameters per conduit type and standard wireway sections,
//! together with the default fill limits applied when an input leaves them blank.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A standard wireway section (internal width × height, mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirewaySize {
    /// Internal width (mm)
    #[serde(alias = "w")]
    pub width_mm: f64,
    /// Internal height (mm)
    #[serde(alias = "h")]
    pub height_mm: f64,
}

impl WirewaySize {
    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        WirewaySize { width_mm, height_mm }
    }

    /// Internal cross-section area (mm²)
    pub fn area_mm2(&self) -> f64 {
        self.width_mm * self.height_mm
    }

    /// Display label, e.g. "150x100"
    pub fn label(&self) -> String {
        format!("{}x{}", self.width_mm, self.height_mm)
    }
}

/// Fill limits and raceway catalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillLimits {
    /// Default maximum conduit fill (%)
    pub conduit_percent: f64,
    /// Default maximum wireway fill (%)
    pub wireway_percent: f64,
    /// Internal diameters (mm) per conduit type key, ascending
    pub conduit_sizes: BTreeMap<String, Vec<f64>>,
    /// Wireway sections, ascending by area
    pub wireway_sizes: Vec<WirewaySize>,
}

impl Default for FillLimits {
    fn default() -> Self {
        let conduit_sizes = BTreeMap::from([
            (
                "pvc".to_string(),
                vec![20.0, 25.0, 32.0, 40.0, 50.0, 63.0, 75.0, 90.0, 110.0],
            ),
            (
                "emt".to_string(),
                vec![16.0, 21.0, 27.0, 35.0, 41.0, 53.0, 63.0, 78.0, 91.0],
            ),
            (
                "rmc".to_string(),
                vec![21.0, 27.0, 35.0, 41.0, 53.0, 63.0, 78.0, 91.0, 103.0],
            ),
            (
                "hdpe".to_string(),
                vec![32.0, 40.0, 50.0, 63.0, 75.0, 90.0, 110.0, 125.0],
            ),
        ]);

        FillLimits {
            conduit_percent: 40.0,
            wireway_percent: 20.0,
            conduit_sizes,
            wireway_sizes: vec![
                WirewaySize::new(100.0, 50.0),
                WirewaySize::new(150.0, 100.0),
                WirewaySize::new(200.0, 100.0),
                WirewaySize::new(300.0, 150.0),
                WirewaySize::new(400.0, 200.0),
            ],
        }
    }
}

impl FillLimits {
    /// Diameter catalog for a conduit type key, if the library has one
    pub fn conduit_catalog(&self, conduit_type: &str) -> Option<&[f64]> {
        self.conduit_sizes.get(conduit_type).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wireway_area_and_label() {
        let size = WirewaySize::new(150.0, 100.0);
        assert_eq!(size.area_mm2(), 15_000.0);
        assert_eq!(size.label(), "150x100");
    }

    #[test]
    fn test_wireway_accepts_short_keys() {
        let size: WirewaySize = serde_json::from_str(r#"{"w": 200, "h": 100}"#).unwrap();
        assert_eq!(size, WirewaySize::new(200.0, 100.0));
    }

    #[test]
    fn test_conduit_catalog_lookup() {
        let limits = FillLimits::default();
        assert_eq!(limits.conduit_catalog("emt").map(|c| c.len()), Some(9));
        assert_eq!(limits.conduit_catalog("emt").and_then(|c| c.last()), Some(&91.0));
        assert!(limits.conduit_catalog("imc").is_none());
    }
}
