//! # Units and Quantity Formatting
//!
//! ee_core works in SI units throughout. Values travel as plain `f64` so the
//! JSON stays clean (just numbers); the unit is carried by the field name.
//!
//! | Quantity            | Unit   | Field suffix  |
//! |---------------------|--------|---------------|
//! | Diameter, width     | mm     | `_mm`         |
//! | Cross-section area  | mm²    | `_mm2`        |
//! | Cable length        | m      | `_m`          |
//! | Impedance           | Ω      | `_ohm`        |
//! | Per-length impedance| Ω/km   | `_ohm_per_km` |
//! | Voltage             | V      | `_v`          |
//! | Current             | A      | `_a`          |
//! | Power               | kW, kVA, kvar | `_kw`, `_kva`, `_kvar` |
//!
//! Derivation narration formats quantities the way the reports always have:
//! at most three fraction digits, thousands grouped with commas.
//!
//! ## Example
//!
//! ```rust
//! use ee_core::units::{format_number, format_quantity};
//!
//! assert_eq!(format_number(2280.79626), "2,280.796");
//! assert_eq!(format_quantity(73.0, "%"), "73 %");
//! ```

use std::f64::consts::PI;

/// √3, the line-to-line factor for balanced three-phase systems
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Cross-sectional area (mm²) of a circle with the given diameter (mm)
pub fn circle_area_mm2(diameter_mm: f64) -> f64 {
    PI * (diameter_mm / 2.0).powi(2)
}

/// Convert a per-kilometre value to per-metre
pub fn per_km_to_per_m(value_per_km: f64) -> f64 {
    value_per_km / 1000.0
}

/// Format a number with up to three fraction digits and comma grouping.
///
/// Trailing zeros are dropped (`73.000` → `73`). Non-finite values are
/// rendered as `∞`, `-∞`, or `NaN`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    let mut rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        // Avoid "-0"
        rounded = 0.0;
    }

    let text = format!("{:.3}", rounded.abs());
    let text = text.trim_end_matches('0').trim_end_matches('.');
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if rounded < 0.0 {
        grouped.push('-');
    }
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Format a number followed by a unit label (`"380.133 mm²"`).
///
/// An empty unit yields just the number.
pub fn format_quantity(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        format_number(value)
    } else {
        format!("{} {}", format_number(value), unit)
    }
}
