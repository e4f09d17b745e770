//! # Input Validation
//!
//! Calculation inputs arrive as loosely typed documents: form fields that
//! may be numbers, numeric strings, blanks, or garbage. This module turns
//! them into `Option<f64>` and checks them in one batch.
//!
//! - [`lenient`] - serde adapter: number / numeric string / bool → `Option<f64>`
//! - [`Validator`] - collects every violation, then fails once with all of them
//!
//! ## Example
//!
//! ```rust
//! use ee_core::validation::Validator;
//!
//! let mut v = Validator::new();
//! let kva = v.positive("kva", "Transformer kVA", Some(2000.0));
//! let _volts = v.positive("secondary_v", "Secondary voltage", None);
//! let _z = v.positive("percent_z", "%Z", Some(0.0));
//!
//! let err = v.finish().unwrap_err();
//! assert_eq!(err.violations().len(), 2);
//! assert_eq!(kva, 2000.0);
//! ```

use crate::errors::{CalcError, CalcResult, Violation};

/// Serde adapter for raw numeric fields.
///
/// Use with `#[serde(default, with = "crate::validation::lenient")]` on an
/// `Option<f64>` field.
///
/// | Raw value              | Parsed        |
/// |------------------------|---------------|
/// | absent, `null`, `""`   | `None`        |
/// | `400`, `"400"`, `" 4e2 "` | `Some(400.0)` |
/// | `true` / `false`       | `Some(1.0)` / `Some(0.0)` |
/// | `"abc"`                | `Some(NaN)` (rejected later as non-numeric) |
pub mod lenient {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Number(f64),
        Text(String),
        Flag(bool),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawNumber> = Option::deserialize(deserializer)?;
        Ok(match raw {
            None => None,
            Some(RawNumber::Number(value)) => Some(value),
            Some(RawNumber::Flag(flag)) => Some(if flag { 1.0 } else { 0.0 }),
            Some(RawNumber::Text(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
                }
            }
        })
    }

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) if v.is_finite() => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

fn raw_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Batch validator for a module's required-field set.
///
/// Each check returns a usable value (the parsed number, or a neutral
/// placeholder when the check failed) so callers can read all fields first
/// and call [`Validator::finish`] once before doing arithmetic.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Validator::default()
    }

    /// Required field: must be present, finite, and greater than zero.
    pub fn positive(&mut self, field: &str, label: &str, value: Option<f64>) -> f64 {
        match value {
            Some(v) if v.is_finite() && v > 0.0 => v,
            other => {
                self.violations.push(Violation::new(
                    field,
                    raw_text(other),
                    format!("{} must be greater than 0.", label),
                ));
                0.0
            }
        }
    }

    /// Optional count-like field: absent means zero, otherwise finite and ≥ 0.
    pub fn non_negative(&mut self, field: &str, label: &str, value: Option<f64>) -> f64 {
        match value {
            None => 0.0,
            Some(v) if v.is_finite() && v >= 0.0 => v,
            Some(v) => {
                self.violations.push(Violation::new(
                    field,
                    v.to_string(),
                    format!("{} cannot be negative.", label),
                ));
                0.0
            }
        }
    }

    /// Optional field: passes through `None`, rejects non-numeric values.
    pub fn finite(&mut self, field: &str, label: &str, value: Option<f64>) -> Option<f64> {
        match value {
            Some(v) if !v.is_finite() => {
                self.violations.push(Violation::new(
                    field,
                    v.to_string(),
                    format!("{} must be a number.", label),
                ));
                None
            }
            other => other,
        }
    }

    /// Record a violation found by a cross-field or lookup check.
    pub fn reject(&mut self, field: &str, value: impl Into<String>, reason: impl Into<String>) {
        self.violations.push(Violation::new(field, value, reason));
    }

    /// Whether any violation has been recorded so far
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Finish the batch: `Ok(())` if clean, otherwise every violation at once.
    pub fn finish(self) -> CalcResult<()> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(count = self.violations.len(), "input rejected");
            Err(CalcError::InvalidInput {
                violations: self.violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, with = "lenient")]
        value: Option<f64>,
    }

    fn parse(json: &str) -> Option<f64> {
        serde_json::from_str::<Form>(json).unwrap().value
    }

    #[test]
    fn test_lenient_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse(r#"{"value": 400}"#), Some(400.0));
        assert_eq!(parse(r#"{"value": "0.9"}"#), Some(0.9));
        assert_eq!(parse(r#"{"value": " 12.5 "}"#), Some(12.5));
        assert_eq!(parse(r#"{"value": true}"#), Some(1.0));
    }

    #[test]
    fn test_lenient_blank_and_absent_are_none() {
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"value": null}"#), None);
        assert_eq!(parse(r#"{"value": "  "}"#), None);
    }

    #[test]
    fn test_lenient_garbage_is_nan() {
        assert!(parse(r#"{"value": "abc"}"#).unwrap().is_nan());
    }

    #[test]
    fn test_positive_collects_all_violations() {
        let mut v = Validator::new();
        v.positive("a", "A", None);
        v.positive("b", "B", Some(-1.0));
        v.positive("c", "C", Some(f64::NAN));
        v.positive("d", "D", Some(f64::INFINITY));
        assert_eq!(v.positive("e", "E", Some(3.0)), 3.0);

        let err = v.finish().unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|x| x.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b", "c", "d"]);
        assert_eq!(err.violations()[1].reason, "B must be greater than 0.");
    }

    #[test]
    fn test_non_negative_allows_zero_and_absent() {
        let mut v = Validator::new();
        assert_eq!(v.non_negative("n", "Count", None), 0.0);
        assert_eq!(v.non_negative("n", "Count", Some(0.0)), 0.0);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.non_negative("n", "Neutral count", Some(-1.0));
        assert_eq!(v.finish().unwrap_err().violations()[0].reason, "Neutral count cannot be negative.");
    }

    #[test]
    fn test_finite_passes_none_through() {
        let mut v = Validator::new();
        assert_eq!(v.finite("x", "X", None), None);
        assert_eq!(v.finite("x", "X", Some(-2.0)), Some(-2.0));
        assert!(!v.has_violations());
        assert_eq!(v.finite("x", "X", Some(f64::NAN)), None);
        assert!(v.has_violations());
    }
}
