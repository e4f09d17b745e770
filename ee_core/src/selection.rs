//! # Size Selection
//!
//! "First catalog entry that is big enough" over an ascending catalog.
//! Conduit diameters, wireway sections, and capacitor banks all use it,
//! each with its own projection onto the quantity being compared.
//!
//! ## Example
//!
//! ```rust
//! use ee_core::selection::{first_at_least, first_at_least_or_largest};
//! use ee_core::units::circle_area_mm2;
//!
//! let emt = [16.0, 21.0, 27.0, 35.0];
//! // Smallest diameter whose area holds 500 mm²
//! assert_eq!(first_at_least(&emt, 500.0, |d| circle_area_mm2(*d)), Some(&27.0));
//! // Nothing holds 5000 mm²: fall back to the largest size
//! assert_eq!(first_at_least_or_largest(&emt, 5000.0, |d| circle_area_mm2(*d)), Some(&35.0));
//! ```

/// Return the first entry whose projection is at least `required`.
///
/// The catalog is scanned in order; it is expected to be ascending in the
/// projected quantity, so the first hit is also the smallest adequate size.
pub fn first_at_least<T, F>(catalog: &[T], required: f64, projection: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    catalog.iter().find(|entry| projection(*entry) >= required)
}

/// Like [`first_at_least`], but fall back to the last (largest) entry when
/// nothing qualifies. Returns `None` only for an empty catalog.
pub fn first_at_least_or_largest<T, F>(catalog: &[T], required: f64, projection: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    first_at_least(catalog, required, projection).or_else(|| catalog.last())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_qualifies() {
        let banks = [5.0, 10.0, 15.0];
        assert_eq!(first_at_least(&banks, 10.0, |v| *v), Some(&10.0));
    }

    #[test]
    fn test_first_match_wins() {
        let banks = [5.0, 10.0, 15.0, 20.0];
        assert_eq!(first_at_least(&banks, 11.0, |v| *v), Some(&15.0));
    }

    #[test]
    fn test_no_match() {
        let banks = [5.0, 10.0];
        assert_eq!(first_at_least(&banks, 11.0, |v| *v), None);
        assert_eq!(first_at_least_or_largest(&banks, 11.0, |v| *v), Some(&10.0));
    }

    #[test]
    fn test_empty_catalog() {
        let empty: [f64; 0] = [];
        assert_eq!(first_at_least_or_largest(&empty, 1.0, |v| *v), None);
    }

    #[test]
    fn test_projection_over_pairs() {
        let wireways = [(100.0, 50.0), (150.0, 100.0), (200.0, 100.0)];
        let hit = first_at_least(&wireways, 11_404.0, |(w, h)| w * h);
        assert_eq!(hit, Some(&(150.0, 100.0)));
    }
}
