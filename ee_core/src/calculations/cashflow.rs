//! Cashflow projection for PV sizing.
//!
//! Revenue escalates yearly; O&M is a flat share of capex. Cumulative cash
//! starts at −capex and payback is the first year it reaches zero.

use serde::{Deserialize, Serialize};

/// Length of the projection (years)
pub const PROJECTION_YEARS: u32 = 25;

/// Financial parameters for the projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashflowParams {
    /// Net upfront cost after incentives
    pub capex: f64,
    /// First-year energy production (kWh)
    pub annual_energy_kwh: f64,
    /// Energy price in year 1 (per kWh)
    pub energy_price: f64,
    /// Yearly price escalation as a fraction (0.02 = 2 %)
    pub escalation: f64,
    /// Yearly O&M cost as a fraction of capex
    pub om_fraction: f64,
}

/// One year of the projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashflowRow {
    pub year: u32,
    pub revenue: f64,
    pub om_cost: f64,
    /// revenue − om_cost
    pub net: f64,
    /// Running total including −capex
    pub cumulative: f64,
}

/// Full projection: one row per year plus the payback year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowProjection {
    pub rows: Vec<CashflowRow>,
    /// First year with cumulative ≥ 0; `None` if never reached
    pub payback_year: Option<u32>,
}

/// Project the cashflow over [`PROJECTION_YEARS`] years.
pub fn project(params: &CashflowParams) -> CashflowProjection {
    let om_cost = params.capex * params.om_fraction;
    let mut cumulative = -params.capex;
    let mut payback_year = None;
    let mut rows = Vec::with_capacity(PROJECTION_YEARS as usize);

    for year in 1..=PROJECTION_YEARS {
        let growth = (1.0 + params.escalation).powi(year as i32 - 1);
        let revenue = params.annual_energy_kwh * params.energy_price * growth;
        let net = revenue - om_cost;
        cumulative += net;
        if payback_year.is_none() && cumulative >= 0.0 {
            payback_year = Some(year);
        }
        rows.push(CashflowRow {
            year,
            revenue,
            om_cost,
            net,
            cumulative,
        });
    }

    CashflowProjection { rows, payback_year }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> CashflowParams {
        CashflowParams {
            capex: 164_835.0,
            annual_energy_kwh: 219_780.0,
            energy_price: 0.12,
            escalation: 0.02,
            om_fraction: 0.015,
        }
    }

    #[test]
    fn test_first_year() {
        let projection = project(&reference());
        let first = projection.rows[0];
        assert_eq!(first.year, 1);
        assert!((first.revenue - 26_373.6).abs() < 1e-6);
        assert!((first.om_cost - 2_472.525).abs() < 1e-6);
        assert!((first.net - 23_901.075).abs() < 1e-6);
        assert!((first.cumulative - (-164_835.0 + 23_901.075)).abs() < 1e-6);
    }

    #[test]
    fn test_payback_is_first_crossing() {
        let projection = project(&reference());
        assert_eq!(projection.rows.len(), 25);
        assert_eq!(projection.payback_year, Some(7));
        assert!(projection.rows[5].cumulative < 0.0);
        assert!(projection.rows[6].cumulative >= 0.0);
    }

    #[test]
    fn test_cumulative_accumulates_net() {
        let projection = project(&reference());
        let mut running = -reference().capex;
        for row in &projection.rows {
            running += row.net;
            assert!((row.cumulative - running).abs() < 1e-6);
        }
        assert!((projection.rows[24].cumulative - 618_106.19).abs() < 0.1);
    }

    #[test]
    fn test_om_is_flat() {
        let projection = project(&reference());
        assert!(projection.rows.iter().all(|r| r.om_cost == projection.rows[0].om_cost));
    }

    #[test]
    fn test_payback_never_reached() {
        let params = CashflowParams {
            energy_price: 0.001,
            ..reference()
        };
        assert_eq!(project(&params).payback_year, None);
    }

    #[test]
    fn test_zero_capex_pays_back_in_first_year() {
        let params = CashflowParams {
            capex: 0.0,
            ..reference()
        };
        assert_eq!(project(&params).payback_year, Some(1));
    }
}
