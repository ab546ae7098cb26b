//! # Present Worth Factors
//!
//! Converts a future or recurring cost into present value. Two discounting
//! policies exist and are not interchangeable, so the caller always names one:
//!
//! | Policy | Per-year factor `r` | Recurring occurrences at `k·f` |
//! |---|---|---|
//! | [`DiscountPolicy::DiscountOnly`] | `1 / (1 + d)` | `k·f <= L` |
//! | [`DiscountPolicy::DiscountAndInflation`] | `(1 + g) / (1 + d)` | `k·f < L` |
//!
//! A single deferred payment at year `T` has factor `r^T`. A recurring
//! activity every `f` years over horizon `L` has factor `Σ r^(k·f)` over its
//! occurrences.
//!
//! Under `DiscountAndInflation` the last activity never lands on the horizon
//! year itself, even when `f` divides `L`. Totals depend on this.
//!
//! Horizons longer than [`MAX_HORIZON_YEARS`] are refused.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

pub const MAX_HORIZON_YEARS: u32 = 1000;

/// How future amounts are brought to present value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    DiscountOnly,
    DiscountAndInflation,
}

impl DiscountPolicy {
    pub const ALL: [DiscountPolicy; 2] = [DiscountPolicy::DiscountOnly, DiscountPolicy::DiscountAndInflation];

    pub fn display_name(&self) -> &'static str {
        match self {
            DiscountPolicy::DiscountOnly => "Discount only",
            DiscountPolicy::DiscountAndInflation => "Discount and inflation",
        }
    }

    /// Whether a recurring activity may fall on the horizon year.
    pub fn includes_horizon(&self) -> bool {
        matches!(self, DiscountPolicy::DiscountOnly)
    }
}

/// Rates that drive discounting, paired with the policy that uses them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialRates {
    pub discount_rate: f64,
    pub inflation_rate: f64,
    pub policy: DiscountPolicy,
}

impl FinancialRates {
    pub fn new(discount_rate: f64, inflation_rate: f64, policy: DiscountPolicy) -> Self {
        FinancialRates {
            discount_rate,
            inflation_rate,
            policy,
        }
    }

    /// One-year factor `r`.
    pub fn annual_factor(&self) -> f64 {
        match self.policy {
            DiscountPolicy::DiscountOnly => 1.0 / (1.0 + self.discount_rate),
            DiscountPolicy::DiscountAndInflation => (1.0 + self.inflation_rate) / (1.0 + self.discount_rate),
        }
    }

    /// Factor for a payment `years` from now.
    pub fn factor_at(&self, years: u32) -> f64 {
        self.annual_factor().powf(f64::from(years))
    }
}

/// A present worth factor and how many payments it covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresentWorth {
    pub factor: f64,
    pub occurrences: u32,
}

impl PresentWorth {
    /// Undiscounted, paid once now.
    pub const IMMEDIATE: PresentWorth = PresentWorth {
        factor: 1.0,
        occurrences: 1,
    };

    pub const NONE: PresentWorth = PresentWorth {
        factor: 0.0,
        occurrences: 0,
    };
}

/// When a cost is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// At year zero
    Initial,
    /// Once, `year` years from now
    Deferred { year: u32 },
    /// Every `frequency_years` up to `horizon_years`
    Recurring { frequency_years: u32, horizon_years: u32 },
}

/// Single deferred payment: `r^T`.
pub fn single(rates: &FinancialRates, horizon_years: u32) -> PresentWorth {
    PresentWorth {
        factor: rates.factor_at(horizon_years),
        occurrences: 1,
    }
}

/// Years at which a recurring activity happens.
pub fn occurrence_years(policy: DiscountPolicy, frequency_years: u32, horizon_years: u32) -> Vec<u32> {
    if frequency_years == 0 {
        return Vec::new();
    }
    (1..=u32::MAX)
        .map_while(|k| k.checked_mul(frequency_years))
        .take_while(|year| {
            if policy.includes_horizon() {
                *year <= horizon_years
            } else {
                *year < horizon_years
            }
        })
        .collect()
}

/// Recurring payment: `Σ r^(k·f)` over the activity's occurrences.
///
/// A zero frequency is a configuration error. A frequency at or past the
/// horizon may give no occurrences and a zero factor; that is logged and
/// left for the caller to report.
pub fn recurring(
    rates: &FinancialRates,
    activity: &str,
    frequency_years: u32,
    horizon_years: u32,
) -> CalcResult<PresentWorth> {
    if frequency_years == 0 {
        return Err(CalcError::misconfigured_schedule(
            activity,
            frequency_years,
            "frequency must be at least one year",
        ));
    }
    if horizon_years > MAX_HORIZON_YEARS {
        return Err(CalcError::misconfigured_schedule(
            activity,
            frequency_years,
            format!("horizon of {horizon_years} years exceeds {MAX_HORIZON_YEARS}"),
        ));
    }
    let years = occurrence_years(rates.policy, frequency_years, horizon_years);
    if years.is_empty() {
        log::warn!("{activity}: every {frequency_years} y never occurs within {horizon_years} y; factor is zero");
    }
    let factor = years.iter().map(|year| rates.factor_at(*year)).sum();
    Ok(PresentWorth {
        factor,
        occurrences: years.len() as u32,
    })
}

/// Factor for any [`Schedule`].
pub fn present_worth(rates: &FinancialRates, activity: &str, schedule: Schedule) -> CalcResult<PresentWorth> {
    match schedule {
        Schedule::Initial => Ok(PresentWorth::IMMEDIATE),
        Schedule::Deferred { year } => Ok(single(rates, year)),
        Schedule::Recurring {
            frequency_years,
            horizon_years,
        } => recurring(rates, activity, frequency_years, horizon_years),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_only_closed_form() {
        let rates = FinancialRates::new(0.05, 0.0, DiscountPolicy::DiscountOnly);
        let pw = recurring(&rates, "inspection", 10, 50).unwrap();
        let expected: f64 = (1..=5).map(|k| 1.05f64.powi(-10 * k)).sum();
        assert_eq!(pw.occurrences, 5);
        assert!((pw.factor - expected).abs() < 1e-12);
        assert!((pw.factor - 1.4514).abs() < 0.001);
    }

    #[test]
    fn test_inflation_policy_stops_before_horizon() {
        // Fifty-year life, ten-year cycle: years 10..40 only.
        let rates = FinancialRates::new(0.05, 0.0, DiscountPolicy::DiscountAndInflation);
        let pw = recurring(&rates, "inspection", 10, 50).unwrap();
        assert_eq!(pw.occurrences, 4);
        let expected: f64 = (1..=4).map(|k| 1.05f64.powi(-10 * k)).sum();
        assert!((pw.factor - expected).abs() < 1e-12);
    }

    #[test]
    fn test_non_dividing_frequency_counts() {
        // floor((50 - eps) / 7) = 7 under both policies
        for policy in DiscountPolicy::ALL {
            assert_eq!(occurrence_years(policy, 7, 50).len(), 7);
        }
        assert_eq!(occurrence_years(DiscountPolicy::DiscountAndInflation, 1, 50).len(), 49);
        assert_eq!(occurrence_years(DiscountPolicy::DiscountOnly, 1, 50).len(), 50);
    }

    #[test]
    fn test_inflation_raises_factor() {
        let flat = FinancialRates::new(0.067, 0.0, DiscountPolicy::DiscountAndInflation);
        let inflated = FinancialRates::new(0.067, 0.0515, DiscountPolicy::DiscountAndInflation);
        assert!(single(&inflated, 50).factor > single(&flat, 50).factor);
        assert!((single(&inflated, 1).factor - 1.0515 / 1.067).abs() < 1e-12);
    }

    #[test]
    fn test_zero_frequency_is_misconfigured() {
        let rates = FinancialRates::new(0.05, 0.02, DiscountPolicy::DiscountAndInflation);
        let err = recurring(&rates, "major repair", 0, 50).unwrap_err();
        assert_eq!(err.error_code(), "MISCONFIGURED_SCHEDULE");
    }

    #[test]
    fn test_frequency_past_horizon_is_empty() {
        let rates = FinancialRates::new(0.05, 0.02, DiscountPolicy::DiscountAndInflation);
        let pw = recurring(&rates, "replacement", 60, 50).unwrap();
        assert_eq!(pw, PresentWorth::NONE);

        // Equal to the horizon: strict bound excludes, inclusive bound keeps one.
        assert_eq!(recurring(&rates, "recycling", 50, 50).unwrap().occurrences, 0);
        let inclusive = FinancialRates::new(0.05, 0.02, DiscountPolicy::DiscountOnly);
        assert_eq!(recurring(&inclusive, "recycling", 50, 50).unwrap().occurrences, 1);
    }

    #[test]
    fn test_huge_frequency_terminates() {
        let years = occurrence_years(DiscountPolicy::DiscountOnly, 3_000_000_000, u32::MAX);
        assert_eq!(years, vec![3_000_000_000]);
        assert_eq!(occurrence_years(DiscountPolicy::DiscountOnly, u32::MAX, u32::MAX), vec![u32::MAX]);
    }

    #[test]
    fn test_horizon_beyond_limit_is_misconfigured() {
        let rates = FinancialRates::new(0.05, 0.0, DiscountPolicy::DiscountOnly);
        let err = recurring(&rates, "inspection", 1, u32::MAX).unwrap_err();
        assert_eq!(err.error_code(), "MISCONFIGURED_SCHEDULE");
        assert!(recurring(&rates, "inspection", 1, MAX_HORIZON_YEARS).is_ok());
    }

    #[test]
    fn test_schedule_dispatch() {
        let rates = FinancialRates::new(0.05, 0.0, DiscountPolicy::DiscountOnly);
        assert_eq!(present_worth(&rates, "build", Schedule::Initial).unwrap(), PresentWorth::IMMEDIATE);
        let deferred = present_worth(&rates, "demolition", Schedule::Deferred { year: 20 }).unwrap();
        assert!((deferred.factor - 1.05f64.powi(-20)).abs() < 1e-12);
    }
}
