//! Financial and schedule parameters for a life-cycle run.
//!
//! Every field except `discount_policy` has a standard value and may be left
//! out of a JSON document. The policy has none: the two discounting
//! conventions give different totals, so a document must name one.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult, Violation};
use crate::lifecycle::pwf::{DiscountPolicy, FinancialRates, MAX_HORIZON_YEARS};
use crate::units::TaxBasis;

/// Financial inputs shared by every cost component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParameters {
    /// Discount rate (fraction per year)
    #[serde(default = "standard::discount_rate")]
    pub discount_rate: f64,
    #[serde(default = "standard::inflation_rate")]
    pub inflation_rate: f64,
    /// Interest rate on construction finance
    #[serde(default = "standard::interest_rate")]
    pub interest_rate: f64,
    /// Share of the construction cost financed over the construction period
    #[serde(default = "standard::investment_ratio")]
    pub investment_ratio: f64,
    #[serde(default = "standard::design_life_years")]
    pub design_life_years: u32,
    #[serde(default = "standard::construction_time_years")]
    pub construction_time_years: f64,
    #[serde(default = "standard::analysis_period_years")]
    pub analysis_period_years: u32,
    pub discount_policy: DiscountPolicy,
    /// Which VOC variant feeds road-user cost during construction
    #[serde(default)]
    pub tax_basis: TaxBasis,
}

mod standard {
    pub fn discount_rate() -> f64 {
        0.067
    }
    pub fn inflation_rate() -> f64 {
        0.0515
    }
    pub fn interest_rate() -> f64 {
        0.0775
    }
    pub fn investment_ratio() -> f64 {
        0.5
    }
    pub fn design_life_years() -> u32 {
        50
    }
    pub fn construction_time_years() -> f64 {
        5.0
    }
    pub fn analysis_period_years() -> u32 {
        50
    }
}

impl AnalysisParameters {
    /// Standard rates and periods under the given policy.
    pub fn standard(discount_policy: DiscountPolicy) -> Self {
        AnalysisParameters {
            discount_rate: standard::discount_rate(),
            inflation_rate: standard::inflation_rate(),
            interest_rate: standard::interest_rate(),
            investment_ratio: standard::investment_ratio(),
            design_life_years: standard::design_life_years(),
            construction_time_years: standard::construction_time_years(),
            analysis_period_years: standard::analysis_period_years(),
            discount_policy,
            tax_basis: TaxBasis::default(),
        }
    }

    pub fn rates(&self) -> FinancialRates {
        FinancialRates::new(self.discount_rate, self.inflation_rate, self.discount_policy)
    }

    pub fn construction_months(&self) -> f64 {
        self.construction_time_years * 12.0
    }

    /// Reconstruction is due when the analysis outlives the bridge.
    pub fn needs_reconstruction(&self) -> bool {
        self.analysis_period_years > self.design_life_years
    }

    /// Every rate non-negative and finite, investment ratio within [0, 1],
    /// design life and analysis period between one and
    /// [`MAX_HORIZON_YEARS`] years.
    pub fn validate(&self) -> CalcResult<()> {
        let mut violations = Vec::new();
        let rates = [
            ("discount_rate", self.discount_rate),
            ("inflation_rate", self.inflation_rate),
            ("interest_rate", self.interest_rate),
            ("construction_time_years", self.construction_time_years),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                violations.push(Violation::new(field, value.to_string(), "must be a non-negative number"));
            }
        }
        if !(0.0..=1.0).contains(&self.investment_ratio) {
            violations.push(Violation::new(
                "investment_ratio",
                self.investment_ratio.to_string(),
                "must lie between 0 and 1",
            ));
        }
        for (field, value) in [
            ("design_life_years", self.design_life_years),
            ("analysis_period_years", self.analysis_period_years),
        ] {
            if value == 0 {
                violations.push(Violation::new(field, "0", "must be at least one year"));
            } else if value > MAX_HORIZON_YEARS {
                violations.push(Violation::new(
                    field,
                    value.to_string(),
                    format!("cannot exceed {MAX_HORIZON_YEARS} years"),
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(CalcError::InvalidInput { violations })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AnalysisParameters {
        AnalysisParameters::standard(DiscountPolicy::DiscountAndInflation)
    }

    #[test]
    fn test_standard_values_are_valid() {
        let params = params();
        assert!(params.validate().is_ok());
        assert!(!params.needs_reconstruction());
        assert!((params.construction_months() - 60.0).abs() < 1e-12);
        assert_eq!(params.tax_basis, TaxBasis::WithoutTax);
    }

    #[test]
    fn test_reports_every_bad_field() {
        let params = AnalysisParameters {
            discount_rate: -0.01,
            investment_ratio: 1.5,
            design_life_years: 0,
            ..params()
        };
        let err = params.validate().unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["discount_rate", "investment_ratio", "design_life_years"]);
    }

    #[test]
    fn test_periods_have_an_upper_bound() {
        let params = AnalysisParameters {
            design_life_years: u32::MAX,
            analysis_period_years: MAX_HORIZON_YEARS + 1,
            ..params()
        };
        let err = params.validate().unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["design_life_years", "analysis_period_years"]);

        let longest = AnalysisParameters {
            design_life_years: MAX_HORIZON_YEARS,
            analysis_period_years: MAX_HORIZON_YEARS,
            ..self::params()
        };
        assert!(longest.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_standard_values() {
        let params: AnalysisParameters =
            serde_json::from_str(r#"{ "analysis_period_years": 75, "discount_policy": "discount_only" }"#).unwrap();
        assert_eq!(params.analysis_period_years, 75);
        assert_eq!(params.discount_policy, DiscountPolicy::DiscountOnly);
        assert_eq!(params.design_life_years, 50);
        assert!(params.needs_reconstruction());
    }

    #[test]
    fn test_policy_must_be_named() {
        let err = serde_json::from_str::<AnalysisParameters>(r#"{ "analysis_period_years": 75 }"#).unwrap_err();
        assert!(err.to_string().contains("discount_policy"), "{err}");
        assert!(serde_json::from_str::<AnalysisParameters>("{}").is_err());
    }
}
