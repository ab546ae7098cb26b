//! # Unit Types
//!
//! Lightweight wrappers for the quantities that flow through the cost engine.
//! Costs are carried in Indian Rupees; road-user costs are per vehicle-km.
//!
//! ## Price-tax variants
//!
//! Most monetary road-user elements exist in two variants carried in parallel:
//! - `IT`: including taxes (financial price)
//! - `ET`: excluding taxes (economic price)
//!
//! [`TaxPair`] keeps the two together so arithmetic never mixes them up.
//!
//! ## Example
//!
//! ```rust
//! use lcc_core::units::{TaxPair, Rupees};
//!
//! let fuel = TaxPair::new(4.20, 1.80);
//! let oil = TaxPair::new(0.30, 0.15);
//! let total = fuel + oil;
//! assert!((total.it - 4.50).abs() < 1e-12);
//!
//! let cost = Rupees(1000.0) * 1.5;
//! assert_eq!(cost.value(), 1500.0);
//! ```

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

// ============================================================================
// Price-tax pair
// ============================================================================

/// Which price variant an economic analysis reads from a [`TaxPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBasis {
    /// Financial prices (IT)
    WithTax,
    /// Economic prices (ET)
    #[default]
    WithoutTax,
}

/// A monetary value in its with-tax (IT) and without-tax (ET) variants.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxPair {
    #[serde(rename = "IT")]
    pub it: f64,
    #[serde(rename = "ET")]
    pub et: f64,
}

impl TaxPair {
    pub const ZERO: TaxPair = TaxPair { it: 0.0, et: 0.0 };

    pub fn new(it: f64, et: f64) -> Self {
        TaxPair { it, et }
    }

    /// Same value in both variants (elements that carry no tax split).
    pub fn uniform(value: f64) -> Self {
        TaxPair { it: value, et: value }
    }

    /// Read the variant selected by `basis`.
    pub fn get(self, basis: TaxBasis) -> f64 {
        match basis {
            TaxBasis::WithTax => self.it,
            TaxBasis::WithoutTax => self.et,
        }
    }

    /// Apply `f` to both variants.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        TaxPair {
            it: f(self.it),
            et: f(self.et),
        }
    }

    /// Clamp both variants to non-negative; NaN passes through unchanged.
    pub fn non_negative(self) -> Self {
        self.map(clamp_non_negative)
    }

    pub fn is_finite(self) -> bool {
        self.it.is_finite() && self.et.is_finite()
    }
}

impl Add for TaxPair {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        TaxPair {
            it: self.it + rhs.it,
            et: self.et + rhs.et,
        }
    }
}

impl AddAssign for TaxPair {
    fn add_assign(&mut self, rhs: Self) {
        self.it += rhs.it;
        self.et += rhs.et;
    }
}

impl Mul<f64> for TaxPair {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        self.map(|v| v * rhs)
    }
}

impl Div<f64> for TaxPair {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        self.map(|v| v / rhs)
    }
}

impl Sum for TaxPair {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(TaxPair::ZERO, |acc, x| acc + x)
    }
}

/// `max(x, 0)` that keeps NaN visible to later finiteness checks.
pub fn clamp_non_negative(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

// ============================================================================
// Scalar units
// ============================================================================

/// Speed in kilometres per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kmph(pub f64);

/// Money in Indian Rupees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rupees(pub f64);

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $type {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Kmph);
impl_arithmetic!(Rupees);

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Rupees(iter.map(|r| r.0).sum())
    }
}

impl std::fmt::Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rs {:.2}", self.0)
    }
}

impl std::fmt::Display for Kmph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} km/h", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_pair_arithmetic() {
        let a = TaxPair::new(10.0, 6.0);
        let b = TaxPair::new(2.0, 1.0);
        assert_eq!(a + b, TaxPair::new(12.0, 7.0));
        assert_eq!(a * 0.5, TaxPair::new(5.0, 3.0));
        assert_eq!(a / 2.0, TaxPair::new(5.0, 3.0));
        let total: TaxPair = vec![a, b, TaxPair::uniform(1.0)].into_iter().sum();
        assert_eq!(total, TaxPair::new(13.0, 8.0));
    }

    #[test]
    fn test_tax_basis_selects_variant() {
        let p = TaxPair::new(72.61, 30.51);
        assert_eq!(p.get(TaxBasis::WithTax), 72.61);
        assert_eq!(p.get(TaxBasis::WithoutTax), 30.51);
        assert_eq!(TaxBasis::default(), TaxBasis::WithoutTax);
    }

    #[test]
    fn test_non_negative_clamp() {
        let p = TaxPair::new(-3.0, 4.0).non_negative();
        assert_eq!(p, TaxPair::new(0.0, 4.0));
        assert!(clamp_non_negative(f64::NAN).is_nan());
    }

    #[test]
    fn test_tax_pair_serialization() {
        let json = serde_json::to_string(&TaxPair::new(1.5, 1.0)).unwrap();
        assert_eq!(json, r#"{"IT":1.5,"ET":1.0}"#);
    }

    #[test]
    fn test_scalar_arithmetic() {
        let a = Rupees(10.0);
        let b = Rupees(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((Kmph(60.0) / 2.0).value(), 30.0);
        let sum: Rupees = vec![a, b].into_iter().sum();
        assert_eq!(sum.value(), 15.0);
    }

    #[test]
    fn test_transparent_serialization() {
        let v = Kmph(62.5);
        assert_eq!(serde_json::to_string(&v).unwrap(), "62.5");
    }
}
