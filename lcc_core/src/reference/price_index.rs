//! # Price Index Tables
//!
//! Wholesale price index (WPI) multipliers that bring the reference prices to
//! the analysis year. A table is tagged with its year so a run can be
//! reproduced for the same vintage.
//!
//! ## JSON shape
//!
//! ```json
//! {
//!   "year": 2024,
//!   "WPI": {
//!     "fuelCost": { "Petrol": 1.8068, "Diesel": 1.7733, "Engine Oil": 1.4497,
//!                   "Other Oil": 1.6951, "Grease": 1.6951 },
//!     "commodityHoldingCost": 1.47886,
//!     "passengerCrewCost": { "Passenger Cost": 1.3297, "Crew Cost": 1.3905 },
//!     "medicalCost": 1.08679,
//!     "votCost": 1.27063,
//!     "vehicleCost": {
//!       "tyreCost": { "Small Cars": 1.12399, "Two Wheeler": 1.13365 },
//!       "spareParts": 1.13958,
//!       "fixedDepreciation": 1.13884,
//!       "propertyDamage": 1.13958
//!     }
//!   }
//! }
//! ```
//!
//! A category is either a scalar applied to every vehicle class, or a mapping
//! keyed by vehicle display name (or by fuel / cost name for `fuelCost` and
//! `passengerCrewCost`).

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult, Violation};
use crate::reference::VehicleClass;

const STANDARD_SERIES_TOML: &str = include_str!("../../data/wpi_series.toml");

static STANDARD_SERIES: Lazy<CalcResult<WpiSeries>> = Lazy::new(|| {
    toml::from_str::<WpiSeries>(STANDARD_SERIES_TOML)
        .map_err(|e| CalcError::reference_data("wpi_series.toml", e.to_string()))
        .and_then(|s| s.validated("wpi_series.toml"))
});

/// A single category entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexEntry {
    Scalar(f64),
    Keyed(BTreeMap<String, f64>),
}

/// Price index categories and the table each lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WpiCategory {
    FuelCost,
    CommodityHolding,
    Medical,
    PassengerCrew,
    Vot,
    TyreCost,
    SpareParts,
    FixedDepreciation,
    PropertyDamage,
}

impl WpiCategory {
    pub const ALL: [WpiCategory; 9] = [
        WpiCategory::FuelCost,
        WpiCategory::CommodityHolding,
        WpiCategory::Medical,
        WpiCategory::PassengerCrew,
        WpiCategory::Vot,
        WpiCategory::TyreCost,
        WpiCategory::SpareParts,
        WpiCategory::FixedDepreciation,
        WpiCategory::PropertyDamage,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            WpiCategory::FuelCost => "fuelCost",
            WpiCategory::CommodityHolding => "commodityHoldingCost",
            WpiCategory::Medical => "medicalCost",
            WpiCategory::PassengerCrew => "passengerCrewCost",
            WpiCategory::Vot => "votCost",
            WpiCategory::TyreCost => "tyreCost",
            WpiCategory::SpareParts => "spareParts",
            WpiCategory::FixedDepreciation => "fixedDepreciation",
            WpiCategory::PropertyDamage => "propertyDamage",
        }
    }

    /// Categories nested under `vehicleCost`.
    pub fn is_vehicle_cost(&self) -> bool {
        matches!(
            self,
            WpiCategory::TyreCost | WpiCategory::SpareParts | WpiCategory::FixedDepreciation | WpiCategory::PropertyDamage
        )
    }
}

/// Entry keys used inside keyed categories that are not vehicle names.
pub mod entry {
    pub const PETROL: &str = "Petrol";
    pub const DIESEL: &str = "Diesel";
    pub const ENGINE_OIL: &str = "Engine Oil";
    pub const OTHER_OIL: &str = "Other Oil";
    pub const GREASE: &str = "Grease";
    pub const PASSENGER_COST: &str = "Passenger Cost";
    pub const CREW_COST: &str = "Crew Cost";
}

/// Category block of a price index table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WpiCategories {
    #[serde(rename = "vehicleCost", default)]
    pub vehicle_cost: BTreeMap<String, IndexEntry>,
    #[serde(flatten)]
    pub top_level: BTreeMap<String, IndexEntry>,
}

/// Year-tagged price index multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceIndexTable {
    pub year: u16,
    #[serde(rename = "WPI")]
    pub wpi: WpiCategories,
}

impl PriceIndexTable {
    /// A table with every category set to 1.0.
    pub fn identity(year: u16) -> Self {
        let mut table = PriceIndexTable {
            year,
            wpi: WpiCategories::default(),
        };
        for category in WpiCategory::ALL {
            table.set(category, IndexEntry::Scalar(1.0));
        }
        table
    }

    /// Insert or replace a category entry in the table it belongs to.
    pub fn set(&mut self, category: WpiCategory, entry: IndexEntry) {
        let table = if category.is_vehicle_cost() {
            &mut self.wpi.vehicle_cost
        } else {
            &mut self.wpi.top_level
        };
        table.insert(category.key().to_string(), entry);
    }

    pub fn category(&self, category: WpiCategory) -> Option<&IndexEntry> {
        if category.is_vehicle_cost() {
            self.wpi.vehicle_cost.get(category.key())
        } else {
            self.wpi.top_level.get(category.key())
        }
    }

    /// Resolve a multiplier. `entry_key` selects within a keyed category;
    /// a scalar category ignores it. `class` is only used for error context.
    pub fn multiplier(&self, category: WpiCategory, entry_key: &str, class: VehicleClass) -> CalcResult<f64> {
        self.entry_multiplier(category, entry_key, class.key())
    }

    /// Same as [`multiplier`](Self::multiplier) for lookups not tied to a
    /// vehicle class. `context` names the requester in errors.
    pub fn entry_multiplier(&self, category: WpiCategory, entry_key: &str, context: &str) -> CalcResult<f64> {
        match self.category(category) {
            Some(IndexEntry::Scalar(v)) => Ok(*v),
            Some(IndexEntry::Keyed(map)) => map
                .get(entry_key)
                .copied()
                .ok_or_else(|| CalcError::missing_wpi_category(format!("{}.{}", category.key(), entry_key), context)),
            None => Err(CalcError::missing_wpi_category(category.key(), context)),
        }
    }

    /// Multiplier keyed by the vehicle class's display name.
    pub fn class_multiplier(&self, category: WpiCategory, class: VehicleClass) -> CalcResult<f64> {
        self.multiplier(category, class.display_name(), class)
    }

    /// Reject non-positive or non-finite multipliers.
    pub fn validate(&self) -> CalcResult<()> {
        let mut violations = Vec::new();
        let tables = [("WPI", &self.wpi.top_level), ("WPI.vehicleCost", &self.wpi.vehicle_cost)];
        for (prefix, table) in tables {
            for (name, entry) in table {
                let values: Vec<(String, f64)> = match entry {
                    IndexEntry::Scalar(v) => vec![(format!("{prefix}.{name}"), *v)],
                    IndexEntry::Keyed(map) => map
                        .iter()
                        .map(|(k, v)| (format!("{prefix}.{name}.{k}"), *v))
                        .collect(),
                };
                for (field, v) in values {
                    if !v.is_finite() || v <= 0.0 {
                        violations.push(Violation::new(field, v.to_string(), "multiplier must be a positive number"));
                    }
                }
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(CalcError::InvalidInput { violations })
        }
    }

    /// Build the multipliers for `year` from a WPI series, as ratios to the
    /// series base year.
    pub fn from_series(series: &WpiSeries, year: u16) -> CalcResult<Self> {
        let ratio = |values: &Vec<f64>| series.ratio(values, year);

        let tyre_cars = ratio(&series.tyre_cars)?;
        let tyre_two_wheeler = ratio(&series.tyre_two_wheeler)?;
        let tyre_heavy = ratio(&series.tyre_heavy)?;
        let tyre: BTreeMap<String, f64> = VehicleClass::ALL
            .into_iter()
            .map(|class| {
                let value = match class {
                    VehicleClass::SmallCars | VehicleClass::BigCars => tyre_cars,
                    VehicleClass::TwoWheelers => tyre_two_wheeler,
                    _ => tyre_heavy,
                };
                (class.display_name().to_string(), value)
            })
            .collect();

        let oil_and_grease = ratio(&series.other_oil_and_grease)?;
        let fuel = BTreeMap::from([
            (entry::PETROL.to_string(), ratio(&series.petrol)?),
            (entry::DIESEL.to_string(), ratio(&series.diesel)?),
            (entry::ENGINE_OIL.to_string(), ratio(&series.engine_oil)?),
            (entry::OTHER_OIL.to_string(), oil_and_grease),
            (entry::GREASE.to_string(), oil_and_grease),
        ]);
        let passenger_crew = BTreeMap::from([
            (entry::PASSENGER_COST.to_string(), ratio(&series.passenger)?),
            (entry::CREW_COST.to_string(), ratio(&series.crew)?),
        ]);
        let spare_parts = ratio(&series.spare_parts)?;

        let mut table = PriceIndexTable {
            year,
            wpi: WpiCategories::default(),
        };
        table.set(WpiCategory::FuelCost, IndexEntry::Keyed(fuel));
        table.set(WpiCategory::CommodityHolding, IndexEntry::Scalar(ratio(&series.commodity_holding)?));
        table.set(WpiCategory::Medical, IndexEntry::Scalar(ratio(&series.medical)?));
        table.set(WpiCategory::PassengerCrew, IndexEntry::Keyed(passenger_crew));
        table.set(WpiCategory::Vot, IndexEntry::Scalar(ratio(&series.vot)?));
        table.set(WpiCategory::TyreCost, IndexEntry::Keyed(tyre));
        table.set(WpiCategory::SpareParts, IndexEntry::Scalar(spare_parts));
        table.set(WpiCategory::FixedDepreciation, IndexEntry::Scalar(ratio(&series.fixed_depreciation)?));
        table.set(WpiCategory::PropertyDamage, IndexEntry::Scalar(spare_parts));
        Ok(table)
    }
}

/// Raw yearly WPI values. Every series is aligned with `years`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WpiSeries {
    pub base_year: u16,
    pub years: Vec<u16>,
    pub petrol: Vec<f64>,
    pub diesel: Vec<f64>,
    pub engine_oil: Vec<f64>,
    pub other_oil_and_grease: Vec<f64>,
    pub tyre_cars: Vec<f64>,
    pub tyre_two_wheeler: Vec<f64>,
    pub tyre_heavy: Vec<f64>,
    pub spare_parts: Vec<f64>,
    pub fixed_depreciation: Vec<f64>,
    pub commodity_holding: Vec<f64>,
    pub passenger: Vec<f64>,
    pub crew: Vec<f64>,
    pub medical: Vec<f64>,
    pub vot: Vec<f64>,
}

impl WpiSeries {
    /// The embedded 2019-2024 series.
    pub fn standard() -> CalcResult<&'static WpiSeries> {
        STANDARD_SERIES.as_ref().map_err(Clone::clone)
    }

    fn validated(self, source_name: &str) -> CalcResult<Self> {
        let n = self.years.len();
        let series = [
            &self.petrol,
            &self.diesel,
            &self.engine_oil,
            &self.other_oil_and_grease,
            &self.tyre_cars,
            &self.tyre_two_wheeler,
            &self.tyre_heavy,
            &self.spare_parts,
            &self.fixed_depreciation,
            &self.commodity_holding,
            &self.passenger,
            &self.crew,
            &self.medical,
            &self.vot,
        ];
        if series.iter().any(|s| s.len() != n) {
            return Err(CalcError::reference_data(source_name, "every series must have one value per year"));
        }
        if !self.years.contains(&self.base_year) {
            return Err(CalcError::reference_data(source_name, "base_year is not in years"));
        }
        Ok(self)
    }

    fn index_of(&self, year: u16) -> Option<usize> {
        self.years.iter().position(|y| *y == year)
    }

    fn ratio(&self, values: &[f64], year: u16) -> CalcResult<f64> {
        let Some(i) = self.index_of(year) else {
            return Err(CalcError::invalid_input(
                "wpi_year",
                year.to_string(),
                format!("no price index for this year (available {:?})", self.years),
            ));
        };
        let base = self
            .index_of(self.base_year)
            .and_then(|b| values.get(b))
            .copied()
            .ok_or_else(|| CalcError::reference_data("wpi series", "base year value missing"))?;
        let value = values
            .get(i)
            .copied()
            .ok_or_else(|| CalcError::reference_data("wpi series", "series shorter than years"))?;
        Ok(value / base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_table() {
        let table = PriceIndexTable::identity(2024);
        for category in WpiCategory::ALL {
            for class in VehicleClass::ALL {
                assert_eq!(table.class_multiplier(category, class).unwrap(), 1.0);
            }
        }
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_from_series_2024() {
        let series = WpiSeries::standard().unwrap();
        let table = PriceIndexTable::from_series(series, 2024).unwrap();
        let class = VehicleClass::SmallCars;
        let petrol = table.multiplier(WpiCategory::FuelCost, entry::PETROL, class).unwrap();
        assert!((petrol - 154.3 / 85.4).abs() < 1e-12);
        assert!((petrol - 1.8068).abs() < 1e-4);
        let tyre_car = table.class_multiplier(WpiCategory::TyreCost, class).unwrap();
        assert!((tyre_car - 1.12399).abs() < 1e-4);
        let tyre_tw = table.class_multiplier(WpiCategory::TyreCost, VehicleClass::TwoWheelers).unwrap();
        assert!((tyre_tw - 1.13365).abs() < 1e-4);
        let fixed = table.class_multiplier(WpiCategory::FixedDepreciation, VehicleClass::Hcv).unwrap();
        assert!((fixed - 1.13884).abs() < 1e-4);
        let vot = table.class_multiplier(WpiCategory::Vot, VehicleClass::Buses).unwrap();
        assert!((vot - 1.27063).abs() < 1e-4);
    }

    #[test]
    fn test_base_year_is_identity() {
        let series = WpiSeries::standard().unwrap();
        let table = PriceIndexTable::from_series(series, 2019).unwrap();
        let v = table.class_multiplier(WpiCategory::SpareParts, VehicleClass::Lcv).unwrap();
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_year() {
        let series = WpiSeries::standard().unwrap();
        let err = PriceIndexTable::from_series(series, 1999).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_missing_category_and_entry() {
        let mut table = PriceIndexTable::identity(2024);
        table.wpi.vehicle_cost.remove("tyreCost");
        let err = table.class_multiplier(WpiCategory::TyreCost, VehicleClass::Hcv).unwrap_err();
        assert_eq!(err, CalcError::missing_wpi_category("tyreCost", "hcv"));

        table.set(
            WpiCategory::TyreCost,
            IndexEntry::Keyed(BTreeMap::from([("Small Cars".to_string(), 1.1)])),
        );
        assert_eq!(table.class_multiplier(WpiCategory::TyreCost, VehicleClass::SmallCars).unwrap(), 1.1);
        let err = table.class_multiplier(WpiCategory::TyreCost, VehicleClass::Hcv).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_WPI_CATEGORY");
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "year": 2023,
            "WPI": {
                "fuelCost": {"Petrol": 1.5, "Diesel": 1.4},
                "votCost": 1.2,
                "vehicleCost": {"spareParts": 1.1, "tyreCost": {"LCV": 1.05}}
            }
        }"#;
        let table: PriceIndexTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.year, 2023);
        assert_eq!(table.class_multiplier(WpiCategory::Vot, VehicleClass::Lcv).unwrap(), 1.2);
        assert_eq!(table.class_multiplier(WpiCategory::TyreCost, VehicleClass::Lcv).unwrap(), 1.05);
        assert_eq!(
            table.multiplier(WpiCategory::FuelCost, entry::DIESEL, VehicleClass::Lcv).unwrap(),
            1.4
        );
        assert!(table.wpi.top_level.get("vehicleCost").is_none());
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let mut table = PriceIndexTable::identity(2024);
        table.set(WpiCategory::Medical, IndexEntry::Scalar(0.0));
        table.set(WpiCategory::SpareParts, IndexEntry::Scalar(-1.0));
        let err = table.validate().unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }
}
