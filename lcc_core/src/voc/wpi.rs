//! # Price Index Adjustment
//!
//! Turns each class's [`VocResult`] into per-km costs at analysis-year prices.
//! Consumption leaves (fuel, tyre life, lubricants) are first priced from the
//! reference tables, then every cost is multiplied by its price-index entry.
//!
//! Multipliers for a class are resolved once into [`ClassMultipliers`] before
//! any arithmetic, so a missing category fails up front with
//! `MissingWpiCategory` rather than part way through.
//!
//! Per-class and grand totals add every element's IT and ET; a single-valued
//! element counts in both.
//!
//! Tyre life is clamped to zero on packaging when its regression goes
//! negative on very rough roads. Tyre cost divides by it, so it is priced at
//! no less than [`MIN_TYRE_LIFE_KM`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::reference::price_index::entry;
use crate::reference::{PriceIndexTable, ReferenceTables, VehicleClass, VehicleProfile, WpiCategory};
use crate::units::TaxPair;
use crate::voc::output::VocResult;

pub const UNIT_ADJUSTED: &str = "Rs/km/veh";

/// Shortest tyre life a tyre cost is priced over (km per tyre).
pub const MIN_TYRE_LIFE_KM: f64 = 1000.0;

/// Index-adjusted distance-related costs of one class (Rs per vehicle-km).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceCosts {
    pub tyre_cost: TaxPair,
    pub fuel_cost: TaxPair,
    pub engine_oil: TaxPair,
    pub other_oil: TaxPair,
    pub grease: TaxPair,
    pub spare_parts: TaxPair,
    pub maintenance_labour: f64,
}

/// Index-adjusted time-related costs of one class (Rs per vehicle-km).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeCosts {
    pub fixed_cost: TaxPair,
    pub depreciation_cost: TaxPair,
    pub passenger_time_cost: f64,
    pub crew_cost: f64,
    pub commodity_holding_cost: f64,
}

/// A per-class cost block that can be rolled up.
pub trait CostBreakdown {
    fn subtotal(&self) -> TaxPair;
}

impl CostBreakdown for DistanceCosts {
    fn subtotal(&self) -> TaxPair {
        self.tyre_cost
            + self.fuel_cost
            + self.engine_oil
            + self.other_oil
            + self.grease
            + self.spare_parts
            + TaxPair::uniform(self.maintenance_labour)
    }
}

impl CostBreakdown for TimeCosts {
    fn subtotal(&self) -> TaxPair {
        self.fixed_cost
            + self.depreciation_cost
            + TaxPair::uniform(self.passenger_time_cost + self.crew_cost + self.commodity_holding_cost)
    }
}

/// Costs per vehicle class with their grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTable<T> {
    pub by_class: BTreeMap<VehicleClass, T>,
    pub total: TaxPair,
    pub units: String,
}

impl<T: CostBreakdown> CostTable<T> {
    pub fn from_classes(by_class: BTreeMap<VehicleClass, T>) -> Self {
        let total = by_class.values().map(CostBreakdown::subtotal).sum();
        CostTable {
            by_class,
            total,
            units: UNIT_ADJUSTED.to_string(),
        }
    }
}

/// Output of [`apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WpiAdjustedCosts {
    /// Year of the price index table used
    pub year: u16,
    pub distance_cost: CostTable<DistanceCosts>,
    pub time_cost: CostTable<TimeCosts>,
}

/// Every multiplier one class needs, resolved from the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMultipliers {
    pub tyre: f64,
    /// `None` when the class burns no petrol
    pub petrol: Option<f64>,
    /// `None` when the class burns no diesel
    pub diesel: Option<f64>,
    pub engine_oil: f64,
    pub other_oil: f64,
    pub grease: f64,
    pub spare_parts: f64,
    pub fixed_depreciation: f64,
    pub passenger: f64,
    pub crew: f64,
    pub commodity_holding: f64,
}

impl ClassMultipliers {
    pub fn resolve(wpi: &PriceIndexTable, result: &VocResult, profile: &VehicleProfile) -> CalcResult<Self> {
        let class = result.vehicle_class;
        let fuel = &result.distance.fuel_consumption;
        let fuel_entry = |name: &str| wpi.multiplier(WpiCategory::FuelCost, name, class);

        let petrol = if profile.petrol_share > 0.0 && fuel.petrol > 0.0 {
            Some(fuel_entry(entry::PETROL)?)
        } else {
            None
        };
        let diesel = if profile.diesel_share > 0.0 && fuel.diesel > 0.0 {
            Some(fuel_entry(entry::DIESEL)?)
        } else {
            None
        };

        Ok(ClassMultipliers {
            tyre: wpi.class_multiplier(WpiCategory::TyreCost, class)?,
            petrol,
            diesel,
            engine_oil: fuel_entry(entry::ENGINE_OIL)?,
            other_oil: fuel_entry(entry::OTHER_OIL)?,
            grease: fuel_entry(entry::GREASE)?,
            spare_parts: wpi.class_multiplier(WpiCategory::SpareParts, class)?,
            fixed_depreciation: wpi.class_multiplier(WpiCategory::FixedDepreciation, class)?,
            passenger: wpi.multiplier(WpiCategory::PassengerCrew, entry::PASSENGER_COST, class)?,
            crew: wpi.multiplier(WpiCategory::PassengerCrew, entry::CREW_COST, class)?,
            commodity_holding: wpi.class_multiplier(WpiCategory::CommodityHolding, class)?,
        })
    }
}

/// Price and index-adjust one class.
pub fn adjust_class(
    result: &VocResult,
    wpi: &PriceIndexTable,
    tables: &ReferenceTables,
) -> CalcResult<(DistanceCosts, TimeCosts)> {
    result.check_shape()?;
    let class = result.vehicle_class;
    let profile = tables.vehicle(class)?;
    let m = ClassMultipliers::resolve(wpi, result, profile)?;
    let prices = &tables.fuel_prices;
    let d = &result.distance;
    let t = &result.time;

    let mut tyre_life = d.tyre_life.value();
    if tyre_life < MIN_TYRE_LIFE_KM {
        log::warn!("{}: tyre life {tyre_life:.1} km priced at {MIN_TYRE_LIFE_KM} km", class.key());
        tyre_life = MIN_TYRE_LIFE_KM;
    }
    let tyre_cost = profile.tyre_price * f64::from(profile.tyres_per_vehicle) / tyre_life;
    if !tyre_cost.is_finite() {
        return Err(CalcError::non_finite(class.key(), "tyre_cost"));
    }

    let petrol_cost = match m.petrol {
        Some(index) => prices.petrol * (d.fuel_consumption.petrol / 1000.0) * profile.petrol_share * index,
        None => TaxPair::ZERO,
    };
    let diesel_cost = match m.diesel {
        Some(index) => prices.diesel * (d.fuel_consumption.diesel / 1000.0) * profile.diesel_share * index,
        None => TaxPair::ZERO,
    };

    let distance = DistanceCosts {
        tyre_cost: tyre_cost * m.tyre,
        fuel_cost: petrol_cost + diesel_cost,
        engine_oil: prices.engine_oil * (d.engine_oil.value() / 1000.0) * m.engine_oil,
        other_oil: prices.other_oil * (d.other_oil.value() / 10000.0) * m.other_oil,
        grease: prices.grease * (d.grease.value() / 10000.0) * m.grease,
        spare_parts: d.spare_parts.pair() * m.spare_parts,
        maintenance_labour: d.maintenance_labour.value() * m.spare_parts,
    };
    let time = TimeCosts {
        fixed_cost: t.fixed_cost.pair() * m.fixed_depreciation,
        depreciation_cost: t.depreciation_cost.pair() * m.fixed_depreciation,
        passenger_time_cost: t.passenger_time_cost.value() * m.passenger,
        crew_cost: t.crew_cost.value() * m.crew,
        commodity_holding_cost: t.commodity_holding_cost.value() * m.commodity_holding,
    };

    log::debug!(
        "{}: distance {:.4} / time {:.4} Rs/km (ET)",
        class.key(),
        distance.subtotal().et,
        time.subtotal().et
    );
    Ok((distance, time))
}

/// Adjust every class and roll up totals. Stops at the first failing class;
/// the pipeline instead captures failures per class.
pub fn apply(
    results: &BTreeMap<VehicleClass, VocResult>,
    wpi: &PriceIndexTable,
    tables: &ReferenceTables,
) -> CalcResult<WpiAdjustedCosts> {
    let mut distance = BTreeMap::new();
    let mut time = BTreeMap::new();
    for (class, result) in results {
        let (d, t) = adjust_class(result, wpi, tables)?;
        distance.insert(*class, d);
        time.insert(*class, t);
    }
    Ok(WpiAdjustedCosts::from_classes(wpi.year, distance, time))
}

impl WpiAdjustedCosts {
    pub fn from_classes(
        year: u16,
        distance: BTreeMap<VehicleClass, DistanceCosts>,
        time: BTreeMap<VehicleClass, TimeCosts>,
    ) -> Self {
        WpiAdjustedCosts {
            year,
            distance_cost: CostTable::from_classes(distance),
            time_cost: CostTable::from_classes(time),
        }
    }
}

/// Sum of an unadjusted record's priced elements, for comparison against
/// [`apply`] with an identity table.
pub fn base_totals(result: &VocResult, tables: &ReferenceTables) -> CalcResult<(TaxPair, TaxPair)> {
    let identity = PriceIndexTable::identity(0);
    let (d, t) = adjust_class(result, &identity, tables)?;
    Ok((d.subtotal(), t.subtotal()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{IndexEntry, LaneType};
    use crate::voc::models::{ModelRegistry, RegressionInputs};
    use crate::voc::output;

    fn voc_for(class: VehicleClass, lane: LaneType) -> VocResult {
        let tables = ReferenceTables::standard().unwrap();
        let profile = tables.vehicle(class).unwrap();
        let w = tables.standard_width(lane).unwrap_or(12.0);
        let x = RegressionInputs {
            rg: 3000.0,
            rf: 10.0,
            rs: 5.0,
            fl: 5.0,
            w,
            lane,
            pwr: 8.0,
            gw: profile.gross_weight_t,
        };
        let raw = ModelRegistry::standard().get(class).unwrap().compute(&x, profile);
        output::build(class, lane, &raw).unwrap()
    }

    #[test]
    fn test_identity_leaves_totals_unchanged() {
        let tables = ReferenceTables::standard().unwrap();
        let results: BTreeMap<_, _> = VehicleClass::ALL
            .into_iter()
            .map(|c| (c, voc_for(c, LaneType::TwoLane)))
            .collect();
        let adjusted = apply(&results, &PriceIndexTable::identity(2019), tables).unwrap();

        let mut distance = TaxPair::ZERO;
        let mut time = TaxPair::ZERO;
        for result in results.values() {
            let (d, t) = base_totals(result, tables).unwrap();
            distance += d;
            time += t;
        }
        assert!((adjusted.distance_cost.total.it - distance.it).abs() < 1e-9);
        assert!((adjusted.distance_cost.total.et - distance.et).abs() < 1e-9);
        assert!((adjusted.time_cost.total.it - time.it).abs() < 1e-9);
        assert_eq!(adjusted.distance_cost.units, UNIT_ADJUSTED);
    }

    #[test]
    fn test_fuel_cost_by_share() {
        let tables = ReferenceTables::standard().unwrap();
        let result = voc_for(VehicleClass::SmallCars, LaneType::TwoLane);
        let (d, _) = adjust_class(&result, &PriceIndexTable::identity(2024), tables).unwrap();
        let fuel = &result.distance.fuel_consumption;
        let expected_et = 0.7 * fuel.petrol * 33.58 / 1000.0 + 0.3 * fuel.diesel * 30.51 / 1000.0;
        assert!((d.fuel_cost.et - expected_et).abs() < 1e-12);
    }

    #[test]
    fn test_tyre_cost_per_km() {
        let tables = ReferenceTables::standard().unwrap();
        let result = voc_for(VehicleClass::Mcv, LaneType::FourLane);
        let (d, _) = adjust_class(&result, &PriceIndexTable::identity(2024), tables).unwrap();
        let life = result.distance.tyre_life.value();
        assert!((d.tyre_cost.it - 20000.0 * 14.0 / life).abs() < 1e-9);
    }

    #[test]
    fn test_multipliers_scale_elements() {
        let tables = ReferenceTables::standard().unwrap();
        let result = voc_for(VehicleClass::Lcv, LaneType::TwoLane);
        let base = adjust_class(&result, &PriceIndexTable::identity(2024), tables).unwrap();

        let mut wpi = PriceIndexTable::identity(2024);
        wpi.set(WpiCategory::FixedDepreciation, IndexEntry::Scalar(2.0));
        wpi.set(
            WpiCategory::CommodityHolding,
            IndexEntry::Keyed(BTreeMap::from([("LCV".to_string(), 1.5)])),
        );
        let scaled = adjust_class(&result, &wpi, tables).unwrap();
        assert!((scaled.1.fixed_cost.it - 2.0 * base.1.fixed_cost.it).abs() < 1e-12);
        assert!((scaled.1.commodity_holding_cost - 1.5 * base.1.commodity_holding_cost).abs() < 1e-12);
        assert_eq!(scaled.0, base.0);
    }

    #[test]
    fn test_missing_category_fails() {
        let tables = ReferenceTables::standard().unwrap();
        let result = voc_for(VehicleClass::Hcv, LaneType::TwoLane);
        let mut wpi = PriceIndexTable::identity(2024);
        wpi.wpi.top_level.remove("passengerCrewCost");
        let err = adjust_class(&result, &wpi, tables).unwrap_err();
        assert_eq!(err, CalcError::missing_wpi_category("passengerCrewCost", "hcv"));
    }

    #[test]
    fn test_unused_fuel_not_required() {
        let tables = ReferenceTables::standard().unwrap();
        let result = voc_for(VehicleClass::Buses, LaneType::TwoLane);
        let mut wpi = PriceIndexTable::identity(2024);
        wpi.set(
            WpiCategory::FuelCost,
            IndexEntry::Keyed(BTreeMap::from([
                (entry::DIESEL.to_string(), 1.2),
                (entry::ENGINE_OIL.to_string(), 1.0),
                (entry::OTHER_OIL.to_string(), 1.0),
                (entry::GREASE.to_string(), 1.0),
            ])),
        );
        assert!(adjust_class(&result, &wpi, tables).is_ok());

        let car = voc_for(VehicleClass::SmallCars, LaneType::TwoLane);
        let err = adjust_class(&car, &wpi, tables).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_WPI_CATEGORY");
    }

    #[test]
    fn test_worn_out_tyre_life_uses_floor() {
        let tables = ReferenceTables::standard().unwrap();
        let profile = tables.vehicle(VehicleClass::Buses).unwrap();
        let mut result = voc_for(VehicleClass::Buses, LaneType::TwoLane);
        result.distance.tyre_life.amount = output::Amount::Single { value: 0.0 };
        let (d, _) = adjust_class(&result, &PriceIndexTable::identity(2024), tables).unwrap();
        let expected = profile.tyre_price * f64::from(profile.tyres_per_vehicle) / MIN_TYRE_LIFE_KM;
        assert!((d.tyre_cost.it - expected.it).abs() < 1e-9);
        assert!((d.tyre_cost.et - expected.et).abs() < 1e-9);
    }

    #[test]
    fn test_nan_tyre_life_rejected() {
        let tables = ReferenceTables::standard().unwrap();
        let mut result = voc_for(VehicleClass::Buses, LaneType::TwoLane);
        result.distance.tyre_life.amount = output::Amount::Single { value: f64::NAN };
        let err = adjust_class(&result, &PriceIndexTable::identity(2024), tables).unwrap_err();
        assert_eq!(err, CalcError::non_finite("buses", "tyre_life"));
    }
}
