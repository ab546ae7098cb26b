//! Small cars: petrol/diesel mix, no crew or cargo.

use super::{divided_speed, undivided_speed, FuelUse, RegressionInputs, VocModel};
use crate::reference::{LaneType, VehicleClass};
use crate::units::TaxPair;

pub struct SmallCars;

impl VocModel for SmallCars {
    fn vehicle_class(&self) -> VehicleClass {
        VehicleClass::SmallCars
    }

    fn free_flow_speed(&self, x: &RegressionInputs) -> f64 {
        match x.lane {
            LaneType::SingleLane => undivided_speed(66.44, 0.6922, 0.002874, x),
            LaneType::IntermediateLane => undivided_speed(73.16, 0.7298, 0.002231, x),
            LaneType::TwoLane => undivided_speed(81.19, 0.7892, 0.001891, x),
            LaneType::FourLane => divided_speed(100.625, 0.394, 0.00330, x),
            LaneType::SixLane => divided_speed(101.065, 0.386, 0.00323, x),
            LaneType::EightLane => divided_speed(103.517, 0.386, 0.00323, x),
            LaneType::Expressway => divided_speed(93.71, 0.386, 0.00323, x) + 0.701 * x.w,
        }
    }

    fn fuel_consumption(&self, x: &RegressionInputs, v: f64) -> FuelUse {
        FuelUse {
            petrol: 30.0 + 844.085 / v + 0.003 * v * v + 0.001 * x.rg + 0.3414 * x.rs - 0.2225 * x.fl,
            diesel: 35.0 + 983.503 / v + 0.003 * v * v + 0.002 * x.rg + 0.339 * x.rs - 0.4785 * x.fl,
        }
    }

    fn spare_parts_fraction(&self, x: &RegressionInputs) -> f64 {
        0.0075 * (x.rg - 2000.0) * 1e-5
    }

    fn maintenance_labour(&self, spare_parts_et: f64) -> f64 {
        1.79934 * spare_parts_et
    }

    fn tyre_life(&self, x: &RegressionInputs) -> f64 {
        68771.0 - 147.9 * x.rf - 26.72 * (x.rg / x.w)
    }

    fn engine_oil(&self, x: &RegressionInputs) -> f64 {
        1.8807 + 0.036615 * x.rf + 0.000578 * (x.rg / x.w)
    }

    fn other_oil(&self, x: &RegressionInputs) -> f64 {
        1.631 + 0.05167 * x.rf + 0.001867 * (x.rg / x.w)
    }

    fn grease(&self, x: &RegressionInputs) -> f64 {
        2.816 + 0.2007 * x.rf
    }

    fn utilisation(&self, v: f64) -> f64 {
        6.7127 * v
    }

    fn fixed_cost_per_day(&self) -> TaxPair {
        TaxPair::new(400.61, 395.65)
    }

    fn depreciation_per_day(&self) -> TaxPair {
        TaxPair::new(76.68, 42.83)
    }

    fn passenger_time_cost(&self, lane: LaneType, v: f64) -> f64 {
        let per_hour = match lane {
            LaneType::SingleLane | LaneType::IntermediateLane => 244.07,
            LaneType::TwoLane => 328.06,
            LaneType::FourLane | LaneType::SixLane | LaneType::EightLane => 498.65,
            LaneType::Expressway => 721.73,
        };
        per_hour / v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceTables;
    use crate::voc::models::test_support::inputs;

    #[test]
    fn test_two_lane_speed() {
        let x = inputs(LaneType::TwoLane, 2000.0, 0.0, 0.0, 7.0);
        assert!((SmallCars.free_flow_speed(&x) - 81.19).abs() < 1e-9);
    }

    #[test]
    fn test_expressway_uses_width() {
        let x = inputs(LaneType::Expressway, 2000.0, 0.0, 0.0, 15.0);
        let expected = 93.71 - 0.00323 * 2000.0 + 0.701 * 15.0;
        assert!((SmallCars.free_flow_speed(&x) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_smooth_road_has_no_spare_parts() {
        let tables = ReferenceTables::standard().unwrap();
        let profile = tables.vehicle(VehicleClass::SmallCars).unwrap();
        let raw = SmallCars.compute(&inputs(LaneType::TwoLane, 2000.0, 0.0, 0.0, 7.0), profile);
        assert_eq!(raw.spare_parts, TaxPair::ZERO);
        assert_eq!(raw.maintenance_labour, 0.0);
        assert_eq!(raw.crew, 0.0);
        assert_eq!(raw.commodity_holding, 0.0);
    }

    #[test]
    fn test_time_costs_scale_with_utilisation() {
        let tables = ReferenceTables::standard().unwrap();
        let profile = tables.vehicle(VehicleClass::SmallCars).unwrap();
        let raw = SmallCars.compute(&inputs(LaneType::TwoLane, 2000.0, 0.0, 0.0, 7.0), profile);
        let upd = 6.7127 * 81.19;
        assert!((raw.utilisation_km_per_day - upd).abs() < 1e-9);
        assert!((raw.fixed_cost.et - 395.65 / upd).abs() < 1e-12);
        assert!((raw.depreciation.it - 76.68 / upd).abs() < 1e-12);
        assert!((raw.passenger_time - 328.06 / 81.19).abs() < 1e-12);
    }
}
