//! Light commercial vehicles: diesel only, carries crew and cargo.

use super::{divided_speed, undivided_speed, FuelUse, RegressionInputs, VocModel};
use crate::reference::{LaneType, VehicleClass};
use crate::units::TaxPair;

pub struct Lcv;

impl VocModel for Lcv {
    fn vehicle_class(&self) -> VehicleClass {
        VehicleClass::Lcv
    }

    fn free_flow_speed(&self, x: &RegressionInputs) -> f64 {
        match x.lane {
            LaneType::SingleLane => undivided_speed(49.87, 0.4447, 0.00088, x),
            LaneType::IntermediateLane => undivided_speed(53.70, 0.4788, 0.00095, x),
            LaneType::TwoLane => undivided_speed(57.41, 0.5119, 0.00102, x),
            LaneType::FourLane => divided_speed(74.897, 0.163, 0.0031, x),
            LaneType::SixLane => divided_speed(77.036, 0.163, 0.0031, x),
            LaneType::EightLane => divided_speed(79.174, 0.163, 0.0031, x),
            LaneType::Expressway => divided_speed(70.620, 0.163, 0.0031, x) + 0.611 * x.w,
        }
    }

    fn fuel_consumption(&self, x: &RegressionInputs, v: f64) -> FuelUse {
        FuelUse {
            petrol: 0.0,
            diesel: 22.504 + 1708.244 / v + 0.02591 * v * v + 0.001612 * x.rg + 5.6863 * x.rs - 0.8744 * x.fl,
        }
    }

    fn spare_parts_fraction(&self, x: &RegressionInputs) -> f64 {
        (-10.5615 + 0.000141 * x.rg + 3.493 / x.w).exp()
    }

    fn maintenance_labour(&self, spare_parts_et: f64) -> f64 {
        0.85773 * spare_parts_et
    }

    fn tyre_life(&self, x: &RegressionInputs) -> f64 {
        22382.0 + 3817.0 * x.w - 375.3 * x.rf - 1.037 * x.rg
    }

    fn engine_oil(&self, x: &RegressionInputs) -> f64 {
        0.80679 + 0.019496 * x.rf + 0.0001297 * (x.rg / x.w)
    }

    fn other_oil(&self, x: &RegressionInputs) -> f64 {
        2.0415 + 0.0001058 * x.rg
    }

    fn grease(&self, x: &RegressionInputs) -> f64 {
        0.3661 + 0.0283 * x.rf + 0.000251 * x.rg
    }

    fn utilisation(&self, v: f64) -> f64 {
        28.807 + 2.1836 * v
    }

    fn fixed_cost_per_day(&self) -> TaxPair {
        TaxPair::new(829.56, 723.80)
    }

    fn depreciation_per_day(&self) -> TaxPair {
        TaxPair::new(173.51, 120.90)
    }

    fn crew_cost(&self, utilisation: f64) -> f64 {
        900.0 / utilisation
    }

    fn commodity_holding_cost(&self, lane: LaneType, utilisation: f64) -> f64 {
        let per_day = match lane {
            LaneType::SingleLane | LaneType::IntermediateLane => 64.71,
            LaneType::TwoLane => 71.35,
            _ => 149.12,
        };
        per_day / utilisation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceTables;
    use crate::voc::models::test_support::inputs;

    #[test]
    fn test_diesel_only() {
        let x = inputs(LaneType::TwoLane, 3000.0, 2.0, 3.0, 7.0);
        let v = Lcv.free_flow_speed(&x);
        let fuel = Lcv.fuel_consumption(&x, v);
        assert_eq!(fuel.petrol, 0.0);
        assert!(fuel.diesel > 0.0);
    }

    #[test]
    fn test_cargo_and_crew_costs() {
        let tables = ReferenceTables::standard().unwrap();
        let profile = tables.vehicle(VehicleClass::Lcv).unwrap();
        let raw = Lcv.compute(&inputs(LaneType::FourLane, 2000.0, 0.0, 0.0, 7.0), profile);
        let v = 74.897 - 0.0031 * 2000.0;
        let upd = 28.807 + 2.1836 * v;
        assert!((raw.crew - 900.0 / upd).abs() < 1e-12);
        assert!((raw.commodity_holding - 149.12 / upd).abs() < 1e-12);
        assert_eq!(raw.passenger_time, 0.0);
    }

    #[test]
    fn test_spare_parts_exponential_form() {
        let tables = ReferenceTables::standard().unwrap();
        let profile = tables.vehicle(VehicleClass::Lcv).unwrap();
        let x = inputs(LaneType::TwoLane, 2000.0, 0.0, 0.0, 7.0);
        let raw = Lcv.compute(&x, profile);
        let fraction = (-10.5615_f64 + 0.000141 * 2000.0 + 3.493 / 7.0).exp();
        assert!((raw.spare_parts.et - fraction * 449721.0).abs() < 1e-9);
        assert!((raw.maintenance_labour - 0.85773 * raw.spare_parts.et).abs() < 1e-12);
    }
}
