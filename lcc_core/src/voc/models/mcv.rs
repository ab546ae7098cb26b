//! Multi-axle commercial vehicles.
//!
//! The coefficients are provisional: they follow the form of the car and LCV
//! regressions and are scaled to this class's speed and weight, but have not
//! been fitted to a published calibration table. Replace them before relying
//! on this class's costs.

use super::{divided_speed, undivided_speed, FuelUse, RegressionInputs, VocModel};
use crate::reference::{LaneType, VehicleClass};
use crate::units::TaxPair;

pub struct Mcv;

impl VocModel for Mcv {
    fn vehicle_class(&self) -> VehicleClass {
        VehicleClass::Mcv
    }

    fn calibrated(&self) -> bool {
        false
    }

    fn free_flow_speed(&self, x: &RegressionInputs) -> f64 {
        match x.lane {
            LaneType::SingleLane => undivided_speed(39.72, 0.3614, 0.00058, x) + 0.231 * x.pwr,
            LaneType::IntermediateLane => undivided_speed(42.81, 0.3897, 0.00064, x) + 0.238 * x.pwr,
            LaneType::TwoLane => undivided_speed(45.97, 0.4182, 0.00070, x) + 0.245 * x.pwr,
            LaneType::FourLane => divided_speed(58.614, 0.136, 0.0026, x) + 0.327 * x.pwr,
            LaneType::SixLane => divided_speed(60.432, 0.136, 0.0026, x) + 0.327 * x.pwr,
            LaneType::EightLane => divided_speed(62.250, 0.136, 0.0026, x) + 0.327 * x.pwr,
            LaneType::Expressway => divided_speed(55.37, 0.136, 0.0026, x) + 0.327 * x.pwr + 0.482 * x.w,
        }
    }

    fn fuel_consumption(&self, x: &RegressionInputs, v: f64) -> FuelUse {
        FuelUse {
            petrol: 0.0,
            diesel: 108.24 + 4786.1 / v + 0.0612 * v * v + 0.00476 * x.rg + 17.4126 * x.rs - 2.5318 * x.fl
                - 0.917 * x.pwr,
        }
    }

    fn spare_parts_fraction(&self, x: &RegressionInputs) -> f64 {
        (-9.2068 + 0.000158 * x.rg + 0.0108 * x.gw).exp()
    }

    fn maintenance_labour(&self, spare_parts_et: f64) -> f64 {
        0.58214 * spare_parts_et
    }

    fn tyre_life(&self, x: &RegressionInputs) -> f64 {
        52140.0 - 512.8 * x.rf - 2.386 * x.rg - 97.3 * x.gw
    }

    fn engine_oil(&self, x: &RegressionInputs) -> f64 {
        2.4372 + 0.04618 * x.rf + 0.0003562 * (x.rg / x.w)
    }

    fn other_oil(&self, x: &RegressionInputs) -> f64 {
        4.8127 + 0.0002093 * x.rg + 0.0187 * x.gw
    }

    fn grease(&self, x: &RegressionInputs) -> f64 {
        1.0846 + 0.0593 * x.rf + 0.000498 * x.rg
    }

    fn utilisation(&self, v: f64) -> f64 {
        36.142 + 2.1583 * v
    }

    fn fixed_cost_per_day(&self) -> TaxPair {
        TaxPair::new(1930.11, 1684.25)
    }

    fn depreciation_per_day(&self) -> TaxPair {
        TaxPair::new(427.18, 297.64)
    }

    fn crew_cost(&self, utilisation: f64) -> f64 {
        1350.0 / utilisation
    }

    fn commodity_holding_cost(&self, lane: LaneType, utilisation: f64) -> f64 {
        let per_day = match lane {
            LaneType::SingleLane | LaneType::IntermediateLane => 131.28,
            LaneType::TwoLane => 144.76,
            _ => 302.55,
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
    fn test_heavier_than_hcv_on_fuel() {
        let mut x = inputs(LaneType::TwoLane, 2000.0, 0.0, 0.0, 7.0);
        x.pwr = 8.0;
        let v = 50.0;
        let mcv = Mcv.fuel_consumption(&x, v).diesel;
        let hcv = super::super::Hcv.fuel_consumption(&x, v).diesel;
        assert!(mcv > hcv);
    }

    #[test]
    fn test_tyre_life_uses_gross_weight() {
        let tables = ReferenceTables::standard().unwrap();
        let profile = tables.vehicle(VehicleClass::Mcv).unwrap();
        let mut x = inputs(LaneType::FourLane, 2000.0, 0.0, 0.0, 7.0);
        x.pwr = 8.0;
        x.gw = profile.gross_weight_t;
        let raw = Mcv.compute(&x, profile);
        assert!((raw.tyre_life_km - (52140.0 - 2.386 * 2000.0 - 97.3 * 37.0)).abs() < 1e-9);
    }
}
