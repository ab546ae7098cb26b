//! Ordinary buses: diesel only, carries passengers and crew.
//!
//! The coefficients are provisional: they follow the form of the car and LCV
//! regressions and are scaled to this class's speed and weight, but have not
//! been fitted to a published calibration table. Replace them before relying
//! on this class's costs.

use super::{divided_speed, undivided_speed, FuelUse, RegressionInputs, VocModel};
use crate::reference::{LaneType, VehicleClass};
use crate::units::TaxPair;

pub struct Buses;

impl VocModel for Buses {
    fn vehicle_class(&self) -> VehicleClass {
        VehicleClass::Buses
    }

    fn calibrated(&self) -> bool {
        false
    }

    fn free_flow_speed(&self, x: &RegressionInputs) -> f64 {
        match x.lane {
            LaneType::SingleLane => undivided_speed(45.86, 0.4102, 0.00071, x),
            LaneType::IntermediateLane => undivided_speed(49.62, 0.4436, 0.00079, x),
            LaneType::TwoLane => undivided_speed(53.21, 0.4751, 0.00085, x),
            LaneType::FourLane => divided_speed(70.134, 0.152, 0.0029, x),
            LaneType::SixLane => divided_speed(72.216, 0.152, 0.0029, x),
            LaneType::EightLane => divided_speed(74.298, 0.152, 0.0029, x),
            LaneType::Expressway => divided_speed(66.38, 0.152, 0.0029, x) + 0.584 * x.w,
        }
    }

    fn fuel_consumption(&self, x: &RegressionInputs, v: f64) -> FuelUse {
        FuelUse {
            petrol: 0.0,
            diesel: 78.46 + 3218.6 / v + 0.0431 * v * v + 0.00329 * x.rg + 9.8632 * x.rs - 1.6217 * x.fl,
        }
    }

    fn spare_parts_fraction(&self, x: &RegressionInputs) -> f64 {
        (-9.8416 + 0.000168 * x.rg + 4.112 / x.w).exp()
    }

    fn maintenance_labour(&self, spare_parts_et: f64) -> f64 {
        0.71241 * spare_parts_et
    }

    fn tyre_life(&self, x: &RegressionInputs) -> f64 {
        41220.0 - 412.6 * x.rf - 1.842 * x.rg
    }

    fn engine_oil(&self, x: &RegressionInputs) -> f64 {
        1.6415 + 0.03218 * x.rf + 0.0002237 * (x.rg / x.w)
    }

    fn other_oil(&self, x: &RegressionInputs) -> f64 {
        3.4218 + 0.0001631 * x.rg
    }

    fn grease(&self, x: &RegressionInputs) -> f64 {
        0.6873 + 0.0441 * x.rf + 0.000392 * x.rg
    }

    fn utilisation(&self, v: f64) -> f64 {
        31.214 + 2.4128 * v
    }

    fn fixed_cost_per_day(&self) -> TaxPair {
        TaxPair::new(2049.55, 1786.40)
    }

    fn depreciation_per_day(&self) -> TaxPair {
        TaxPair::new(457.20, 318.42)
    }

    // Value of time times 30 passengers.
    fn passenger_time_cost(&self, lane: LaneType, v: f64) -> f64 {
        let per_hour = match lane {
            LaneType::SingleLane | LaneType::IntermediateLane => 816.0,
            _ => 2196.0,
        };
        per_hour / v
    }

    fn crew_cost(&self, utilisation: f64) -> f64 {
        1440.0 / utilisation
    }
}
