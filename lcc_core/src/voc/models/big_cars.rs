//! Big cars: diesel-heavy mix, no crew or cargo.

use super::{divided_speed, undivided_speed, FuelUse, RegressionInputs, VocModel};
use crate::reference::{LaneType, VehicleClass};
use crate::units::TaxPair;

pub struct BigCars;

impl VocModel for BigCars {
    fn vehicle_class(&self) -> VehicleClass {
        VehicleClass::BigCars
    }

    fn free_flow_speed(&self, x: &RegressionInputs) -> f64 {
        match x.lane {
            LaneType::SingleLane => undivided_speed(67.04, 0.6984, 0.002956, x),
            LaneType::IntermediateLane => undivided_speed(73.82, 0.7364, 0.002251, x),
            LaneType::TwoLane => undivided_speed(81.92, 0.7963, 0.001915, x),
            LaneType::FourLane => divided_speed(100.625, 0.394, 0.00330, x),
            LaneType::SixLane => divided_speed(104.159, 0.398, 0.00333, x),
            LaneType::EightLane => divided_speed(107.743, 0.402, 0.00337, x),
            LaneType::Expressway => divided_speed(97.53, 0.402, 0.00337, x) + 0.729 * x.w,
        }
    }

    // Same engine families as small cars.
    fn fuel_consumption(&self, x: &RegressionInputs, v: f64) -> FuelUse {
        FuelUse {
            petrol: 30.0 + 844.085 / v + 0.003 * v * v + 0.001 * x.rg + 0.3414 * x.rs - 0.2225 * x.fl,
            diesel: 35.0 + 983.503 / v + 0.003 * v * v + 0.002 * x.rg + 0.339 * x.rs - 0.4785 * x.fl,
        }
    }

    fn spare_parts_fraction(&self, x: &RegressionInputs) -> f64 {
        0.0045 * (x.rg - 2000.0) * 1e-5
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
        6.7378 * v
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
            _ => 721.73,
        };
        per_hour / v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voc::models::test_support::inputs;

    #[test]
    fn test_eight_lane_speed() {
        let x = inputs(LaneType::EightLane, 2500.0, 4.0, 6.0, 14.0);
        let expected = 107.743 - 0.402 * 10.0 - 0.00337 * 2500.0;
        assert!((BigCars.free_flow_speed(&x) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_multilane_passenger_time() {
        assert!((BigCars.passenger_time_cost(LaneType::FourLane, 80.0) - 721.73 / 80.0).abs() < 1e-12);
        assert!((BigCars.passenger_time_cost(LaneType::IntermediateLane, 50.0) - 244.07 / 50.0).abs() < 1e-12);
    }
}
