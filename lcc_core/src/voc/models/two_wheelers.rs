//! Two-wheelers: petrol only, no crew or cargo.
//!
//! The coefficients are provisional: they follow the form of the car and LCV
//! regressions and are scaled to this class's speed and weight, but have not
//! been fitted to a published calibration table. Replace them before relying
//! on this class's costs.

use super::{divided_speed, undivided_speed, FuelUse, RegressionInputs, VocModel};
use crate::reference::{LaneType, VehicleClass};
use crate::units::TaxPair;

pub struct TwoWheelers;

impl VocModel for TwoWheelers {
    fn vehicle_class(&self) -> VehicleClass {
        VehicleClass::TwoWheelers
    }

    fn calibrated(&self) -> bool {
        false
    }

    fn free_flow_speed(&self, x: &RegressionInputs) -> f64 {
        match x.lane {
            LaneType::SingleLane => undivided_speed(52.37, 0.4658, 0.001882, x),
            LaneType::IntermediateLane => undivided_speed(56.14, 0.4992, 0.001716, x),
            LaneType::TwoLane => undivided_speed(60.42, 0.5374, 0.001536, x),
            LaneType::FourLane => divided_speed(71.244, 0.274, 0.00246, x),
            LaneType::SixLane => divided_speed(73.140, 0.274, 0.00246, x),
            LaneType::EightLane => divided_speed(75.036, 0.274, 0.00246, x),
            LaneType::Expressway => divided_speed(67.85, 0.274, 0.00246, x) + 0.512 * x.w,
        }
    }

    fn fuel_consumption(&self, x: &RegressionInputs, v: f64) -> FuelUse {
        FuelUse {
            petrol: 12.0 + 412.36 / v + 0.0012 * v * v + 0.0006 * x.rg + 0.1621 * x.rs - 0.0893 * x.fl,
            diesel: 0.0,
        }
    }

    fn spare_parts_fraction(&self, x: &RegressionInputs) -> f64 {
        0.0032 * (x.rg - 2000.0) * 1e-5
    }

    fn maintenance_labour(&self, spare_parts_et: f64) -> f64 {
        1.2134 * spare_parts_et
    }

    fn tyre_life(&self, x: &RegressionInputs) -> f64 {
        31520.0 - 62.4 * x.rf - 9.87 * (x.rg / x.w)
    }

    fn engine_oil(&self, x: &RegressionInputs) -> f64 {
        0.9321 + 0.0184 * x.rf + 0.000291 * (x.rg / x.w)
    }

    fn other_oil(&self, x: &RegressionInputs) -> f64 {
        0.4127 + 0.0132 * x.rf + 0.000466 * (x.rg / x.w)
    }

    fn grease(&self, x: &RegressionInputs) -> f64 {
        0.8141 + 0.0587 * x.rf
    }

    fn utilisation(&self, v: f64) -> f64 {
        5.8216 * v
    }

    fn fixed_cost_per_day(&self) -> TaxPair {
        TaxPair::new(45.91, 42.18)
    }

    fn depreciation_per_day(&self) -> TaxPair {
        TaxPair::new(11.97, 6.81)
    }

    // Value of time times 1.71 riders.
    fn passenger_time_cost(&self, lane: LaneType, v: f64) -> f64 {
        let per_hour = match lane {
            LaneType::SingleLane | LaneType::IntermediateLane => 70.62,
            LaneType::TwoLane => 102.77,
            _ => 103.46,
        };
        per_hour / v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voc::models::test_support::inputs;

    #[test]
    fn test_petrol_only() {
        let x = inputs(LaneType::SingleLane, 3000.0, 1.0, 1.0, 3.75);
        let v = TwoWheelers.free_flow_speed(&x);
        let fuel = TwoWheelers.fuel_consumption(&x, v);
        assert_eq!(fuel.diesel, 0.0);
        assert!(fuel.petrol > 0.0);
    }

    #[test]
    fn test_speed_drops_with_roughness() {
        let smooth = inputs(LaneType::SixLane, 2000.0, 0.0, 0.0, 10.5);
        let rough = inputs(LaneType::SixLane, 6000.0, 0.0, 0.0, 10.5);
        assert!(TwoWheelers.free_flow_speed(&rough) < TwoWheelers.free_flow_speed(&smooth));
    }
}
