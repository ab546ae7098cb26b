//! Heavy commercial vehicles (two/three-axle trucks). Speed and fuel depend
//! on the power-to-weight ratio; wear on gross weight.
//!
//! The coefficients are provisional: they follow the form of the car and LCV
//! regressions and are scaled to this class's speed and weight, but have not
//! been fitted to a published calibration table. Replace them before relying
//! on this class's costs.

use super::{divided_speed, undivided_speed, FuelUse, RegressionInputs, VocModel};
use crate::reference::{LaneType, VehicleClass};
use crate::units::TaxPair;

pub struct Hcv;

impl VocModel for Hcv {
    fn vehicle_class(&self) -> VehicleClass {
        VehicleClass::Hcv
    }

    fn calibrated(&self) -> bool {
        false
    }

    fn free_flow_speed(&self, x: &RegressionInputs) -> f64 {
        match x.lane {
            LaneType::SingleLane => undivided_speed(42.18, 0.3821, 0.00062, x) + 0.218 * x.pwr,
            LaneType::IntermediateLane => undivided_speed(45.36, 0.4112, 0.00068, x) + 0.224 * x.pwr,
            LaneType::TwoLane => undivided_speed(48.74, 0.4403, 0.00074, x) + 0.231 * x.pwr,
            LaneType::FourLane => divided_speed(61.528, 0.141, 0.0027, x) + 0.312 * x.pwr,
            LaneType::SixLane => divided_speed(63.410, 0.141, 0.0027, x) + 0.312 * x.pwr,
            LaneType::EightLane => divided_speed(65.292, 0.141, 0.0027, x) + 0.312 * x.pwr,
            LaneType::Expressway => divided_speed(58.16, 0.141, 0.0027, x) + 0.312 * x.pwr + 0.497 * x.w,
        }
    }

    fn fuel_consumption(&self, x: &RegressionInputs, v: f64) -> FuelUse {
        FuelUse {
            petrol: 0.0,
            diesel: 92.61 + 4127.3 / v + 0.0514 * v * v + 0.00412 * x.rg + 14.2218 * x.rs - 2.1147 * x.fl
                - 0.842 * x.pwr,
        }
    }

    fn spare_parts_fraction(&self, x: &RegressionInputs) -> f64 {
        (-9.4173 + 0.000152 * x.rg + 0.0132 * x.gw).exp()
    }

    fn maintenance_labour(&self, spare_parts_et: f64) -> f64 {
        0.63127 * spare_parts_et
    }

    fn tyre_life(&self, x: &RegressionInputs) -> f64 {
        46380.0 - 486.2 * x.rf - 2.214 * x.rg - 118.6 * x.gw
    }

    fn engine_oil(&self, x: &RegressionInputs) -> f64 {
        2.1184 + 0.04126 * x.rf + 0.0003117 * (x.rg / x.w)
    }

    fn other_oil(&self, x: &RegressionInputs) -> f64 {
        4.2316 + 0.0001847 * x.rg + 0.0214 * x.gw
    }

    fn grease(&self, x: &RegressionInputs) -> f64 {
        0.9412 + 0.0527 * x.rf + 0.000446 * x.rg
    }

    fn utilisation(&self, v: f64) -> f64 {
        34.628 + 2.2917 * v
    }

    fn fixed_cost_per_day(&self) -> TaxPair {
        TaxPair::new(1618.72, 1412.30)
    }

    fn depreciation_per_day(&self) -> TaxPair {
        TaxPair::new(351.43, 244.86)
    }

    fn crew_cost(&self, utilisation: f64) -> f64 {
        1125.0 / utilisation
    }

    fn commodity_holding_cost(&self, lane: LaneType, utilisation: f64) -> f64 {
        let per_day = match lane {
            LaneType::SingleLane | LaneType::IntermediateLane => 98.46,
            LaneType::TwoLane => 108.57,
            _ => 226.91,
        };
        per_day / utilisation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voc::models::test_support::inputs;

    #[test]
    fn test_more_power_is_faster_and_thriftier() {
        let mut weak = inputs(LaneType::TwoLane, 3000.0, 5.0, 5.0, 7.0);
        weak.pwr = 5.0;
        let mut strong = weak;
        strong.pwr = 10.0;
        let v_weak = Hcv.free_flow_speed(&weak);
        let v_strong = Hcv.free_flow_speed(&strong);
        assert!(v_strong > v_weak);
        assert!((v_strong - v_weak - 0.231 * 5.0).abs() < 1e-9);
        assert!(Hcv.fuel_consumption(&strong, v_weak).diesel < Hcv.fuel_consumption(&weak, v_weak).diesel);
    }

    #[test]
    fn test_expressway_width_term() {
        let mut x = inputs(LaneType::Expressway, 2000.0, 0.0, 0.0, 12.0);
        x.pwr = 7.22;
        let expected = 58.16 - 0.0027 * 2000.0 + 0.312 * 7.22 + 0.497 * 12.0;
        assert!((Hcv.free_flow_speed(&x) - expected).abs() < 1e-9);
    }
}
