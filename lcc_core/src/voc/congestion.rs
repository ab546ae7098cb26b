//! # Congestion Adjustment
//!
//! Scales index-adjusted per-km costs by the volume-to-capacity ratio and
//! weights them by traffic counts to give the road-user cost per km of the
//! whole stream.
//!
//! Each (lane group, vehicle class) pair has a time factor and a distance
//! factor, each a polynomial in V/C. Both are clamped to `[1.0, 2.0]`, so
//! congestion never makes travel cheaper and never more than doubles a cost.
//! Eight-lane roads and expressways share coefficients.
//!
//! ```text
//! total = Σ_c count_c · (distance_c · df_c(vc) + time_c · tf_c(vc))
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::reference::{LaneType, VehicleClass};
use crate::units::TaxPair;
use crate::voc::input::VehicleCounts;
use crate::voc::wpi::{CostBreakdown, WpiAdjustedCosts};

pub const UNIT_ROAD_USER_COST: &str = "Rs/km";

pub const MIN_FACTOR: f64 = 1.0;
pub const MAX_FACTOR: f64 = 2.0;

/// Which half of the per-km cost a factor scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostKind {
    Distance,
    Time,
}

/// `a0 + a1·vc + a2·vc²`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Poly {
    a0: f64,
    a1: f64,
    a2: f64,
}

const fn lin(a0: f64, a1: f64) -> Poly {
    Poly { a0, a1, a2: 0.0 }
}

const fn quad(a2: f64, a1: f64, a0: f64) -> Poly {
    Poly { a0, a1, a2 }
}

impl Poly {
    fn eval(self, vc: f64) -> f64 {
        self.a0 + self.a1 * vc + self.a2 * vc * vc
    }
}

fn time_poly(lane: LaneType, class: VehicleClass) -> Poly {
    use LaneType::*;
    use VehicleClass::*;
    match (lane, class) {
        (SingleLane, SmallCars | BigCars) => lin(0.747, 1.458),
        (SingleLane, TwoWheelers) => lin(0.911, 0.807),
        (SingleLane, Buses) => lin(0.838, 1.307),
        (SingleLane, Lcv) => lin(0.880, 1.200),
        (SingleLane, Hcv | Mcv) => lin(0.858, 1.101),

        (IntermediateLane, SmallCars | BigCars) => lin(0.930, 1.025),
        (IntermediateLane, TwoWheelers) => lin(0.776, 0.728),
        (IntermediateLane, Buses) => lin(0.942, 0.670),
        (IntermediateLane, Lcv) => lin(1.012, 0.863),
        (IntermediateLane, Hcv | Mcv) => lin(0.920, 1.033),

        (TwoLane, SmallCars | BigCars) => lin(1.087, 0.483),
        (TwoLane, TwoWheelers) => lin(0.804, 0.865),
        (TwoLane, Buses) => lin(0.864, 0.543),
        (TwoLane, Lcv) => lin(0.925, 0.573),
        (TwoLane, Hcv | Mcv) => lin(0.878, 0.561),

        (FourLane, SmallCars | BigCars) => quad(0.4834, 0.4095, 0.99),
        (FourLane, TwoWheelers) => lin(0.99, 1.1063),
        (FourLane, Buses) => quad(1.534, -0.2301, 0.99),
        (FourLane, Lcv) => quad(0.8441, 0.4337, 0.99),
        (FourLane, Hcv) => quad(1.1036, 0.4124, 0.99),
        (FourLane, Mcv) => quad(0.3709, 0.4604, 0.99),

        (SixLane, SmallCars | BigCars) => quad(2.1947, -0.3352, 1.0),
        (SixLane, TwoWheelers) => quad(0.8998, 0.9407, 1.0),
        (SixLane, Buses) => quad(0.9412, -0.1881, 1.0),
        (SixLane, Lcv) => quad(0.8441, 0.4337, 0.99),
        (SixLane, Hcv) => quad(1.593, -0.0523, 1.0),
        (SixLane, Mcv) => lin(1.0, 1.0234),

        (EightLane | Expressway, SmallCars | BigCars) => quad(-0.2441, 0.9003, 0.99),
        (EightLane | Expressway, TwoWheelers) => lin(1.0, 0.3973),
        (EightLane | Expressway, Buses) => quad(-0.0092, 0.4559, 1.0),
        (EightLane | Expressway, Lcv) => quad(-0.1476, 0.5986, 0.99),
        (EightLane | Expressway, Hcv) => quad(0.2143, 0.457, 1.0),
        (EightLane | Expressway, Mcv) => quad(-0.373, 0.7575, 1.0),
    }
}

fn distance_poly(lane: LaneType, class: VehicleClass) -> Poly {
    use LaneType::*;
    use VehicleClass::*;
    match (lane, class) {
        (SingleLane, SmallCars | BigCars) => lin(0.924, 0.680),
        (SingleLane, TwoWheelers) => lin(0.990, 0.830),
        (SingleLane, Buses) => lin(1.0, 1.0),
        (SingleLane, Lcv) => lin(1.0, 0.9),
        (SingleLane, Hcv | Mcv) => lin(1.179, 0.757),

        (IntermediateLane, SmallCars | BigCars) => lin(0.924, 0.635),
        (IntermediateLane, TwoWheelers) => lin(0.942, 0.118),
        (IntermediateLane, Buses) => lin(0.8, 1.2),
        (IntermediateLane, Lcv) => lin(0.9, 1.0),
        (IntermediateLane, Hcv | Mcv) => lin(1.104, 0.755),

        (TwoLane, SmallCars | BigCars) => lin(0.893, 0.259),
        (TwoLane, TwoWheelers) => lin(0.917, 0.112),
        (TwoLane, Buses) => lin(0.8, 1.1),
        (TwoLane, Lcv) => lin(0.9, 1.0),
        (TwoLane, Hcv) => lin(0.925, 0.482),
        (TwoLane, Mcv) => lin(0.9, 1.4),

        (FourLane, SmallCars) => quad(2.4405, -2.8919, 1.8939),
        (FourLane, BigCars | Buses) => quad(3.713, -4.2811, 2.2173),
        (FourLane, TwoWheelers) => quad(4.9774, -4.8846, 2.1831),
        (FourLane, Lcv) => quad(2.2518, -1.2471, 1.1348),
        (FourLane, Hcv) => quad(2.8147, -1.5589, 1.4185),
        (FourLane, Mcv) => quad(3.6591, -2.0266, 1.8441),

        (SixLane, SmallCars) => quad(2.8163, -3.1278, 1.9629),
        (SixLane, BigCars | Buses) => quad(4.3108, -4.6276, 2.3129),
        (SixLane, TwoWheelers) => quad(5.6528, -4.5691, 1.9083),
        (SixLane, Lcv) => quad(14.990, -12.014, 3.2242),
        (SixLane, Hcv) => quad(18.737, -15.017, 4.0302),
        (SixLane, Mcv) => quad(24.3581, -19.522, 5.2393),

        (EightLane | Expressway, SmallCars) => quad(0.5239, -0.9289, 1.4847),
        (EightLane | Expressway, BigCars | Buses) => quad(0.7734, -1.3037, 1.596),
        (EightLane | Expressway, TwoWheelers) => quad(2.4879, -3.9095, 2.6253),
        (EightLane | Expressway, Lcv) => quad(0.7707, -0.7214, 1.0232),
        (EightLane | Expressway, Hcv) => quad(0.9634, -0.9018, 1.279),
        (EightLane | Expressway, Mcv) => quad(1.2524, -1.1723, 1.6627),
    }
}

/// Polynomial value before clamping.
pub fn raw_factor(kind: CostKind, lane: LaneType, class: VehicleClass, vc: f64) -> f64 {
    let poly = match kind {
        CostKind::Distance => distance_poly(lane, class),
        CostKind::Time => time_poly(lane, class),
    };
    poly.eval(vc)
}

/// Congestion factor clamped to `[MIN_FACTOR, MAX_FACTOR]`.
pub fn factor(kind: CostKind, lane: LaneType, class: VehicleClass, vc: f64) -> f64 {
    let raw = raw_factor(kind, lane, class, vc);
    let clamped = raw.clamp(MIN_FACTOR, MAX_FACTOR);
    if clamped != raw {
        log::warn!("{kind:?} factor for {class} on {lane} at V/C {vc} is {raw:.4}; clamped to {clamped}");
    }
    clamped
}

pub fn time_factor(lane: LaneType, class: VehicleClass, vc: f64) -> f64 {
    factor(CostKind::Time, lane, class, vc)
}

pub fn distance_factor(lane: LaneType, class: VehicleClass, vc: f64) -> f64 {
    factor(CostKind::Distance, lane, class, vc)
}

/// Per-class detail, returned only when requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBreakdown {
    pub count: f64,
    pub distance_factor: f64,
    pub time_factor: f64,
    /// Index-adjusted distance cost per vehicle-km
    pub base_distance: TaxPair,
    pub base_time: TaxPair,
    /// Count-weighted, congestion-adjusted cost per km of road
    pub adjusted: TaxPair,
}

/// Road-user cost per km of road for the whole traffic stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadUserCostSummary {
    pub volume_capacity_ratio: f64,
    pub lane_type: LaneType,
    pub distance_total: TaxPair,
    pub time_total: TaxPair,
    pub total: TaxPair,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BTreeMap<VehicleClass, ClassBreakdown>>,
}

pub fn check_volume_capacity_ratio(vc: f64) -> CalcResult<()> {
    if vc.is_finite() && vc >= 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid_input(
            "volume_capacity_ratio",
            vc.to_string(),
            "must be a finite, non-negative number",
        ))
    }
}

/// Apply congestion factors and traffic weights. Classes without a count
/// contribute nothing.
pub fn adjust(
    costs: &WpiAdjustedCosts,
    vc: f64,
    lane: LaneType,
    counts: &VehicleCounts,
    with_breakdown: bool,
) -> CalcResult<RoadUserCostSummary> {
    check_volume_capacity_ratio(vc)?;

    let mut distance_total = TaxPair::ZERO;
    let mut time_total = TaxPair::ZERO;
    let mut breakdown = BTreeMap::new();

    for (class, distance) in &costs.distance_cost.by_class {
        let Some(time) = costs.time_cost.by_class.get(class) else {
            return Err(CalcError::Internal {
                message: format!("{} has distance costs but no time costs", class.key()),
            });
        };
        let count = counts.get(class).copied().unwrap_or(0.0);
        let df = distance_factor(lane, *class, vc);
        let tf = time_factor(lane, *class, vc);
        let base_distance = distance.subtotal();
        let base_time = time.subtotal();

        let d = base_distance * (count * df);
        let t = base_time * (count * tf);
        distance_total += d;
        time_total += t;

        if with_breakdown {
            breakdown.insert(
                *class,
                ClassBreakdown {
                    count,
                    distance_factor: df,
                    time_factor: tf,
                    base_distance,
                    base_time,
                    adjusted: d + t,
                },
            );
        }
    }

    log::info!(
        "road user cost at V/C {vc:.4} on {}: {:.2} Rs/km (ET)",
        lane.code(),
        (distance_total + time_total).et
    );

    Ok(RoadUserCostSummary {
        volume_capacity_ratio: vc,
        lane_type: lane,
        distance_total,
        time_total,
        total: distance_total + time_total,
        unit: UNIT_ROAD_USER_COST.to_string(),
        breakdown: with_breakdown.then_some(breakdown),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voc::wpi::{DistanceCosts, TimeCosts};

    fn flat_costs(classes: &[VehicleClass], distance: f64, time: f64) -> WpiAdjustedCosts {
        let d = DistanceCosts {
            tyre_cost: TaxPair::ZERO,
            fuel_cost: TaxPair::uniform(distance),
            engine_oil: TaxPair::ZERO,
            other_oil: TaxPair::ZERO,
            grease: TaxPair::ZERO,
            spare_parts: TaxPair::ZERO,
            maintenance_labour: 0.0,
        };
        let t = TimeCosts {
            fixed_cost: TaxPair::uniform(time),
            depreciation_cost: TaxPair::ZERO,
            passenger_time_cost: 0.0,
            crew_cost: 0.0,
            commodity_holding_cost: 0.0,
        };
        WpiAdjustedCosts::from_classes(
            2024,
            classes.iter().map(|c| (*c, d)).collect(),
            classes.iter().map(|c| (*c, t)).collect(),
        )
    }

    #[test]
    fn test_factors_stay_in_bounds() {
        for lane in LaneType::ALL {
            for class in VehicleClass::ALL {
                for step in 0..=100 {
                    let vc = step as f64 * 0.1;
                    for kind in [CostKind::Distance, CostKind::Time] {
                        let f = factor(kind, lane, class, vc);
                        assert!((MIN_FACTOR..=MAX_FACTOR).contains(&f), "{kind:?} {lane} {class} at {vc}: {f}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_two_lane_small_cars() {
        let vc = 0.8854;
        let tf = time_factor(LaneType::TwoLane, VehicleClass::SmallCars, vc);
        let df = distance_factor(LaneType::TwoLane, VehicleClass::SmallCars, vc);
        assert!((tf - (1.087 + 0.483 * vc)).abs() < 1e-12);
        assert!((df - (0.893 + 0.259 * vc)).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_at_extremes() {
        assert_eq!(distance_factor(LaneType::TwoLane, VehicleClass::Buses, 0.0), 1.0);
        assert_eq!(time_factor(LaneType::SingleLane, VehicleClass::SmallCars, 5.0), 2.0);
    }

    #[test]
    fn test_expressway_matches_eight_lane() {
        for class in VehicleClass::ALL {
            for kind in [CostKind::Distance, CostKind::Time] {
                assert_eq!(
                    raw_factor(kind, LaneType::EightLane, class, 0.6),
                    raw_factor(kind, LaneType::Expressway, class, 0.6)
                );
            }
        }
    }

    #[test]
    fn test_single_class_total() {
        let costs = flat_costs(&[VehicleClass::SmallCars], 2.0, 3.0);
        let counts = VehicleCounts::from([(VehicleClass::SmallCars, 100.0)]);
        let vc = 0.8854;
        let summary = adjust(&costs, vc, LaneType::TwoLane, &counts, false).unwrap();
        let expected = 100.0 * (2.0 * (0.893 + 0.259 * vc) + 3.0 * (1.087 + 0.483 * vc));
        assert!((summary.total.et - expected).abs() < 1e-9);
        assert!((summary.total.it - expected).abs() < 1e-9);
        assert!(summary.breakdown.is_none());
        assert_eq!(summary.unit, UNIT_ROAD_USER_COST);
    }

    #[test]
    fn test_total_is_sum_over_classes() {
        let classes = [VehicleClass::SmallCars, VehicleClass::Buses, VehicleClass::Mcv];
        let counts: VehicleCounts = classes.iter().map(|c| (*c, 50.0)).collect();
        let all = adjust(&flat_costs(&classes, 1.5, 2.5), 0.4, LaneType::FourLane, &counts, true).unwrap();

        let mut sum = TaxPair::ZERO;
        for class in classes {
            let one = adjust(&flat_costs(&[class], 1.5, 2.5), 0.4, LaneType::FourLane, &counts, false).unwrap();
            sum += one.total;
        }
        assert!((all.total.et - sum.et).abs() < 1e-9);

        let breakdown = all.breakdown.unwrap();
        let from_breakdown: f64 = breakdown.values().map(|b| b.adjusted.et).sum();
        assert!((from_breakdown - all.total.et).abs() < 1e-9);
    }

    #[test]
    fn test_missing_count_contributes_nothing() {
        let costs = flat_costs(&[VehicleClass::Lcv], 2.0, 2.0);
        let summary = adjust(&costs, 0.5, LaneType::SixLane, &VehicleCounts::new(), false).unwrap();
        assert_eq!(summary.total, TaxPair::ZERO);
    }

    #[test]
    fn test_negative_ratio_rejected() {
        let costs = flat_costs(&[VehicleClass::Lcv], 2.0, 2.0);
        let err = adjust(&costs, -0.1, LaneType::TwoLane, &VehicleCounts::new(), false).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.violations()[0].field, "volume_capacity_ratio");

        assert!(adjust(&costs, f64::NAN, LaneType::TwoLane, &VehicleCounts::new(), false).is_err());
    }
}
