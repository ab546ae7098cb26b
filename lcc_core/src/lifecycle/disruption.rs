//! # Road-User Disruption During Construction
//!
//! While the bridge is built, traffic detours. The road-user cost line item
//! is the sum of:
//!
//! - extra vehicle operating cost: VOC per km of road × detour km × days
//! - value of time lost: Σ VOT × occupancy × count × extra hours × days
//! - accident costs on the detour: human injury plus vehicle damage
//!
//! Days are working days over the construction period. VOT, medical and
//! property-damage costs are brought to the analysis year with the price
//! index table.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcResult, Violation};
use crate::lifecycle::params::AnalysisParameters;
use crate::reference::{LaneType, PriceIndexTable, ReferenceTables, WpiCategory};
use crate::voc::input::VehicleCounts;

/// Share of detour accidents by severity (fractions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityShares {
    pub fatal: f64,
    pub major_injury: f64,
    pub minor_injury: f64,
}

impl Default for SeverityShares {
    fn default() -> Self {
        SeverityShares {
            fatal: 0.2,
            major_injury: 0.2,
            minor_injury: 0.6,
        }
    }
}

/// Detour taken by traffic while the bridge is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diversion {
    /// Extra distance per vehicle (km)
    pub reroute_km: f64,
    /// Extra travel time per vehicle (h)
    pub additional_travel_time_h: f64,
    /// Accidents per million vehicle-km on the detour
    pub crash_rate_per_million_vkm: f64,
    /// Carriageway of the detour road; selects the VOT column
    pub alternate_road: LaneType,
    pub severity_shares: SeverityShares,
}

impl Default for Diversion {
    fn default() -> Self {
        Diversion {
            reroute_km: 6.0,
            additional_travel_time_h: 1.5,
            crash_rate_per_million_vkm: 30.0,
            alternate_road: LaneType::TwoLane,
            severity_shares: SeverityShares::default(),
        }
    }
}

impl Diversion {
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (field, value) in [
            ("diversion.reroute_km", self.reroute_km),
            ("diversion.additional_travel_time_h", self.additional_travel_time_h),
            ("diversion.crash_rate_per_million_vkm", self.crash_rate_per_million_vkm),
        ] {
            if !value.is_finite() || value < 0.0 {
                violations.push(Violation::new(field, value.to_string(), "must be a non-negative number"));
            }
        }
        let s = self.severity_shares;
        for (field, value) in [
            ("diversion.severity_shares.fatal", s.fatal),
            ("diversion.severity_shares.major_injury", s.major_injury),
            ("diversion.severity_shares.minor_injury", s.minor_injury),
        ] {
            if !(0.0..=1.0).contains(&value) {
                violations.push(Violation::new(field, value.to_string(), "must lie between 0 and 1"));
            }
        }
        violations
    }
}

/// Breakdown of the construction-stage road-user cost (Rs).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisruptionCosts {
    pub working_days: f64,
    /// Expected accidents on the detour over the construction period
    pub accidents: f64,
    pub vehicle_operating_cost: f64,
    pub value_of_time_cost: f64,
    pub human_injury_cost: f64,
    pub vehicle_damage_cost: f64,
}

impl DisruptionCosts {
    pub fn accident_cost(&self) -> f64 {
        self.human_injury_cost + self.vehicle_damage_cost
    }

    pub fn total(&self) -> f64 {
        self.vehicle_operating_cost + self.value_of_time_cost + self.accident_cost()
    }
}

/// Road-user cost of the construction detour.
///
/// `voc_per_km` is the congestion-adjusted road-user cost of the whole
/// stream (Rs per km of road per day) in the chosen tax basis.
pub fn construction_disruption(
    counts: &VehicleCounts,
    voc_per_km: f64,
    diversion: &Diversion,
    params: &AnalysisParameters,
    tables: &ReferenceTables,
    wpi: &PriceIndexTable,
) -> CalcResult<DisruptionCosts> {
    let constants = &tables.constants;
    let working_days = params.construction_months() * constants.working_days_per_month;
    let adt: f64 = counts.values().sum();

    let daily_accidents = diversion.crash_rate_per_million_vkm
        * adt
        * constants.work_zone_accident_multiplier
        * diversion.reroute_km
        * 1e-6;
    let accidents = daily_accidents * working_days;

    let costs = &tables.accident_costs;
    let shares = diversion.severity_shares;
    let mut human_injury_cost = 0.0;
    for (severity, cost, share) in [
        ("Fatal", costs.fatal, shares.fatal),
        ("Major Injury", costs.major_injury, shares.major_injury),
        ("Minor Injury", costs.minor_injury, shares.minor_injury),
    ] {
        if share > 0.0 {
            let index = wpi.entry_multiplier(WpiCategory::Medical, severity, "accidents")?;
            human_injury_cost += cost * index * accidents * share;
        }
    }

    let mut vehicle_damage_cost = 0.0;
    let mut value_of_time_cost = 0.0;
    for (class, count) in counts.iter().filter(|(_, count)| **count > 0.0) {
        let profile = tables.vehicle(*class)?;

        let damage_index = wpi.class_multiplier(WpiCategory::PropertyDamage, *class)?;
        vehicle_damage_cost += profile.accident_damage_cost * damage_index * accidents * (count / adt);

        let vot_index = wpi.class_multiplier(WpiCategory::Vot, *class)?;
        let vot = profile.value_of_time.for_lane(diversion.alternate_road) * vot_index;
        value_of_time_cost += vot * count * diversion.additional_travel_time_h * profile.occupancy * working_days;
    }

    let disruption = DisruptionCosts {
        working_days,
        accidents,
        vehicle_operating_cost: voc_per_km * diversion.reroute_km * working_days,
        value_of_time_cost,
        human_injury_cost,
        vehicle_damage_cost,
    };
    log::debug!(
        "construction detour: {:.1} working days, {:.2} accidents, Rs {:.0} road-user cost",
        working_days,
        accidents,
        disruption.total()
    );
    Ok(disruption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::pwf::DiscountPolicy;
    use crate::reference::{IndexEntry, VehicleClass};

    fn params(years: f64) -> AnalysisParameters {
        AnalysisParameters {
            construction_time_years: years,
            ..AnalysisParameters::standard(DiscountPolicy::DiscountAndInflation)
        }
    }

    #[test]
    fn test_no_traffic_no_cost() {
        let tables = ReferenceTables::standard().unwrap();
        let costs = construction_disruption(
            &VehicleCounts::new(),
            0.0,
            &Diversion::default(),
            &params(1.0),
            tables,
            &PriceIndexTable::identity(2024),
        )
        .unwrap();
        assert_eq!(costs.total(), 0.0);
        assert!((costs.working_days - 12.0 * 26.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_breakdown() {
        let tables = ReferenceTables::standard().unwrap();
        let counts = VehicleCounts::from([(VehicleClass::SmallCars, 1000.0)]);
        let diversion = Diversion::default();
        let costs = construction_disruption(
            &counts,
            5000.0,
            &diversion,
            &params(1.0),
            tables,
            &PriceIndexTable::identity(2024),
        )
        .unwrap();

        let days = 312.0;
        let accidents = 30.0 * 1000.0 * 1.0 * 6.0 * 1e-6 * days;
        assert!((costs.accidents - accidents).abs() < 1e-9);
        assert!((costs.vehicle_operating_cost - 5000.0 * 6.0 * days).abs() < 1e-6);

        let car = tables.vehicle(VehicleClass::SmallCars).unwrap();
        let vot = car.value_of_time.two_lane * 1000.0 * 1.5 * car.occupancy * days;
        assert!((costs.value_of_time_cost - vot).abs() < 1e-6);
        // one class carries all traffic, so it takes all the damage
        assert!((costs.vehicle_damage_cost - car.accident_damage_cost * accidents).abs() < 1e-6);

        let injury = accidents * (0.2 * 1325049.0 + 0.2 * 432651.0 + 0.6 * 46680.0);
        assert!((costs.human_injury_cost - injury).abs() < 1e-6);
    }

    #[test]
    fn test_medical_index_scales_injuries() {
        let tables = ReferenceTables::standard().unwrap();
        let counts = VehicleCounts::from([(VehicleClass::Buses, 200.0)]);
        let base = construction_disruption(
            &counts,
            0.0,
            &Diversion::default(),
            &params(2.0),
            tables,
            &PriceIndexTable::identity(2024),
        )
        .unwrap();
        let mut wpi = PriceIndexTable::identity(2024);
        wpi.set(WpiCategory::Medical, IndexEntry::Scalar(1.25));
        let scaled = construction_disruption(&counts, 0.0, &Diversion::default(), &params(2.0), tables, &wpi).unwrap();
        assert!((scaled.human_injury_cost - 1.25 * base.human_injury_cost).abs() < 1e-6);
        assert_eq!(scaled.vehicle_damage_cost, base.vehicle_damage_cost);
    }

    #[test]
    fn test_diversion_validation() {
        let diversion = Diversion {
            reroute_km: -1.0,
            severity_shares: SeverityShares {
                fatal: 20.0,
                ..SeverityShares::default()
            },
            ..Diversion::default()
        };
        let fields: Vec<String> = diversion.validate().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["diversion.reroute_km", "diversion.severity_shares.fatal"]);
    }
}
