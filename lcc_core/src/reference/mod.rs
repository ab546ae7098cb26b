//! # Reference Tables
//!
//! Read-only price and vehicle data consumed by the road-user cost pipeline.
//! Tables are plain TOML, parsed once into typed structs. The standard vintage
//! is embedded in the crate; an alternate vintage can be parsed with
//! [`ReferenceTables::from_toml_str`] and passed to the pipeline in its place.
//!
//! ## Example
//!
//! ```rust
//! use lcc_core::reference::{LaneType, ReferenceTables, VehicleClass};
//!
//! let tables = ReferenceTables::standard().unwrap();
//! assert_eq!(tables.standard_width(LaneType::TwoLane), Some(7.0));
//! assert_eq!(tables.vehicle(VehicleClass::Mcv).unwrap().tyres_per_vehicle, 14);
//! ```

pub mod lane_type;
pub mod price_index;
pub mod vehicle_class;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::TaxPair;

pub use lane_type::{LaneGroup, LaneType};
pub use price_index::{IndexEntry, PriceIndexTable, WpiCategory, WpiSeries};
pub use vehicle_class::VehicleClass;

const STANDARD_TABLES_TOML: &str = include_str!("../../data/reference_tables.toml");

static STANDARD_TABLES: Lazy<CalcResult<ReferenceTables>> =
    Lazy::new(|| ReferenceTables::from_toml_str("reference_tables.toml", STANDARD_TABLES_TOML));

/// Complete set of reference data for one price vintage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTables {
    /// Label of the price basis, e.g. "IRC SP:30-2019"
    pub vintage: String,
    pub constants: ReroutingConstants,
    /// Standard carriageway width (m) per lane type
    pub carriageway_width_m: BTreeMap<LaneType, f64>,
    pub fuel_prices: FuelPrices,
    pub accident_costs: AccidentCosts,
    pub vehicles: BTreeMap<VehicleClass, VehicleProfile>,
}

/// Constants used by the rerouting and disruption calculators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReroutingConstants {
    pub working_days_per_month: f64,
    pub rerouting_emission_kg_per_km: f64,
    pub major_repair_closure_months: f64,
    pub replacement_closure_months: f64,
    pub demolition_closure_months: f64,
    pub work_zone_accident_multiplier: f64,
}

/// Unit prices (Rs/litre) of fuels and lubricants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FuelPrices {
    pub petrol: TaxPair,
    pub diesel: TaxPair,
    pub engine_oil: TaxPair,
    pub other_oil: TaxPair,
    pub grease: TaxPair,
}

/// Cost of one road accident by severity (Rs).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccidentCosts {
    pub fatal: f64,
    pub major_injury: f64,
    pub minor_injury: f64,
}

/// Value of travel time (Rs per occupant-hour) by lane group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueOfTime {
    pub single_intermediate: f64,
    pub two_lane: f64,
    pub multi_lane: f64,
}

impl ValueOfTime {
    pub fn for_lane(&self, lane: LaneType) -> f64 {
        match lane.group() {
            LaneGroup::SingleOrIntermediate => self.single_intermediate,
            LaneGroup::TwoLane => self.two_lane,
            LaneGroup::MultiLane => self.multi_lane,
        }
    }
}

/// Per-class vehicle data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleProfile {
    /// New vehicle price (Rs)
    pub new_price: TaxPair,
    /// Price of one new tyre (Rs)
    pub tyre_price: TaxPair,
    pub tyres_per_vehicle: u32,
    /// Share of the fleet running on petrol
    pub petrol_share: f64,
    /// Share of the fleet running on diesel
    pub diesel_share: f64,
    /// Passenger car units
    pub pcu: f64,
    /// Gross vehicle weight (t)
    pub gross_weight_t: f64,
    /// Average occupants per vehicle
    pub occupancy: f64,
    /// Property damage per accident involving this class (Rs)
    pub accident_damage_cost: f64,
    pub value_of_time: ValueOfTime,
}

impl ReferenceTables {
    /// The embedded standard vintage.
    pub fn standard() -> CalcResult<&'static ReferenceTables> {
        STANDARD_TABLES.as_ref().map_err(Clone::clone)
    }

    /// Parse and validate a TOML document. `source_name` appears in errors.
    pub fn from_toml_str(source_name: &str, text: &str) -> CalcResult<Self> {
        let tables: ReferenceTables =
            toml::from_str(text).map_err(|e| CalcError::reference_data(source_name, e.to_string()))?;
        tables.validate(source_name)?;
        log::debug!(
            "loaded reference tables '{}' ({} vehicle classes) from {}",
            tables.vintage,
            tables.vehicles.len(),
            source_name
        );
        Ok(tables)
    }

    fn validate(&self, source_name: &str) -> CalcResult<()> {
        for class in VehicleClass::ALL {
            let Some(profile) = self.vehicles.get(&class) else {
                return Err(CalcError::reference_data(
                    source_name,
                    format!("no vehicle profile for '{}'", class.key()),
                ));
            };
            let share = profile.petrol_share + profile.diesel_share;
            if profile.petrol_share < 0.0 || profile.diesel_share < 0.0 || share > 1.0 + 1e-9 {
                return Err(CalcError::reference_data(
                    source_name,
                    format!("fuel shares for '{}' must be non-negative and sum to at most 1", class.key()),
                ));
            }
        }
        for lane in LaneType::ALL {
            if lane.requires_custom_width() {
                continue;
            }
            match self.carriageway_width_m.get(&lane) {
                Some(w) if *w > 0.0 => {}
                _ => {
                    return Err(CalcError::reference_data(
                        source_name,
                        format!("no positive standard width for lane type '{}'", lane.code()),
                    ))
                }
            }
        }
        if self.constants.working_days_per_month <= 0.0 {
            return Err(CalcError::reference_data(source_name, "working_days_per_month must be positive"));
        }
        Ok(())
    }

    /// Profile of a vehicle class.
    pub fn vehicle(&self, class: VehicleClass) -> CalcResult<&VehicleProfile> {
        self.vehicles
            .get(&class)
            .ok_or_else(|| CalcError::unknown_vehicle_class(class.key()))
    }

    /// Standard carriageway width for `lane`, `None` for expressways.
    pub fn standard_width(&self, lane: LaneType) -> Option<f64> {
        if lane.requires_custom_width() {
            return None;
        }
        self.carriageway_width_m.get(&lane).copied()
    }
}
