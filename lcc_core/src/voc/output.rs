//! # VOC Output Records
//!
//! Packages a model's [`RawVoc`] into the canonical [`VocResult`]: every leaf
//! carries its value (single, or IT/ET), its unit, and whether a price-index
//! multiplier applies to it. Every value is clamped to zero or above while
//! packaging; regressions that dip below zero at extreme inputs are expected.
//!
//! ## JSON Example (one leaf of each kind)
//!
//! ```json
//! {
//!   "spare_parts": { "IT": 0.0082, "ET": 0.0046, "unit": "Rs/km", "index_adjustable": true },
//!   "tyre_life": { "value": 45916.0, "unit": "km/tyre", "index_adjustable": false }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::reference::{LaneType, VehicleClass};
use crate::units::{clamp_non_negative, TaxPair};
use crate::voc::models::RawVoc;

pub const UNIT_SPEED: &str = "km/h";
pub const UNIT_PER_1000_KM: &str = "liters per 1000 km";
pub const UNIT_PER_10000_KM: &str = "liters per 10000 km";
pub const UNIT_TYRE_LIFE: &str = "km/tyre";
pub const UNIT_COST: &str = "Rs/km";
pub const UNIT_UTILISATION: &str = "km/day";

/// Spare parts and maintenance labour are tabulated per 100 km.
const PER_HUNDRED_KM: f64 = 100.0;

/// Value of a leaf: one number, or the IT/ET pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Taxed(TaxPair),
    Single { value: f64 },
}

impl Amount {
    /// Both variants; a single value counts as both IT and ET.
    pub fn as_pair(&self) -> TaxPair {
        match self {
            Amount::Taxed(pair) => *pair,
            Amount::Single { value } => TaxPair::uniform(*value),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.as_pair().is_finite()
    }
}

/// One leaf of a [`VocResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub amount: Amount,
    pub unit: String,
    pub index_adjustable: bool,
}

impl Element {
    fn single(value: f64, unit: &str, index_adjustable: bool) -> Self {
        Element {
            amount: Amount::Single {
                value: clamp_non_negative(value),
            },
            unit: unit.to_string(),
            index_adjustable,
        }
    }

    fn taxed(pair: TaxPair, unit: &str) -> Self {
        Element {
            amount: Amount::Taxed(pair.non_negative()),
            unit: unit.to_string(),
            index_adjustable: true,
        }
    }

    /// The single value; zero for a taxed leaf.
    pub fn value(&self) -> f64 {
        match self.amount {
            Amount::Single { value } => value,
            Amount::Taxed(_) => 0.0,
        }
    }

    pub fn pair(&self) -> TaxPair {
        self.amount.as_pair()
    }
}

/// Petrol and diesel consumption of the class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelConsumption {
    pub petrol: f64,
    pub diesel: f64,
    pub unit: String,
    pub index_adjustable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRelated {
    pub fuel_consumption: FuelConsumption,
    pub spare_parts: Element,
    pub maintenance_labour: Element,
    pub tyre_life: Element,
    pub engine_oil: Element,
    pub other_oil: Element,
    pub grease: Element,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRelated {
    pub fixed_cost: Element,
    pub depreciation_cost: Element,
    pub passenger_time_cost: Element,
    pub crew_cost: Element,
    pub commodity_holding_cost: Element,
}

/// Canonical road-user cost record of one vehicle class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocResult {
    pub vehicle_class: VehicleClass,
    pub lane_type: LaneType,
    pub velocity: Element,
    pub utilisation: Element,
    pub distance: DistanceRelated,
    pub time: TimeRelated,
}

/// Package raw model output. Fails only when a raw value is NaN or infinite.
pub fn build(vehicle_class: VehicleClass, lane_type: LaneType, raw: &RawVoc) -> CalcResult<VocResult> {
    let scalars = [
        ("velocity", raw.velocity.0),
        ("fuel_consumption.petrol", raw.petrol_l_per_1000km),
        ("fuel_consumption.diesel", raw.diesel_l_per_1000km),
        ("spare_parts.IT", raw.spare_parts.it),
        ("spare_parts.ET", raw.spare_parts.et),
        ("maintenance_labour", raw.maintenance_labour),
        ("tyre_life", raw.tyre_life_km),
        ("engine_oil", raw.engine_oil_l_per_1000km),
        ("other_oil", raw.other_oil_l_per_10000km),
        ("grease", raw.grease_l_per_10000km),
        ("utilisation", raw.utilisation_km_per_day),
        ("fixed_cost.IT", raw.fixed_cost.it),
        ("fixed_cost.ET", raw.fixed_cost.et),
        ("depreciation_cost.IT", raw.depreciation.it),
        ("depreciation_cost.ET", raw.depreciation.et),
        ("passenger_time_cost", raw.passenger_time),
        ("crew_cost", raw.crew),
        ("commodity_holding_cost", raw.commodity_holding),
    ];
    if let Some((element, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
        return Err(CalcError::non_finite(vehicle_class.key(), *element));
    }

    Ok(VocResult {
        vehicle_class,
        lane_type,
        velocity: Element::single(raw.velocity.0, UNIT_SPEED, false),
        utilisation: Element::single(raw.utilisation_km_per_day, UNIT_UTILISATION, false),
        distance: DistanceRelated {
            fuel_consumption: FuelConsumption {
                petrol: clamp_non_negative(raw.petrol_l_per_1000km),
                diesel: clamp_non_negative(raw.diesel_l_per_1000km),
                unit: UNIT_PER_1000_KM.to_string(),
                index_adjustable: false,
            },
            spare_parts: Element::taxed(raw.spare_parts / PER_HUNDRED_KM, UNIT_COST),
            maintenance_labour: Element::single(raw.maintenance_labour / PER_HUNDRED_KM, UNIT_COST, true),
            tyre_life: Element::single(raw.tyre_life_km, UNIT_TYRE_LIFE, false),
            engine_oil: Element::single(raw.engine_oil_l_per_1000km, UNIT_PER_1000_KM, false),
            other_oil: Element::single(raw.other_oil_l_per_10000km, UNIT_PER_10000_KM, false),
            grease: Element::single(raw.grease_l_per_10000km, UNIT_PER_10000_KM, false),
        },
        time: TimeRelated {
            fixed_cost: Element::taxed(raw.fixed_cost, UNIT_COST),
            depreciation_cost: Element::taxed(raw.depreciation, UNIT_COST),
            passenger_time_cost: Element::single(raw.passenger_time, UNIT_COST, true),
            crew_cost: Element::single(raw.crew, UNIT_COST, true),
            commodity_holding_cost: Element::single(raw.commodity_holding, UNIT_COST, true),
        },
    })
}

impl VocResult {
    /// Every leaf with its dotted name.
    pub fn leaves(&self) -> Vec<(&'static str, &Element)> {
        vec![
            ("velocity", &self.velocity),
            ("utilisation", &self.utilisation),
            ("spare_parts", &self.distance.spare_parts),
            ("maintenance_labour", &self.distance.maintenance_labour),
            ("tyre_life", &self.distance.tyre_life),
            ("engine_oil", &self.distance.engine_oil),
            ("other_oil", &self.distance.other_oil),
            ("grease", &self.distance.grease),
            ("fixed_cost", &self.time.fixed_cost),
            ("depreciation_cost", &self.time.depreciation_cost),
            ("passenger_time_cost", &self.time.passenger_time_cost),
            ("crew_cost", &self.time.crew_cost),
            ("commodity_holding_cost", &self.time.commodity_holding_cost),
        ]
    }

    /// Confirm the record is in canonical form: taxed leaves where IT/ET is
    /// expected, and every value finite and non-negative. Records built by
    /// [`build`] always pass; records deserialized from elsewhere may not.
    pub fn check_shape(&self) -> CalcResult<()> {
        let class = self.vehicle_class.key();
        let taxed = ["spare_parts", "fixed_cost", "depreciation_cost"];
        for (name, leaf) in self.leaves() {
            let is_taxed = matches!(leaf.amount, Amount::Taxed(_));
            if is_taxed != taxed.contains(&name) {
                return Err(CalcError::malformed_result(class, name));
            }
            let pair = leaf.pair();
            if !pair.is_finite() {
                return Err(CalcError::non_finite(class, name));
            }
            if pair.it < 0.0 || pair.et < 0.0 {
                return Err(CalcError::malformed_result(class, name));
            }
        }
        let fuel = &self.distance.fuel_consumption;
        if !(fuel.petrol.is_finite() && fuel.diesel.is_finite()) {
            return Err(CalcError::non_finite(class, "fuel_consumption"));
        }
        if fuel.petrol < 0.0 || fuel.diesel < 0.0 {
            return Err(CalcError::malformed_result(class, "fuel_consumption"));
        }
        Ok(())
    }
}
