//! # Vehicle Operating Cost Models
//!
//! One [`VocModel`] per vehicle class. Every model has the same shape:
//!
//! 1. free-flow speed `V` from a lane-type regression over roughness and
//!    rise-and-fall (plus carriageway width on expressways);
//! 2. fuel consumption from `V`, roughness, rise and fall;
//! 3. spare parts, maintenance labour, tyre life and lubricant consumption;
//! 4. utilisation from `V`, then fixed and depreciation costs per km, and the
//!    passenger, crew and commodity-holding time costs.
//!
//! The models return raw, unclamped numbers ([`RawVoc`]). Regressions go
//! negative at extreme inputs; [`crate::voc::output`] clamps on packaging.
//! Speed is the exception: it is floored at [`MIN_FREE_FLOW_SPEED_KMPH`]
//! before anything is derived from it, since fuel, utilisation and the time
//! costs all divide by it.
//!
//! [`ModelRegistry`] maps each [`VehicleClass`] to its model. The pipeline
//! resolves the models it needs once, right after validation.

mod big_cars;
mod buses;
mod hcv;
mod lcv;
mod mcv;
mod small_cars;
mod two_wheelers;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::reference::{LaneType, VehicleClass, VehicleProfile};
use crate::units::{Kmph, TaxPair};
use crate::voc::input::RoadGeometry;

pub use big_cars::BigCars;
pub use buses::Buses;
pub use hcv::Hcv;
pub use lcv::Lcv;
pub use mcv::Mcv;
pub use small_cars::SmallCars;
pub use two_wheelers::TwoWheelers;

/// Lowest free-flow speed the derived regressions are evaluated at (km/h).
pub const MIN_FREE_FLOW_SPEED_KMPH: f64 = 5.0;

/// Regressor values shared by every model.
#[derive(Debug, Clone, Copy)]
pub struct RegressionInputs {
    /// Roughness (mm/km)
    pub rg: f64,
    /// Rise plus fall (m/km)
    pub rf: f64,
    /// Rise (m/km)
    pub rs: f64,
    /// Fall (m/km)
    pub fl: f64,
    /// Carriageway width (m)
    pub w: f64,
    pub lane: LaneType,
    /// Power-to-weight ratio; zero for classes that do not use it
    pub pwr: f64,
    /// Gross vehicle weight (t)
    pub gw: f64,
}

impl RegressionInputs {
    pub fn new(road: &RoadGeometry, power_weight_ratio: Option<f64>, profile: &VehicleProfile) -> Self {
        RegressionInputs {
            rg: road.roughness,
            rf: road.rise_and_fall(),
            rs: road.rise,
            fl: road.fall,
            w: road.carriageway_width_m,
            lane: road.lane_type,
            pwr: power_weight_ratio.unwrap_or(0.0),
            gw: profile.gross_weight_t,
        }
    }
}

/// Fuel consumption in litres per 1000 km.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuelUse {
    pub petrol: f64,
    pub diesel: f64,
}

/// Unclamped model output for one vehicle class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVoc {
    pub velocity: Kmph,
    pub petrol_l_per_1000km: f64,
    pub diesel_l_per_1000km: f64,
    pub spare_parts: TaxPair,
    pub maintenance_labour: f64,
    pub tyre_life_km: f64,
    pub engine_oil_l_per_1000km: f64,
    pub other_oil_l_per_10000km: f64,
    pub grease_l_per_10000km: f64,
    pub utilisation_km_per_day: f64,
    pub fixed_cost: TaxPair,
    pub depreciation: TaxPair,
    pub passenger_time: f64,
    pub crew: f64,
    pub commodity_holding: f64,
}

/// Regression set for one vehicle class.
pub trait VocModel: Send + Sync {
    fn vehicle_class(&self) -> VehicleClass;

    /// False while the coefficients are provisional rather than fitted.
    fn calibrated(&self) -> bool {
        true
    }

    /// Free-flow speed (km/h)
    fn free_flow_speed(&self, x: &RegressionInputs) -> f64;

    fn fuel_consumption(&self, x: &RegressionInputs, v: f64) -> FuelUse;

    /// Spare parts cost per km as a fraction of the new vehicle price
    fn spare_parts_fraction(&self, x: &RegressionInputs) -> f64;

    /// Maintenance labour per km from the ET spare parts cost
    fn maintenance_labour(&self, spare_parts_et: f64) -> f64;

    /// Tyre life (km)
    fn tyre_life(&self, x: &RegressionInputs) -> f64;

    /// Engine oil (litres per 1000 km)
    fn engine_oil(&self, x: &RegressionInputs) -> f64;

    /// Other oil (litres per 10000 km)
    fn other_oil(&self, x: &RegressionInputs) -> f64;

    /// Grease (kg per 10000 km)
    fn grease(&self, x: &RegressionInputs) -> f64;

    /// Utilisation (km/day)
    fn utilisation(&self, v: f64) -> f64;

    /// Daily fixed cost; divided by utilisation to get Rs/km
    fn fixed_cost_per_day(&self) -> TaxPair;

    /// Daily depreciation; divided by utilisation to get Rs/km
    fn depreciation_per_day(&self) -> TaxPair;

    fn passenger_time_cost(&self, _lane: LaneType, _v: f64) -> f64 {
        0.0
    }

    fn crew_cost(&self, _utilisation: f64) -> f64 {
        0.0
    }

    fn commodity_holding_cost(&self, _lane: LaneType, _utilisation: f64) -> f64 {
        0.0
    }

    fn compute(&self, x: &RegressionInputs, profile: &VehicleProfile) -> RawVoc {
        let mut v = self.free_flow_speed(x);
        if v < MIN_FREE_FLOW_SPEED_KMPH {
            log::debug!(
                "{}: free-flow speed {v:.3} km/h raised to {MIN_FREE_FLOW_SPEED_KMPH}",
                self.vehicle_class()
            );
            v = MIN_FREE_FLOW_SPEED_KMPH;
        }
        let fuel = self.fuel_consumption(x, v);
        let spare_parts = profile.new_price * self.spare_parts_fraction(x);
        let upd = self.utilisation(v);

        RawVoc {
            velocity: Kmph(v),
            petrol_l_per_1000km: fuel.petrol,
            diesel_l_per_1000km: fuel.diesel,
            spare_parts,
            maintenance_labour: self.maintenance_labour(spare_parts.et),
            tyre_life_km: self.tyre_life(x),
            engine_oil_l_per_1000km: self.engine_oil(x),
            other_oil_l_per_10000km: self.other_oil(x),
            grease_l_per_10000km: self.grease(x),
            utilisation_km_per_day: upd,
            fixed_cost: self.fixed_cost_per_day() / upd,
            depreciation: self.depreciation_per_day() / upd,
            passenger_time: self.passenger_time_cost(x.lane, v),
            crew: self.crew_cost(upd),
            commodity_holding: self.commodity_holding_cost(x.lane, upd),
        }
    }
}

/// Undivided-road speed form: `a - b·RF - c·(RG - 2000)`.
pub(crate) fn undivided_speed(a: f64, b: f64, c: f64, x: &RegressionInputs) -> f64 {
    a - b * x.rf - c * (x.rg - 2000.0)
}

/// Divided-road speed form: `a - b·RF - c·RG`.
pub(crate) fn divided_speed(a: f64, b: f64, c: f64, x: &RegressionInputs) -> f64 {
    a - b * x.rf - c * x.rg
}

/// Enum-indexed table of models.
pub struct ModelRegistry {
    models: BTreeMap<VehicleClass, Box<dyn VocModel>>,
}

impl ModelRegistry {
    pub fn empty() -> Self {
        ModelRegistry {
            models: BTreeMap::new(),
        }
    }

    /// All seven classes.
    pub fn standard() -> Self {
        let mut registry = ModelRegistry::empty();
        registry.register(Box::new(SmallCars));
        registry.register(Box::new(BigCars));
        registry.register(Box::new(TwoWheelers));
        registry.register(Box::new(Buses));
        registry.register(Box::new(Lcv));
        registry.register(Box::new(Hcv));
        registry.register(Box::new(Mcv));
        registry
    }

    pub fn register(&mut self, model: Box<dyn VocModel>) {
        self.models.insert(model.vehicle_class(), model);
    }

    pub fn get(&self, class: VehicleClass) -> CalcResult<&dyn VocModel> {
        self.models
            .get(&class)
            .map(|m| m.as_ref())
            .ok_or_else(|| CalcError::unknown_vehicle_class(class.key()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        ModelRegistry::standard()
    }
}
