//! # Vehicle Operating Cost Engine
//!
//! Road-user cost per km of road for a traffic stream, in four stages:
//!
//! 1. [`input::validate`] checks the traffic input and reports every
//!    violation together;
//! 2. the per-class [`models`] compute raw costs, and [`output::build`]
//!    packages them into the canonical [`VocResult`];
//! 3. [`wpi`] prices them and applies the analysis-year price index;
//! 4. [`congestion`] applies V/C factors and traffic weights.
//!
//! Classes are independent, so stages 2 and 3 run in parallel across
//! classes. A failing class does not stop the others. Every failure is
//! gathered into one [`CalcError::VehicleClassFailures`] after all classes
//! finish.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lcc_core::voc::{evaluate_road_user_cost, EvaluationOptions};
//!
//! let report = evaluate_road_user_cost(&traffic, 0.8854, tables, &wpi, &registry, EvaluationOptions::default())?;
//! println!("{:.2} Rs/km", report.summary.total.et);
//! ```

pub mod congestion;
pub mod input;
pub mod models;
pub mod output;
pub mod wpi;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult, ClassFailure};
use crate::reference::{PriceIndexTable, ReferenceTables, VehicleClass};

pub use congestion::RoadUserCostSummary;
pub use input::{ValidatedTraffic, VehicleCounts, VehicleTrafficInput};
pub use models::{ModelRegistry, VocModel};
pub use output::VocResult;
pub use wpi::{DistanceCosts, TimeCosts, WpiAdjustedCosts};

/// Knobs for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOptions {
    /// Include the per-class congestion breakdown in the summary
    #[serde(default)]
    pub debug_breakdown: bool,
}

/// Everything one evaluation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadUserCostReport {
    pub summary: RoadUserCostSummary,
    pub adjusted: WpiAdjustedCosts,
    pub voc: BTreeMap<VehicleClass, VocResult>,
    /// Validated daily counts the summary was weighted with
    pub counts: VehicleCounts,
}

struct ClassCosts {
    voc: VocResult,
    distance: DistanceCosts,
    time: TimeCosts,
}

type ClassOutcome = (VehicleClass, CalcResult<ClassCosts>);

fn evaluate_class(
    model: &dyn VocModel,
    traffic: &ValidatedTraffic,
    tables: &ReferenceTables,
    wpi: &PriceIndexTable,
) -> CalcResult<ClassCosts> {
    let class = model.vehicle_class();
    let profile = tables.vehicle(class)?;
    let pwr = traffic.power_weight_ratio.get(&class).copied();
    let x = models::RegressionInputs::new(&traffic.road, pwr, profile);
    let raw = model.compute(&x, profile);
    let voc = output::build(class, traffic.road.lane_type, &raw)?;
    let (distance, time) = wpi::adjust_class(&voc, wpi, tables)?;
    Ok(ClassCosts { voc, distance, time })
}

/// Validate the traffic input together with the V/C ratio, so one call
/// reports every problem.
pub fn validate_request(
    input: &VehicleTrafficInput,
    vc: f64,
    tables: &ReferenceTables,
) -> CalcResult<ValidatedTraffic> {
    let vc_check = congestion::check_volume_capacity_ratio(vc);
    match (input::validate(input, tables), vc_check) {
        (Ok(traffic), Ok(())) => Ok(traffic),
        (Ok(_), Err(e)) => Err(e),
        (Err(CalcError::InvalidInput { mut violations }), Err(vc_err)) => {
            violations.extend(vc_err.violations().iter().cloned());
            Err(CalcError::InvalidInput { violations })
        }
        (Err(e), _) => Err(e),
    }
}

/// Run the whole engine for one traffic stream.
pub fn evaluate_road_user_cost(
    input: &VehicleTrafficInput,
    vc: f64,
    tables: &ReferenceTables,
    wpi: &PriceIndexTable,
    registry: &ModelRegistry,
    options: EvaluationOptions,
) -> CalcResult<RoadUserCostReport> {
    let traffic = validate_request(input, vc, tables)?;
    wpi.validate()?;

    let plan = traffic
        .active_classes()
        .into_iter()
        .map(|class| registry.get(class))
        .collect::<CalcResult<Vec<&dyn VocModel>>>()?;
    for model in plan.iter().filter(|m| !m.calibrated()) {
        log::warn!("{}: regression coefficients are provisional", model.vehicle_class().key());
    }

    log::debug!(
        "evaluating {} vehicle classes on {} with WPI {}",
        plan.len(),
        traffic.road.lane_type.code(),
        wpi.year
    );

    let outcomes: Vec<ClassOutcome> = plan
        .par_iter()
        .map(|model| (model.vehicle_class(), evaluate_class(*model, &traffic, tables, wpi)))
        .collect();

    let mut voc = BTreeMap::new();
    let mut distance = BTreeMap::new();
    let mut time = BTreeMap::new();
    let mut failures = Vec::new();
    for (class, outcome) in outcomes {
        match outcome {
            Ok(costs) => {
                voc.insert(class, costs.voc);
                distance.insert(class, costs.distance);
                time.insert(class, costs.time);
            }
            Err(error) => {
                log::warn!("{} failed: {}", class.key(), error);
                failures.push(ClassFailure {
                    vehicle_class: class.key().to_string(),
                    error,
                });
            }
        }
    }
    if !failures.is_empty() {
        return Err(CalcError::VehicleClassFailures { failures });
    }

    let adjusted = WpiAdjustedCosts::from_classes(wpi.year, distance, time);
    let summary = congestion::adjust(
        &adjusted,
        vc,
        traffic.road.lane_type,
        &traffic.counts,
        options.debug_breakdown,
    )?;

    Ok(RoadUserCostReport {
        summary,
        adjusted,
        voc,
        counts: traffic.counts,
    })
}
