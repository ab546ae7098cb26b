//! # Life-Cycle Cost
//!
//! Discounted cost of a bridge over its analysis period, split into three
//! stages:
//!
//! - **Initial**: construction, embodied carbon, finance during
//!   construction, and the detour imposed on road users while building.
//! - **Use**: inspections, maintenance, repairs and bearing replacement,
//!   recurring over the design life.
//! - **End of life**: demolition, recycling credit and, when the analysis
//!   outlives the bridge, a full reconstruction.
//!
//! The present worth engine lives in [`pwf`]; the line-item calculators in
//! [`components`]. [`evaluate_life_cycle`] wires them to the road-user cost
//! summary produced by [`crate::voc`].

pub mod components;
pub mod disruption;
pub mod params;
pub mod pwf;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult, Violation};
use crate::reference::{PriceIndexTable, ReferenceTables};
use crate::units::Rupees;
use crate::voc::congestion::RoadUserCostSummary;
use crate::voc::input::VehicleCounts;

pub use components::{
    line_item, CostCategory, CostComponent, CostTiming, EndOfLife, LifeCycleStage, MaintenanceSchedule, MaterialItem,
    MaterialKind, SccSource, SocialCostOfCarbon, StructurePart,
};
pub use disruption::{DisruptionCosts, Diversion};
pub use params::AnalysisParameters;
pub use pwf::{DiscountPolicy, FinancialRates, PresentWorth, Schedule};
pub use summary::LifeCycleReport;

use components::{Activity, ReconstructionParts, Rerouting};

/// Everything the cost-component library needs beyond the traffic data.
///
/// `parameters` is required so that the discount policy is always chosen by
/// the caller; every other section falls back to its standard values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeCycleInputs {
    pub parameters: AnalysisParameters,
    /// Bill of materials for the initial construction
    #[serde(default)]
    pub materials: Vec<MaterialItem>,
    #[serde(default)]
    pub carbon: SocialCostOfCarbon,
    #[serde(default)]
    pub maintenance: MaintenanceSchedule,
    #[serde(default)]
    pub end_of_life: EndOfLife,
    #[serde(default)]
    pub diversion: Diversion,
}

impl LifeCycleInputs {
    /// Standard schedules and no materials.
    pub fn new(parameters: AnalysisParameters) -> Self {
        LifeCycleInputs {
            parameters,
            materials: Vec::new(),
            carbon: SocialCostOfCarbon::default(),
            maintenance: MaintenanceSchedule::default(),
            end_of_life: EndOfLife::default(),
            diversion: Diversion::default(),
        }
    }

    /// Check every section and report all violations together.
    pub fn validate(&self) -> CalcResult<()> {
        let mut violations: Vec<Violation> = Vec::new();
        if let Err(err) = self.parameters.validate() {
            violations.extend_from_slice(err.violations());
        }
        violations.extend(components::validate_materials(&self.materials));
        if let Err(err) = self.carbon.rate() {
            violations.extend_from_slice(err.violations());
        }
        violations.extend(self.maintenance.validate());
        violations.extend(self.end_of_life.validate());
        violations.extend(self.diversion.validate());

        if violations.is_empty() {
            Ok(())
        } else {
            Err(CalcError::InvalidInput { violations })
        }
    }
}

/// Resolves present worth factors and remembers empty schedules.
struct Scheduler {
    rates: FinancialRates,
    warnings: Vec<String>,
}

impl Scheduler {
    fn recurring(&mut self, name: &str, frequency_years: u32, horizon_years: u32) -> CalcResult<PresentWorth> {
        let pw = pwf::recurring(&self.rates, name, frequency_years, horizon_years)?;
        if pw.occurrences == 0 {
            self.warnings.push(format!(
                "{name}: a {frequency_years}-year cycle never occurs within {horizon_years} years; contributes zero"
            ));
        }
        Ok(pw)
    }

    fn activity(&mut self, name: &str, activity: Activity, horizon_years: u32) -> CalcResult<PresentWorth> {
        self.recurring(name, activity.frequency_years, horizon_years)
    }
}

/// Run the cost-component library for one bridge.
///
/// `counts` is the daily traffic diverted while the bridge is closed and
/// `road_user` the congestion-adjusted road-user cost of that traffic.
pub fn evaluate_life_cycle(
    inputs: &LifeCycleInputs,
    counts: &VehicleCounts,
    road_user: &RoadUserCostSummary,
    tables: &ReferenceTables,
    wpi: &PriceIndexTable,
) -> CalcResult<LifeCycleReport> {
    inputs.validate()?;

    let params = &inputs.parameters;
    let materials = &inputs.materials;
    let scc = inputs.carbon.rate()?;
    let design_life = params.design_life_years;
    let mut scheduler = Scheduler {
        rates: params.rates(),
        warnings: Vec::new(),
    };
    let rerouting = Rerouting {
        daily_traffic: counts.values().sum(),
        reroute_km: inputs.diversion.reroute_km,
        constants: &tables.constants,
        scc_rate: scc,
    };

    // Initial stage
    let construction = components::initial_construction(materials);
    let carbon = components::initial_carbon(materials, scc);
    let time = components::time_cost(construction.base_amount, params);
    let initial_rerouting = components::rerouting_carbon(
        line_item::INITIAL_REROUTING_CARBON,
        LifeCycleStage::Initial,
        CostTiming::Initial,
        &rerouting,
        params.construction_months(),
        PresentWorth::IMMEDIATE,
    );
    let disruption = disruption::construction_disruption(
        counts,
        road_user.total.get(params.tax_basis),
        &inputs.diversion,
        params,
        tables,
        wpi,
    )?;
    let road_user_cost =
        CostComponent::immediate(line_item::ROAD_USER, CostCategory::Economic, Rupees(disruption.total()));

    // Use stage
    let schedule = &inputs.maintenance;
    let construction_cost = construction.base_amount;
    let carbon_cost = carbon.base_amount;
    let superstructure = components::part_cost(materials, StructurePart::Superstructure);
    let recurring_share = |name: &str, category, base, activity: Activity, pw| {
        components::share_of_base(
            name,
            LifeCycleStage::Use,
            category,
            CostTiming::Recurring,
            base,
            activity.rate,
            pw,
        )
    };

    let routine_pw = scheduler.activity(line_item::ROUTINE_INSPECTION, schedule.routine_inspection, design_life)?;
    let periodic_pw = scheduler.activity(line_item::PERIODIC_MAINTENANCE, schedule.periodic_maintenance, design_life)?;
    let major_inspection_pw =
        scheduler.activity(line_item::MAJOR_INSPECTION, schedule.major_inspection, design_life)?;
    let repair_pw = scheduler.activity(line_item::MAJOR_REPAIR, schedule.major_repair, design_life)?;
    let bearing_pw = scheduler.activity(line_item::BEARING_REPLACEMENT, schedule.bearing_replacement, design_life)?;

    let use_stage = vec![
        recurring_share(
            line_item::ROUTINE_INSPECTION,
            CostCategory::Economic,
            construction_cost,
            schedule.routine_inspection,
            routine_pw,
        ),
        recurring_share(
            line_item::PERIODIC_MAINTENANCE,
            CostCategory::Economic,
            construction_cost,
            schedule.periodic_maintenance,
            periodic_pw,
        ),
        recurring_share(
            line_item::PERIODIC_MAINTENANCE_CARBON,
            CostCategory::Environmental,
            carbon_cost,
            schedule.periodic_maintenance,
            periodic_pw,
        ),
        recurring_share(
            line_item::MAJOR_INSPECTION,
            CostCategory::Economic,
            construction_cost,
            schedule.major_inspection,
            major_inspection_pw,
        ),
        recurring_share(
            line_item::MAJOR_REPAIR,
            CostCategory::Economic,
            construction_cost,
            schedule.major_repair,
            repair_pw,
        ),
        recurring_share(
            line_item::MAJOR_REPAIR_CARBON,
            CostCategory::Environmental,
            carbon_cost,
            schedule.major_repair,
            repair_pw,
        ),
        components::rerouting_carbon(
            line_item::MAJOR_REPAIR_REROUTING_CARBON,
            LifeCycleStage::Use,
            CostTiming::Recurring,
            &rerouting,
            tables.constants.major_repair_closure_months,
            repair_pw,
        ),
        recurring_share(
            line_item::BEARING_REPLACEMENT,
            CostCategory::Economic,
            superstructure,
            schedule.bearing_replacement,
            bearing_pw,
        ),
        components::rerouting_carbon(
            line_item::REPLACEMENT_REROUTING_CARBON,
            LifeCycleStage::Use,
            CostTiming::Recurring,
            &rerouting,
            tables.constants.replacement_closure_months,
            bearing_pw,
        ),
    ];

    // End of life
    let eol = &inputs.end_of_life;
    let analysis_period = params.analysis_period_years;
    let demolition_pw = pwf::single(&scheduler.rates, analysis_period);
    let demolition_base = construction_cost * eol.demolition_rate;
    let terminal_pw = scheduler.recurring(line_item::RECYCLING, analysis_period, design_life)?;
    let reconstruction_parts = ReconstructionParts {
        demolition: demolition_base,
        construction: construction_cost,
        carbon: carbon_cost,
        time: time.base_amount,
        road_user: road_user_cost.base_amount,
        rerouting_carbon: initial_rerouting.base_amount,
    };

    let end_of_life = vec![
        components::share_of_base(
            line_item::DEMOLITION,
            LifeCycleStage::EndOfLife,
            CostCategory::Economic,
            CostTiming::Terminal,
            construction_cost,
            eol.demolition_rate,
            demolition_pw,
        ),
        components::share_of_base(
            line_item::DEMOLITION_CARBON,
            LifeCycleStage::EndOfLife,
            CostCategory::Environmental,
            CostTiming::Terminal,
            carbon_cost,
            eol.demolition_rate,
            demolition_pw,
        ),
        components::rerouting_carbon(
            line_item::DEMOLITION_REROUTING_CARBON,
            LifeCycleStage::EndOfLife,
            CostTiming::Terminal,
            &rerouting,
            tables.constants.demolition_closure_months,
            terminal_pw,
        ),
        components::recycling(materials, eol, terminal_pw),
        components::reconstruction(&reconstruction_parts, params),
    ];

    let mut line_items = vec![construction, carbon, time, initial_rerouting, road_user_cost];
    line_items.extend(use_stage);
    line_items.extend(end_of_life);

    let report = LifeCycleReport::from_components(line_items, scheduler.warnings);
    log::info!(
        "life-cycle cost over {} years: initial {}, use {}, end of life {}, total {}",
        analysis_period,
        report.stage_totals.initial,
        report.stage_totals.use_stage,
        report.stage_totals.end_of_life,
        report.total
    );
    for warning in &report.warnings {
        log::warn!("{warning}");
    }
    Ok(report)
}
