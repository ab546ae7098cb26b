//! # Cost Components
//!
//! Discounted line items of the life-cycle total. Each calculator is a pure
//! function of its base amount, a rate and a [`PresentWorth`] factor:
//!
//! ```text
//! discounted = base × rate × PWF
//! ```
//!
//! Carbon components price emissions with the social cost of carbon (SCC)
//! instead of a monetary rate. Rerouting components also scale by daily
//! traffic, closure duration in working days, detour length and the
//! per-vehicle-km emission factor.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult, Violation};
use crate::lifecycle::params::AnalysisParameters;
use crate::lifecycle::pwf::{PresentWorth, MAX_HORIZON_YEARS};
use crate::reference::ReroutingConstants;
use crate::units::Rupees;

/// Names of the line items as they appear in reports.
pub mod line_item {
    pub const INITIAL_CONSTRUCTION: &str = "Total Initial Construction Cost";
    pub const INITIAL_CARBON: &str = "Initial Carbon Emission Cost";
    pub const TIME_COST: &str = "Time Cost";
    pub const INITIAL_REROUTING_CARBON: &str = "Initial Rerouting Carbon Emission Cost";
    pub const ROAD_USER: &str = "Road User Cost";

    pub const ROUTINE_INSPECTION: &str = "Routine Inspection Cost";
    pub const PERIODIC_MAINTENANCE: &str = "Periodic Maintenance Cost";
    pub const PERIODIC_MAINTENANCE_CARBON: &str = "Periodic Maintenance Carbon Emission Cost";
    pub const MAJOR_INSPECTION: &str = "Major Inspection Cost";
    pub const MAJOR_REPAIR: &str = "Major Repair Cost";
    pub const MAJOR_REPAIR_CARBON: &str = "Major Repair Carbon Emission Cost";
    pub const MAJOR_REPAIR_REROUTING_CARBON: &str = "Major Repair Rerouting Carbon Emission Cost";
    pub const BEARING_REPLACEMENT: &str = "Bearing and Expansion Joint Replacement Cost";
    pub const REPLACEMENT_REROUTING_CARBON: &str = "Replacement Rerouting Carbon Emission Cost";

    pub const DEMOLITION: &str = "Demolition and Disposal Cost";
    pub const DEMOLITION_CARBON: &str = "Demolition Carbon Emission Cost";
    pub const DEMOLITION_REROUTING_CARBON: &str = "Demolition Rerouting Carbon Emission Cost";
    pub const RECYCLING: &str = "Recycling Cost";
    pub const RECONSTRUCTION: &str = "Reconstruction Cost";
}

// ============================================================================
// Component record
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostCategory {
    Economic,
    Environmental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTiming {
    Initial,
    Recurring,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeCycleStage {
    Initial,
    Use,
    EndOfLife,
}

impl LifeCycleStage {
    pub const ALL: [LifeCycleStage; 3] = [LifeCycleStage::Initial, LifeCycleStage::Use, LifeCycleStage::EndOfLife];

    pub fn display_name(&self) -> &'static str {
        match self {
            LifeCycleStage::Initial => "Initial stage",
            LifeCycleStage::Use => "Use stage",
            LifeCycleStage::EndOfLife => "End-of-life stage",
        }
    }
}

/// One discounted line item. Built once per run and not modified after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComponent {
    pub name: String,
    pub stage: LifeCycleStage,
    pub category: CostCategory,
    pub timing: CostTiming,
    /// Undiscounted amount of one occurrence
    pub base_amount: Rupees,
    pub present_worth_factor: f64,
    pub occurrences: u32,
    pub discounted_amount: Rupees,
}

impl CostComponent {
    pub fn new(
        name: impl Into<String>,
        stage: LifeCycleStage,
        category: CostCategory,
        timing: CostTiming,
        base_amount: Rupees,
        present_worth: PresentWorth,
    ) -> Self {
        CostComponent {
            name: name.into(),
            stage,
            category,
            timing,
            base_amount,
            present_worth_factor: present_worth.factor,
            occurrences: present_worth.occurrences,
            discounted_amount: base_amount * present_worth.factor,
        }
    }

    /// Paid at year zero, undiscounted.
    pub fn immediate(name: impl Into<String>, category: CostCategory, amount: Rupees) -> Self {
        CostComponent::new(
            name,
            LifeCycleStage::Initial,
            category,
            CostTiming::Initial,
            amount,
            PresentWorth::IMMEDIATE,
        )
    }
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Concrete,
    SteelRebar,
    StructuralSteel,
    PrestressingTendons,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructurePart {
    Foundation,
    Substructure,
    Superstructure,
    Auxiliary,
}

/// A bill-of-quantities line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialItem {
    pub name: String,
    pub kind: MaterialKind,
    pub part: StructurePart,
    pub quantity: f64,
    /// Unit of `quantity`, e.g. "cum" or "MT"
    pub unit: String,
    /// Rs per unit
    pub rate: f64,
    /// kg CO2e per unit
    #[serde(default)]
    pub carbon_kg_per_unit: f64,
}

impl MaterialItem {
    pub fn cost(&self) -> Rupees {
        Rupees(self.quantity * self.rate)
    }

    pub fn carbon_kg(&self) -> f64 {
        self.quantity * self.carbon_kg_per_unit
    }
}

pub fn validate_materials(materials: &[MaterialItem]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (i, item) in materials.iter().enumerate() {
        for (field, value) in [
            ("quantity", item.quantity),
            ("rate", item.rate),
            ("carbon_kg_per_unit", item.carbon_kg_per_unit),
        ] {
            if !value.is_finite() || value < 0.0 {
                violations.push(Violation::new(
                    format!("materials[{i}].{field}"),
                    value.to_string(),
                    "must be a non-negative number",
                ));
            }
        }
    }
    violations
}

/// Σ quantity × rate
pub fn construction_cost(materials: &[MaterialItem]) -> Rupees {
    materials.iter().map(MaterialItem::cost).sum()
}

pub fn part_cost(materials: &[MaterialItem], part: StructurePart) -> Rupees {
    materials.iter().filter(|m| m.part == part).map(MaterialItem::cost).sum()
}

pub fn kind_cost(materials: &[MaterialItem], kind: MaterialKind) -> Rupees {
    materials.iter().filter(|m| m.kind == kind).map(MaterialItem::cost).sum()
}

pub fn embodied_carbon_kg(materials: &[MaterialItem]) -> f64 {
    materials.iter().map(MaterialItem::carbon_kg).sum()
}

/// Where the SCC value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SccSource {
    /// Rs per kg CO2e
    NitiAayog,
    /// USD per kg CO2e, converted with `usd_to_inr`
    RickeEtAl,
    Custom,
}

/// Social cost of carbon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialCostOfCarbon {
    pub source: SccSource,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_to_inr: Option<f64>,
}

impl Default for SocialCostOfCarbon {
    fn default() -> Self {
        SocialCostOfCarbon {
            source: SccSource::Custom,
            value: 6.3936,
            usd_to_inr: None,
        }
    }
}

impl SocialCostOfCarbon {
    /// Rs per kg CO2e.
    pub fn rate(&self) -> CalcResult<f64> {
        let rate = match self.source {
            SccSource::RickeEtAl => match self.usd_to_inr {
                Some(fx) if fx.is_finite() && fx > 0.0 => self.value * fx,
                other => {
                    return Err(CalcError::invalid_input(
                        "carbon.usd_to_inr",
                        other.map_or_else(|| "<missing>".to_string(), |v| v.to_string()),
                        "Ricke et al. SCC is in USD and needs a positive exchange rate",
                    ))
                }
            },
            SccSource::NitiAayog | SccSource::Custom => self.value,
        };
        if rate.is_finite() && rate >= 0.0 {
            Ok(rate)
        } else {
            Err(CalcError::invalid_input(
                "carbon.value",
                self.value.to_string(),
                "must be a non-negative number",
            ))
        }
    }
}

/// A maintenance activity: share of its base cost, every `frequency_years`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub rate: f64,
    pub frequency_years: u32,
}

impl Activity {
    pub const fn new(rate: f64, frequency_years: u32) -> Self {
        Activity { rate, frequency_years }
    }
}

/// Use-stage activities. Rates are fractions of the initial construction
/// cost, except bearing replacement which is a fraction of the
/// superstructure cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceSchedule {
    pub routine_inspection: Activity,
    pub periodic_maintenance: Activity,
    pub major_inspection: Activity,
    pub major_repair: Activity,
    pub bearing_replacement: Activity,
}

impl Default for MaintenanceSchedule {
    fn default() -> Self {
        MaintenanceSchedule {
            routine_inspection: Activity::new(0.01, 1),
            periodic_maintenance: Activity::new(0.0055, 5),
            major_inspection: Activity::new(0.005, 10),
            major_repair: Activity::new(0.10, 30),
            bearing_replacement: Activity::new(0.125, 25),
        }
    }
}

impl MaintenanceSchedule {
    pub fn activities(&self) -> [(&'static str, Activity); 5] {
        [
            ("routine_inspection", self.routine_inspection),
            ("periodic_maintenance", self.periodic_maintenance),
            ("major_inspection", self.major_inspection),
            ("major_repair", self.major_repair),
            ("bearing_replacement", self.bearing_replacement),
        ]
    }

    /// Rates must be non-negative. A zero frequency is left to the present
    /// worth engine, which reports it as a misconfigured schedule.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (name, a) in self.activities() {
            if !a.rate.is_finite() || a.rate < 0.0 {
                violations.push(Violation::new(
                    format!("maintenance.{name}.rate"),
                    a.rate.to_string(),
                    "must be a non-negative number",
                ));
            }
            if a.frequency_years > MAX_HORIZON_YEARS {
                violations.push(Violation::new(
                    format!("maintenance.{name}.frequency_years"),
                    a.frequency_years.to_string(),
                    format!("cannot exceed {MAX_HORIZON_YEARS} years"),
                ));
            }
        }
        violations
    }
}

/// Scrap value recovered from a recyclable material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    /// Scrap value as a fraction of the material cost
    pub scrap_rate: f64,
    /// Fraction of the material that can be recycled
    pub recyclability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndOfLife {
    /// Demolition and disposal as a fraction of the initial cost
    pub demolition_rate: f64,
    pub steel_rebar: Recovery,
    pub structural_steel: Recovery,
    pub prestressing_tendons: Recovery,
}

impl Default for EndOfLife {
    fn default() -> Self {
        let steel = Recovery {
            scrap_rate: 0.98,
            recyclability: 0.9,
        };
        EndOfLife {
            demolition_rate: 0.10,
            steel_rebar: steel,
            structural_steel: steel,
            prestressing_tendons: steel,
        }
    }
}

impl EndOfLife {
    pub fn recovery(&self, kind: MaterialKind) -> Option<Recovery> {
        match kind {
            MaterialKind::SteelRebar => Some(self.steel_rebar),
            MaterialKind::StructuralSteel => Some(self.structural_steel),
            MaterialKind::PrestressingTendons => Some(self.prestressing_tendons),
            MaterialKind::Concrete | MaterialKind::Other => None,
        }
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if !self.demolition_rate.is_finite() || self.demolition_rate < 0.0 {
            violations.push(Violation::new(
                "end_of_life.demolition_rate",
                self.demolition_rate.to_string(),
                "must be a non-negative number",
            ));
        }
        for (name, r) in [
            ("steel_rebar", self.steel_rebar),
            ("structural_steel", self.structural_steel),
            ("prestressing_tendons", self.prestressing_tendons),
        ] {
            for (field, value) in [("scrap_rate", r.scrap_rate), ("recyclability", r.recyclability)] {
                if !(0.0..=1.0).contains(&value) {
                    violations.push(Violation::new(
                        format!("end_of_life.{name}.{field}"),
                        value.to_string(),
                        "must lie between 0 and 1",
                    ));
                }
            }
        }
        violations
    }
}

/// Traffic diverted while the bridge is closed.
#[derive(Debug, Clone, Copy)]
pub struct Rerouting<'a> {
    /// Vehicles per day
    pub daily_traffic: f64,
    /// Extra distance per vehicle (km)
    pub reroute_km: f64,
    pub constants: &'a ReroutingConstants,
    /// Rs per kg CO2e
    pub scc_rate: f64,
}

impl Rerouting<'_> {
    /// Undiscounted carbon cost of one closure lasting `months`.
    pub fn carbon_cost(&self, months: f64) -> Rupees {
        let days = months * self.constants.working_days_per_month;
        Rupees(self.daily_traffic * days * self.scc_rate * self.constants.rerouting_emission_kg_per_km * self.reroute_km)
    }
}

// ============================================================================
// Calculators
// ============================================================================

pub fn initial_construction(materials: &[MaterialItem]) -> CostComponent {
    CostComponent::immediate(line_item::INITIAL_CONSTRUCTION, CostCategory::Economic, construction_cost(materials))
}

/// Σ quantity × kg CO2e per unit × SCC
pub fn initial_carbon(materials: &[MaterialItem], scc_rate: f64) -> CostComponent {
    CostComponent::immediate(
        line_item::INITIAL_CARBON,
        CostCategory::Environmental,
        Rupees(embodied_carbon_kg(materials) * scc_rate),
    )
}

/// Interest carried on the financed share during construction.
pub fn time_cost(construction: Rupees, params: &AnalysisParameters) -> CostComponent {
    let amount = construction * (params.interest_rate * params.construction_time_years * params.investment_ratio);
    CostComponent::immediate(line_item::TIME_COST, CostCategory::Economic, amount)
}

/// `base × rate × PWF`, for every activity priced as a share of a base cost.
pub fn share_of_base(
    name: &str,
    stage: LifeCycleStage,
    category: CostCategory,
    timing: CostTiming,
    base: Rupees,
    rate: f64,
    present_worth: PresentWorth,
) -> CostComponent {
    CostComponent::new(name, stage, category, timing, base * rate, present_worth)
}

pub fn rerouting_carbon(
    name: &str,
    stage: LifeCycleStage,
    timing: CostTiming,
    rerouting: &Rerouting<'_>,
    closure_months: f64,
    present_worth: PresentWorth,
) -> CostComponent {
    CostComponent::new(
        name,
        stage,
        CostCategory::Environmental,
        timing,
        rerouting.carbon_cost(closure_months),
        present_worth,
    )
}

/// Σ over recyclable kinds of material cost × scrap rate × recyclability.
pub fn recycling(materials: &[MaterialItem], end_of_life: &EndOfLife, present_worth: PresentWorth) -> CostComponent {
    let kinds = [
        MaterialKind::SteelRebar,
        MaterialKind::StructuralSteel,
        MaterialKind::PrestressingTendons,
    ];
    let base: Rupees = kinds
        .into_iter()
        .filter_map(|kind| {
            end_of_life
                .recovery(kind)
                .map(|r| kind_cost(materials, kind) * (r.scrap_rate * r.recyclability))
        })
        .sum();
    CostComponent::new(
        line_item::RECYCLING,
        LifeCycleStage::EndOfLife,
        CostCategory::Economic,
        CostTiming::Terminal,
        base,
        present_worth,
    )
}

/// Undiscounted parts of a rebuild: demolition, construction, carbon, time,
/// road-user and rerouting-carbon costs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReconstructionParts {
    pub demolition: Rupees,
    pub construction: Rupees,
    pub carbon: Rupees,
    pub time: Rupees,
    pub road_user: Rupees,
    pub rerouting_carbon: Rupees,
}

impl ReconstructionParts {
    pub fn total(&self) -> Rupees {
        self.demolition + self.construction + self.carbon + self.time + self.road_user + self.rerouting_carbon
    }
}

/// The rebuilt bridge, discounted once over the design life. Zero unless the
/// analysis period outlives the design life.
pub fn reconstruction(parts: &ReconstructionParts, params: &AnalysisParameters) -> CostComponent {
    let present_worth = if params.needs_reconstruction() {
        crate::lifecycle::pwf::single(&params.rates(), params.design_life_years)
    } else {
        PresentWorth::NONE
    };
    CostComponent::new(
        line_item::RECONSTRUCTION,
        LifeCycleStage::EndOfLife,
        CostCategory::Economic,
        CostTiming::Terminal,
        parts.total(),
        present_worth,
    )
}


#[cfg(test)]
mod tests {
    use super::test_support::materials;
    use super::*;
    use crate::lifecycle::pwf::{self, DiscountPolicy, FinancialRates};
    use crate::reference::ReferenceTables;

    #[test]
    fn test_initial_construction_sums_lines() {
        let item = initial_construction(&materials());
        let expected = 214.0 * 11994.0 + 27.99 * 91565.0 + 5.69 * 185100.0;
        assert!((item.discounted_amount.value() - expected).abs() < 1e-6);
        assert_eq!(item.present_worth_factor, 1.0);
        assert_eq!(item.timing, CostTiming::Initial);
    }

    #[test]
    fn test_part_and_kind_costs() {
        let m = materials();
        let superstructure = part_cost(&m, StructurePart::Superstructure);
        assert!((superstructure.value() - (214.0 * 11994.0 + 5.69 * 185100.0)).abs() < 1e-6);
        assert_eq!(part_cost(&m, StructurePart::Foundation), Rupees(0.0));
        assert!((kind_cost(&m, MaterialKind::SteelRebar).value() - 27.99 * 91565.0).abs() < 1e-6);
    }

    #[test]
    fn test_carbon_uses_scc() {
        let item = initial_carbon(&materials(), 6.0);
        let kg = 214.0 * 214.1 + (27.99 + 5.69) * 2600.0;
        assert!((item.discounted_amount.value() - kg * 6.0).abs() < 1e-6);
        assert_eq!(item.category, CostCategory::Environmental);
    }

    #[test]
    fn test_time_cost() {
        let params = AnalysisParameters::standard(DiscountPolicy::DiscountAndInflation);
        let item = time_cost(Rupees(1_000_000.0), &params);
        assert!((item.discounted_amount.value() - 1_000_000.0 * 0.0775 * 5.0 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_recurring_share_of_base() {
        let rates = FinancialRates::new(0.05, 0.0, DiscountPolicy::DiscountOnly);
        let pw = pwf::recurring(&rates, "major_inspection", 10, 50).unwrap();
        let item = share_of_base(
            line_item::MAJOR_INSPECTION,
            LifeCycleStage::Use,
            CostCategory::Economic,
            CostTiming::Recurring,
            Rupees(1000.0),
            0.1,
            pw,
        );
        assert!((item.discounted_amount.value() - 100.0 * pw.factor).abs() < 1e-9);
        assert_eq!(item.occurrences, 5);
    }

    #[test]
    fn test_rerouting_carbon_scales_with_closure() {
        let tables = ReferenceTables::standard().unwrap();
        let rerouting = Rerouting {
            daily_traffic: 1000.0,
            reroute_km: 6.0,
            constants: &tables.constants,
            scc_rate: 6.0,
        };
        let item = rerouting_carbon(
            line_item::MAJOR_REPAIR_REROUTING_CARBON,
            LifeCycleStage::Use,
            CostTiming::Recurring,
            &rerouting,
            3.0,
            PresentWorth::IMMEDIATE,
        );
        let expected = 1000.0 * 3.0 * 26.0 * 6.0 * 0.1213 * 6.0;
        assert!((item.base_amount.value() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_recycling_only_counts_steel() {
        let eol = EndOfLife::default();
        let item = recycling(&materials(), &eol, PresentWorth::IMMEDIATE);
        let steel = 27.99 * 91565.0 + 5.69 * 185100.0;
        assert!((item.base_amount.value() - steel * 0.98 * 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_reconstruction_only_when_outlived() {
        let parts = ReconstructionParts {
            construction: Rupees(1000.0),
            demolition: Rupees(100.0),
            ..Default::default()
        };
        let params = AnalysisParameters::standard(DiscountPolicy::DiscountAndInflation);
        assert_eq!(reconstruction(&parts, &params).discounted_amount, Rupees(0.0));

        let longer = AnalysisParameters {
            analysis_period_years: 100,
            discount_policy: DiscountPolicy::DiscountOnly,
            ..AnalysisParameters::standard(DiscountPolicy::DiscountAndInflation)
        };
        let item = reconstruction(&parts, &longer);
        let expected = 1100.0 / 1.067f64.powi(50);
        assert!((item.discounted_amount.value() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_scc_conversion() {
        let ricke = SocialCostOfCarbon {
            source: SccSource::RickeEtAl,
            value: 0.086,
            usd_to_inr: Some(83.0),
        };
        assert!((ricke.rate().unwrap() - 0.086 * 83.0).abs() < 1e-12);

        let missing_fx = SocialCostOfCarbon {
            usd_to_inr: None,
            ..ricke
        };
        assert_eq!(missing_fx.rate().unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_material_validation() {
        let mut m = materials();
        m[1].rate = -5.0;
        let violations = validate_materials(&m);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "materials[1].rate");
    }
}
