//! # Project Data Structures
//!
//! The `Project` struct is the root container for one bridge appraisal.
//! Projects serialize to human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (id, version, engineer, job info, timestamps)
//! └── inputs: ProjectInputs
//!     ├── traffic: VehicleTrafficInput (counts, road, lane type)
//!     ├── volume_capacity_ratio
//!     └── life_cycle: LifeCycleInputs (finance, materials, schedules)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lcc_core::project::Project;
//! use lcc_core::reference::{PriceIndexTable, ReferenceTables};
//!
//! let project = Project::demo();
//! let json = project.to_json().unwrap();
//! let loaded = Project::from_json(&json).unwrap();
//!
//! let tables = ReferenceTables::standard().unwrap();
//! let report = loaded.evaluate(tables, &PriceIndexTable::identity(2019)).unwrap();
//! assert!(report.life_cycle.total.value() > 0.0);
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CalcResult;
use crate::lifecycle::{
    self, AnalysisParameters, DiscountPolicy, LifeCycleInputs, LifeCycleReport, MaterialItem, MaterialKind,
    StructurePart,
};
use crate::reference::{PriceIndexTable, ReferenceTables, VehicleClass};
use crate::voc::input::PowerWeightRatio;
use crate::voc::{self, EvaluationOptions, ModelRegistry, RoadUserCostReport, VehicleTrafficInput};

/// Current schema version for project files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (id, version, engineer, job info)
    pub meta: ProjectMetadata,

    /// Everything the evaluation reads
    pub inputs: ProjectInputs,
}

impl Project {
    /// Create a project with standard life-cycle inputs and no traffic.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Name of the responsible engineer
    /// * `job_id` - Job/project number (e.g., "25-001")
    /// * `client` - Client name
    /// * `discount_policy` - How future costs are discounted
    ///
    /// # Example
    ///
    /// ```rust
    /// use lcc_core::project::Project;
    /// use lcc_core::DiscountPolicy;
    ///
    /// let project = Project::new("John Doe", "25-001", "Client Corp", DiscountPolicy::DiscountOnly);
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// ```
    pub fn new(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
        discount_policy: DiscountPolicy,
    ) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                id: Uuid::new_v4(),
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            inputs: ProjectInputs::new(discount_policy),
        }
    }

    /// A two-lane crossing carrying about 19 500 vehicles a day, with a
    /// small steel-concrete composite superstructure.
    pub fn demo() -> Self {
        let policy = DiscountPolicy::DiscountAndInflation;
        let mut project = Project::new("Demo Engineer", "DEMO-001", "Demo Client", policy);
        project.inputs = ProjectInputs {
            traffic: demo_traffic(),
            volume_capacity_ratio: 0.8854,
            life_cycle: LifeCycleInputs {
                materials: demo_materials(),
                ..LifeCycleInputs::new(AnalysisParameters::standard(policy))
            },
        };
        project
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn to_json(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> CalcResult<Self> {
        let project: Project = serde_json::from_str(json)?;
        if project.meta.version != SCHEMA_VERSION {
            log::warn!(
                "project {} was written with schema {}, reading as {}",
                project.meta.id,
                project.meta.version,
                SCHEMA_VERSION
            );
        }
        Ok(project)
    }

    /// Run the road-user cost engine and the cost-component library.
    pub fn evaluate(&self, tables: &ReferenceTables, wpi: &PriceIndexTable) -> CalcResult<ProjectReport> {
        self.evaluate_with(tables, wpi, &ModelRegistry::standard(), EvaluationOptions::default())
    }

    /// [`evaluate`](Self::evaluate) with an explicit model registry and options.
    pub fn evaluate_with(
        &self,
        tables: &ReferenceTables,
        wpi: &PriceIndexTable,
        registry: &ModelRegistry,
        options: EvaluationOptions,
    ) -> CalcResult<ProjectReport> {
        let inputs = &self.inputs;
        log::debug!("evaluating project {} ({})", self.meta.id, self.meta.job_id);

        let road_user = voc::evaluate_road_user_cost(
            &inputs.traffic,
            inputs.volume_capacity_ratio,
            tables,
            wpi,
            registry,
            options,
        )?;
        let life_cycle =
            lifecycle::evaluate_life_cycle(&inputs.life_cycle, &road_user.counts, &road_user.summary, tables, wpi)?;

        Ok(ProjectReport {
            project_id: self.meta.id,
            job_id: self.meta.job_id.clone(),
            reference_vintage: tables.vintage.clone(),
            wpi_year: wpi.year,
            evaluated: Utc::now(),
            road_user,
            life_cycle,
        })
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: Uuid,

    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Inputs of one appraisal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInputs {
    pub traffic: VehicleTrafficInput,
    pub volume_capacity_ratio: f64,
    pub life_cycle: LifeCycleInputs,
}

impl ProjectInputs {
    /// All classes present with zero traffic on a two-lane road.
    pub fn new(discount_policy: DiscountPolicy) -> Self {
        ProjectInputs {
            traffic: VehicleTrafficInput {
                vehicle_counts: VehicleClass::ALL.iter().map(|c| (c.key().to_string(), 0.0)).collect(),
                roughness: 2000.0,
                rise: 0.0,
                fall: 0.0,
                lane_type: "2L".to_string(),
                carriageway_width_m: None,
                power_weight_ratio: None,
            },
            volume_capacity_ratio: 0.0,
            life_cycle: LifeCycleInputs::new(AnalysisParameters::standard(discount_policy)),
        }
    }
}

/// Result of [`Project::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub project_id: Uuid,
    pub job_id: String,
    /// Price basis of the reference tables used
    pub reference_vintage: String,
    pub wpi_year: u16,
    pub evaluated: DateTime<Utc>,
    pub road_user: RoadUserCostReport,
    pub life_cycle: LifeCycleReport,
}

fn demo_traffic() -> VehicleTrafficInput {
    let counts = [
        (VehicleClass::SmallCars, 3943.0),
        (VehicleClass::BigCars, 2397.0),
        (VehicleClass::TwoWheelers, 12505.0),
        (VehicleClass::Buses, 329.0),
        (VehicleClass::Lcv, 271.0),
        (VehicleClass::Hcv, 0.0),
        (VehicleClass::Mcv, 1.0),
    ];
    VehicleTrafficInput {
        vehicle_counts: counts.iter().map(|(c, n)| (c.key().to_string(), *n)).collect(),
        roughness: 2000.0,
        rise: 0.0,
        fall: 0.0,
        lane_type: "2L".to_string(),
        carriageway_width_m: None,
        power_weight_ratio: Some(PowerWeightRatio::PerClass(BTreeMap::from([
            (VehicleClass::Mcv.key().to_string(), 8.0),
            (VehicleClass::Hcv.key().to_string(), 7.22),
        ]))),
    }
}

fn demo_materials() -> Vec<MaterialItem> {
    let item = |name: &str, kind, part, quantity, unit: &str, rate, carbon_kg_per_unit| MaterialItem {
        name: name.to_string(),
        kind,
        part,
        quantity,
        unit: unit.to_string(),
        rate,
        carbon_kg_per_unit,
    };
    vec![
        item("M30 pile concrete", MaterialKind::Concrete, StructurePart::Foundation, 180.0, "cum", 8950.0, 182.0),
        item("Pile cage rebar", MaterialKind::SteelRebar, StructurePart::Foundation, 14.2, "MT", 91565.0, 2600.0),
        item("M35 pier concrete", MaterialKind::Concrete, StructurePart::Substructure, 96.0, "cum", 10420.0, 198.0),
        item("Fe 500 rebar", MaterialKind::SteelRebar, StructurePart::Substructure, 27.99, "MT", 91565.0, 2600.0),
        item("M40 deck concrete", MaterialKind::Concrete, StructurePart::Superstructure, 214.0, "cum", 11994.0, 214.1),
        item("E 300 girders", MaterialKind::StructuralSteel, StructurePart::Superstructure, 5.69, "MT", 185100.0, 2600.0),
        item("Crash barrier", MaterialKind::Other, StructurePart::Auxiliary, 120.0, "m", 4200.0, 35.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::line_item;

    #[test]
    fn test_project_creation() {
        let project = Project::new("John Doe", "25-001", "Acme Corp", DiscountPolicy::DiscountOnly);
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "25-001");
        assert_eq!(project.meta.client, "Acme Corp");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.inputs.life_cycle.parameters.discount_policy, DiscountPolicy::DiscountOnly);
        let other = Project::new("", "", "", DiscountPolicy::DiscountOnly);
        assert_ne!(project.meta.id, other.meta.id);
    }

    #[test]
    fn test_project_serialization() {
        let project = Project::demo();
        let json = project.to_json().unwrap();
        assert!(json.contains("DEMO-001"));
        assert!(json.contains("small_cars"));

        let roundtrip = Project::from_json(&json).unwrap();
        assert_eq!(roundtrip.meta.id, project.meta.id);
        assert_eq!(roundtrip.inputs, project.inputs);
    }

    #[test]
    fn test_minimal_life_cycle_takes_standard_values() {
        let mut json = serde_json::to_value(Project::demo()).unwrap();
        json["inputs"]["life_cycle"] = serde_json::json!({ "parameters": { "discount_policy": "discount_only" } });
        let project: Project = serde_json::from_value(json).unwrap();
        assert!(project.inputs.life_cycle.materials.is_empty());
        assert_eq!(project.inputs.life_cycle.parameters.design_life_years, 50);
        assert_eq!(project.inputs.life_cycle.parameters.discount_policy, DiscountPolicy::DiscountOnly);
    }

    #[test]
    fn test_project_without_discount_policy_is_rejected() {
        let mut json = serde_json::to_value(Project::demo()).unwrap();
        json["inputs"]["life_cycle"]["parameters"]
            .as_object_mut()
            .unwrap()
            .remove("discount_policy");
        let err = Project::from_json(&json.to_string()).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");

        json["inputs"].as_object_mut().unwrap().remove("life_cycle");
        assert!(Project::from_json(&json.to_string()).is_err());
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        let err = Project::from_json("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_touch_updates_modified() {
        let mut project = Project::new("Engineer", "25-001", "Client", DiscountPolicy::DiscountAndInflation);
        let created = project.meta.created;
        project.touch();
        assert!(project.meta.modified >= created);
    }

    #[test]
    fn test_demo_evaluates() {
        let tables = ReferenceTables::standard().unwrap();
        let project = Project::demo();
        let report = project.evaluate(tables, &PriceIndexTable::identity(2019)).unwrap();

        assert_eq!(report.project_id, project.meta.id);
        assert!(report.road_user.summary.total.et > 0.0);
        let road_user = report.life_cycle.get(line_item::ROAD_USER).unwrap();
        assert!(road_user.discounted_amount.value() > 0.0);

        let stages = report.life_cycle.stage_totals;
        let sum = stages.initial + stages.use_stage + stages.end_of_life;
        assert!((sum.value() - report.life_cycle.total.value()).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_traffic_stops_evaluation() {
        let mut project = Project::demo();
        project.inputs.traffic.lane_type = "3L".to_string();
        let err = project
            .evaluate(ReferenceTables::standard().unwrap(), &PriceIndexTable::identity(2019))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.violations()[0].field, "lane_type");
    }
}
