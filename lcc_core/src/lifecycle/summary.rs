//! Life-cycle report: discounted line items and their totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lifecycle::components::{CostCategory, CostComponent, LifeCycleStage};
use crate::units::Rupees;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageTotals {
    pub initial: Rupees,
    #[serde(rename = "use")]
    pub use_stage: Rupees,
    pub end_of_life: Rupees,
}

impl StageTotals {
    pub fn get(&self, stage: LifeCycleStage) -> Rupees {
        match stage {
            LifeCycleStage::Initial => self.initial,
            LifeCycleStage::Use => self.use_stage,
            LifeCycleStage::EndOfLife => self.end_of_life,
        }
    }

    fn add(&mut self, stage: LifeCycleStage, amount: Rupees) {
        match stage {
            LifeCycleStage::Initial => self.initial += amount,
            LifeCycleStage::Use => self.use_stage += amount,
            LifeCycleStage::EndOfLife => self.end_of_life += amount,
        }
    }
}

/// Outcome of a life-cycle run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeCycleReport {
    /// In evaluation order
    pub line_items: Vec<CostComponent>,
    pub stage_totals: StageTotals,
    pub economic_total: Rupees,
    pub environmental_total: Rupees,
    pub total: Rupees,
    /// Likely configuration mistakes that did not stop the run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl LifeCycleReport {
    pub fn from_components(line_items: Vec<CostComponent>, warnings: Vec<String>) -> Self {
        let mut stage_totals = StageTotals::default();
        let mut economic_total = Rupees(0.0);
        let mut environmental_total = Rupees(0.0);
        for item in &line_items {
            stage_totals.add(item.stage, item.discounted_amount);
            match item.category {
                CostCategory::Economic => economic_total += item.discounted_amount,
                CostCategory::Environmental => environmental_total += item.discounted_amount,
            }
        }
        LifeCycleReport {
            line_items,
            stage_totals,
            economic_total,
            environmental_total,
            total: economic_total + environmental_total,
            warnings,
        }
    }

    /// Discounted amount per line-item name.
    pub fn amounts(&self) -> BTreeMap<String, f64> {
        self.line_items
            .iter()
            .map(|item| (item.name.clone(), item.discounted_amount.value()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&CostComponent> {
        self.line_items.iter().find(|item| item.name == name)
    }
}
