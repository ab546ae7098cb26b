//! # lcc_core - Bridge Life-Cycle Cost Engine
//!
//! `lcc_core` computes the whole-life cost of a road bridge: what it costs to
//! build, keep in service and take down, plus what its closures cost the
//! people who drive over it. All inputs and outputs are JSON-serializable.
//!
//! Two halves share the reference data:
//!
//! - the **road-user cost engine** ([`voc`]) turns traffic counts and road
//!   geometry into congestion-adjusted operating and time costs per km;
//! - the **cost-component library** ([`lifecycle`]) discounts construction,
//!   maintenance, carbon and end-of-life items over the analysis period.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Explicit data**: Reference tables and price indices are passed in,
//!   never read from globals behind the caller's back
//!
//! ## Quick Start
//!
//! ```rust
//! use lcc_core::project::Project;
//! use lcc_core::reference::{PriceIndexTable, ReferenceTables, WpiSeries};
//!
//! let tables = ReferenceTables::standard().unwrap();
//! let wpi = PriceIndexTable::from_series(WpiSeries::standard().unwrap(), 2024).unwrap();
//!
//! let report = Project::demo().evaluate(tables, &wpi).unwrap();
//! println!("life-cycle total: {}", report.life_cycle.total);
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project container, metadata and evaluation
//! - [`voc`] - Vehicle operating cost models, price indexing, congestion
//! - [`lifecycle`] - Present worth factors and discounted cost components
//! - [`reference`] - Vehicle, price and index tables
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod errors;
pub mod lifecycle;
pub mod project;
pub mod reference;
pub mod units;
pub mod voc;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult, ClassFailure, Violation};
pub use lifecycle::{evaluate_life_cycle, AnalysisParameters, DiscountPolicy, LifeCycleInputs, LifeCycleReport};
pub use project::{Project, ProjectInputs, ProjectMetadata, ProjectReport};
pub use reference::{LaneType, PriceIndexTable, ReferenceTables, VehicleClass};
pub use units::{Rupees, TaxBasis, TaxPair};
pub use voc::{evaluate_road_user_cost, EvaluationOptions, RoadUserCostReport, RoadUserCostSummary};
