//! # Error Types
//!
//! Structured error types for lcc_core. Every failure a caller can see is one
//! of these variants, serializable to JSON so a UI or API layer can show the
//! full list of reasons a cost summary could not be produced.
//!
//! ## Example
//!
//! ```rust
//! use lcc_core::errors::{CalcError, CalcResult, Violation};
//!
//! fn check_roughness(roughness: f64) -> CalcResult<()> {
//!     if roughness < 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             violations: vec![Violation::new(
//!                 "roughness",
//!                 roughness.to_string(),
//!                 "Roughness cannot be negative",
//!             )],
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for lcc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// One failed input check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' = {}: {}", self.field, self.value, self.reason)
    }
}

/// A vehicle class whose computation failed, kept alongside its cause.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassFailure {
    pub vehicle_class: String,
    pub error: CalcError,
}

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// One or more input checks failed. Carries every violation, not just the first.
    #[error("Invalid input ({} violation(s)): {}", .violations.len(), join_violations(.violations))]
    InvalidInput { violations: Vec<Violation> },

    /// Vehicle class key is not recognised or has no registered model
    #[error("Unknown vehicle class: {vehicle_class}")]
    UnknownVehicleClass { vehicle_class: String },

    /// Lane type code is not one of SL, IL, 2L, 4L, 6L, 8L, EW
    #[error("Unknown lane type: {lane_type}")]
    UnknownLaneType { lane_type: String },

    /// Price index table has no entry for a category a vehicle class needs
    #[error("Missing price index category '{category}' for {vehicle_class}")]
    MissingWpiCategory {
        category: String,
        vehicle_class: String,
    },

    /// Recurring activity schedule cannot be evaluated
    #[error("Misconfigured schedule for {activity}: frequency {frequency_years} years - {reason}")]
    MisconfiguredSchedule {
        activity: String,
        frequency_years: u32,
        reason: String,
    },

    /// A computed element came out NaN or infinite
    #[error("Non-finite value for {vehicle_class}: {element}")]
    NonFiniteValue {
        vehicle_class: String,
        element: String,
    },

    /// A per-class record is not in canonical form
    #[error("Malformed cost record for {vehicle_class}: {element}")]
    MalformedVocResult {
        vehicle_class: String,
        element: String,
    },

    /// One or more vehicle classes failed; raised at the aggregation boundary
    #[error("{} vehicle class(es) failed: {}", .failures.len(), join_failures(.failures))]
    VehicleClassFailures { failures: Vec<ClassFailure> },

    /// Embedded or injected reference data could not be parsed
    #[error("Reference data error in {source_name}: {reason}")]
    ReferenceData { source_name: String, reason: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_failures(failures: &[ClassFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.vehicle_class, f.error.error_code()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CalcError {
    /// Create an InvalidInput error holding a single violation
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            violations: vec![Violation::new(field, value, reason)],
        }
    }

    /// Create an UnknownVehicleClass error
    pub fn unknown_vehicle_class(vehicle_class: impl Into<String>) -> Self {
        CalcError::UnknownVehicleClass {
            vehicle_class: vehicle_class.into(),
        }
    }

    /// Create an UnknownLaneType error
    pub fn unknown_lane_type(lane_type: impl Into<String>) -> Self {
        CalcError::UnknownLaneType {
            lane_type: lane_type.into(),
        }
    }

    /// Create a MissingWpiCategory error
    pub fn missing_wpi_category(category: impl Into<String>, vehicle_class: impl Into<String>) -> Self {
        CalcError::MissingWpiCategory {
            category: category.into(),
            vehicle_class: vehicle_class.into(),
        }
    }

    /// Create a MisconfiguredSchedule error
    pub fn misconfigured_schedule(activity: impl Into<String>, frequency_years: u32, reason: impl Into<String>) -> Self {
        CalcError::MisconfiguredSchedule {
            activity: activity.into(),
            frequency_years,
            reason: reason.into(),
        }
    }

    /// Create a NonFiniteValue error
    pub fn non_finite(vehicle_class: impl Into<String>, element: impl Into<String>) -> Self {
        CalcError::NonFiniteValue {
            vehicle_class: vehicle_class.into(),
            element: element.into(),
        }
    }

    /// Create a MalformedVocResult error
    pub fn malformed_result(vehicle_class: impl Into<String>, element: impl Into<String>) -> Self {
        CalcError::MalformedVocResult {
            vehicle_class: vehicle_class.into(),
            element: element.into(),
        }
    }

    /// Create a ReferenceData error
    pub fn reference_data(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ReferenceData {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Violations carried by an InvalidInput error (empty for other variants)
    pub fn violations(&self) -> &[Violation] {
        match self {
            CalcError::InvalidInput { violations } => violations,
            _ => &[],
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnknownVehicleClass { .. } => "UNKNOWN_VEHICLE_CLASS",
            CalcError::UnknownLaneType { .. } => "UNKNOWN_LANE_TYPE",
            CalcError::MissingWpiCategory { .. } => "MISSING_WPI_CATEGORY",
            CalcError::MisconfiguredSchedule { .. } => "MISCONFIGURED_SCHEDULE",
            CalcError::NonFiniteValue { .. } => "NON_FINITE_VALUE",
            CalcError::MalformedVocResult { .. } => "MALFORMED_VOC_RESULT",
            CalcError::VehicleClassFailures { .. } => "VEHICLE_CLASS_FAILURES",
            CalcError::ReferenceData { .. } => "REFERENCE_DATA",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}
