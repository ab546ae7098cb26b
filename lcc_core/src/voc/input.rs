//! # Traffic Input and Validation
//!
//! [`VehicleTrafficInput`] is the loosely-typed record a caller hands in
//! (string class keys, string lane code, optional fields). [`validate`]
//! checks all of it at once and, on success, returns a [`ValidatedTraffic`]
//! with every key parsed and every optional field resolved. Nothing past this
//! point re-checks the input.
//!
//! ## Accepted ranges
//!
//! | Field | Range |
//! |---|---|
//! | `roughness` | 0 ..= [`MAX_ROUGHNESS_MM_PER_KM`] |
//! | `rise`, `fall` | 0 ..= [`MAX_RISE_FALL_M_PER_KM`] (negative values are rejected) |
//! | `carriageway_width_m` (EW) | [`MIN_CARRIAGEWAY_WIDTH_M`] ..= [`MAX_CARRIAGEWAY_WIDTH_M`] |
//! | `power_weight_ratio` | > 0 and <= [`MAX_POWER_WEIGHT_RATIO`] |
//!
//! The regressions stay finite across these ranges. A class key that appears
//! twice in `vehicle_counts` fails deserialization.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "vehicle_counts": {
//!     "small_cars": 3943, "big_cars": 2397, "two_wheelers": 12505,
//!     "buses": 329, "lcv": 271, "hcv": 0, "mcv": 1
//!   },
//!   "roughness": 2000.0,
//!   "rise": 0.0,
//!   "fall": 0.0,
//!   "lane_type": "2L",
//!   "power_weight_ratio": { "mcv": 8.0, "hcv": 7.22 }
//! }
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{CalcError, CalcResult, Violation};
use crate::reference::{LaneType, ReferenceTables, VehicleClass};

pub const MAX_ROUGHNESS_MM_PER_KM: f64 = 50_000.0;
pub const MAX_RISE_FALL_M_PER_KM: f64 = 1000.0;
pub const MIN_CARRIAGEWAY_WIDTH_M: f64 = 1.0;
pub const MAX_CARRIAGEWAY_WIDTH_M: f64 = 100.0;
pub const MAX_POWER_WEIGHT_RATIO: f64 = 1000.0;

/// Daily traffic count per vehicle class.
pub type VehicleCounts = BTreeMap<VehicleClass, f64>;

/// Power-to-weight ratio, either one value for every heavy class or one per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PowerWeightRatio {
    Uniform(f64),
    PerClass(BTreeMap<String, f64>),
}

/// Traffic and road description as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTrafficInput {
    /// Count per vehicle class key; every class must appear exactly once
    #[serde(deserialize_with = "unique_counts")]
    pub vehicle_counts: BTreeMap<String, f64>,

    /// Roughness (mm/km)
    pub roughness: f64,

    /// Rise (m/km)
    pub rise: f64,

    /// Fall (m/km)
    pub fall: f64,

    /// One of SL, IL, 2L, 4L, 6L, 8L, EW
    pub lane_type: String,

    /// Required for EW; other lane types use the standard width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carriageway_width_m: Option<f64>,

    /// Required for HCV and MCV when their count is positive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_weight_ratio: Option<PowerWeightRatio>,
}

/// Reads `vehicle_counts`, refusing a key that appears twice.
fn unique_counts<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountsVisitor;

    impl<'de> Visitor<'de> for CountsVisitor {
        type Value = BTreeMap<String, f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of vehicle class to daily count")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut counts = BTreeMap::new();
            while let Some((key, count)) = map.next_entry::<String, f64>()? {
                match counts.entry(key) {
                    Entry::Occupied(e) => {
                        return Err(de::Error::custom(format!(
                            "vehicle class `{}` appears more than once",
                            e.key()
                        )))
                    }
                    Entry::Vacant(e) => {
                        e.insert(count);
                    }
                }
            }
            Ok(counts)
        }
    }

    deserializer.deserialize_map(CountsVisitor)
}

/// Road description with the lane type parsed and the width resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadGeometry {
    pub roughness: f64,
    pub rise: f64,
    pub fall: f64,
    pub lane_type: LaneType,
    pub carriageway_width_m: f64,
}

impl RoadGeometry {
    /// Combined rise-and-fall factor RF.
    pub fn rise_and_fall(&self) -> f64 {
        self.rise + self.fall
    }
}

/// Output of [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedTraffic {
    pub counts: VehicleCounts,
    pub road: RoadGeometry,
    pub power_weight_ratio: BTreeMap<VehicleClass, f64>,
}

impl ValidatedTraffic {
    /// Classes with a positive count, in class order.
    pub fn active_classes(&self) -> Vec<VehicleClass> {
        self.counts
            .iter()
            .filter(|(_, count)| **count > 0.0)
            .map(|(class, _)| *class)
            .collect()
    }

    pub fn total_vehicles(&self) -> f64 {
        self.counts.values().sum()
    }
}

impl VehicleTrafficInput {
    /// Validate against the reference tables. See [`validate`].
    pub fn validate(&self, tables: &ReferenceTables) -> CalcResult<ValidatedTraffic> {
        validate(self, tables)
    }
}

/// Check the whole input and report every violation together.
pub fn validate(input: &VehicleTrafficInput, tables: &ReferenceTables) -> CalcResult<ValidatedTraffic> {
    let mut violations = Vec::new();

    let lane_type = match LaneType::from_code(&input.lane_type) {
        Ok(lane) => Some(lane),
        Err(_) => {
            violations.push(Violation::new(
                "lane_type",
                input.lane_type.clone(),
                "unknown lane type; expected one of SL, IL, 2L, 4L, 6L, 8L, EW",
            ));
            None
        }
    };

    for (field, value, max) in [
        ("roughness", input.roughness, MAX_ROUGHNESS_MM_PER_KM),
        ("rise", input.rise, MAX_RISE_FALL_M_PER_KM),
        ("fall", input.fall, MAX_RISE_FALL_M_PER_KM),
    ] {
        if !value.is_finite() {
            violations.push(Violation::new(field, value.to_string(), "must be a finite number"));
        } else if value < 0.0 {
            violations.push(Violation::new(field, value.to_string(), "cannot be negative"));
        } else if value > max {
            violations.push(Violation::new(field, value.to_string(), format!("cannot exceed {max}")));
        }
    }

    let mut counts = VehicleCounts::new();
    for (key, count) in &input.vehicle_counts {
        let field = format!("vehicle_counts.{key}");
        let Ok(class) = VehicleClass::from_key(key) else {
            violations.push(Violation::new(field, count.to_string(), "unexpected vehicle class"));
            continue;
        };
        if !count.is_finite() {
            violations.push(Violation::new(field, count.to_string(), "count must be a finite number"));
        } else if *count < 0.0 {
            violations.push(Violation::new(field, count.to_string(), "count cannot be negative"));
        } else {
            counts.insert(class, *count);
        }
    }
    for class in VehicleClass::ALL {
        if !input.vehicle_counts.contains_key(class.key()) {
            violations.push(Violation::new(
                format!("vehicle_counts.{}", class.key()),
                "<missing>",
                "missing vehicle class",
            ));
        }
    }

    let width = match lane_type {
        Some(lane) if lane.requires_custom_width() => match input.carriageway_width_m {
            Some(w) if (MIN_CARRIAGEWAY_WIDTH_M..=MAX_CARRIAGEWAY_WIDTH_M).contains(&w) => Some(w),
            other => {
                violations.push(Violation::new(
                    "carriageway_width_m",
                    other.map_or_else(|| "<missing>".to_string(), |w| w.to_string()),
                    format!(
                        "expressway requires a carriageway width between {MIN_CARRIAGEWAY_WIDTH_M} and {MAX_CARRIAGEWAY_WIDTH_M} m"
                    ),
                ));
                None
            }
        },
        Some(lane) => {
            if input.carriageway_width_m.is_some() {
                log::debug!("ignoring supplied carriageway width for {}; using standard width", lane.code());
            }
            match tables.standard_width(lane) {
                Some(w) => Some(w),
                None => {
                    violations.push(Violation::new(
                        "lane_type",
                        lane.code(),
                        "no standard carriageway width in reference tables",
                    ));
                    None
                }
            }
        }
        None => None,
    };

    let mut power_weight_ratio = BTreeMap::new();
    if let Some(PowerWeightRatio::PerClass(map)) = &input.power_weight_ratio {
        for (key, value) in map {
            match VehicleClass::from_key(key) {
                Ok(class) if class.needs_power_weight_ratio() => {}
                _ => violations.push(Violation::new(
                    format!("power_weight_ratio.{key}"),
                    value.to_string(),
                    "power-to-weight ratio only applies to hcv and mcv",
                )),
            }
        }
    }
    for class in VehicleClass::ALL.into_iter().filter(|c| c.needs_power_weight_ratio()) {
        let count = input.vehicle_counts.get(class.key()).copied().unwrap_or(0.0);
        if count <= 0.0 {
            continue;
        }
        let supplied = match &input.power_weight_ratio {
            Some(PowerWeightRatio::Uniform(v)) => Some(*v),
            Some(PowerWeightRatio::PerClass(map)) => map.get(class.key()).copied(),
            None => None,
        };
        match supplied {
            Some(v) if v > 0.0 && v <= MAX_POWER_WEIGHT_RATIO => {
                power_weight_ratio.insert(class, v);
            }
            other => violations.push(Violation::new(
                format!("power_weight_ratio.{}", class.key()),
                other.map_or_else(|| "<missing>".to_string(), |v| v.to_string()),
                format!("a power-to-weight ratio in (0, {MAX_POWER_WEIGHT_RATIO}] is required when the class is present"),
            )),
        }
    }

    if !violations.is_empty() {
        log::debug!("traffic input rejected with {} violation(s)", violations.len());
        return Err(CalcError::InvalidInput { violations });
    }

    // Both are Some whenever no violation was recorded.
    let (Some(lane_type), Some(carriageway_width_m)) = (lane_type, width) else {
        return Err(CalcError::Internal {
            message: "lane type resolved without violations but missing".to_string(),
        });
    };

    Ok(ValidatedTraffic {
        counts,
        road: RoadGeometry {
            roughness: input.roughness,
            rise: input.rise,
            fall: input.fall,
            lane_type,
            carriageway_width_m,
        },
        power_weight_ratio,
    })
}
