//! Carriageway lane configurations.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Lane configuration of the carriageway.
///
/// Serialized with the short codes used throughout the road-user cost tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LaneType {
    #[serde(rename = "SL")]
    SingleLane,
    #[serde(rename = "IL")]
    IntermediateLane,
    #[serde(rename = "2L")]
    TwoLane,
    #[serde(rename = "4L")]
    FourLane,
    #[serde(rename = "6L")]
    SixLane,
    #[serde(rename = "8L")]
    EightLane,
    #[serde(rename = "EW")]
    Expressway,
}

/// Coarser grouping used by the time-value tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneGroup {
    SingleOrIntermediate,
    TwoLane,
    MultiLane,
}

impl LaneType {
    pub const ALL: [LaneType; 7] = [
        LaneType::SingleLane,
        LaneType::IntermediateLane,
        LaneType::TwoLane,
        LaneType::FourLane,
        LaneType::SixLane,
        LaneType::EightLane,
        LaneType::Expressway,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LaneType::SingleLane => "SL",
            LaneType::IntermediateLane => "IL",
            LaneType::TwoLane => "2L",
            LaneType::FourLane => "4L",
            LaneType::SixLane => "6L",
            LaneType::EightLane => "8L",
            LaneType::Expressway => "EW",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LaneType::SingleLane => "Single Lane",
            LaneType::IntermediateLane => "Intermediate Lane",
            LaneType::TwoLane => "Two Lane",
            LaneType::FourLane => "Four Lane Divided",
            LaneType::SixLane => "Six Lane Divided",
            LaneType::EightLane => "Eight Lane Divided",
            LaneType::Expressway => "Expressway",
        }
    }

    /// Strict lookup by code, case-insensitive.
    pub fn from_code(code: &str) -> CalcResult<Self> {
        let wanted = code.trim().to_uppercase();
        LaneType::ALL
            .into_iter()
            .find(|l| l.code() == wanted)
            .ok_or_else(|| CalcError::unknown_lane_type(code))
    }

    /// Expressways have no standard width; the caller supplies one.
    pub fn requires_custom_width(&self) -> bool {
        matches!(self, LaneType::Expressway)
    }

    pub fn group(&self) -> LaneGroup {
        match self {
            LaneType::SingleLane | LaneType::IntermediateLane => LaneGroup::SingleOrIntermediate,
            LaneType::TwoLane => LaneGroup::TwoLane,
            LaneType::FourLane | LaneType::SixLane | LaneType::EightLane | LaneType::Expressway => {
                LaneGroup::MultiLane
            }
        }
    }
}

impl std::fmt::Display for LaneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for lane in LaneType::ALL {
            assert_eq!(LaneType::from_code(lane.code()).unwrap(), lane);
            let json = serde_json::to_string(&lane).unwrap();
            assert_eq!(json, format!("\"{}\"", lane.code()));
        }
        assert_eq!(LaneType::from_code("ew").unwrap(), LaneType::Expressway);
    }

    #[test]
    fn test_unknown_code() {
        let err = LaneType::from_code("3L").unwrap_err();
        assert_eq!(err, CalcError::unknown_lane_type("3L"));
    }

    #[test]
    fn test_groups() {
        assert_eq!(LaneType::IntermediateLane.group(), LaneGroup::SingleOrIntermediate);
        assert_eq!(LaneType::TwoLane.group(), LaneGroup::TwoLane);
        assert_eq!(LaneType::Expressway.group(), LaneGroup::MultiLane);
        assert!(LaneType::Expressway.requires_custom_width());
        assert!(!LaneType::EightLane.requires_custom_width());
    }
}
