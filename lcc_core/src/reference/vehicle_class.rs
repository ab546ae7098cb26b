//! Vehicle class enumeration.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Vehicle classes covered by the road-user cost models.
///
/// Serialized with the snake_case keys used in traffic inputs
/// (`"small_cars"`, `"lcv"`, ...). Price index tables key on
/// [`VehicleClass::display_name`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    SmallCars,
    BigCars,
    TwoWheelers,
    Buses,
    Lcv,
    Hcv,
    Mcv,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 7] = [
        VehicleClass::SmallCars,
        VehicleClass::BigCars,
        VehicleClass::TwoWheelers,
        VehicleClass::Buses,
        VehicleClass::Lcv,
        VehicleClass::Hcv,
        VehicleClass::Mcv,
    ];

    /// Input key, e.g. `"two_wheelers"`
    pub fn key(&self) -> &'static str {
        match self {
            VehicleClass::SmallCars => "small_cars",
            VehicleClass::BigCars => "big_cars",
            VehicleClass::TwoWheelers => "two_wheelers",
            VehicleClass::Buses => "buses",
            VehicleClass::Lcv => "lcv",
            VehicleClass::Hcv => "hcv",
            VehicleClass::Mcv => "mcv",
        }
    }

    /// Name used by price index tables and reports
    pub fn display_name(&self) -> &'static str {
        match self {
            VehicleClass::SmallCars => "Small Cars",
            VehicleClass::BigCars => "Big Cars",
            VehicleClass::TwoWheelers => "Two Wheeler",
            VehicleClass::Buses => "Ordinary Buses",
            VehicleClass::Lcv => "LCV",
            VehicleClass::Hcv => "HCV",
            VehicleClass::Mcv => "MCV",
        }
    }

    /// Strict lookup by input key.
    pub fn from_key(key: &str) -> CalcResult<Self> {
        VehicleClass::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| CalcError::unknown_vehicle_class(key))
    }

    /// Parse from a key or display name, ignoring case and separators.
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_uppercase().replace([' ', '_', '-'], "").as_str() {
            "SMALLCARS" | "SMALLCAR" => Ok(VehicleClass::SmallCars),
            "BIGCARS" | "BIGCAR" => Ok(VehicleClass::BigCars),
            "TWOWHEELERS" | "TWOWHEELER" | "TW" => Ok(VehicleClass::TwoWheelers),
            "BUSES" | "BUS" | "ORDINARYBUSES" => Ok(VehicleClass::Buses),
            "LCV" => Ok(VehicleClass::Lcv),
            "HCV" => Ok(VehicleClass::Hcv),
            "MCV" => Ok(VehicleClass::Mcv),
            _ => Err(CalcError::unknown_vehicle_class(s)),
        }
    }

    /// Heavy classes whose models take a power-to-weight ratio.
    pub fn needs_power_weight_ratio(&self) -> bool {
        matches!(self, VehicleClass::Hcv | VehicleClass::Mcv)
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        for class in VehicleClass::ALL {
            assert_eq!(VehicleClass::from_key(class.key()).unwrap(), class);
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class.key()));
        }
    }

    #[test]
    fn test_unknown_key() {
        let err = VehicleClass::from_key("tractors").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_VEHICLE_CLASS");
    }

    #[test]
    fn test_flexible_parse() {
        assert_eq!(VehicleClass::from_str_flexible("Two Wheeler").unwrap(), VehicleClass::TwoWheelers);
        assert_eq!(VehicleClass::from_str_flexible("small-cars").unwrap(), VehicleClass::SmallCars);
        assert_eq!(VehicleClass::from_str_flexible("Ordinary Buses").unwrap(), VehicleClass::Buses);
    }

    #[test]
    fn test_heavy_classes() {
        let heavy: Vec<_> = VehicleClass::ALL
            .into_iter()
            .filter(|c| c.needs_power_weight_ratio())
            .collect();
        assert_eq!(heavy, vec![VehicleClass::Hcv, VehicleClass::Mcv]);
    }
}
