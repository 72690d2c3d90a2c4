//! Vehicle model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::slugify;

/// Fuel grade the vehicle runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    /// Regular gasoline
    Regular,
    /// Premium gasoline
    Premium,
    /// Diesel
    Diesel,
}

/// A vehicle profile.
///
/// The identifier is a slug of the name and is carried in the entry's
/// identifier tag, never in the body. Vehicles have a single writer and are
/// replaced wholesale by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Slug identifier
    #[serde(skip)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Manufacturer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker: Option<String>,
    /// Model year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Engine displacement (cc)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement: Option<f64>,
    /// Tank capacity (L)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_tank_capacity: Option<f64>,
    /// Fuel grade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelType>,
    /// Front tire pressure (kPa)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_tire_pressure_front: Option<f64>,
    /// Rear tire pressure (kPa)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_tire_pressure_rear: Option<f64>,
}

impl Vehicle {
    /// Create a vehicle whose id is derived from its name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: vehicle_id_for(&name),
            name,
            maker: None,
            year: None,
            displacement: None,
            fuel_tank_capacity: None,
            fuel_type: None,
            recommended_tire_pressure_front: None,
            recommended_tire_pressure_rear: None,
        }
    }

    /// Identifier tag value for this vehicle's entry
    #[must_use]
    pub fn d_tag(&self) -> String {
        format!("{VEHICLE_TAG_PREFIX}{}", self.id)
    }
}

/// Prefix of a vehicle entry's identifier tag.
pub const VEHICLE_TAG_PREFIX: &str = "vehicle:";

/// Derive a vehicle identifier from its name.
///
/// Names made only of punctuation get a random suffix so the id is never empty.
#[must_use]
pub fn vehicle_id_for(name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        let uuid = Uuid::now_v7().simple().to_string();
        format!("vehicle-{}", &uuid[uuid.len() - 8..])
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_id_from_name() {
        let vehicle = Vehicle::new("Super Cub 110");
        assert_eq!(vehicle.id, "super-cub-110");
        assert_eq!(vehicle.d_tag(), "vehicle:super-cub-110");
    }

    #[test]
    fn test_vehicle_id_never_empty() {
        let id = vehicle_id_for("???");
        assert!(id.starts_with("vehicle-"));
        assert_eq!(id.len(), "vehicle-".len() + 8);
    }

    #[test]
    fn test_vehicle_body_uses_camel_case_and_skips_id() {
        let mut vehicle = Vehicle::new("CB400");
        vehicle.fuel_tank_capacity = Some(18.0);
        vehicle.fuel_type = Some(FuelType::Premium);
        let body = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(body["fuelTankCapacity"], 18.0);
        assert_eq!(body["fuelType"], "premium");
        assert!(body.get("id").is_none());
        assert!(body.get("maker").is_none());
    }
}
