//! Refuel record model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{new_record_id, LogRecord, RecordKind};

/// A refuelling stop.
///
/// Fuel amount and odometer are independently optional: a rider may know one,
/// both or neither, and the fuel calculator treats each gap differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefuelRecord {
    /// Identifier (also the entry's identifier tag)
    #[serde(skip)]
    pub id: String,
    /// Owning vehicle
    pub vehicle_id: String,
    /// Calendar date of the stop
    pub date: NaiveDate,
    /// Litres added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_amount: Option<f64>,
    /// Whether the tank was filled to the brim
    pub is_full_tank: bool,
    /// Odometer reading (km)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer: Option<f64>,
    /// Price per litre
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_liter: Option<f64>,
    /// Total paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    /// Station name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Logical timestamp of the entry this was read from
    #[serde(skip)]
    pub created_at: u64,
}

impl RefuelRecord {
    /// Create a refuel record with a fresh identifier
    #[must_use]
    pub fn new(vehicle_id: impl Into<String>, date: NaiveDate, is_full_tank: bool) -> Self {
        Self {
            id: new_record_id(RecordKind::Refuel),
            vehicle_id: vehicle_id.into(),
            date,
            fuel_amount: None,
            is_full_tank,
            odometer: None,
            price_per_liter: None,
            total_cost: None,
            station: None,
            notes: None,
            created_at: 0,
        }
    }

    /// Fuel amount when it is known and positive
    pub fn known_fuel(&self) -> Option<f64> {
        self.fuel_amount.filter(|amount| *amount > 0.0)
    }
}

impl LogRecord for RefuelRecord {
    const KIND: RecordKind = RecordKind::Refuel;

    fn id(&self) -> &str {
        &self.id
    }

    fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn created_at(&self) -> u64 {
        self.created_at
    }

    fn odometer(&self) -> Option<f64> {
        self.odometer
    }

    fn stamp(&mut self, id: String, created_at: u64) {
        self.id = id;
        self.created_at = created_at;
    }
}
