//! Odometer reading model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{new_record_id, LogRecord, RecordKind};

/// A standalone odometer reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OdometerRecord {
    #[serde(skip)]
    pub id: String,
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub odometer: f64,
    #[serde(skip)]
    pub created_at: u64,
}

impl OdometerRecord {
    /// Create an odometer record with a fresh identifier
    #[must_use]
    pub fn new(vehicle_id: impl Into<String>, date: NaiveDate, odometer: f64) -> Self {
        Self {
            id: new_record_id(RecordKind::Odometer),
            vehicle_id: vehicle_id.into(),
            date,
            odometer,
            created_at: 0,
        }
    }
}

impl LogRecord for OdometerRecord {
    const KIND: RecordKind = RecordKind::Odometer;

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
        Some(self.odometer)
    }

    fn stamp(&mut self, id: String, created_at: u64) {
        self.id = id;
        self.created_at = created_at;
    }
}
