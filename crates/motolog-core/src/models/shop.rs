//! Shop maintenance record model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{new_record_id, LogRecord, RecordKind};

/// Kind of shop visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopCategory {
    Regular,
    Repair,
    /// Statutory vehicle inspection
    Shaken,
    Custom,
}

/// Work done at a shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRecord {
    #[serde(skip)]
    pub id: String,
    pub vehicle_id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ShopCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    /// Work item keys such as `oilChange`
    #[serde(default)]
    pub work_done: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    /// Date the next visit is due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_date: Option<NaiveDate>,
    /// Odometer reading the next visit is due at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_odometer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip)]
    pub created_at: u64,
}

impl ShopRecord {
    /// Create a shop record with a fresh identifier
    #[must_use]
    pub fn new(vehicle_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: new_record_id(RecordKind::Shop),
            vehicle_id: vehicle_id.into(),
            date,
            odometer: None,
            category: None,
            shop_name: None,
            work_done: Vec::new(),
            total_cost: None,
            next_date: None,
            next_odometer: None,
            notes: None,
            created_at: 0,
        }
    }
}

impl LogRecord for ShopRecord {
    const KIND: RecordKind = RecordKind::Shop;

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
