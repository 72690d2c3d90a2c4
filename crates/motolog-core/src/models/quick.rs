//! Quick maintenance record model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{new_record_id, LogRecord, RecordKind};

/// One-tap maintenance actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickAction {
    TirePressure,
    ChainLube,
    ChainClean,
    ChainAdjust,
    Wash,
    OilCheck,
    CoolantCheck,
    BatteryCharge,
    Custom,
}

impl QuickAction {
    /// Every action, in display order
    pub const ALL: [Self; 9] = [
        Self::TirePressure,
        Self::ChainLube,
        Self::ChainClean,
        Self::ChainAdjust,
        Self::Wash,
        Self::OilCheck,
        Self::CoolantCheck,
        Self::BatteryCharge,
        Self::Custom,
    ];

    /// Wire name of the action
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TirePressure => "tire-pressure",
            Self::ChainLube => "chain-lube",
            Self::ChainClean => "chain-clean",
            Self::ChainAdjust => "chain-adjust",
            Self::Wash => "wash",
            Self::OilCheck => "oil-check",
            Self::CoolantCheck => "coolant-check",
            Self::BatteryCharge => "battery-charge",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuickAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown quick action: {s}"))
    }
}

/// A quick maintenance action performed on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickRecord {
    #[serde(skip)]
    pub id: String,
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub action: QuickAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip)]
    pub created_at: u64,
}

impl QuickRecord {
    /// Create a quick record with a fresh identifier
    #[must_use]
    pub fn new(vehicle_id: impl Into<String>, date: NaiveDate, action: QuickAction) -> Self {
        Self {
            id: new_record_id(RecordKind::Quick),
            vehicle_id: vehicle_id.into(),
            date,
            action,
            odometer: None,
            notes: None,
            created_at: 0,
        }
    }
}

impl LogRecord for QuickRecord {
    const KIND: RecordKind = RecordKind::Quick;

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
