//! Data models for motolog

mod inspection;
mod odometer;
mod quick;
mod refuel;
mod shop;
mod vehicle;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use uuid::Uuid;

pub use inspection::{InspectionIssue, InspectionRecord, InspectionType, IssueStatus};
pub use odometer::OdometerRecord;
pub use quick::{QuickAction, QuickRecord};
pub use refuel::RefuelRecord;
pub use shop::{ShopCategory, ShopRecord};
pub use vehicle::{vehicle_id_for, FuelType, Vehicle, VEHICLE_TAG_PREFIX};

/// Every kind of entry the application writes, named by its label tag value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Vehicle,
    Refuel,
    Quick,
    Inspection,
    Shop,
    Odometer,
}

impl RecordKind {
    /// All kinds, vehicles first
    pub const ALL: [Self; 6] = [
        Self::Vehicle,
        Self::Refuel,
        Self::Quick,
        Self::Inspection,
        Self::Shop,
        Self::Odometer,
    ];

    /// Label tag value (and legacy identifier prefix) for this kind
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Refuel => "refuel",
            Self::Quick => "quick",
            Self::Inspection => "inspection",
            Self::Shop => "shop",
            Self::Odometer => "odometer",
        }
    }

    /// Match a label tag value exactly
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// Match the `<label>:` prefix of an identifier tag
    pub fn from_identifier_prefix(identifier: &str) -> Option<Self> {
        let (prefix, _) = identifier.split_once(':')?;
        Self::from_label(prefix)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown record kind: {s}"))
    }
}

/// Generate a fresh `<label>:<uuid-v7>` record identifier
#[must_use]
pub fn new_record_id(kind: RecordKind) -> String {
    format!("{}:{}", kind.label(), Uuid::now_v7())
}

/// Common shape of the five dated record kinds.
pub trait LogRecord: Clone {
    /// Kind this record type is stored as
    const KIND: RecordKind;

    /// Stable identifier shared by every version of the record
    fn id(&self) -> &str;

    /// Owning vehicle
    fn vehicle_id(&self) -> &str;

    /// User-facing calendar date
    fn date(&self) -> NaiveDate;

    /// Logical timestamp used for last-write-wins
    fn created_at(&self) -> u64;

    /// Odometer reading, if the record carries one
    fn odometer(&self) -> Option<f64>;

    /// Fill in the fields that live outside the entry body
    fn stamp(&mut self, id: String, created_at: u64);
}

/// A decoded entry of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Vehicle(Vehicle),
    Refuel(RefuelRecord),
    Quick(QuickRecord),
    Inspection(InspectionRecord),
    Shop(ShopRecord),
    Odometer(OdometerRecord),
}

impl Record {
    /// Kind of the wrapped record
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Vehicle(_) => RecordKind::Vehicle,
            Self::Refuel(_) => RecordKind::Refuel,
            Self::Quick(_) => RecordKind::Quick,
            Self::Inspection(_) => RecordKind::Inspection,
            Self::Shop(_) => RecordKind::Shop,
            Self::Odometer(_) => RecordKind::Odometer,
        }
    }

    /// Record identifier (the vehicle slug for vehicles)
    pub fn id(&self) -> &str {
        match self {
            Self::Vehicle(v) => &v.id,
            Self::Refuel(r) => &r.id,
            Self::Quick(r) => &r.id,
            Self::Inspection(r) => &r.id,
            Self::Shop(r) => &r.id,
            Self::Odometer(r) => &r.id,
        }
    }
}

/// A dated record of one of the five kinds, as shown in a vehicle timeline
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineItem {
    Refuel(RefuelRecord),
    Quick(QuickRecord),
    Inspection(InspectionRecord),
    Shop(ShopRecord),
    Odometer(OdometerRecord),
}

impl TimelineItem {
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Refuel(_) => RecordKind::Refuel,
            Self::Quick(_) => RecordKind::Quick,
            Self::Inspection(_) => RecordKind::Inspection,
            Self::Shop(_) => RecordKind::Shop,
            Self::Odometer(_) => RecordKind::Odometer,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Refuel(r) => r.id(),
            Self::Quick(r) => r.id(),
            Self::Inspection(r) => r.id(),
            Self::Shop(r) => r.id(),
            Self::Odometer(r) => r.id(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Refuel(r) => r.date(),
            Self::Quick(r) => r.date(),
            Self::Inspection(r) => r.date(),
            Self::Shop(r) => r.date(),
            Self::Odometer(r) => r.date(),
        }
    }

    pub fn odometer(&self) -> Option<f64> {
        match self {
            Self::Refuel(r) => r.odometer(),
            Self::Quick(r) => r.odometer(),
            Self::Inspection(r) => r.odometer(),
            Self::Shop(r) => r.odometer(),
            Self::Odometer(r) => r.odometer(),
        }
    }
}

impl From<TimelineItem> for Record {
    fn from(item: TimelineItem) -> Self {
        match item {
            TimelineItem::Refuel(r) => Self::Refuel(r),
            TimelineItem::Quick(r) => Self::Quick(r),
            TimelineItem::Inspection(r) => Self::Inspection(r),
            TimelineItem::Shop(r) => Self::Shop(r),
            TimelineItem::Odometer(r) => Self::Odometer(r),
        }
    }
}
