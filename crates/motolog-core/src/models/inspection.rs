//! Inspection record model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{new_record_id, LogRecord, RecordKind};

/// Inspection cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionType {
    Daily,
    Weekly,
    Monthly,
}

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Warning,
    Ng,
}

/// A checklist item that did not pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionIssue {
    pub item: String,
    pub status: IssueStatus,
}

/// A pre-ride or periodic inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    #[serde(skip)]
    pub id: String,
    pub vehicle_id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub inspection_type: InspectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer: Option<f64>,
    pub all_ok: bool,
    #[serde(default)]
    pub issues: Vec<InspectionIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip)]
    pub created_at: u64,
}

impl InspectionRecord {
    /// Create an all-clear inspection with a fresh identifier
    #[must_use]
    pub fn new(
        vehicle_id: impl Into<String>,
        date: NaiveDate,
        inspection_type: InspectionType,
    ) -> Self {
        Self {
            id: new_record_id(RecordKind::Inspection),
            vehicle_id: vehicle_id.into(),
            date,
            inspection_type,
            odometer: None,
            all_ok: true,
            issues: Vec::new(),
            notes: None,
            created_at: 0,
        }
    }

    /// Record a finding; the inspection is no longer all-clear
    pub fn push_issue(&mut self, item: impl Into<String>, status: IssueStatus) {
        self.issues.push(InspectionIssue {
            item: item.into(),
            status,
        });
        self.all_ok = false;
    }
}

impl LogRecord for InspectionRecord {
    const KIND: RecordKind = RecordKind::Inspection;

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
