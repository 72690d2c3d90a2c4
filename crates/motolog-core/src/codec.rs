//! Mapping between typed records and wire entries.
//!
//! Record entries are application-specific data events (kind 30078) tagged
//!
//! ```text
//! ["d", <record id>]                      identifier
//! ["L", "nostr-moto-log"]                 application label namespace
//! ["l", <record label>, "nostr-moto-log"] record label
//! ```
//!
//! with the record body serialized as a JSON object in `content`. The body
//! never carries the identifier or the logical timestamp; those come from the
//! tags and `created_at` on the way back in.
//!
//! Deletion entries (kind 5) reference the record by address
//! (`30078:<owner>:<d>`) and, when known, by the id of the entry they retract.

use nostr_sdk::prelude::*;
use serde::de::DeserializeOwned;

use crate::error::{DecodeError, Result};
use crate::models::{
    InspectionRecord, LogRecord, OdometerRecord, QuickRecord, Record, RecordKind, RefuelRecord,
    ShopRecord, Vehicle, VEHICLE_TAG_PREFIX,
};

/// Label namespace shared by every entry this application writes
pub const APP_LABEL: &str = "nostr-moto-log";

/// Content of a deletion entry
pub const DELETION_CONTENT: &str = "deleted";

/// Wire kind of record entries
pub const fn entry_kind() -> Kind {
    Kind::ApplicationSpecificData
}

/// Everything needed to build a record entry, before a timestamp is chosen
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    /// Identifier tag value
    pub d_tag: String,
    /// Record label
    pub kind: RecordKind,
    /// JSON body
    pub content: serde_json::Value,
}

impl EntryDraft {
    /// Serialize a record into its tag identifier and body
    pub fn from_record(record: &Record) -> Result<Self> {
        let (d_tag, content) = match record {
            Record::Vehicle(vehicle) => (vehicle.d_tag(), serde_json::to_value(vehicle)?),
            Record::Refuel(r) => (r.id.clone(), serde_json::to_value(r)?),
            Record::Quick(r) => (r.id.clone(), serde_json::to_value(r)?),
            Record::Inspection(r) => (r.id.clone(), serde_json::to_value(r)?),
            Record::Shop(r) => (r.id.clone(), serde_json::to_value(r)?),
            Record::Odometer(r) => (r.id.clone(), serde_json::to_value(r)?),
        };
        Ok(Self {
            d_tag,
            kind: record.kind(),
            content,
        })
    }
}

/// Build an unsigned record entry.
pub fn encode(
    d_tag: &str,
    kind: RecordKind,
    content: &serde_json::Value,
    created_at: Timestamp,
) -> EventBuilder {
    EventBuilder::new(entry_kind(), content.to_string())
        .tags([
            Tag::identifier(d_tag),
            Tag::custom(TagKind::custom("L"), [APP_LABEL]),
            Tag::custom(TagKind::custom("l"), [kind.label(), APP_LABEL]),
        ])
        .custom_created_at(created_at)
}

/// Build an unsigned deletion entry for the record stored under `d_tag`.
pub fn encode_deletion(
    owner: &PublicKey,
    d_tag: &str,
    prior: Option<EventId>,
    created_at: Timestamp,
) -> EventBuilder {
    let mut tags = Vec::with_capacity(2);
    if let Some(event_id) = prior {
        tags.push(Tag::event(event_id));
    }
    tags.push(Tag::custom(
        TagKind::custom("a"),
        [record_address(owner, d_tag)],
    ));
    EventBuilder::new(Kind::EventDeletion, DELETION_CONTENT)
        .tags(tags)
        .custom_created_at(created_at)
}

/// Replaceable-entry address of a record: `30078:<owner hex>:<d>`
pub fn record_address(owner: &PublicKey, d_tag: &str) -> String {
    format!("{}:{}:{}", entry_kind().as_u16(), owner.to_hex(), d_tag)
}

/// How an entry was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The label tag names a known kind
    Labelled(RecordKind),
    /// No label tag; the identifier prefix names a known kind
    LegacyPrefix(RecordKind),
    /// Neither source names a known kind
    Unrecognized,
}

impl Classification {
    pub const fn kind(self) -> Option<RecordKind> {
        match self {
            Self::Labelled(kind) | Self::LegacyPrefix(kind) => Some(kind),
            Self::Unrecognized => None,
        }
    }
}

/// Classify an entry from its identifier and label tags.
///
/// A present label is authoritative, so a label this build does not know is
/// `Unrecognized` even if the identifier happens to carry a known prefix. The
/// prefix is consulted only for entries published before labels existed.
pub fn classify(d_tag: &str, label: Option<&str>) -> Classification {
    match label {
        Some(label) => {
            RecordKind::from_label(label).map_or(Classification::Unrecognized, Classification::Labelled)
        }
        None => RecordKind::from_identifier_prefix(d_tag)
            .map_or(Classification::Unrecognized, Classification::LegacyPrefix),
    }
}

/// A successfully decoded record entry
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntry {
    /// Identifier tag value
    pub d_tag: String,
    /// Label tag value, if any
    pub label: Option<String>,
    /// Classification path taken
    pub classification: Classification,
    /// Logical timestamp of the entry
    pub created_at: u64,
    /// Typed record with id and logical timestamp filled in
    pub record: Record,
}

/// Decode one wire entry into a typed record.
pub fn decode(event: &Event) -> std::result::Result<DecodedEntry, DecodeError> {
    if event.kind != entry_kind() {
        return Err(DecodeError::UnexpectedKind(event.kind.as_u16()));
    }

    let d_tag = event
        .tags
        .identifier()
        .map(str::to_string)
        .ok_or_else(|| DecodeError::MissingIdentifier(event.id.to_hex()))?;
    let label = label_of(event);
    let classification = classify(&d_tag, label.as_deref());
    let created_at = event.created_at.as_u64();

    let record = match classification.kind() {
        None => {
            return Err(DecodeError::Unrecognized {
                identifier: d_tag,
                label,
            })
        }
        Some(RecordKind::Vehicle) => {
            let mut vehicle: Vehicle = parse_body(&d_tag, &event.content)?;
            vehicle.id = d_tag
                .strip_prefix(VEHICLE_TAG_PREFIX)
                .unwrap_or(&d_tag)
                .to_string();
            Record::Vehicle(vehicle)
        }
        Some(RecordKind::Refuel) => {
            Record::Refuel(parse_record::<RefuelRecord>(&d_tag, &event.content, created_at)?)
        }
        Some(RecordKind::Quick) => {
            Record::Quick(parse_record::<QuickRecord>(&d_tag, &event.content, created_at)?)
        }
        Some(RecordKind::Inspection) => Record::Inspection(parse_record::<InspectionRecord>(
            &d_tag,
            &event.content,
            created_at,
        )?),
        Some(RecordKind::Shop) => {
            Record::Shop(parse_record::<ShopRecord>(&d_tag, &event.content, created_at)?)
        }
        Some(RecordKind::Odometer) => Record::Odometer(parse_record::<OdometerRecord>(
            &d_tag,
            &event.content,
            created_at,
        )?),
    };

    Ok(DecodedEntry {
        d_tag,
        label,
        classification,
        created_at,
        record,
    })
}

/// Value of the `l` tag scoped to this application's namespace
pub fn label_of(event: &Event) -> Option<String> {
    event.tags.iter().find_map(|tag| {
        let values = tag.as_slice();
        match values {
            [name, label, namespace, ..] if name == "l" && namespace == APP_LABEL => {
                Some(label.clone())
            }
            _ => None,
        }
    })
}

fn parse_body<T: DeserializeOwned>(d_tag: &str, content: &str) -> std::result::Result<T, DecodeError> {
    serde_json::from_str(content).map_err(|source| DecodeError::MalformedBody {
        identifier: d_tag.to_string(),
        source,
    })
}

fn parse_record<T: DeserializeOwned + LogRecord>(
    d_tag: &str,
    content: &str,
    created_at: u64,
) -> std::result::Result<T, DecodeError> {
    let mut record: T = parse_body(d_tag, content)?;
    record.stamp(d_tag.to_string(), created_at);
    Ok(record)
}
