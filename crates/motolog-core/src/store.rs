//! In-memory record collections and the raw entry cache

use std::collections::HashMap;

use nostr_sdk::prelude::{Event, EventId};

use crate::codec::DecodedEntry;
use crate::merge::{merge_by_id, replace_all, upsert_vehicle};
use crate::models::{
    InspectionRecord, LogRecord, OdometerRecord, QuickRecord, Record, RefuelRecord, ShopRecord,
    TimelineItem, Vehicle,
};

/// How a decoded page is folded into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// First page: previous state is discarded
    Replace,
    /// Later pages: last-write-wins merge
    Merge,
}

/// Typed records held for the session, one collection per kind.
///
/// Dated collections are kept in descending calendar-date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    pub vehicles: Vec<Vehicle>,
    pub refuels: Vec<RefuelRecord>,
    pub quicks: Vec<QuickRecord>,
    pub inspections: Vec<InspectionRecord>,
    pub shops: Vec<ShopRecord>,
    pub odometers: Vec<OdometerRecord>,
    /// Logical timestamp of the held version of each vehicle
    vehicle_versions: HashMap<String, u64>,
}

/// Records grouped by kind, as produced by one page
#[derive(Debug, Default)]
struct Partitioned {
    vehicles: Vec<(u64, Vehicle)>,
    refuels: Vec<RefuelRecord>,
    quicks: Vec<QuickRecord>,
    inspections: Vec<InspectionRecord>,
    shops: Vec<ShopRecord>,
    odometers: Vec<OdometerRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decoded page into the store, one pass per kind.
    pub fn apply(&mut self, entries: Vec<DecodedEntry>, mode: ApplyMode) {
        let mut page = Partitioned::default();
        for entry in entries {
            match entry.record {
                Record::Vehicle(v) => page.vehicles.push((entry.created_at, v)),
                Record::Refuel(r) => page.refuels.push(r),
                Record::Quick(r) => page.quicks.push(r),
                Record::Inspection(r) => page.inspections.push(r),
                Record::Shop(r) => page.shops.push(r),
                Record::Odometer(r) => page.odometers.push(r),
            }
        }

        // Oldest first so the newest version of a vehicle is written last
        page.vehicles.sort_by_key(|(created_at, _)| *created_at);

        if mode == ApplyMode::Replace {
            self.vehicles.clear();
            self.vehicle_versions.clear();
        }
        for (created_at, vehicle) in page.vehicles {
            self.put_vehicle(vehicle, created_at);
        }

        match mode {
            ApplyMode::Replace => {
                replace_all(&mut self.refuels, page.refuels);
                replace_all(&mut self.quicks, page.quicks);
                replace_all(&mut self.inspections, page.inspections);
                replace_all(&mut self.shops, page.shops);
                replace_all(&mut self.odometers, page.odometers);
            }
            ApplyMode::Merge => {
                merge_by_id(&mut self.refuels, page.refuels);
                merge_by_id(&mut self.quicks, page.quicks);
                merge_by_id(&mut self.inspections, page.inspections);
                merge_by_id(&mut self.shops, page.shops);
                merge_by_id(&mut self.odometers, page.odometers);
            }
        }
    }

    /// Hold a vehicle version unless a newer one is already held.
    ///
    /// Equal timestamps let the incoming version win.
    pub fn put_vehicle(&mut self, vehicle: Vehicle, created_at: u64) {
        if self
            .vehicle_versions
            .get(&vehicle.id)
            .is_some_and(|held| *held > created_at)
        {
            tracing::debug!("Ignoring stale version of vehicle {}", vehicle.id);
            return;
        }
        self.vehicle_versions.insert(vehicle.id.clone(), created_at);
        upsert_vehicle(&mut self.vehicles, vehicle);
    }

    /// Insert or update a single record after it was published.
    ///
    /// Vehicles are overwritten as given; use [`Self::put_vehicle`] to
    /// respect their timestamps.
    pub fn upsert(&mut self, record: Record) {
        match record {
            Record::Vehicle(v) => upsert_vehicle(&mut self.vehicles, v),
            Record::Refuel(r) => merge_by_id(&mut self.refuels, [r]),
            Record::Quick(r) => merge_by_id(&mut self.quicks, [r]),
            Record::Inspection(r) => merge_by_id(&mut self.inspections, [r]),
            Record::Shop(r) => merge_by_id(&mut self.shops, [r]),
            Record::Odometer(r) => merge_by_id(&mut self.odometers, [r]),
        }
    }

    /// Look a dated record up by identifier across all five kinds
    pub fn find_by_id(&self, id: &str) -> Option<TimelineItem> {
        find(&self.refuels, id)
            .map(TimelineItem::Refuel)
            .or_else(|| find(&self.quicks, id).map(TimelineItem::Quick))
            .or_else(|| find(&self.inspections, id).map(TimelineItem::Inspection))
            .or_else(|| find(&self.shops, id).map(TimelineItem::Shop))
            .or_else(|| find(&self.odometers, id).map(TimelineItem::Odometer))
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Refuels of one vehicle, newest date first
    pub fn refuels_for(&self, vehicle_id: &str) -> Vec<RefuelRecord> {
        for_vehicle(&self.refuels, vehicle_id)
    }

    /// Quick actions of one vehicle, newest date first
    pub fn quicks_for(&self, vehicle_id: &str) -> Vec<QuickRecord> {
        for_vehicle(&self.quicks, vehicle_id)
    }

    /// Every dated record of one vehicle, newest date first.
    ///
    /// Records on the same date are ordered by logical timestamp, newest first.
    pub fn timeline(&self, vehicle_id: &str) -> Vec<TimelineItem> {
        let mut items: Vec<(u64, TimelineItem)> = Vec::new();
        items.extend(timeline_part(&self.refuels, vehicle_id, TimelineItem::Refuel));
        items.extend(timeline_part(&self.quicks, vehicle_id, TimelineItem::Quick));
        items.extend(timeline_part(&self.inspections, vehicle_id, TimelineItem::Inspection));
        items.extend(timeline_part(&self.shops, vehicle_id, TimelineItem::Shop));
        items.extend(timeline_part(&self.odometers, vehicle_id, TimelineItem::Odometer));
        items.sort_by(|(a_ts, a), (b_ts, b)| b.date().cmp(&a.date()).then(b_ts.cmp(a_ts)));
        items.into_iter().map(|(_, item)| item).collect()
    }

    /// Highest odometer reading recorded for a vehicle across every kind
    pub fn latest_odometer(&self, vehicle_id: &str) -> Option<f64> {
        self.timeline(vehicle_id)
            .iter()
            .filter_map(TimelineItem::odometer)
            .reduce(f64::max)
    }

    /// Drop a dated record by identifier; returns whether anything was held
    pub fn remove(&mut self, id: &str) -> bool {
        remove(&mut self.refuels, id)
            || remove(&mut self.quicks, id)
            || remove(&mut self.inspections, id)
            || remove(&mut self.shops, id)
            || remove(&mut self.odometers, id)
    }

    /// Drop a vehicle by id; its records stay until they are deleted
    pub fn remove_vehicle(&mut self, id: &str) -> bool {
        self.vehicle_versions.remove(id);
        let before = self.vehicles.len();
        self.vehicles.retain(|v| v.id != id);
        self.vehicles.len() != before
    }

    pub fn len(&self) -> usize {
        self.refuels.len()
            + self.quicks.len()
            + self.inspections.len()
            + self.shops.len()
            + self.odometers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn find<R: LogRecord>(records: &[R], id: &str) -> Option<R> {
    records.iter().find(|r| r.id() == id).cloned()
}

fn for_vehicle<R: LogRecord>(records: &[R], vehicle_id: &str) -> Vec<R> {
    records
        .iter()
        .filter(|r| r.vehicle_id() == vehicle_id)
        .cloned()
        .collect()
}

fn timeline_part<'a, R: LogRecord>(
    records: &'a [R],
    vehicle_id: &'a str,
    wrap: fn(R) -> TimelineItem,
) -> impl Iterator<Item = (u64, TimelineItem)> + 'a {
    records
        .iter()
        .filter(move |r| r.vehicle_id() == vehicle_id)
        .map(move |r| (r.created_at(), wrap(r.clone())))
}

fn remove<R: LogRecord>(records: &mut Vec<R>, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

/// Last wire entry seen per identifier tag, for the developer view and for
/// referencing prior entries in retractions.
///
/// Overwritten on every fetch regardless of logical timestamps.
#[derive(Debug, Clone, Default)]
pub struct RawEntryCache {
    entries: HashMap<String, Event>,
}

impl RawEntryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `event` under its identifier tag; entries without one are ignored
    pub fn record(&mut self, event: &Event) {
        if let Some(d_tag) = event.tags.identifier() {
            self.entries.insert(d_tag.to_string(), event.clone());
        }
    }

    pub fn get(&self, d_tag: &str) -> Option<&Event> {
        self.entries.get(d_tag)
    }

    /// Wire id of the last entry seen for `d_tag`
    pub fn event_id(&self, d_tag: &str) -> Option<EventId> {
        self.entries.get(d_tag).map(|event| event.id)
    }

    pub fn remove(&mut self, d_tag: &str) -> Option<Event> {
        self.entries.remove(d_tag)
    }

    /// Entries sorted newest first
    pub fn entries(&self) -> Vec<&Event> {
        let mut entries: Vec<&Event> = self.entries.values().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use nostr_sdk::prelude::*;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codec::Classification;
    use crate::models::{QuickAction, RecordKind};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn entry(record: Record, created_at: u64) -> DecodedEntry {
        let record = match record {
            Record::Refuel(mut r) => {
                r.created_at = created_at;
                Record::Refuel(r)
            }
            Record::Quick(mut r) => {
                r.created_at = created_at;
                Record::Quick(r)
            }
            Record::Odometer(mut r) => {
                r.created_at = created_at;
                Record::Odometer(r)
            }
            other => other,
        };
        DecodedEntry {
            d_tag: record.id().to_string(),
            label: Some(record.kind().label().to_string()),
            classification: Classification::Labelled(record.kind()),
            created_at,
            record,
        }
    }

    fn refuel(vehicle: &str, day: u32, odometer: Option<f64>) -> RefuelRecord {
        let mut r = RefuelRecord::new(vehicle, date(day), true);
        r.odometer = odometer;
        r
    }

    #[test]
    fn test_replace_then_merge() {
        let mut store = RecordStore::new();
        store.upsert(Record::Refuel(refuel("cb400", 1, None)));

        let first = refuel("cb400", 3, Some(300.0));
        store.apply(vec![entry(Record::Refuel(first.clone()), 10)], ApplyMode::Replace);
        assert_eq!(store.refuels.len(), 1);

        let second = refuel("cb400", 5, Some(500.0));
        store.apply(vec![entry(Record::Refuel(second.clone()), 5)], ApplyMode::Merge);
        let ids: Vec<&str> = store.refuels.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[test]
    fn test_newest_vehicle_version_wins_within_a_page() {
        let mut store = RecordStore::new();
        let old = Vehicle::new("CB400");
        let mut new = Vehicle::new("CB400");
        new.year = Some(2020);
        store.apply(
            vec![
                entry(Record::Vehicle(new.clone()), 20),
                entry(Record::Vehicle(old), 10),
            ],
            ApplyMode::Replace,
        );
        assert_eq!(store.vehicles, vec![new]);
    }

    #[test]
    fn test_stale_vehicle_from_an_older_page_is_ignored() {
        let mut store = RecordStore::new();
        let mut current = Vehicle::new("CB400");
        current.fuel_tank_capacity = Some(18.0);
        store.apply(vec![entry(Record::Vehicle(current.clone()), 30)], ApplyMode::Replace);

        // A lagging relay returns the first version on the next page
        let stale = Vehicle::new("CB400");
        store.apply(vec![entry(Record::Vehicle(stale), 10)], ApplyMode::Merge);
        assert_eq!(store.vehicles, vec![current.clone()]);

        let mut tied = current.clone();
        tied.year = Some(2021);
        store.put_vehicle(tied.clone(), 30);
        assert_eq!(store.vehicles, vec![tied]);

        assert!(store.remove_vehicle(&current.id));
        store.put_vehicle(current.clone(), 1);
        assert_eq!(store.vehicles, vec![current]);
    }

    #[test]
    fn test_find_timeline_and_remove() {
        let mut store = RecordStore::new();
        let fuel = refuel("cb400", 2, Some(1_200.0));
        let quick = QuickRecord::new("cb400", date(4), QuickAction::Wash);
        let odo = OdometerRecord::new("cb400", date(3), 1_350.0);
        let other = refuel("cub", 9, Some(99_999.0));
        for record in [
            Record::Refuel(fuel.clone()),
            Record::Quick(quick.clone()),
            Record::Odometer(odo.clone()),
            Record::Refuel(other),
        ] {
            store.upsert(record);
        }

        let found = store.find_by_id(&quick.id).unwrap();
        assert_eq!(found.kind(), RecordKind::Quick);

        let timeline: Vec<String> = store
            .timeline("cb400")
            .iter()
            .map(|item| item.id().to_string())
            .collect();
        assert_eq!(timeline, vec![quick.id.clone(), odo.id.clone(), fuel.id.clone()]);
        assert_eq!(store.latest_odometer("cb400"), Some(1_350.0));

        assert!(store.remove(&quick.id));
        assert!(store.find_by_id(&quick.id).is_none());
        assert_eq!(store.timeline("cb400").len(), 2);
        assert!(!store.remove(&quick.id));
    }

    #[test]
    fn test_latest_odometer_none_without_readings() {
        let mut store = RecordStore::new();
        store.upsert(Record::Refuel(refuel("cb400", 1, None)));
        assert_eq!(store.latest_odometer("cb400"), None);
    }

    #[test]
    fn test_raw_cache_last_writer_wins() {
        let keys = Keys::generate();
        let build = |content: &str, ts: u64| {
            EventBuilder::new(Kind::ApplicationSpecificData, content)
                .tag(Tag::identifier("refuel:1"))
                .custom_created_at(Timestamp::from(ts))
                .sign_with_keys(&keys)
                .unwrap()
        };
        let newer = build("{\"v\":2}", 20);
        let older = build("{\"v\":1}", 10);

        let mut cache = RawEntryCache::new();
        cache.record(&newer);
        cache.record(&older);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.event_id("refuel:1"), Some(older.id));
    }
}
