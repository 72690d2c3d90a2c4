//! Folding fetched records into local collections.
//!
//! Every collection holds at most one version per identifier, the one with
//! the newest logical timestamp, and stays in descending calendar-date order.
//! Folding the same batch twice changes nothing.

use crate::models::{LogRecord, Vehicle};

/// Fold `incoming` into `local` with last-write-wins per identifier.
///
/// An incoming version replaces the held one when its logical timestamp is
/// newer or equal; an older version is discarded even if it arrives later.
pub fn merge_by_id<R: LogRecord>(local: &mut Vec<R>, incoming: impl IntoIterator<Item = R>) {
    for record in incoming {
        match local.iter_mut().find(|held| held.id() == record.id()) {
            Some(held) => {
                if record.created_at() >= held.created_at() {
                    *held = record;
                }
            }
            None => local.push(record),
        }
    }
    sort_by_date_desc(local);
}

/// Discard everything held and install `incoming`.
///
/// Duplicate identifiers inside `incoming` still resolve by timestamp.
pub fn replace_all<R: LogRecord>(local: &mut Vec<R>, incoming: impl IntoIterator<Item = R>) {
    local.clear();
    merge_by_id(local, incoming);
}

/// Stable sort, newest calendar date first
pub fn sort_by_date_desc<R: LogRecord>(records: &mut [R]) {
    records.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// Overwrite a vehicle by id, appending it when new.
pub fn upsert_vehicle(vehicles: &mut Vec<Vehicle>, vehicle: Vehicle) {
    match vehicles.iter_mut().find(|held| held.id == vehicle.id) {
        Some(held) => *held = vehicle,
        None => vehicles.push(vehicle),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::OdometerRecord;

    fn odo(id: &str, day: u32, km: f64, created_at: u64) -> OdometerRecord {
        let mut record = OdometerRecord::new("cb400", NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), km);
        record.stamp(id.to_string(), created_at);
        record
    }

    #[test]
    fn test_new_ids_are_added_and_sorted() {
        let mut local = vec![odo("odometer:a", 5, 500.0, 10)];
        merge_by_id(
            &mut local,
            vec![odo("odometer:b", 9, 900.0, 11), odo("odometer:c", 1, 100.0, 12)],
        );
        let ids: Vec<&str> = local.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["odometer:b", "odometer:a", "odometer:c"]);
    }

    #[test]
    fn test_newer_version_replaces_older() {
        let mut local = vec![odo("odometer:a", 5, 500.0, 10)];
        merge_by_id(&mut local, vec![odo("odometer:a", 6, 600.0, 20)]);
        assert_eq!(local, vec![odo("odometer:a", 6, 600.0, 20)]);
    }

    #[test]
    fn test_stale_version_is_discarded_even_when_late() {
        let mut local = vec![odo("odometer:a", 6, 600.0, 20)];
        merge_by_id(&mut local, vec![odo("odometer:a", 5, 500.0, 10)]);
        assert_eq!(local, vec![odo("odometer:a", 6, 600.0, 20)]);
    }

    #[test]
    fn test_tie_favours_incoming() {
        let mut local = vec![odo("odometer:a", 5, 500.0, 10)];
        merge_by_id(&mut local, vec![odo("odometer:a", 5, 555.0, 10)]);
        assert_eq!(local[0].odometer, 555.0);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut once = vec![odo("odometer:a", 5, 500.0, 10), odo("odometer:b", 2, 200.0, 10)];
        let batch = vec![
            odo("odometer:a", 7, 700.0, 30),
            odo("odometer:c", 3, 300.0, 12),
            odo("odometer:b", 1, 100.0, 5),
        ];
        merge_by_id(&mut once, batch.clone());
        let mut twice = once.clone();
        merge_by_id(&mut twice, batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_batch_order_does_not_matter() {
        let batch = vec![
            odo("odometer:a", 5, 500.0, 10),
            odo("odometer:a", 6, 600.0, 20),
            odo("odometer:b", 2, 200.0, 15),
        ];
        let mut forward = Vec::new();
        merge_by_id(&mut forward, batch.clone());
        let mut backward = Vec::new();
        merge_by_id(&mut backward, batch.into_iter().rev());
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_replace_all_discards_previous_state() {
        let mut local = vec![odo("odometer:old", 5, 500.0, 10)];
        replace_all(
            &mut local,
            vec![odo("odometer:a", 1, 100.0, 1), odo("odometer:a", 2, 200.0, 2)],
        );
        assert_eq!(local, vec![odo("odometer:a", 2, 200.0, 2)]);
    }

    #[test]
    fn test_upsert_vehicle_overwrites_by_id() {
        let mut vehicles = vec![Vehicle::new("CB400")];
        let mut edited = Vehicle::new("CB400");
        edited.maker = Some("Honda".to_string());
        upsert_vehicle(&mut vehicles, edited.clone());
        upsert_vehicle(&mut vehicles, Vehicle::new("Super Cub"));
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0], edited);
    }
}
