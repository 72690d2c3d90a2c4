//! Session state: who is logged in and what has been loaded

use std::sync::Arc;

use nostr_sdk::prelude::PublicKey;

use crate::error::{Error, Result};
use crate::models::Vehicle;
use crate::signer::EntrySigner;
use crate::store::{RawEntryCache, RecordStore};
use crate::util::unix_timestamp_now;

/// Monotonic logical timestamps for entries signed in this session.
///
/// Each tick is the wall clock in seconds, bumped past the last tick (or the
/// newest timestamp observed from relays) so two edits in the same second
/// still order correctly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicalClock {
    last: u64,
}

impl LogicalClock {
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    pub fn tick(&mut self) -> u64 {
        self.tick_at(unix_timestamp_now())
    }

    pub fn tick_at(&mut self, now: u64) -> u64 {
        let next = now.max(self.last.saturating_add(1));
        self.last = next;
        next
    }

    /// Never issue a timestamp at or below one already seen on the relays
    pub fn observe(&mut self, created_at: u64) {
        self.last = self.last.max(created_at);
    }

    pub const fn last(&self) -> u64 {
        self.last
    }
}

/// Paging cursor over the owner's entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Oldest logical timestamp loaded so far; the next page ends before it
    pub oldest: Option<u64>,
    /// Whether the last page was full
    pub has_more: bool,
    /// Pages loaded since the last reset
    pub pages: usize,
}

/// Everything a logged-in client holds.
///
/// A session without a signer can load and browse but not publish.
pub struct Session {
    owner: PublicKey,
    signer: Option<Arc<dyn EntrySigner>>,
    clock: LogicalClock,
    active_vehicle: Option<String>,
    pub store: RecordStore,
    pub raw: RawEntryCache,
    pub pagination: Pagination,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("owner", &self.owner.to_hex())
            .field("can_sign", &self.signer.is_some())
            .field("active_vehicle", &self.active_vehicle)
            .field("records", &self.store.len())
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Read-only session for `owner`
    pub fn read_only(owner: PublicKey) -> Self {
        Self {
            owner,
            signer: None,
            clock: LogicalClock::new(),
            active_vehicle: None,
            store: RecordStore::new(),
            raw: RawEntryCache::new(),
            pagination: Pagination::default(),
        }
    }

    /// Session that signs as `signer`
    pub fn with_signer(signer: Arc<dyn EntrySigner>) -> Self {
        let mut session = Self::read_only(signer.identity());
        session.signer = Some(signer);
        session
    }

    pub const fn owner(&self) -> &PublicKey {
        &self.owner
    }

    pub fn signer(&self) -> Option<&dyn EntrySigner> {
        self.signer.as_deref()
    }

    pub const fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Next logical timestamp for an outgoing entry
    pub fn tick(&mut self) -> u64 {
        self.clock.tick()
    }

    pub fn clock_mut(&mut self) -> &mut LogicalClock {
        &mut self.clock
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.store.vehicles
    }

    /// The selected vehicle, falling back to the first one known
    pub fn active_vehicle(&self) -> Option<&Vehicle> {
        self.active_vehicle
            .as_deref()
            .and_then(|id| self.store.vehicle(id))
            .or_else(|| self.store.vehicles.first())
    }

    pub fn set_active_vehicle(&mut self, id: &str) -> Result<()> {
        if self.store.vehicle(id).is_none() {
            return Err(Error::NotFound(format!("vehicle {id}")));
        }
        self.active_vehicle = Some(id.to_string());
        Ok(())
    }

    /// Forget everything loaded; identity and signer are kept
    pub fn clear(&mut self) {
        self.store.clear();
        self.raw.clear();
        self.pagination = Pagination::default();
        self.active_vehicle = None;
    }
}

#[cfg(test)]
mod tests {
    use nostr_sdk::prelude::Keys;

    use super::*;
    use crate::models::Record;

    #[test]
    fn test_clock_is_monotonic_within_a_second() {
        let mut clock = LogicalClock::new();
        assert_eq!(clock.tick_at(100), 100);
        assert_eq!(clock.tick_at(100), 101);
        assert_eq!(clock.tick_at(99), 102);
        assert_eq!(clock.tick_at(500), 500);
    }

    #[test]
    fn test_clock_steps_past_observed_timestamps() {
        let mut clock = LogicalClock::new();
        clock.observe(1_000);
        assert_eq!(clock.tick_at(900), 1_001);
    }

    #[test]
    fn test_read_only_session_cannot_sign() {
        let keys = Keys::generate();
        let session = Session::read_only(keys.public_key());
        assert!(!session.can_sign());
        assert!(session.signer().is_none());
    }

    #[test]
    fn test_active_vehicle_falls_back_to_first() {
        let keys = Keys::generate();
        let mut session = Session::with_signer(Arc::new(keys));
        assert!(session.active_vehicle().is_none());

        session.store.upsert(Record::Vehicle(Vehicle::new("CB400")));
        session.store.upsert(Record::Vehicle(Vehicle::new("Super Cub")));
        assert_eq!(session.active_vehicle().unwrap().id, "cb400");

        session.set_active_vehicle("super-cub").unwrap();
        assert_eq!(session.active_vehicle().unwrap().id, "super-cub");

        session.store.remove_vehicle("super-cub");
        assert_eq!(session.active_vehicle().unwrap().id, "cb400");
        assert!(session.set_active_vehicle("missing").is_err());
    }

    #[test]
    fn test_clear_keeps_identity() {
        let keys = Keys::generate();
        let mut session = Session::with_signer(Arc::new(keys.clone()));
        session.store.upsert(Record::Vehicle(Vehicle::new("CB400")));
        session.pagination.has_more = true;

        session.clear();

        assert_eq!(session.owner(), &keys.public_key());
        assert!(session.can_sign());
        assert!(session.vehicles().is_empty());
        assert_eq!(session.pagination, Pagination::default());
    }
}
