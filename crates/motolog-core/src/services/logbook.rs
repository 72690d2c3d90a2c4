//! Logbook service shared by clients.
//!
//! Ties the fetcher, merger, publisher and retractor to a [`Session`]: pages
//! are folded into the session's store, saved records are published and then
//! upserted locally, and deletions retract before removing the local copy.

use nostr_sdk::prelude::Event;

use crate::codec::EntryDraft;
use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::fetch::{BatchFetcher, FetchedBatch};
use crate::models::{LogRecord, Record, Vehicle, VEHICLE_TAG_PREFIX};
use crate::publish::{PublishReport, Publisher};
use crate::relay::RelayTransport;
use crate::retract::Retractor;
use crate::session::{Pagination, Session};
use crate::store::ApplyMode;

/// What one page load did to the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Unique entries received
    pub fetched: usize,
    /// Entries decoded into records
    pub decoded: usize,
    /// Whether another page may exist
    pub has_more: bool,
}

impl LoadSummary {
    pub const fn skipped(&self) -> usize {
        self.fetched - self.decoded
    }
}

/// Loads, saves and deletes records for a session
pub struct LogbookService<T> {
    transport: T,
    config: RelayConfig,
}

impl<T: RelayTransport> LogbookService<T> {
    pub const fn new(transport: T, config: RelayConfig) -> Self {
        Self { transport, config }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn config(&self) -> &RelayConfig {
        &self.config
    }

    fn fetcher(&self) -> BatchFetcher<'_, T> {
        BatchFetcher::new(
            &self.transport,
            self.config.fetch_deadline(),
            self.config.page_size,
        )
    }

    /// Load the newest page, replacing whatever the session held.
    pub async fn load_initial(&self, session: &mut Session) -> Result<LoadSummary> {
        let batch = self.fetcher().fetch_batch(session.owner(), None).await;
        session.raw.clear();
        session.pagination = Pagination::default();
        let summary = Self::absorb(session, &batch, ApplyMode::Replace);
        tracing::info!(
            "Loaded {} records ({} vehicles)",
            session.store.len(),
            session.store.vehicles.len()
        );
        Ok(summary)
    }

    /// Load the page before the current cursor and merge it in.
    ///
    /// Does nothing when the last page was not full.
    pub async fn load_more(&self, session: &mut Session) -> Result<LoadSummary> {
        if !session.pagination.has_more {
            return Ok(LoadSummary::default());
        }
        let until = session.pagination.oldest;
        let batch = self.fetcher().fetch_batch(session.owner(), until).await;
        let summary = Self::absorb(session, &batch, ApplyMode::Merge);
        tracing::info!(
            "Loaded page {} ({} entries)",
            session.pagination.pages,
            summary.fetched
        );
        Ok(summary)
    }

    /// Load the newest page, then keep paging until the history is exhausted.
    pub async fn load_all(&self, session: &mut Session) -> Result<LoadSummary> {
        let mut total = self.load_initial(session).await?;
        while session.pagination.has_more {
            let cursor = session.pagination.oldest;
            let page = self.load_more(session).await?;
            total.fetched += page.fetched;
            total.decoded += page.decoded;
            if session.pagination.oldest == cursor {
                break;
            }
        }
        total.has_more = session.pagination.has_more;
        Ok(total)
    }

    /// Fold a fetched page into the session and move the cursor.
    fn absorb(session: &mut Session, batch: &FetchedBatch, mode: ApplyMode) -> LoadSummary {
        for event in &batch.entries {
            session.raw.record(event);
            session.clock_mut().observe(event.created_at.as_u64());
        }
        let decoded = batch.decode();
        let summary = LoadSummary {
            fetched: batch.len(),
            decoded: decoded.len(),
            has_more: batch.has_more,
        };
        if summary.skipped() > 0 {
            tracing::warn!("Skipped {} undecodable entries", summary.skipped());
        }
        session.store.apply(decoded, mode);

        let pagination = &mut session.pagination;
        pagination.oldest = match (pagination.oldest, batch.oldest) {
            (Some(held), Some(new)) => Some(held.min(new)),
            (held, new) => new.or(held),
        };
        pagination.has_more = batch.has_more;
        pagination.pages += 1;
        summary
    }

    /// Publish a record and, once submitted, hold it in the session.
    ///
    /// The session is updated whenever signing succeeded, even if no relay
    /// confirmed before the deadline.
    pub async fn save_record(&self, session: &mut Session, record: Record) -> Result<PublishReport> {
        validate(&record)?;
        let draft = EntryDraft::from_record(&record)?;
        let created_at = session.tick();

        let report = Publisher::new(&self.transport, self.config.publish_deadline())
            .publish(session.signer(), &draft, created_at)
            .await?;

        session.raw.record(&report.event);
        match stamped(record, created_at) {
            Record::Vehicle(vehicle) => session.store.put_vehicle(vehicle, created_at),
            record => session.store.upsert(record),
        }
        Ok(report)
    }

    /// Republish a record the session already holds, under the same
    /// identifier.
    ///
    /// The new version carries a fresh logical timestamp, so it wins over
    /// every earlier version of the record.
    pub async fn update_record(&self, session: &mut Session, record: Record) -> Result<PublishReport> {
        let held = match &record {
            Record::Vehicle(vehicle) => session.store.vehicle(&vehicle.id).is_some(),
            other => session.store.find_by_id(other.id()).is_some(),
        };
        if !held {
            return Err(Error::NotFound(record.id().to_string()));
        }
        self.save_record(session, record).await
    }

    /// Publish a vehicle profile
    pub async fn save_vehicle(&self, session: &mut Session, vehicle: Vehicle) -> Result<PublishReport> {
        self.save_record(session, Record::Vehicle(vehicle)).await
    }

    /// Retract a dated record and drop it from the session.
    pub async fn delete_record(&self, session: &mut Session, id: &str) -> Result<PublishReport> {
        if session.store.find_by_id(id).is_none() && session.raw.get(id).is_none() {
            return Err(Error::NotFound(id.to_string()));
        }
        let report = self.retract(session, id).await?;
        session.store.remove(id);
        session.raw.remove(id);
        Ok(report)
    }

    /// Retract a vehicle profile and drop it from the session.
    ///
    /// The vehicle's records are left alone.
    pub async fn delete_vehicle(&self, session: &mut Session, vehicle_id: &str) -> Result<PublishReport> {
        if session.store.vehicle(vehicle_id).is_none() {
            return Err(Error::NotFound(format!("vehicle {vehicle_id}")));
        }
        let d_tag = format!("{VEHICLE_TAG_PREFIX}{vehicle_id}");
        let report = self.retract(session, &d_tag).await?;
        session.store.remove_vehicle(vehicle_id);
        session.raw.remove(&d_tag);
        Ok(report)
    }

    async fn retract(&self, session: &mut Session, d_tag: &str) -> Result<PublishReport> {
        let created_at = session.tick();
        Retractor::new(&self.transport, self.config.publish_deadline())
            .retract(session.signer(), &session.raw, d_tag, created_at)
            .await
    }

    /// Every entry the relays hold for the owner, newest first.
    ///
    /// Refreshes the raw cache; the record store is not touched.
    pub async fn refetch_raw(&self, session: &mut Session) -> Result<Vec<Event>> {
        let entries = self.fetcher().refetch_raw(session.owner()).await;
        // Oldest first so the newest entry per identifier ends up cached
        for event in entries.iter().rev() {
            session.raw.record(event);
        }
        Ok(entries)
    }
}

fn validate(record: &Record) -> Result<()> {
    let vehicle_id = match record {
        Record::Vehicle(vehicle) => {
            if vehicle.name.trim().is_empty() || vehicle.id.is_empty() {
                return Err(Error::InvalidInput("vehicle name is required".to_string()));
            }
            return Ok(());
        }
        Record::Refuel(r) => r.vehicle_id(),
        Record::Quick(r) => r.vehicle_id(),
        Record::Inspection(r) => r.vehicle_id(),
        Record::Shop(r) => r.vehicle_id(),
        Record::Odometer(r) => r.vehicle_id(),
    };
    if vehicle_id.trim().is_empty() {
        return Err(Error::InvalidInput(format!(
            "{} {} has no vehicle",
            record.kind(),
            record.id()
        )));
    }
    Ok(())
}

fn stamped(record: Record, created_at: u64) -> Record {
    fn stamp<R: LogRecord>(mut record: R, created_at: u64) -> R {
        let id = record.id().to_string();
        record.stamp(id, created_at);
        record
    }
    match record {
        Record::Vehicle(v) => Record::Vehicle(v),
        Record::Refuel(r) => Record::Refuel(stamp(r, created_at)),
        Record::Quick(r) => Record::Quick(stamp(r, created_at)),
        Record::Inspection(r) => Record::Inspection(stamp(r, created_at)),
        Record::Shop(r) => Record::Shop(stamp(r, created_at)),
        Record::Odometer(r) => Record::Odometer(stamp(r, created_at)),
    }
}
