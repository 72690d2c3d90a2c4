//! Paged fetching of the owner's entries from every relay.
//!
//! Each page is one query fanned out to all relays. Results are deduplicated
//! by entry id (relays overlap), trimmed to the newest `page_size` entries,
//! and the oldest kept timestamp becomes the cursor for the next page. A
//! page that runs past its deadline finalizes with whatever arrived.

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use nostr_sdk::prelude::*;

use crate::codec::{self, DecodedEntry, APP_LABEL};
use crate::relay::RelayTransport;

/// One bounded window of the owner's entries
#[derive(Debug, Clone, Default)]
pub struct FetchedBatch {
    /// Unique entries, newest first
    pub entries: Vec<Event>,
    /// Minimum logical timestamp among `entries`; `None` when empty
    pub oldest: Option<u64>,
    /// The window was full, so older entries may exist
    pub has_more: bool,
}

impl FetchedBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode every entry, logging and skipping the ones that fail
    pub fn decode(&self) -> Vec<DecodedEntry> {
        decode_entries(&self.entries)
    }
}

/// Runs paged queries through a relay transport
pub struct BatchFetcher<'a, T: ?Sized> {
    transport: &'a T,
    deadline: Duration,
    page_size: usize,
}

impl<'a, T: RelayTransport + ?Sized> BatchFetcher<'a, T> {
    pub const fn new(transport: &'a T, deadline: Duration, page_size: usize) -> Self {
        Self {
            transport,
            deadline,
            page_size,
        }
    }

    /// Query for the page of `owner`'s entries strictly older than `until`.
    pub fn page_filter(&self, owner: &PublicKey, until: Option<u64>) -> Filter {
        let filter = base_filter(owner).limit(self.page_size);
        match until {
            // Relay `until` is inclusive
            Some(until) => filter.until(Timestamp::from(until.saturating_sub(1))),
            None => filter,
        }
    }

    /// Fetch one page ending before `until` (or the newest page).
    pub async fn fetch_batch(&self, owner: &PublicKey, until: Option<u64>) -> FetchedBatch {
        if until == Some(0) {
            return FetchedBatch::default();
        }
        let filter = self.page_filter(owner, until);
        let collected = self.collect(filter, owner).await;
        let batch = window_batch(collected, self.page_size);
        tracing::debug!(
            "Fetched {} entries (oldest {:?}, more: {})",
            batch.len(),
            batch.oldest,
            batch.has_more
        );
        batch
    }

    /// Unpaged query for every entry of `owner`, newest first.
    ///
    /// Used by the developer view; nothing is merged.
    pub async fn refetch_raw(&self, owner: &PublicKey) -> Vec<Event> {
        let mut entries = self.collect(base_filter(owner), owner).await;
        sort_newest_first(&mut entries);
        entries
    }

    async fn collect(&self, filter: Filter, owner: &PublicKey) -> Vec<Event> {
        let relays = self.transport.relays();
        let mut merged = stream::select_all(
            relays
                .iter()
                .map(|relay| self.transport.query(relay, filter.clone())),
        );

        let mut unique: HashMap<EventId, Event> = HashMap::new();
        let gather = async {
            while let Some(event) = merged.next().await {
                if event.pubkey != *owner {
                    tracing::warn!("Dropping entry {} from unexpected author", event.id);
                    continue;
                }
                unique.entry(event.id).or_insert(event);
            }
        };
        if tokio::time::timeout(self.deadline, gather).await.is_err() {
            tracing::warn!(
                "Fetch deadline of {}s elapsed; continuing with {} entries",
                self.deadline.as_secs(),
                unique.len()
            );
        }

        unique.into_values().collect()
    }
}

/// Owner's application entries, any age
fn base_filter(owner: &PublicKey) -> Filter {
    Filter::new()
        .kind(codec::entry_kind())
        .author(*owner)
        .custom_tag(SingleLetterTag::uppercase(Alphabet::L), APP_LABEL)
}

/// Keep the newest `limit` unique entries and derive the cursor.
///
/// The next page asks for entries strictly older than the cursor. When the
/// cut falls inside a run of entries sharing one timestamp, the ones dropped
/// here are not returned by any later page either.
pub fn window_batch(mut entries: Vec<Event>, limit: usize) -> FetchedBatch {
    sort_newest_first(&mut entries);
    entries.truncate(limit);
    let oldest = entries.last().map(|event| event.created_at.as_u64());
    let has_more = limit > 0 && entries.len() == limit;
    FetchedBatch {
        entries,
        oldest,
        has_more,
    }
}

/// Newest first; ties broken by id so windows are deterministic
fn sort_newest_first(entries: &mut [Event]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Decode a batch; failures are per entry and never abort the batch.
pub fn decode_entries(entries: &[Event]) -> Vec<DecodedEntry> {
    entries
        .iter()
        .filter_map(|event| match codec::decode(event) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Skipping entry {}: {e}", event.id);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::relay::mock::{MockRelays, SendBehavior};

    const DEADLINE: Duration = Duration::from_secs(10);

    fn entry(keys: &Keys, n: u64) -> Event {
        EventBuilder::new(
            Kind::ApplicationSpecificData,
            r#"{"vehicleId":"cb400","date":"2024-01-01","odometer":1.0}"#,
        )
        .tags([
            Tag::identifier(format!("odometer:{n}")),
            Tag::custom(TagKind::custom("L"), [APP_LABEL]),
            Tag::custom(TagKind::custom("l"), ["odometer", APP_LABEL]),
        ])
        .custom_created_at(Timestamp::from(n))
        .sign_with_keys(keys)
        .unwrap()
    }

    fn timestamps(batch: &FetchedBatch) -> Vec<u64> {
        batch
            .entries
            .iter()
            .map(|e| e.created_at.as_u64())
            .collect()
    }

    #[test]
    fn test_window_keeps_newest_and_reports_cursor() {
        let keys = Keys::generate();
        let entries: Vec<Event> = (1..=8).map(|n| entry(&keys, n * 10)).collect();

        let batch = window_batch(entries, 5);

        assert_eq!(timestamps(&batch), vec![80, 70, 60, 50, 40]);
        assert_eq!(batch.oldest, Some(40));
        assert!(batch.has_more);
    }

    #[test]
    fn test_window_under_limit() {
        let keys = Keys::generate();
        let batch = window_batch(vec![entry(&keys, 5), entry(&keys, 9)], 200);
        assert_eq!(timestamps(&batch), vec![9, 5]);
        assert_eq!(batch.oldest, Some(5));
        assert!(!batch.has_more);
    }

    #[test]
    fn test_empty_window_does_not_advance() {
        let batch = window_batch(Vec::new(), 200);
        assert_eq!(batch.oldest, None);
        assert!(!batch.has_more);
    }

    #[tokio::test]
    async fn test_dedups_across_relays_and_truncates() {
        let keys = Keys::generate();
        let all: Vec<Event> = (1..=30).map(|n| entry(&keys, n)).collect();
        let relays = MockRelays::new()
            .with_relay("wss://a", SendBehavior::Accept)
            .storing(all[..20].to_vec())
            .with_relay("wss://b", SendBehavior::Accept)
            .storing(all[10..].to_vec());

        let batch = BatchFetcher::new(&relays, DEADLINE, 12)
            .fetch_batch(&keys.public_key(), None)
            .await;

        // a returns 20..9 and b returns 30..19; union is 30..9, newest 12 kept
        assert_eq!(timestamps(&batch), (19..=30).rev().collect::<Vec<_>>());
        assert_eq!(batch.oldest, Some(19));
        assert!(batch.has_more);
    }

    #[tokio::test]
    async fn test_until_is_exclusive() {
        let keys = Keys::generate();
        let relays = MockRelays::new()
            .with_relay("wss://a", SendBehavior::Accept)
            .storing((1..=10).map(|n| entry(&keys, n)).collect());

        let fetcher = BatchFetcher::new(&relays, DEADLINE, 4);
        let first = fetcher.fetch_batch(&keys.public_key(), None).await;
        assert_eq!(timestamps(&first), vec![10, 9, 8, 7]);

        let second = fetcher.fetch_batch(&keys.public_key(), first.oldest).await;
        assert_eq!(timestamps(&second), vec![6, 5, 4, 3]);

        let third = fetcher.fetch_batch(&keys.public_key(), second.oldest).await;
        assert_eq!(timestamps(&third), vec![2, 1]);
        assert!(!third.has_more);
    }

    #[tokio::test]
    async fn test_entries_cut_at_a_shared_timestamp_are_not_paged_in() {
        let keys = Keys::generate();
        let mut stored: Vec<Event> = (1..=3)
            .map(|n| {
                EventBuilder::new(Kind::ApplicationSpecificData, "{}")
                    .tags([Tag::identifier(format!("odometer:tied-{n}"))])
                    .custom_created_at(Timestamp::from(10))
                    .sign_with_keys(&keys)
                    .unwrap()
            })
            .collect();
        stored.push(entry(&keys, 9));
        let relays = MockRelays::new()
            .with_relay("wss://a", SendBehavior::Accept)
            .storing(stored);
        let fetcher = BatchFetcher::new(&relays, DEADLINE, 2);

        let first = fetcher.fetch_batch(&keys.public_key(), None).await;
        assert_eq!(timestamps(&first), vec![10, 10]);
        assert_eq!(first.oldest, Some(10));
        assert!(first.has_more);

        let second = fetcher.fetch_batch(&keys.public_key(), first.oldest).await;
        // The third entry at 10 fell outside both windows
        assert_eq!(timestamps(&second), vec![9]);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_foreign_authors_are_dropped() {
        let keys = Keys::generate();
        let stranger = Keys::generate();
        let relays = MockRelays::new()
            .with_relay("wss://liar", SendBehavior::Accept)
            .storing(vec![entry(&keys, 1), entry(&stranger, 2)])
            .ignoring_filter();

        let batch = BatchFetcher::new(&relays, DEADLINE, 200)
            .fetch_batch(&keys.public_key(), None)
            .await;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.entries[0].pubkey, keys.public_key());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_finalizes_with_partial_results() {
        let keys = Keys::generate();
        let relays = MockRelays::new()
            .with_relay("wss://stuck", SendBehavior::Accept)
            .storing(vec![entry(&keys, 1), entry(&keys, 2)])
            .stalling()
            .with_relay("wss://ok", SendBehavior::Accept)
            .storing(vec![entry(&keys, 3)]);

        let batch = BatchFetcher::new(&relays, DEADLINE, 200)
            .fetch_batch(&keys.public_key(), None)
            .await;

        assert_eq!(timestamps(&batch), vec![3, 2, 1]);
        assert_eq!(batch.oldest, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_entries_already_streamed() {
        let keys = Keys::generate();
        let relays = MockRelays::new()
            .with_relay("wss://slow", SendBehavior::Accept)
            .storing((1..=200).map(|n| entry(&keys, n)).collect())
            .trickling(Duration::from_millis(60))
            .stalling();

        let batch = BatchFetcher::new(&relays, DEADLINE, 200)
            .fetch_batch(&keys.public_key(), None)
            .await;

        // One entry per 60ms: the newest 166 arrived before the 10s deadline
        assert_eq!(batch.len(), 166);
        assert_eq!(batch.entries[0].created_at.as_u64(), 200);
        assert_eq!(batch.oldest, Some(35));
        assert!(!batch.has_more);
    }

    #[tokio::test]
    async fn test_page_filter_shape() {
        let keys = Keys::generate();
        let relays = MockRelays::new().with_relay("wss://a", SendBehavior::Accept);
        let fetcher = BatchFetcher::new(&relays, DEADLINE, 200);

        let filter = fetcher.page_filter(&keys.public_key(), Some(1_000));

        assert_eq!(filter.limit, Some(200));
        assert_eq!(filter.until, Some(Timestamp::from(999)));
        assert!(filter
            .kinds
            .as_ref()
            .is_some_and(|kinds| kinds.contains(&Kind::ApplicationSpecificData)));
    }

    #[test]
    fn test_decode_entries_skips_failures() {
        let keys = Keys::generate();
        let broken = EventBuilder::new(Kind::ApplicationSpecificData, "not json")
            .tags([
                Tag::identifier("odometer:broken"),
                Tag::custom(TagKind::custom("l"), ["odometer", APP_LABEL]),
            ])
            .sign_with_keys(&keys)
            .unwrap();

        let decoded = decode_entries(&[entry(&keys, 1), broken]);

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].d_tag, "odometer:1");
    }
}
