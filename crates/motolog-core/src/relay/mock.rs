//! In-memory relay set for tests

use std::sync::Mutex;
use std::time::Duration;

use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream, StreamExt};
use nostr_sdk::prelude::*;

use super::{RelayTransport, SendOutcome};

/// How a mock relay answers submissions
#[derive(Debug, Clone)]
pub enum SendBehavior {
    Accept,
    AcceptAfter(Duration),
    Reject(String),
    Hang,
}

#[derive(Debug, Clone)]
struct MockRelay {
    url: String,
    send: SendBehavior,
    stored: Vec<Event>,
    /// Keep the query stream open after the stored entries
    stall_query: bool,
    /// Delay before each queried entry is yielded
    trickle: Option<Duration>,
    /// Return stored entries whatever the filter says
    ignore_filter: bool,
}

/// Relay set whose answers are scripted per relay
#[derive(Debug, Default)]
pub struct MockRelays {
    relays: Vec<MockRelay>,
    sent: Mutex<Vec<(String, Event)>>,
    filters: Mutex<Vec<Filter>>,
}

impl MockRelays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relay(mut self, url: &str, send: SendBehavior) -> Self {
        self.relays.push(MockRelay {
            url: url.to_string(),
            send,
            stored: Vec::new(),
            stall_query: false,
            trickle: None,
            ignore_filter: false,
        });
        self
    }

    /// Entries the most recently added relay returns for any query
    pub fn storing(mut self, events: Vec<Event>) -> Self {
        if let Some(relay) = self.relays.last_mut() {
            relay.stored = events;
        }
        self
    }

    /// Make the most recently added relay never finish its query stream
    pub fn stalling(mut self) -> Self {
        if let Some(relay) = self.relays.last_mut() {
            relay.stall_query = true;
        }
        self
    }

    /// Make the most recently added relay send queried entries one at a time,
    /// `delay` apart
    pub fn trickling(mut self, delay: Duration) -> Self {
        if let Some(relay) = self.relays.last_mut() {
            relay.trickle = Some(delay);
        }
        self
    }

    /// Make the most recently added relay answer queries with everything it holds
    pub fn ignoring_filter(mut self) -> Self {
        if let Some(relay) = self.relays.last_mut() {
            relay.ignore_filter = true;
        }
        self
    }

    /// Entries submitted so far, with the relay they went to
    pub fn sent(&self) -> Vec<(String, Event)> {
        self.sent.lock().unwrap().clone()
    }

    /// Filters queried so far
    pub fn filters(&self) -> Vec<Filter> {
        self.filters.lock().unwrap().clone()
    }

    fn relay(&self, url: &str) -> Option<&MockRelay> {
        self.relays.iter().find(|r| r.url == url)
    }
}

impl RelayTransport for MockRelays {
    fn relays(&self) -> Vec<String> {
        self.relays.iter().map(|r| r.url.clone()).collect()
    }

    fn send<'a>(&'a self, relay: &'a str, event: &'a Event) -> BoxFuture<'a, SendOutcome> {
        self.sent
            .lock()
            .unwrap()
            .push((relay.to_string(), event.clone()));
        let behavior = self
            .relay(relay)
            .map_or(SendBehavior::Reject("unknown relay".to_string()), |r| {
                r.send.clone()
            });
        Box::pin(async move {
            match behavior {
                SendBehavior::Accept => SendOutcome::Accepted,
                SendBehavior::AcceptAfter(delay) => {
                    tokio::time::sleep(delay).await;
                    SendOutcome::Accepted
                }
                SendBehavior::Reject(reason) => SendOutcome::Rejected(reason),
                SendBehavior::Hang => future::pending().await,
            }
        })
    }

    fn query<'a>(&'a self, relay: &'a str, filter: Filter) -> BoxStream<'a, Event> {
        self.filters.lock().unwrap().push(filter.clone());
        let Some(relay) = self.relay(relay) else {
            return stream::empty().boxed();
        };

        let mut matching: Vec<Event> = relay
            .stored
            .iter()
            .filter(|event| relay.ignore_filter || matches_filter(&filter, event))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            matching.truncate(limit);
        }
        let events = match relay.trickle {
            Some(delay) => stream::iter(matching)
                .then(move |event| async move {
                    tokio::time::sleep(delay).await;
                    event
                })
                .boxed(),
            None => stream::iter(matching).boxed(),
        };
        if relay.stall_query {
            events.chain(stream::pending()).boxed()
        } else {
            events.boxed()
        }
    }
}

/// The subset of relay-side filtering the core relies on: kinds, authors and
/// an inclusive `until`
fn matches_filter(filter: &Filter, event: &Event) -> bool {
    let kind_ok = filter
        .kinds
        .as_ref()
        .is_none_or(|kinds| kinds.contains(&event.kind));
    let author_ok = filter
        .authors
        .as_ref()
        .is_none_or(|authors| authors.contains(&event.pubkey));
    let until_ok = filter.until.is_none_or(|until| event.created_at <= until);
    kind_ok && author_ok && until_ok
}
