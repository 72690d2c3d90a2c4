//! Relay transport abstraction
//!
//! The core fans requests out over a fixed relay set through [`RelayTransport`]
//! and never talks to a websocket directly. [`NostrRelays`] is the production
//! implementation.

mod nostr;

#[cfg(test)]
pub(crate) mod mock;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use nostr_sdk::prelude::{Event, Filter};

pub use nostr::NostrRelays;

/// How a single relay answered a submitted entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The relay stored the entry
    Accepted,
    /// The relay refused the entry or the connection failed
    Rejected(String),
}

/// Per-relay access to a set of relays.
///
/// Implementations never apply their own overall deadline; callers race
/// the returned futures and streams against one.
pub trait RelayTransport: Send + Sync {
    /// Relay URLs requests are fanned out to
    fn relays(&self) -> Vec<String>;

    /// Submit a signed entry to one relay
    fn send<'a>(&'a self, relay: &'a str, event: &'a Event) -> BoxFuture<'a, SendOutcome>;

    /// Stream entries matching `filter` from one relay; the stream ends when
    /// the relay signals it has nothing more
    fn query<'a>(&'a self, relay: &'a str, filter: Filter) -> BoxStream<'a, Event>;
}
