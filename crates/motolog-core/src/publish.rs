//! Publishing record entries to the relay set.
//!
//! An entry is signed once and submitted to every relay concurrently. The
//! call resolves on the first acknowledgement; if every relay answers without
//! accepting, or the deadline passes first, it still resolves and reports
//! what happened. Relays are slow and flaky, so neither case is an error.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use nostr_sdk::prelude::*;

use crate::codec::{self, EntryDraft};
use crate::error::{Error, Result};
use crate::relay::{RelayTransport, SendOutcome};
use crate::signer::EntrySigner;

/// A relay that answered without accepting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRejection {
    pub relay: String,
    pub reason: String,
}

/// How a submission to the relay set resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// At least one relay stored the entry
    Accepted { relay: String },
    /// Every relay answered and none accepted
    Unconfirmed { rejections: Vec<RelayRejection> },
    /// The deadline passed before any relay accepted
    DeadlineElapsed,
}

impl Delivery {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Result of a publish or retraction
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// The signed entry that was submitted
    pub event: Event,
    pub delivery: Delivery,
}

impl PublishReport {
    pub const fn event_id(&self) -> EventId {
        self.event.id
    }
}

/// Publishes record entries through a relay transport
pub struct Publisher<'a, T: ?Sized> {
    transport: &'a T,
    deadline: Duration,
}

impl<'a, T: RelayTransport + ?Sized> Publisher<'a, T> {
    pub const fn new(transport: &'a T, deadline: Duration) -> Self {
        Self {
            transport,
            deadline,
        }
    }

    /// Sign `draft` at logical time `created_at` and submit it.
    ///
    /// Fails only when no signer is configured or the signer declines.
    pub async fn publish(
        &self,
        signer: Option<&dyn EntrySigner>,
        draft: &EntryDraft,
        created_at: u64,
    ) -> Result<PublishReport> {
        let signer = signer.ok_or(Error::SignerUnavailable)?;
        let unsigned = codec::encode(
            &draft.d_tag,
            draft.kind,
            &draft.content,
            Timestamp::from(created_at),
        )
        .build(signer.identity());
        let event = signer.sign(unsigned).await?;

        let delivery = deliver(self.transport, &event, self.deadline).await;
        tracing::info!("Published {} {} ({delivery:?})", draft.kind, draft.d_tag);
        Ok(PublishReport { event, delivery })
    }
}

/// Race one signed entry across every relay against `deadline`.
///
/// Pending submissions are dropped as soon as the outcome is known.
pub(crate) async fn deliver<T: RelayTransport + ?Sized>(
    transport: &T,
    event: &Event,
    deadline: Duration,
) -> Delivery {
    let relays = transport.relays();
    let mut pending: FuturesUnordered<_> = relays
        .iter()
        .map(|relay| async move { (relay.as_str(), transport.send(relay, event).await) })
        .collect();

    let timer = tokio::time::sleep(deadline);
    tokio::pin!(timer);

    let mut rejections = Vec::new();
    loop {
        tokio::select! {
            next = pending.next() => match next {
                Some((relay, SendOutcome::Accepted)) => {
                    tracing::debug!("{relay} accepted {}", event.id);
                    return Delivery::Accepted { relay: relay.to_string() };
                }
                Some((relay, SendOutcome::Rejected(reason))) => {
                    tracing::warn!("{relay} rejected {}: {reason}", event.id);
                    rejections.push(RelayRejection {
                        relay: relay.to_string(),
                        reason,
                    });
                }
                None => return Delivery::Unconfirmed { rejections },
            },
            () = &mut timer => {
                tracing::warn!(
                    "No relay accepted {} within {}s",
                    event.id,
                    deadline.as_secs()
                );
                return Delivery::DeadlineElapsed;
            }
        }
    }
}
