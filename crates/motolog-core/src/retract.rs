//! Retracting published records

use std::time::Duration;

use nostr_sdk::prelude::*;

use crate::codec;
use crate::error::{Error, Result};
use crate::publish::{deliver, PublishReport};
use crate::relay::RelayTransport;
use crate::signer::EntrySigner;
use crate::store::RawEntryCache;

/// Sends deletion entries through a relay transport
pub struct Retractor<'a, T: ?Sized> {
    transport: &'a T,
    deadline: Duration,
}

impl<'a, T: RelayTransport + ?Sized> Retractor<'a, T> {
    pub const fn new(transport: &'a T, deadline: Duration) -> Self {
        Self {
            transport,
            deadline,
        }
    }

    /// Retract the record stored under `d_tag`.
    ///
    /// The deletion always names the record's address; it also names the
    /// last wire entry seen for it when the raw cache has one. Resolution
    /// follows the same first-ack/deadline race as publishing.
    pub async fn retract(
        &self,
        signer: Option<&dyn EntrySigner>,
        raw: &RawEntryCache,
        d_tag: &str,
        created_at: u64,
    ) -> Result<PublishReport> {
        let signer = signer.ok_or(Error::SignerUnavailable)?;
        let owner = signer.identity();
        let prior = raw.event_id(d_tag);
        if prior.is_none() {
            tracing::debug!("No cached entry for {d_tag}; retracting by address only");
        }

        let unsigned =
            codec::encode_deletion(&owner, d_tag, prior, Timestamp::from(created_at)).build(owner);
        let event = signer.sign(unsigned).await?;

        let delivery = deliver(self.transport, &event, self.deadline).await;
        tracing::info!("Retracted {d_tag} ({delivery:?})");
        Ok(PublishReport { event, delivery })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::Delivery;
    use crate::relay::mock::{MockRelays, SendBehavior};

    const DEADLINE: Duration = Duration::from_secs(10);

    fn tag_values(event: &Event, name: &str) -> Vec<String> {
        event
            .tags
            .iter()
            .filter_map(|tag| match tag.as_slice() {
                [n, value, ..] if n == name => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_retraction_references_cached_entry() {
        let keys = Keys::generate();
        let prior = EventBuilder::new(Kind::ApplicationSpecificData, "{}")
            .tag(Tag::identifier("quick:abc"))
            .sign_with_keys(&keys)
            .unwrap();
        let mut raw = RawEntryCache::new();
        raw.record(&prior);
        let relays = MockRelays::new().with_relay("wss://a", SendBehavior::Accept);

        let report = Retractor::new(&relays, DEADLINE)
            .retract(Some(&keys), &raw, "quick:abc", 50)
            .await
            .unwrap();

        assert!(report.delivery.is_accepted());
        assert_eq!(report.event.kind, Kind::EventDeletion);
        assert_eq!(tag_values(&report.event, "e"), vec![prior.id.to_hex()]);
        assert_eq!(
            tag_values(&report.event, "a"),
            vec![format!("30078:{}:quick:abc", keys.public_key().to_hex())]
        );
    }

    #[tokio::test]
    async fn test_retraction_without_cached_entry_uses_address_only() {
        let keys = Keys::generate();
        let relays = MockRelays::new().with_relay("wss://a", SendBehavior::Reject("no".into()));

        let report = Retractor::new(&relays, DEADLINE)
            .retract(Some(&keys), &RawEntryCache::new(), "shop:1", 50)
            .await
            .unwrap();

        assert!(tag_values(&report.event, "e").is_empty());
        assert_eq!(tag_values(&report.event, "a").len(), 1);
        assert!(matches!(report.delivery, Delivery::Unconfirmed { .. }));
    }

    #[tokio::test]
    async fn test_retraction_requires_signer() {
        let relays = MockRelays::new().with_relay("wss://a", SendBehavior::Accept);
        let err = Retractor::new(&relays, DEADLINE)
            .retract(None, &RawEntryCache::new(), "shop:1", 50)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SignerUnavailable));
    }
}
