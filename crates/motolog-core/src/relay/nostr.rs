//! Relay transport backed by the nostr-sdk client

use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};
use nostr_sdk::prelude::*;

use super::{RelayTransport, SendOutcome};
use crate::config::RelayConfig;
use crate::error::{Error, Result};

/// Connected relay pool
pub struct NostrRelays {
    client: Client,
    relays: Vec<String>,
    query_timeout: Duration,
}

impl NostrRelays {
    /// Add every configured relay to a fresh client and start connecting.
    ///
    /// Connection happens in the background; relays that never come up
    /// simply fail their sends and return empty queries.
    pub async fn connect(config: &RelayConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::default();
        for url in &config.relays {
            client
                .add_relay(url.as_str())
                .await
                .map_err(|e| Error::Transport(format!("{url}: {e}")))?;
        }
        client.connect().await;
        tracing::info!("Connecting to {} relays", config.relays.len());

        Ok(Self {
            client,
            relays: config.relays.clone(),
            query_timeout: config.fetch_deadline(),
        })
    }
}

impl RelayTransport for NostrRelays {
    fn relays(&self) -> Vec<String> {
        self.relays.clone()
    }

    fn send<'a>(&'a self, relay: &'a str, event: &'a Event) -> BoxFuture<'a, SendOutcome> {
        Box::pin(async move {
            match self.client.send_event_to([relay], event).await {
                Ok(output) if !output.success.is_empty() => SendOutcome::Accepted,
                Ok(output) => {
                    let reason = output
                        .failed
                        .into_values()
                        .next()
                        .unwrap_or_else(|| "no acknowledgement".to_string());
                    SendOutcome::Rejected(reason)
                }
                Err(e) => SendOutcome::Rejected(e.to_string()),
            }
        })
    }

    fn query<'a>(&'a self, relay: &'a str, filter: Filter) -> BoxStream<'a, Event> {
        // Entries are yielded as the relay sends them, so a caller that stops
        // at its deadline keeps everything received up to that point.
        let open = async move {
            match self
                .client
                .stream_events_from([relay], filter, self.query_timeout)
                .await
            {
                Ok(events) => events.boxed(),
                Err(e) => {
                    tracing::warn!("Query to {relay} failed: {e}");
                    stream::empty().boxed()
                }
            }
        };
        stream::once(open).flatten().boxed()
    }
}
