//! Relay configuration shared by every client.
//!
//! Holds the fixed relay set, the publish/fetch deadlines and the page size
//! used by the batch fetcher.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::is_relay_url;

/// Relays used when nothing else is configured
pub const DEFAULT_RELAYS: [&str; 3] = [
    "wss://nostr.compile-error.net",
    "wss://nos.lol",
    "wss://relay.nostr.wirednet.jp",
];

/// Publish and retraction deadline
pub const DEFAULT_PUBLISH_DEADLINE_SECS: u64 = 10;
/// Batch fetch deadline
pub const DEFAULT_FETCH_DEADLINE_SECS: u64 = 10;
/// Entries per batch
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Relay set and protocol timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RelayConfig {
    pub relays: Vec<String>,
    pub publish_deadline_secs: u64,
    pub fetch_deadline_secs: u64,
    pub page_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            relays: default_relays(),
            publish_deadline_secs: DEFAULT_PUBLISH_DEADLINE_SECS,
            fetch_deadline_secs: DEFAULT_FETCH_DEADLINE_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RelayConfig {
    /// Default timing over an explicit relay list
    pub fn with_relays<I, S>(relays: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self {
            relays: relays.into_iter().map(Into::into).collect(),
            ..Self::default()
        };
        config.normalize();
        config
    }

    pub const fn publish_deadline(&self) -> Duration {
        Duration::from_secs(self.publish_deadline_secs)
    }

    pub const fn fetch_deadline(&self) -> Duration {
        Duration::from_secs(self.fetch_deadline_secs)
    }

    /// Trim relay URLs, drop trailing slashes, empties and duplicates.
    pub fn normalize(&mut self) {
        let mut seen = Vec::with_capacity(self.relays.len());
        for relay in self.relays.drain(..) {
            let relay = normalize_relay_url(&relay);
            if !relay.is_empty() && !seen.contains(&relay) {
                seen.push(relay);
            }
        }
        self.relays = seen;
    }

    /// Check that the configuration can drive the protocol.
    pub fn validate(&self) -> Result<()> {
        if self.relays.is_empty() {
            return Err(Error::Config("at least one relay is required".to_string()));
        }
        if let Some(bad) = self.relays.iter().find(|url| !is_relay_url(url)) {
            return Err(Error::Config(format!(
                "relay URL must start with ws:// or wss://: {bad}"
            )));
        }
        if self.page_size == 0 {
            return Err(Error::Config("page size must be positive".to_string()));
        }
        if self.publish_deadline_secs == 0 || self.fetch_deadline_secs == 0 {
            return Err(Error::Config("deadlines must be positive".to_string()));
        }
        Ok(())
    }
}

/// The default relay list as owned strings
pub fn default_relays() -> Vec<String> {
    DEFAULT_RELAYS.iter().map(ToString::to_string).collect()
}

/// Parse a comma separated relay list, e.g. from an environment variable.
pub fn parse_relay_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(normalize_relay_url)
        .filter(|url| !url.is_empty())
        .collect()
}

fn normalize_relay_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
