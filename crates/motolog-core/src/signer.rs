//! Signing capability for outgoing entries

use futures::future::BoxFuture;
use nostr_sdk::prelude::*;

use crate::error::{Error, Result};

/// Something that can sign entries on behalf of the session owner.
///
/// A session without a signer is read-only; publishing and retraction fail
/// with [`Error::SignerUnavailable`] before anything is sent.
pub trait EntrySigner: Send + Sync {
    /// Public key entries will be signed as
    fn identity(&self) -> PublicKey;

    /// Sign a fully built entry
    fn sign(&self, unsigned: UnsignedEvent) -> BoxFuture<'_, Result<Event>>;
}

impl EntrySigner for Keys {
    fn identity(&self) -> PublicKey {
        Self::public_key(self)
    }

    fn sign(&self, unsigned: UnsignedEvent) -> BoxFuture<'_, Result<Event>> {
        Box::pin(async move {
            unsigned
                .sign_with_keys(self)
                .map_err(|e| Error::SigningRejected(e.to_string()))
        })
    }
}
