//! Identity persistence in the system keychain.
//!
//! A signing identity is stored as its `nsec`, a read-only one as its `npub`.

#[cfg(test)]
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;
use motolog_core::util::normalize_text_option;
use motolog_core::Session;
use nostr_sdk::prelude::{Keys, PublicKey, ToBech32};

use crate::error::CliError;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "motolog-cli";
const KEYRING_USERNAME: &str = "identity";
pub const SECRET_KEY_ENV: &str = "MOTOLOG_SECRET_KEY";

/// The key a session is opened with
#[derive(Debug, Clone)]
pub enum StoredIdentity {
    Signing(Keys),
    ReadOnly(PublicKey),
}

impl StoredIdentity {
    pub fn parse_secret(value: &str) -> Result<Self, CliError> {
        Keys::parse(value.trim())
            .map(Self::Signing)
            .map_err(|error| CliError::Auth(format!("invalid secret key: {error}")))
    }

    pub fn parse_public(value: &str) -> Result<Self, CliError> {
        PublicKey::parse(value.trim())
            .map(Self::ReadOnly)
            .map_err(|error| CliError::Auth(format!("invalid public key: {error}")))
    }

    fn decode(raw: &str) -> Result<Self, CliError> {
        if raw.starts_with("npub") {
            Self::parse_public(raw)
        } else {
            Self::parse_secret(raw)
        }
    }

    fn encode(&self) -> Result<String, CliError> {
        match self {
            Self::Signing(keys) => keys
                .secret_key()
                .to_bech32()
                .map_err(|error| CliError::Keychain(error.to_string())),
            Self::ReadOnly(public_key) => public_key
                .to_bech32()
                .map_err(|error| CliError::Keychain(error.to_string())),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Signing(keys) => keys.public_key(),
            Self::ReadOnly(public_key) => *public_key,
        }
    }

    pub const fn can_sign(&self) -> bool {
        matches!(self, Self::Signing(_))
    }

    pub fn npub(&self) -> String {
        self.public_key()
            .to_bech32()
            .unwrap_or_else(|_| self.public_key().to_hex())
    }

    pub fn into_session(self) -> Session {
        match self {
            Self::Signing(keys) => Session::with_signer(Arc::new(keys)),
            Self::ReadOnly(public_key) => Session::read_only(public_key),
        }
    }
}

#[derive(Clone)]
pub struct IdentityStore {
    username: String,
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self {
            username: KEYRING_USERNAME.to_string(),
        }
    }
}

impl IdentityStore {
    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry, CliError> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| CliError::Keychain(error.to_string()))
    }

    #[cfg(not(test))]
    pub fn load(&self) -> Result<Option<StoredIdentity>, CliError> {
        match self.entry()?.get_password() {
            Ok(raw) => StoredIdentity::decode(&raw).map(Some),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(CliError::Keychain(error.to_string())),
        }
    }

    #[cfg(test)]
    pub fn load(&self) -> Result<Option<StoredIdentity>, CliError> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| CliError::Keychain(error.to_string()))?;
        guard
            .get(&self.username)
            .map(String::as_str)
            .map(StoredIdentity::decode)
            .transpose()
    }

    #[cfg(not(test))]
    pub fn save(&self, identity: &StoredIdentity) -> Result<(), CliError> {
        let raw = identity.encode()?;
        self.entry()?
            .set_password(&raw)
            .map_err(|error| CliError::Keychain(error.to_string()))
    }

    #[cfg(test)]
    pub fn save(&self, identity: &StoredIdentity) -> Result<(), CliError> {
        let raw = identity.encode()?;
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| CliError::Keychain(error.to_string()))?;
        guard.insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    pub fn clear(&self) -> Result<(), CliError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(CliError::Keychain(error.to_string())),
        }
    }

    #[cfg(test)]
    pub fn clear(&self) -> Result<(), CliError> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| CliError::Keychain(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

/// `MOTOLOG_SECRET_KEY` if set, otherwise whatever the keychain holds.
pub fn resolve_identity(store: &IdentityStore) -> Result<Option<StoredIdentity>, CliError> {
    if let Some(secret) = normalize_text_option(std::env::var(SECRET_KEY_ENV).ok()) {
        return StoredIdentity::parse_secret(&secret).map(Some);
    }
    store.load()
}
