use nostr_sdk::prelude::{Keys, ToBech32};

use crate::cli::AuthCommands;
use crate::error::CliError;
use crate::keychain::{resolve_identity, IdentityStore, StoredIdentity, SECRET_KEY_ENV};

pub fn run_auth(command: AuthCommands, store: &IdentityStore) -> Result<(), CliError> {
    match command {
        AuthCommands::Login {
            secret_key,
            public_key,
            generate,
        } => {
            let identity = login_identity(secret_key.as_deref(), public_key.as_deref(), generate)?;
            store.save(&identity)?;
            println!("Logged in as {} ({})", identity.npub(), access_label(&identity));
            Ok(())
        }
        AuthCommands::Status => {
            if std::env::var_os(SECRET_KEY_ENV).is_some() {
                println!("Using the key from {SECRET_KEY_ENV}");
            }
            match resolve_identity(store)? {
                Some(identity) => {
                    println!("Logged in as {} ({})", identity.npub(), access_label(&identity));
                }
                None => println!("Not logged in."),
            }
            Ok(())
        }
        AuthCommands::Logout => {
            store.clear()?;
            println!("Removed the stored key.");
            Ok(())
        }
    }
}

fn login_identity(
    secret_key: Option<&str>,
    public_key: Option<&str>,
    generate: bool,
) -> Result<StoredIdentity, CliError> {
    match (secret_key, public_key) {
        (Some(secret), _) => StoredIdentity::parse_secret(secret),
        (None, Some(public)) => StoredIdentity::parse_public(public),
        (None, None) if generate => {
            let keys = Keys::generate();
            let nsec = keys
                .secret_key()
                .to_bech32()
                .map_err(|error| CliError::Auth(error.to_string()))?;
            println!("Generated a new key: {nsec}");
            println!("Back it up; it is the only way to sign as this identity.");
            Ok(StoredIdentity::Signing(keys))
        }
        (None, None) => Err(CliError::InvalidInput(
            "pass --secret-key, --public-key or --generate".to_string(),
        )),
    }
}

const fn access_label(identity: &StoredIdentity) -> &'static str {
    if identity.can_sign() {
        "signing"
    } else {
        "read-only"
    }
}
