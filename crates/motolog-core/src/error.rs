//! Error types for motolog-core

use thiserror::Error;

/// Result type alias using motolog-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in motolog-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// No signer configured for the session
    #[error("No signer available. Log in with a secret key to publish or delete records.")]
    SignerUnavailable,

    /// The signer refused or failed to sign an entry
    #[error("Signer rejected the entry: {0}")]
    SigningRejected(String),

    /// Building a wire entry failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// A single wire entry could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Relay transport setup error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Preference store failure
    #[error("Preference store error: {0}")]
    Preferences(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a wire entry was skipped while decoding a batch.
///
/// These never abort a batch; the decoder logs them and moves on.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The entry kind is not the application-specific data kind
    #[error("unexpected entry kind {0}")]
    UnexpectedKind(u16),

    /// The entry carries no `d` identifier tag
    #[error("entry {0} has no identifier tag")]
    MissingIdentifier(String),

    /// Neither the label nor the identifier prefix names a known record kind
    #[error("unrecognized record label {label:?} for identifier {identifier}")]
    Unrecognized {
        /// Identifier tag value
        identifier: String,
        /// Label tag value, if present
        label: Option<String>,
    },

    /// The JSON body does not match the record shape
    #[error("malformed body for {identifier}: {source}")]
    MalformedBody {
        /// Identifier tag value
        identifier: String,
        /// Underlying parse error
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_unavailable_message_is_actionable() {
        let msg = Error::SignerUnavailable.to_string();
        assert!(msg.contains("Log in with a secret key"));
    }

    #[test]
    fn decode_error_display_names_identifier() {
        let err = DecodeError::Unrecognized {
            identifier: "mystery:1".to_string(),
            label: Some("mystery".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("mystery:1"));
        assert!(msg.contains("unrecognized"));
    }

    #[test]
    fn from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
