use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] motolog_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Keychain error: {0}")]
    Keychain(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not logged in. Run `motolog auth login` or set MOTOLOG_SECRET_KEY.")]
    NotLoggedIn,
    #[error("No vehicle selected. Add one with `motolog vehicle add` or pass --vehicle.")]
    NoVehicle,
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),
}
