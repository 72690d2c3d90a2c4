//! motolog-core - Core library for motolog
//!
//! This crate contains the record models, the relay publish/fetch protocol,
//! last-write-wins merging, and the fuel and maintenance analytics used by
//! every motolog client.

pub mod codec;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fuel;
pub mod merge;
pub mod models;
pub mod preferences;
pub mod publish;
pub mod relay;
pub mod retract;
pub mod services;
pub mod session;
pub mod signer;
pub mod store;
pub mod util;

pub use config::RelayConfig;
pub use error::{DecodeError, Error, Result};
pub use models::{Record, RecordKind, TimelineItem, Vehicle};
pub use publish::{Delivery, PublishReport};
pub use services::LogbookService;
pub use session::Session;
pub use signer::EntrySigner;
