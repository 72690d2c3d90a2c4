//! Client-facing orchestration over the relay protocol and session state.

mod logbook;

pub use logbook::{LoadSummary, LogbookService};
