pub mod alerts;
pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod raw;
pub mod record;
pub mod stats;
pub mod timeline;
pub mod vehicle;
